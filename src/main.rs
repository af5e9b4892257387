//! Mutant Collector entry point
//!
//! Headless native runner: the autopilot plays a full run at 60 frames per
//! second (or as fast as possible with `--fast`) and the final score goes to
//! the score file.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::thread;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use clap::{Parser, Subcommand};
    use mutant_collector::consts::FRAMES_PER_SECOND;
    use mutant_collector::highscores::ScoreError;
    use mutant_collector::settings::DEFAULT_SETTINGS_PATH;
    use mutant_collector::sim::{FrameView, Frontend, Game, GameEvent, TickInput, run};
    use mutant_collector::{ScoreHistory, ScoreRecord, Settings};

    const RULES: &str = "\
Mutant Collector - collect the stars, dodge the hazards, survive the mutations

RULES:
    Arrow keys move the avatar. Pick up every star before the 30 s timer runs out.
    Stars picked up within 5 s are worth 3 points, later ones 1 point.
    Touching a hazard costs a life, then you are immune for 3 s.
    Shield booster: absorbs the next hit. Slow booster: hazards at half speed for 5 s.
    Running out of time costs a life but still advances you.
    After every level one rule mutates: your speed, hazard speed, hazard count,
    or inverted controls.

In this build the autopilot plays; progress is logged (RUST_LOG=debug for more).";

    const CREDITS: &str = "\
CREDITS

Game design:
    Luis Mario Franco Gómez
    Lizeth Juliana Barrios Gonzales
Course: Computación Gráfica
Instructor: Francisco Alejandro Medina Aguirre";

    /// Headless Mutant Collector runner
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None, disable_help_subcommand = true)]
    struct Cli {
        #[command(subcommand)]
        command: Option<Command>,
        /// Seed for a reproducible run (defaults to the settings file, then the clock)
        #[arg(long, value_name = "N", global = true)]
        seed: Option<u64>,
        /// Run as fast as possible instead of 60 frames per second
        #[arg(long, global = true)]
        fast: bool,
        /// Print every frame as a JSON line
        #[arg(long, global = true)]
        json: bool,
        /// Settings file
        #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_PATH, global = true)]
        config: PathBuf,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
    enum Command {
        /// Play a full run with the autopilot (default)
        Play,
        /// Show the last 10 scores
        Scores,
        /// Show the game rules
        Help,
        /// Show the credits
        Credits,
    }

    fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5eed)
    }

    /// Terminal frontend: autopilot input, log or JSON output, real-time pacing
    struct HeadlessFrontend {
        fast: bool,
        json: bool,
        frames: u64,
        next_frame: Instant,
        frame_duration: Duration,
    }

    impl HeadlessFrontend {
        fn new(fast: bool, json: bool) -> Self {
            Self {
                fast,
                json,
                frames: 0,
                next_frame: Instant::now(),
                frame_duration: Duration::from_secs(1) / FRAMES_PER_SECOND as u32,
            }
        }
    }

    impl Frontend for HeadlessFrontend {
        fn poll_input(&mut self) -> TickInput {
            TickInput {
                idle_mode: true,
                ..Default::default()
            }
        }

        fn present(&mut self, view: &FrameView) {
            self.frames += 1;
            if self.json {
                match serde_json::to_string(view) {
                    Ok(line) => println!("{}", line),
                    Err(e) => log::warn!("Could not serialize frame: {}", e),
                }
            } else if self.frames % FRAMES_PER_SECOND == 0 {
                log::info!("{}", view.status_line());
            }
        }

        fn on_event(&mut self, event: &GameEvent) {
            match event {
                GameEvent::LevelStarted { level, rules } => {
                    log::info!("=== Level {} === {:?}", level, rules);
                }
                GameEvent::LevelFinished {
                    level,
                    outcome,
                    score,
                    lives,
                } => {
                    log::info!(
                        "Level {} ended: {:?} (passed: {}), score {}, lives {}",
                        level,
                        outcome,
                        outcome.passed(),
                        score,
                        lives
                    );
                }
                GameEvent::RulesMutated { mutation, .. } => {
                    log::info!("Mutation: {}", mutation.as_str());
                }
                GameEvent::GameOver {
                    score,
                    levels_cleared,
                } => {
                    log::info!("Game over: {} pts, {} levels cleared", score, levels_cleared);
                }
                GameEvent::Aborted { score } => log::info!("Quit with {} pts", score),
            }
        }

        fn pause(&mut self, secs: u64, caption: &str) {
            if !self.json {
                println!("{}", caption);
            }
            if !self.fast {
                thread::sleep(Duration::from_secs(secs));
            }
            self.next_frame = Instant::now();
        }

        fn wait_frame(&mut self) {
            if self.fast {
                return;
            }
            self.next_frame += self.frame_duration;
            let now = Instant::now();
            if self.next_frame > now {
                thread::sleep(self.next_frame - now);
            } else {
                // Fell behind; don't try to catch up
                self.next_frame = now;
            }
        }
    }

    fn play(args: &Cli) {
        let settings = Settings::load(&args.config);
        let seed = args.seed.or(settings.seed).unwrap_or_else(clock_seed);
        let history = ScoreHistory::new(settings.score_file.clone());

        let mut game = Game::new(settings, seed);
        let mut frontend = HeadlessFrontend::new(args.fast, args.json);
        let summary = run(&mut game, &mut frontend);

        if !summary.completed {
            log::info!("Run not completed, score not saved");
            return;
        }
        if let Err(e) = history.append(&ScoreRecord::now(summary.score)) {
            log::warn!("Could not save score: {}", e);
        }
        if !args.json {
            println!(
                "Final score: {} ({} levels cleared, seed {})",
                summary.score, summary.levels_cleared, summary.seed
            );
        }
    }

    fn show_scores(args: &Cli) -> Result<(), ScoreError> {
        let settings = Settings::load(&args.config);
        let history = ScoreHistory::new(settings.score_file);
        let records = history.recent()?;
        if records.is_empty() {
            println!("No scores saved yet.");
            return Ok(());
        }
        println!("SCORES");
        for record in &records {
            println!("  {}", record);
        }
        if let Some(best) = records.iter().map(|r| r.score).max() {
            println!("Best: {} pts", best);
        }
        Ok(())
    }

    pub fn main() -> Result<(), ScoreError> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Cli::parse();
        match args.command.unwrap_or(Command::Play) {
            Command::Play => {
                log::info!("Mutant Collector (native) starting...");
                play(&args);
                Ok(())
            }
            Command::Scores => show_scores(&args),
            Command::Help => {
                println!("{}", RULES);
                Ok(())
            }
            Command::Credits => {
                println!("{}", CREDITS);
                Ok(())
            }
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), mutant_collector::highscores::ScoreError> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser frontend; the library is usable on its own
}
