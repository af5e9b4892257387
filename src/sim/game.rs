//! Run controller
//!
//! Sequences level sessions, carries lives, shield and score between them,
//! mutates the rules after each passed level and decides when the run is
//! over.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rules::{Mutation, RuleSet, mutate_rules};
use super::state::Avatar;
use super::tick::{LevelConfig, LevelOutcome, LevelSession, TickInput, tick};
use super::view::FrameView;
use crate::settings::Settings;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// A level session is in progress
    Playing,
    /// Run ended normally (all levels done or out of lives)
    GameOver,
    /// Player quit mid-run; nothing is persisted
    Aborted,
}

/// Things the frontend may want to react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted {
        level: u32,
        rules: RuleSet,
    },
    LevelFinished {
        level: u32,
        outcome: LevelOutcome,
        score: u64,
        lives: u8,
    },
    RulesMutated {
        mutation: Mutation,
        rules: RuleSet,
    },
    GameOver {
        score: u64,
        levels_cleared: u32,
    },
    Aborted {
        score: u64,
    },
}

/// Final result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub score: u64,
    pub levels_cleared: u32,
    pub lives: u8,
    /// False when the player quit
    pub completed: bool,
}

/// A whole run from level 1 to game over
#[derive(Debug, Clone)]
pub struct Game {
    pub settings: Settings,
    pub seed: u64,
    rng: Pcg32,
    pub rules: RuleSet,
    /// Current level (1-based)
    pub level: u32,
    pub score: u64,
    pub phase: GamePhase,
    pub levels_cleared: u32,
    level_config: LevelConfig,
    /// Lives and shield while no session holds the avatar
    lives: u8,
    has_shield: bool,
    session: Option<LevelSession>,
    pending: Vec<GameEvent>,
}

impl Game {
    /// Set up a run. Zero levels or zero lives give a run that is over
    /// before it starts, with score 0.
    pub fn new(settings: Settings, seed: u64) -> Self {
        let settings = settings.sanitized();
        let mut game = Self {
            rng: Pcg32::seed_from_u64(seed),
            seed,
            rules: settings.initial_rules,
            level: 1,
            score: 0,
            phase: GamePhase::Playing,
            levels_cleared: 0,
            level_config: settings.level_config(),
            lives: settings.starting_lives,
            has_shield: false,
            session: None,
            pending: Vec::new(),
            settings,
        };

        if game.settings.max_levels == 0 || game.lives == 0 {
            log::warn!(
                "Degenerate run (max_levels={}, lives={}), game over",
                game.settings.max_levels,
                game.lives
            );
            game.end_run();
        } else {
            log::info!("New run with seed {}", seed);
            game.start_level();
        }
        game
    }

    pub fn session(&self) -> Option<&LevelSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut LevelSession> {
        self.session.as_mut()
    }

    /// Lives right now, whether or not a level is running
    pub fn lives(&self) -> u8 {
        self.session
            .as_ref()
            .map(|s| s.avatar.lives)
            .unwrap_or(self.lives)
    }

    pub fn is_over(&self) -> bool {
        self.phase != GamePhase::Playing
    }

    /// Snapshot of the running level for rendering
    pub fn view(&self) -> Option<FrameView> {
        self.session.as_ref().map(FrameView::from_session)
    }

    /// Events produced since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            score: self.score,
            levels_cleared: self.levels_cleared,
            lives: self.lives(),
            completed: self.phase == GamePhase::GameOver,
        }
    }

    fn start_level(&mut self) {
        let mut avatar = Avatar::new(self.lives);
        avatar.has_shield = self.has_shield;
        self.session = Some(LevelSession::new(
            self.level,
            &self.rules,
            avatar,
            self.score,
            &self.level_config,
            &mut self.rng,
        ));
        self.pending.push(GameEvent::LevelStarted {
            level: self.level,
            rules: self.rules,
        });
    }

    fn end_run(&mut self) {
        self.phase = GamePhase::GameOver;
        log::info!(
            "Game over: score {}, {} levels cleared",
            self.score,
            self.levels_cleared
        );
        self.pending.push(GameEvent::GameOver {
            score: self.score,
            levels_cleared: self.levels_cleared,
        });
    }

    /// Advance one frame. Returns every event raised since the last call.
    pub fn tick(&mut self, input: &TickInput) -> Vec<GameEvent> {
        if self.phase == GamePhase::Playing {
            self.advance(input);
        }
        self.take_events()
    }

    fn advance(&mut self, input: &TickInput) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(outcome) = tick(session, input) else {
            return;
        };
        let Some(session) = self.session.take() else {
            return;
        };

        let level = session.level;
        let (avatar, score) = session.into_parts();
        self.lives = avatar.lives;
        self.has_shield = avatar.has_shield;
        self.score = score;
        self.pending.push(GameEvent::LevelFinished {
            level,
            outcome,
            score,
            lives: self.lives,
        });

        if outcome == LevelOutcome::Quit {
            self.phase = GamePhase::Aborted;
            log::info!("Run aborted at level {} with score {}", level, score);
            self.pending.push(GameEvent::Aborted { score });
            return;
        }

        if outcome.passed() {
            self.levels_cleared += 1;
            let mutation = mutate_rules(&mut self.rules, &mut self.rng);
            self.pending.push(GameEvent::RulesMutated {
                mutation,
                rules: self.rules,
            });
            self.level += 1;
        }

        if self.level > self.settings.max_levels || self.lives == 0 {
            self.end_run();
        } else {
            self.start_level();
        }
    }
}

/// Input and presentation collaborator driven by `run`
pub trait Frontend {
    /// Key states for the next frame
    fn poll_input(&mut self) -> TickInput;

    /// Show the current frame
    fn present(&mut self, view: &FrameView);

    fn on_event(&mut self, _event: &GameEvent) {}

    /// Fixed-duration presentation pause (intro, countdown, outro)
    fn pause(&mut self, _secs: u64, _caption: &str) {}

    /// Block until the next frame is due
    fn wait_frame(&mut self) {}
}

/// Play a run to the end through `frontend`
pub fn run<F: Frontend>(game: &mut Game, frontend: &mut F) -> RunSummary {
    if !game.is_over() {
        frontend.pause(game.settings.intro_secs, "Welcome to Mutant Collector!");
        for i in (1..=game.settings.countdown_secs).rev() {
            frontend.pause(1, &format!("Starting in... {}", i));
        }
    }

    for event in game.take_events() {
        frontend.on_event(&event);
    }

    while !game.is_over() {
        let input = frontend.poll_input();
        for event in game.tick(&input) {
            frontend.on_event(&event);
        }
        if let Some(view) = game.view() {
            frontend.present(&view);
        }
        frontend.wait_frame();
    }

    if game.phase == GamePhase::GameOver {
        frontend.pause(game.settings.outro_secs, "Game over!");
    }
    game.summary()
}
