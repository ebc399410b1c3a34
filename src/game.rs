//! Frame driver
//!
//! Runs the fixed-timestep simulation from variable frame times. A frontend
//! writes pointer and key state into [`Game::input`], calls
//! [`Game::update`] once per frame and draws [`Game::scene`].

use crate::config::Config;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::scene::Scene;
use crate::session::Session;
use crate::sim::{GameEvent, GameWorld, TickInput, tick};

/// Longest frame time fed into the accumulator
const MAX_FRAME_DT: f32 = 0.1;

pub struct Game {
    pub world: GameWorld,
    pub session: Session,
    /// Input for the next tick; one-shot fields clear after each tick
    pub input: TickInput,
    accumulator: f32,
}

impl Game {
    pub fn new(seed: u64, config: Config) -> Self {
        Self {
            world: GameWorld::new(seed, config),
            session: Session::new(),
            input: TickInput::default(),
            accumulator: 0.0,
        }
    }

    /// Advance by a frame's worth of fixed ticks. Returns the events produced.
    pub fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        self.accumulator += dt.min(MAX_FRAME_DT);

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.world, &mut self.session, &self.input, SIM_DT);
            events.extend(self.world.drain_events());
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.wheel = 0.0;
            self.input.shoot = false;
            self.input.hit_point = None;
            self.input.grab = false;
            self.input.release = false;
            self.input.reset = false;
            self.input.stop_balls = false;
            self.input.toggle_help = false;
            self.input.toggle_music = false;
        }
        events
    }

    pub fn scene(&self) -> Scene {
        Scene::capture(&self.world, &self.session)
    }

    /// Start over with a new seed, keeping the config
    pub fn restart(&mut self, seed: u64) {
        let config = self.world.config.clone();
        self.world = GameWorld::new(seed, config);
        self.session = Session::new();
        self.input = TickInput::default();
        self.accumulator = 0.0;
    }
}
