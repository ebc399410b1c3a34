//! Game world and core simulation types
//!
//! Everything the world loop and the rule engine touch lives in
//! [`GameWorld`]. It is plain data: cloneable and serializable.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallGroup, CUE_BALL, EIGHT_BALL, TOTAL_BALLS};
use super::cue::{CueStick, Player};
use super::rules::{RuleState, TurnStatistics, Verdict};
use super::table::{
    RACK_EIGHT_SLOT, RACK_SOLID_CORNER_SLOT, RACK_STRIPE_CORNER_SLOT, Table, rack_positions,
};
use crate::config::Config;
use crate::consts::BALL_COUNT;

/// Aggregate motion of all balls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallsState {
    Moving,
    Stopped,
}

/// How hard a ball-ball contact was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTier {
    Soft,
    Hard,
}

/// Things that happened during a tick, for sound and presentation.
/// Drained by the caller after each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired { player: Player, power: f32 },
    CushionHit { ball: u8 },
    BallHit { ball: u8, other: u8, tier: HitTier },
    BallPocketed { ball: u8, pocket: usize },
    CueBallRespotted,
    RulesApplied { verdict: Verdict },
    GameOver { winner: Player },
    Reracked,
}

/// Seeded RNG bookkeeping. Each rack draws from a fresh stream so a seed
/// reproduces the whole sequence of racks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream += 1;
        rng
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameWorld {
    pub config: Config,
    pub rng_state: RngState,
    pub table: Table,
    /// Indexed by ball number; index 0 is the cue ball
    pub balls: Vec<Ball>,
    pub cue_sticks: [CueStick; 2],
    /// Player holding the stick
    pub current: Player,
    /// Player who took the last shot
    pub last: Player,
    pub state: RuleState,
    pub balls_state: BallsState,
    /// Every object ball pocketed this rack, in order
    pub pocketed_history: Vec<u8>,
    pub stats: TurnStatistics,
    /// A shot was taken; rules run once everything is at rest
    pub rules_pending: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameWorld {
    pub fn new(seed: u64, config: Config) -> Self {
        let table = Table::standard();
        let head = table.head_spot();
        let cue_sticks = [
            CueStick::new(Player::One, head, &config.cue),
            CueStick::new(Player::Two, head, &config.cue),
        ];

        let mut world = Self {
            config,
            rng_state: RngState::new(seed),
            table,
            balls: Vec::with_capacity(TOTAL_BALLS),
            cue_sticks,
            current: Player::One,
            last: Player::One,
            state: RuleState::Breaking,
            balls_state: BallsState::Stopped,
            pocketed_history: Vec::new(),
            stats: TurnStatistics::default(),
            rules_pending: false,
            time_ticks: 0,
            events: Vec::new(),
        };
        world.setup_rack();
        world.events.clear();
        world
    }

    /// Fresh rack, fresh sticks, player one to break
    pub fn setup_rack(&mut self) {
        let head = self.table.head_spot();
        let positions = rack_positions(self.table.foot_spot(), self.config.physics.ball_radius);
        let order = self.rack_order();

        let physics = &self.config.physics;
        self.balls = (0..TOTAL_BALLS as u8)
            .map(|n| {
                Ball::new(
                    n,
                    head,
                    physics.ball_radius,
                    physics.friction,
                    physics.restitution,
                )
            })
            .collect();
        for (slot, &number) in order.iter().enumerate() {
            self.balls[number as usize].place(positions[slot]);
        }

        self.cue_sticks = [
            CueStick::new(Player::One, head, &self.config.cue),
            CueStick::new(Player::Two, head, &self.config.cue),
        ];
        self.current = Player::One;
        self.last = Player::One;
        self.state = RuleState::Breaking;
        self.balls_state = BallsState::Stopped;
        self.pocketed_history.clear();
        self.stats.reset();
        self.rules_pending = false;
        self.events.push(GameEvent::Reracked);

        log::info!("Racked (seed {}, rack {})", self.rng_state.seed, self.rng_state.stream);
    }

    /// Ball number for every rack slot. The 8 sits in the middle of the
    /// third row and the back corners hold one solid and one stripe.
    fn rack_order(&mut self) -> [u8; BALL_COUNT] {
        let mut solids: Vec<u8> = (1..=7).collect();
        let mut stripes: Vec<u8> = (9..=15).collect();
        let shuffle = self.config.rules.shuffle_rack;
        let mut rng = self.rng_state.next_rng();
        if shuffle {
            solids.shuffle(&mut rng);
            stripes.shuffle(&mut rng);
        }

        let solid_corner = solids.remove(0);
        let stripe_corner = stripes.remove(0);
        let mut rest: Vec<u8> = solids.into_iter().chain(stripes).collect();
        if shuffle {
            rest.shuffle(&mut rng);
        }

        let mut order = [0u8; BALL_COUNT];
        let mut rest = rest.into_iter();
        for (slot, number) in order.iter_mut().enumerate() {
            *number = match slot {
                RACK_EIGHT_SLOT => EIGHT_BALL,
                RACK_SOLID_CORNER_SLOT => solid_corner,
                RACK_STRIPE_CORNER_SLOT => stripe_corner,
                _ => rest.next().unwrap_or(EIGHT_BALL),
            };
        }
        order
    }

    pub fn cue_ball(&self) -> &Ball {
        &self.balls[CUE_BALL as usize]
    }

    pub fn cue_ball_mut(&mut self) -> &mut Ball {
        &mut self.balls[CUE_BALL as usize]
    }

    pub fn ball_by_number(&self, number: u8) -> Option<&Ball> {
        self.balls.get(number as usize)
    }

    pub fn stick(&self, player: Player) -> &CueStick {
        &self.cue_sticks[player.index()]
    }

    pub fn stick_mut(&mut self, player: Player) -> &mut CueStick {
        &mut self.cue_sticks[player.index()]
    }

    pub fn current_stick(&self) -> &CueStick {
        self.stick(self.current)
    }

    pub fn current_stick_mut(&mut self) -> &mut CueStick {
        self.stick_mut(self.current)
    }

    pub fn balls_stopped(&self) -> bool {
        self.balls_state == BallsState::Stopped
    }

    pub fn winner(&self) -> Option<Player> {
        match self.state {
            RuleState::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn declare_winner(&mut self, winner: Player) {
        self.state = RuleState::GameOver { winner };
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Player whose group `number` belongs to, once groups are assigned
    fn owner_of(&self, number: u8) -> Option<Player> {
        let group = BallGroup::of(number);
        if group == BallGroup::Undefined {
            return None;
        }
        self.cue_sticks
            .iter()
            .find(|stick| stick.group == group)
            .map(|stick| stick.player)
    }

    /// Add an object ball to the history and credit its owner, if any
    pub fn record_pocketed(&mut self, number: u8) {
        if number == CUE_BALL {
            return;
        }
        if !self.pocketed_history.contains(&number) {
            self.pocketed_history.push(number);
        }
        if let Some(owner) = self.owner_of(number) {
            self.stick_mut(owner).record_pocketed(number);
        }
    }

    /// Give `group` to `shooter` and the other group to the opponent, then
    /// credit every ball already pocketed this rack.
    pub fn assign_groups(&mut self, shooter: Player, group: BallGroup) {
        self.stick_mut(shooter).group = group;
        self.stick_mut(shooter.other()).group = group.opposite();
        log::info!(
            "{} takes {}, {} takes {}",
            shooter.as_str(),
            group.as_str(),
            shooter.other().as_str(),
            group.opposite().as_str()
        );

        let history = self.pocketed_history.clone();
        for number in history {
            if let Some(owner) = self.owner_of(number) {
                self.stick_mut(owner).record_pocketed(number);
            }
        }
    }

    /// Whether a ball of the standard radius fits at `p` without touching
    /// any ball on the table other than `except`
    pub fn is_spot_free(&self, p: Vec2, except: u8) -> bool {
        let radius = self.config.physics.ball_radius;
        self.table.on_cloth(p, radius)
            && self
                .balls
                .iter()
                .filter(|b| b.number != except && !b.pocketed)
                .all(|b| b.center.distance(p) >= b.radius + radius)
    }

    /// Closest free spot to `spot` along `dir`, searching the preferred
    /// direction first at each distance
    fn free_spot_near(&self, spot: Vec2, dir: Vec2, except: u8) -> Vec2 {
        let step = self.config.physics.ball_radius * 0.5;
        let max_steps = (self.table.bounds.width / step.max(f32::EPSILON)) as usize;
        for k in 0..=max_steps {
            let offset = dir * step * k as f32;
            for candidate in [spot + offset, spot - offset] {
                if self.is_spot_free(candidate, except) {
                    return candidate;
                }
            }
        }
        spot
    }

    /// Put a pocketed cue ball back on the head spot
    pub fn respot_cue_ball(&mut self) {
        let spot = self.free_spot_near(self.table.head_spot(), Vec2::NEG_X, CUE_BALL);
        let cue = self.cue_ball_mut();
        cue.pocketed = false;
        cue.place(spot);
        self.events.push(GameEvent::CueBallRespotted);
        log::debug!("Cue ball respotted at ({:.1}, {:.1})", spot.x, spot.y);
    }

    /// Bring a fouled 8 back to the foot spot
    pub fn respot_eight_ball(&mut self) {
        let spot = self.free_spot_near(self.table.foot_spot(), Vec2::X, EIGHT_BALL);
        self.pocketed_history.retain(|&n| n != EIGHT_BALL);
        let eight = &mut self.balls[EIGHT_BALL as usize];
        eight.pocketed = false;
        eight.place(spot);
        log::info!("8 ball respotted at ({:.1}, {:.1})", spot.x, spot.y);
    }

    /// Debug control: zero every velocity
    pub fn stop_balls(&mut self) {
        for ball in &mut self.balls {
            ball.velocity = Vec2::ZERO;
            ball.spin = Vec2::ZERO;
            ball.moving = false;
        }
    }
}
