//! 8-ball rule engine
//!
//! Runs once per turn boundary (a shot was taken and every ball is at rest).
//! The world loop has already handed the stick to the opponent before the
//! rules run: `world.last` is the shooter, `world.current` the opponent.
//! Continuing a turn means handing the stick back to the shooter.

use serde::{Deserialize, Serialize};

use super::ball::{BallGroup, CUE_BALL, EIGHT_BALL, TOTAL_BALLS};
use super::cue::{GROUP_SIZE, Player};
use super::state::{GameEvent, GameWorld};

/// Rule state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleState {
    /// Opening shot
    Breaking,
    /// Groups not yet assigned
    OpenTable,
    Playing,
    /// The incoming player may place the cue ball anywhere
    BallInHand,
    GameOver { winner: Player },
}

impl RuleState {
    pub fn name(&self) -> &'static str {
        match self {
            RuleState::Breaking => "Breaking",
            RuleState::OpenTable => "Open Table",
            RuleState::Playing => "Playing",
            RuleState::BallInHand => "Ball In Hand",
            RuleState::GameOver { .. } => "Game Over",
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, RuleState::GameOver { .. })
    }
}

/// What happened during one turn. Reset exactly once per turn boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnStatistics {
    /// Contacts between the cue ball and any object ball
    pub cue_ball_hits: u32,
    /// First ball the cue ball touched
    pub first_ball_hit: Option<u8>,
    pub cue_ball_pocketed: bool,
    /// Indexed by ball number
    pub cushion_touched: [bool; TOTAL_BALLS],
    /// Object balls pocketed this turn, in order
    pub pocketed: Vec<u8>,
}

impl TurnStatistics {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn record_cue_contact(&mut self, other: u8) {
        if self.cue_ball_hits == 0 {
            self.first_ball_hit = Some(other);
        }
        self.cue_ball_hits += 1;
    }

    pub fn record_cushion(&mut self, number: u8) {
        if let Some(touched) = self.cushion_touched.get_mut(number as usize) {
            *touched = true;
        }
    }

    pub fn record_pocket(&mut self, number: u8) {
        if number == CUE_BALL {
            self.cue_ball_pocketed = true;
        } else {
            self.pocketed.push(number);
        }
    }

    /// Distinct balls that reached a cushion
    pub fn cushion_ball_count(&self) -> usize {
        self.cushion_touched.iter().filter(|&&t| t).count()
    }

    pub fn eight_pocketed(&self) -> bool {
        self.pocketed.contains(&EIGHT_BALL)
    }

    /// Non-8 balls pocketed this turn that count for `group`
    pub fn pocketed_in_group(&self, group: BallGroup) -> usize {
        self.pocketed
            .iter()
            .filter(|&&n| n != EIGHT_BALL && group.contains(n))
            .count()
    }

    /// Non-8 balls pocketed this turn that belong to the other group
    pub fn pocketed_outside_group(&self, group: BallGroup) -> usize {
        self.pocketed
            .iter()
            .filter(|&&n| n != EIGHT_BALL && !group.contains(n))
            .count()
    }
}

/// Why a turn was a foul
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultReason {
    /// The cue ball touched nothing
    NoContact,
    /// The cue ball was pocketed
    Scratch,
    /// First contact was not one of the shooter's balls
    WrongFirstContact { ball: u8 },
    /// Nothing reached a cushion and nothing was pocketed
    NoRailNoPocket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// The 8 dropped on a legal break
    EightOnBreak,
    /// The 8 was pocketed after clearing the group
    EightAfterClearing,
    /// The opponent pocketed the 8 before clearing their group
    EightPocketedEarly,
}

/// Outcome of one rule evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Illegal break, table re-racked
    BreakRerack,
    /// Legal break, table is open
    BreakLegal,
    /// Foul, opponent gets ball in hand
    Fault(FaultReason),
    /// Groups decided by this shot
    GroupsAssigned {
        shooter: Player,
        group: BallGroup,
        continues: bool,
    },
    /// Shooter keeps the table
    TurnContinues,
    /// Stick passes to the opponent
    TurnPasses,
    Win { winner: Player, reason: WinReason },
}

/// Shared foul check.
///
/// `eight_open` tells whether the shooter had cleared their group before
/// this shot, which makes the 8 a legal first contact.
pub fn evaluate_fault(
    stats: &TurnStatistics,
    group: BallGroup,
    eight_open: bool,
) -> Option<FaultReason> {
    if stats.cue_ball_hits == 0 {
        return Some(FaultReason::NoContact);
    }
    if stats.cue_ball_pocketed {
        return Some(FaultReason::Scratch);
    }
    if group != BallGroup::Undefined
        && let Some(first) = stats.first_ball_hit
    {
        let legal = if first == EIGHT_BALL {
            eight_open
        } else {
            group.contains(first)
        };
        if !legal {
            return Some(FaultReason::WrongFirstContact { ball: first });
        }
    }
    if stats.cushion_ball_count() == 0 && stats.pocketed.is_empty() {
        return Some(FaultReason::NoRailNoPocket);
    }
    None
}

/// Evaluate the finished turn, update the world, reset the statistics.
pub fn apply_rules(world: &mut GameWorld) -> Verdict {
    log::debug!("Turn statistics: {:?}", world.stats);

    let verdict = match world.state {
        RuleState::Breaking => rules_breaking(world),
        RuleState::OpenTable => rules_open_table(world),
        RuleState::Playing => rules_playing(world),
        RuleState::BallInHand => rules_ball_in_hand(world),
        RuleState::GameOver { .. } => return Verdict::TurnPasses,
    };

    log::info!(
        "{} shot: {:?} -> {}",
        world.last.as_str(),
        verdict,
        world.state.name()
    );
    world.events.push(GameEvent::RulesApplied { verdict });
    if let RuleState::GameOver { winner } = world.state {
        log::info!("Game over, {} wins", winner.as_str());
        world.events.push(GameEvent::GameOver { winner });
    }

    world.stats.reset();
    verdict
}

fn rules_breaking(world: &mut GameWorld) -> Verdict {
    let stats = &world.stats;
    let valid = stats.cue_ball_hits > 0
        && !stats.cue_ball_pocketed
        && (stats.cushion_ball_count() >= world.config.rules.break_min_cushion_balls
            || !stats.pocketed.is_empty());

    if !valid {
        world.setup_rack();
        return Verdict::BreakRerack;
    }

    if stats.eight_pocketed() {
        let shooter = world.last;
        world.declare_winner(shooter);
        return Verdict::Win {
            winner: shooter,
            reason: WinReason::EightOnBreak,
        };
    }

    world.state = RuleState::OpenTable;
    Verdict::BreakLegal
}

/// Foul handling shared by every post-break state
fn check_fault(world: &mut GameWorld) -> Option<Verdict> {
    let shooter = world.last;
    let group = world.stick(shooter).group;
    let eight_open = shooter_cleared_before_turn(world, shooter);

    let reason = evaluate_fault(&world.stats, group, eight_open)?;
    if world.stats.eight_pocketed() {
        // Keep the game winnable: the 8 goes back on the foot spot
        world.respot_eight_ball();
    }
    world.state = RuleState::BallInHand;
    Some(Verdict::Fault(reason))
}

fn rules_open_table(world: &mut GameWorld) -> Verdict {
    if let Some(verdict) = check_fault(world) {
        return verdict;
    }
    open_table_outcome(world)
}

fn open_table_outcome(world: &mut GameWorld) -> Verdict {
    let shooter = world.last;
    let opponent = shooter.other();
    let table_open = world.stick(shooter).group == BallGroup::Undefined
        && world.stick(opponent).group == BallGroup::Undefined;

    if !table_open {
        return playing_outcome(world);
    }

    if world.stats.pocketed.is_empty() {
        // Stick already went to the opponent
        world.state = RuleState::OpenTable;
        return Verdict::TurnPasses;
    }

    if world.stats.eight_pocketed() {
        world.declare_winner(opponent);
        return Verdict::Win {
            winner: opponent,
            reason: WinReason::EightPocketedEarly,
        };
    }

    let group = world
        .stats
        .first_ball_hit
        .map(BallGroup::of)
        .filter(|g| *g != BallGroup::Undefined)
        .or_else(|| {
            world
                .stats
                .pocketed
                .first()
                .map(|&n| BallGroup::of(n))
        })
        .unwrap_or(BallGroup::Plain);

    world.assign_groups(shooter, group);

    let continues = world.stats.pocketed_in_group(group) > 0;
    if continues {
        world.current = shooter;
    }
    world.state = RuleState::Playing;
    Verdict::GroupsAssigned {
        shooter,
        group,
        continues,
    }
}

fn rules_playing(world: &mut GameWorld) -> Verdict {
    if let Some(verdict) = check_fault(world) {
        return verdict;
    }
    playing_outcome(world)
}

fn playing_outcome(world: &mut GameWorld) -> Verdict {
    let shooter = world.last;
    let opponent = shooter.other();

    if world.stats.eight_pocketed() {
        if shooter_cleared_before_turn(world, shooter) {
            world.declare_winner(shooter);
            return Verdict::Win {
                winner: shooter,
                reason: WinReason::EightAfterClearing,
            };
        }
        world.declare_winner(opponent);
        return Verdict::Win {
            winner: opponent,
            reason: WinReason::EightPocketedEarly,
        };
    }

    let group = world.stick(shooter).group;
    let own = world.stats.pocketed_in_group(group);
    let wrong = world.stats.pocketed_outside_group(group);

    world.state = RuleState::Playing;
    if own > 0 && wrong == 0 {
        world.current = shooter;
        Verdict::TurnContinues
    } else {
        Verdict::TurnPasses
    }
}

fn rules_ball_in_hand(world: &mut GameWorld) -> Verdict {
    if let Some(verdict) = check_fault(world) {
        return verdict;
    }
    // A clean shot with no groups yet goes back to OpenTable so the next
    // pocket can still assign them
    open_table_outcome(world)
}

/// Whether the shooter's group was complete before this turn's pockets
fn shooter_cleared_before_turn(world: &GameWorld, shooter: Player) -> bool {
    let stick = world.stick(shooter);
    if stick.group == BallGroup::Undefined {
        return false;
    }
    let this_turn = world
        .stats
        .pocketed
        .iter()
        .filter(|&&n| stick.group.contains(n))
        .count();
    stick.group_pocketed_count().saturating_sub(this_turn) == GROUP_SIZE
}
