//! Fixed timestep simulation tick
//!
//! One call advances the world by `dt`: player input while the table is
//! at rest, ball integration with cushion, ball and pocket handling, then
//! the turn boundary once everything has stopped.

use glam::Vec2;

use super::ball::{Ball, CUE_BALL};
use super::collision::{
    apply_cushion_spin, ball_cushion_collision, ball_in_pocket, reflect_velocity,
    resolve_ball_ball,
};
use super::cue::CueState;
use super::rules::{self, RuleState};
use super::state::{BallsState, GameEvent, GameWorld, HitTier};
use crate::config::PhysicsConfig;
use crate::session::Session;

/// Spin below this magnitude is ignored on cushion contact
const MIN_CUSHION_SPIN: f32 = 0.01;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in table coordinates
    pub pointer: Option<Vec2>,
    /// Wheel delta this tick; negative adds power
    pub wheel: f32,
    /// Start the strike
    pub shoot: bool,
    /// New contact point on the cue ball, each axis in [-1, 1]
    pub hit_point: Option<Vec2>,
    /// Pointer pressed: pick up a ball
    pub grab: bool,
    /// Pointer released: drop the held ball
    pub release: bool,
    /// Re-rack (debug)
    pub reset: bool,
    /// Zero all velocities (debug)
    pub stop_balls: bool,
    pub toggle_help: bool,
    pub toggle_music: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut GameWorld, session: &mut Session, input: &TickInput, dt: f32) {
    if input.reset {
        session.clear();
        world.setup_rack();
        return;
    }

    if input.toggle_help {
        session.toggle_help();
    }
    if input.toggle_music {
        session.toggle_music();
    }
    if input.stop_balls {
        world.stop_balls();
    }

    world.time_ticks += 1;
    session.advance(dt);

    for ball in &mut world.balls {
        ball.prev_pos = ball.center;
    }

    if world.balls_stopped() && !world.state.is_game_over() {
        handle_player_input(world, session, input, dt);
    }

    step_balls(world, dt);

    let cue_center = world.cue_ball().center;
    for stick in &mut world.cue_sticks {
        stick.target = cue_center;
    }

    let moving = world.balls.iter().any(Ball::is_in_motion);
    world.balls_state = if moving {
        BallsState::Moving
    } else {
        BallsState::Stopped
    };

    if !moving && world.rules_pending {
        end_turn(world, session);
    }
}

/// Drag-and-drop, aiming, power and the strike. Only runs at rest.
fn handle_player_input(world: &mut GameWorld, session: &mut Session, input: &TickInput, dt: f32) {
    if input.grab
        && let Some(pointer) = input.pointer
    {
        session.grab(world, pointer);
    }
    if let Some(pointer) = input.pointer {
        session.drag_to(world, pointer);
    }
    if input.release {
        session.release(world);
    }
    if session.is_dragging() {
        return;
    }

    let strike_duration = world.config.cue.strike_duration;
    let spin_scale = world.config.cue.spin_from_hit_point;
    let stick = world.current_stick_mut();

    if stick.state == CueState::Ready {
        if let Some(pointer) = input.pointer {
            stick.aim_at(pointer);
        }
        if input.wheel != 0.0 {
            stick.adjust_power(input.wheel);
        }
        if let Some(hit_point) = input.hit_point {
            stick.set_hit_point(hit_point);
        }
        if input.shoot {
            stick.trigger();
        }
    }

    stick.update(dt, strike_duration);

    if let Some(shot) = stick.take_shot(spin_scale) {
        let player = world.current;
        let cue = world.cue_ball_mut();
        cue.velocity = shot.velocity;
        cue.spin = shot.spin;
        cue.moving = true;
        world.rules_pending = true;
        world.events.push(GameEvent::ShotFired {
            player,
            power: shot.power,
        });
        log::info!(
            "{} shoots: power {:.0}, spin ({:.2}, {:.2})",
            player.as_str(),
            shot.power,
            shot.spin.x,
            shot.spin.y
        );
    }
}

/// Integrate every ball on the table and resolve its contacts, in ball order
fn step_balls(world: &mut GameWorld, dt: f32) {
    let GameWorld {
        config,
        table,
        balls,
        stats,
        events,
        state,
        ..
    } = &mut *world;
    let physics = &config.physics;
    let breaking = *state == RuleState::Breaking;
    let outer = table.outer_bounds();
    let mut newly_pocketed = Vec::new();

    for i in 0..balls.len() {
        if balls[i].pocketed {
            continue;
        }
        balls[i].update(dt, physics.stop_threshold);

        // Cushions
        for cushion in &table.cushions {
            let ball = &mut balls[i];
            let hit = ball_cushion_collision(ball, cushion, physics.segment_end_tolerance);
            if !hit.hit {
                continue;
            }
            bounce_off_cushion(ball, hit.t, hit.normal, physics);
            events.push(GameEvent::CushionHit { ball: ball.number });
            // Rails touched before the break shot reaches the rack do not count
            if !breaking || stats.cue_ball_hits > 0 {
                stats.record_cushion(ball.number);
            }
        }

        // Other balls
        for j in 0..balls.len() {
            if j == i || balls[j].pocketed {
                continue;
            }
            let (a, b) = pair_mut(balls, i, j);
            let cue_speed = if a.is_cue_ball() {
                a.speed()
            } else if b.is_cue_ball() {
                b.speed()
            } else {
                0.0
            };
            if !resolve_ball_ball(a, b) {
                continue;
            }

            if a.number == CUE_BALL {
                stats.record_cue_contact(b.number);
            } else if b.number == CUE_BALL {
                stats.record_cue_contact(a.number);
            }
            let tier = if cue_speed > physics.hard_hit_speed {
                HitTier::Hard
            } else {
                HitTier::Soft
            };
            events.push(GameEvent::BallHit {
                ball: a.number,
                other: b.number,
                tier,
            });
        }

        // Pockets, then the off-table guard
        let ball = &mut balls[i];
        let pocket = table
            .pockets
            .iter()
            .position(|p| ball_in_pocket(ball.center, ball.radius, p))
            .or_else(|| {
                (!outer.contains(ball.center)).then(|| table.nearest_pocket(ball.center))
            });
        if let Some(pocket) = pocket {
            ball.capture();
            stats.record_pocket(ball.number);
            events.push(GameEvent::BallPocketed {
                ball: ball.number,
                pocket,
            });
            newly_pocketed.push(ball.number);
            log::debug!("Ball {} pocketed in pocket {}", ball.number, pocket);
        }
    }

    for number in newly_pocketed {
        world.record_pocketed(number);
    }
}

/// Snap back to the contact point, reflect, apply spin, lose energy and
/// step off the rail
fn bounce_off_cushion(ball: &mut Ball, t: f32, normal: Vec2, physics: &PhysicsConfig) {
    let movement = ball.center - ball.prev_pos;
    ball.center = ball.prev_pos + movement * t;
    ball.velocity = reflect_velocity(ball.velocity, normal);
    if ball.is_cue_ball() && ball.spin.length() > MIN_CUSHION_SPIN {
        apply_cushion_spin(ball, normal, physics.spin_transfer, physics.spin_decay);
    }
    ball.velocity *= ball.restitution;
    ball.center += normal * physics.cushion_nudge;
}

fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    if i < j {
        let (left, right) = balls.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = balls.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Everything is at rest after a shot: respot, hand over the stick, judge
fn end_turn(world: &mut GameWorld, session: &mut Session) {
    world.rules_pending = false;
    if world.cue_ball().pocketed {
        world.respot_cue_ball();
    }

    world.last = world.current;
    world.current = world.current.other();
    rules::apply_rules(world);

    let cue_center = world.cue_ball().center;
    for stick in &mut world.cue_sticks {
        stick.target = cue_center;
    }
    session.flash_turn();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::consts::SIM_DT;
    use crate::sim::ball::BallGroup;
    use crate::sim::cue::Player;
    use crate::sim::rules::{FaultReason, TurnStatistics, Verdict};

    fn unshuffled_world() -> GameWorld {
        let mut config = Config::default();
        config.rules.shuffle_rack = false;
        GameWorld::new(7, config)
    }

    /// Leave only the cue ball and `keep` on the table
    fn clear_table(world: &mut GameWorld, keep: &[u8]) {
        for ball in &mut world.balls {
            if ball.number != CUE_BALL && !keep.contains(&ball.number) {
                ball.capture();
            }
        }
    }

    /// Aim, strike and run until the rules have been applied
    fn play_shot(world: &mut GameWorld, session: &mut Session, pointer: Vec2, power: f32) -> Vec<GameEvent> {
        tick(world, session, &TickInput::default(), SIM_DT);
        world.current_stick_mut().power = power;
        let shoot = TickInput {
            pointer: Some(pointer),
            shoot: true,
            ..Default::default()
        };
        tick(world, session, &shoot, SIM_DT);

        let mut events = Vec::new();
        for _ in 0..(60 * 120) {
            tick(world, session, &TickInput::default(), SIM_DT);
            events.extend(world.drain_events());
            if events.iter().any(|e| matches!(e, GameEvent::RulesApplied { .. })) {
                return events;
            }
        }
        panic!("shot never came to rest");
    }

    fn verdict_of(events: &[GameEvent]) -> Option<Verdict> {
        events.iter().find_map(|e| match e {
            GameEvent::RulesApplied { verdict } => Some(*verdict),
            _ => None,
        })
    }

    #[test]
    fn test_idle_tick_changes_nothing() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        let before: Vec<Vec2> = world.balls.iter().map(|b| b.center).collect();

        tick(&mut world, &mut session, &TickInput::default(), SIM_DT);

        let after: Vec<Vec2> = world.balls.iter().map(|b| b.center).collect();
        assert_eq!(before, after);
        assert!(world.balls_stopped());
        assert!(!world.rules_pending);
        assert_eq!(world.time_ticks, 1);
    }

    #[test]
    fn test_wheel_and_hit_point_adjust_stick() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        let input = TickInput {
            wheel: -1.0,
            hit_point: Some(Vec2::new(0.0, 2.0)),
            ..Default::default()
        };
        tick(&mut world, &mut session, &input, SIM_DT);
        assert_eq!(world.current_stick().power, 410.0);
        assert_eq!(world.current_stick().hit_point, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_break_shot() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        let apex = world.table.foot_spot();

        let events = play_shot(&mut world, &mut session, apex, 1400.0);

        assert!(matches!(
            events.first(),
            Some(GameEvent::ShotFired {
                player: Player::One,
                power
            }) if *power == 1400.0
        ));
        // The cue ball meets the apex ball first
        let first_hit = events.iter().find_map(|e| match e {
            GameEvent::BallHit { ball, other, .. } => Some((*ball, *other)),
            _ => None,
        });
        assert_eq!(first_hit, Some((CUE_BALL, 2)));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::BallHit {
                tier: HitTier::Hard,
                ..
            }
        )));

        // Turn bookkeeping after the rules ran
        assert!(world.balls_stopped());
        assert!(!world.rules_pending);
        assert_eq!(world.stats, TurnStatistics::default());
        assert_eq!(world.last, Player::One);

        // Unshuffled apex break spreads the rack without a pocket or scratch
        assert_eq!(verdict_of(&events), Some(Verdict::BreakLegal));
        assert_eq!(world.state, RuleState::OpenTable);
        assert_eq!(world.current, Player::Two);
        assert!(world.pocketed_history.is_empty());
    }

    #[test]
    fn test_pocketing_shot_assigns_group() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        world.state = RuleState::OpenTable;
        clear_table(&mut world, &[3]);
        world.balls[3].place(Vec2::new(450.0, 130.0));
        world.cue_ball_mut().place(Vec2::new(450.0, 275.0));

        let events = play_shot(&mut world, &mut session, Vec2::new(450.0, 100.0), 600.0);

        assert!(events.contains(&GameEvent::BallPocketed { ball: 3, pocket: 1 }));
        assert_eq!(
            verdict_of(&events),
            Some(Verdict::GroupsAssigned {
                shooter: Player::One,
                group: BallGroup::Plain,
                continues: true
            })
        );
        assert_eq!(world.state, RuleState::Playing);
        assert_eq!(world.current, Player::One);
        assert_eq!(world.stick(Player::One).pocketed_balls, vec![3]);
        assert_eq!(world.pocketed_history, vec![3]);
        assert!(!world.cue_ball().pocketed);
    }

    #[test]
    fn test_scratch_gives_ball_in_hand() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        world.state = RuleState::OpenTable;
        world.cue_ball_mut().place(Vec2::new(150.0, 150.0));

        let events = play_shot(&mut world, &mut session, Vec2::new(86.0, 86.0), 500.0);

        assert!(events.contains(&GameEvent::BallPocketed {
            ball: CUE_BALL,
            pocket: 0
        }));
        assert!(events.contains(&GameEvent::CueBallRespotted));
        assert_eq!(
            verdict_of(&events),
            Some(Verdict::Fault(FaultReason::NoContact))
        );
        assert_eq!(world.state, RuleState::BallInHand);
        assert_eq!(world.current, Player::Two);
        assert!(!world.cue_ball().pocketed);
        assert_eq!(world.cue_ball().center, world.table.head_spot());
        assert!(session.highlight_active());
    }

    #[test]
    fn test_cushion_touch_before_contact_ignored_on_break() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        world.cue_ball_mut().velocity = Vec2::new(-600.0, 0.0);

        let mut bounced = false;
        for _ in 0..120 {
            tick(&mut world, &mut session, &TickInput::default(), SIM_DT);
            if world
                .drain_events()
                .contains(&GameEvent::CushionHit { ball: CUE_BALL })
            {
                bounced = true;
                break;
            }
        }
        assert!(bounced);
        assert!(world.cue_ball().velocity.x > 0.0);
        assert!(world.cue_ball().center.x > 100.0 + 10.0);
        assert_eq!(world.stats.cushion_ball_count(), 0);
    }

    #[test]
    fn test_cushion_touch_counts_after_break() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        world.state = RuleState::Playing;
        world.cue_ball_mut().velocity = Vec2::new(-600.0, 0.0);

        for _ in 0..120 {
            tick(&mut world, &mut session, &TickInput::default(), SIM_DT);
            if world.stats.cushion_touched[CUE_BALL as usize] {
                return;
            }
        }
        panic!("cue ball never reached the head rail");
    }

    #[test]
    fn test_ball_off_table_is_captured() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        world.balls[6].place(Vec2::new(900.0, 200.0));
        world.balls[6].velocity = Vec2::new(50.0, 0.0);

        tick(&mut world, &mut session, &TickInput::default(), SIM_DT);

        assert!(world.balls[6].pocketed);
        assert!(world
            .drain_events()
            .contains(&GameEvent::BallPocketed { ball: 6, pocket: 2 }));
        assert_eq!(world.pocketed_history, vec![6]);
    }

    #[test]
    fn test_no_input_while_balls_move() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        world.balls[6].velocity = Vec2::new(0.0, 100.0);
        tick(&mut world, &mut session, &TickInput::default(), SIM_DT);
        assert!(!world.balls_stopped());

        let shoot = TickInput {
            shoot: true,
            wheel: -1.0,
            ..Default::default()
        };
        tick(&mut world, &mut session, &shoot, SIM_DT);
        assert_eq!(world.current_stick().state, CueState::Ready);
        assert_eq!(world.current_stick().power, 400.0);
    }

    #[test]
    fn test_stop_and_reset_controls() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        world.balls[6].velocity = Vec2::new(0.0, 100.0);
        world.rules_pending = true;
        world.state = RuleState::Playing;

        let stop = TickInput {
            stop_balls: true,
            ..Default::default()
        };
        tick(&mut world, &mut session, &stop, SIM_DT);
        assert!(world.balls_stopped());
        assert!(!world.rules_pending);

        world.balls[6].place(Vec2::new(300.0, 300.0));
        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        tick(&mut world, &mut session, &reset, SIM_DT);
        assert_eq!(world.state, RuleState::Breaking);
        assert_ne!(world.balls[6].center, Vec2::new(300.0, 300.0));
        assert!(world.drain_events().contains(&GameEvent::Reracked));
    }

    #[test]
    fn test_game_over_blocks_shots() {
        let mut world = unshuffled_world();
        let mut session = Session::new();
        world.declare_winner(Player::Two);
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        for _ in 0..20 {
            tick(&mut world, &mut session, &shoot, SIM_DT);
        }
        assert!(world.cue_ball().velocity == Vec2::ZERO);
        assert!(world.drain_events().is_empty());
    }
}
