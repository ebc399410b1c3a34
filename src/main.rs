//! Eight Ball entry point
//!
//! Headless run: racks a table, breaks at full power, plays the table out
//! at the fixed timestep and prints the final scene as JSON.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use eight_ball::Config;
    use eight_ball::audio::SoundBoard;
    use eight_ball::consts::SIM_DT;
    use eight_ball::game::Game;
    use eight_ball::sim::GameEvent;

    // Frames to run before giving up on the table settling
    const MAX_FRAMES: u32 = 60 * 120;

    env_logger::init();
    log::info!("Eight Ball (headless) starting...");

    let config = Config::load();
    let seed = config.seed.unwrap_or_else(clock_seed);
    let mut game = Game::new(seed, config);
    let mut sounds = SoundBoard::new();

    // Full power, aimed at the apex of the rack
    let max_power = game.world.config.cue.max_power;
    game.world.current_stick_mut().power = max_power;
    game.input.pointer = Some(game.world.table.foot_spot());
    game.input.shoot = true;

    let mut verdict = None;
    let mut cue_count = 0;
    for _ in 0..MAX_FRAMES {
        let events = game.update(SIM_DT);
        cue_count += sounds.cues(&events).len();
        verdict = verdict.or_else(|| {
            events.iter().find_map(|e| match e {
                GameEvent::RulesApplied { verdict } => Some(*verdict),
                _ => None,
            })
        });
        if verdict.is_some() {
            break;
        }
    }

    match verdict {
        Some(verdict) => log::info!(
            "Break finished after {} ticks: {:?}, {} to play ({} sound cues)",
            game.world.time_ticks,
            verdict,
            game.world.current.as_str(),
            cue_count
        ),
        None => log::warn!("Table did not settle within {} frames", MAX_FRAMES),
    }

    match game.scene().to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize scene: {}", e),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // A browser frontend drives eight_ball::game::Game directly
}
