//! Sound cue selection
//!
//! Maps simulation events to sound effects. Playback belongs to the
//! frontend; this only decides what to play, which sample variant and how
//! loud.

use crate::sim::{CUE_BALL, GameEvent, HitTier};

/// Sample variants available for ball-ball contacts
pub const BALL_HIT_VARIANTS: usize = 10;
/// Sample variants available for cushion contacts
pub const CUSHION_HIT_VARIANTS: usize = 10;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Two balls click
    BallHit,
    /// Cue ball driven hard into another ball
    CueBallHardHit,
    /// Ball off a rail
    CushionHit,
    /// Ball drops into a pocket
    BallFalling,
    /// Stick tip meets the cue ball
    CueStickHit,
}

impl SoundEffect {
    /// Relative gain per effect
    fn gain(self) -> f32 {
        match self {
            SoundEffect::BallHit => 0.6,
            SoundEffect::CueBallHardHit => 0.9,
            SoundEffect::CushionHit => 0.4,
            SoundEffect::BallFalling => 0.8,
            SoundEffect::CueStickHit => 0.7,
        }
    }
}

/// One sound to play
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub effect: SoundEffect,
    /// Sample index within the effect's bank
    pub variant: usize,
    pub volume: f32,
}

/// Chooses sounds for events, cycling through sample banks
#[derive(Debug, Clone)]
pub struct SoundBoard {
    next_ball_hit: usize,
    next_cushion_hit: usize,
    master_volume: f32,
    muted: bool,
}

impl Default for SoundBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundBoard {
    pub fn new() -> Self {
        Self {
            next_ball_hit: 0,
            next_cushion_hit: 0,
            master_volume: 0.8,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_volume(&self, effect: SoundEffect) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * effect.gain()
        }
    }

    /// Sound for a single event, if it makes one
    pub fn cue_for(&mut self, event: &GameEvent) -> Option<SoundCue> {
        let (effect, variant) = match *event {
            GameEvent::ShotFired { .. } => (SoundEffect::CueStickHit, 0),
            GameEvent::CushionHit { .. } => {
                let variant = self.next_cushion_hit;
                self.next_cushion_hit = (variant + 1) % CUSHION_HIT_VARIANTS;
                (SoundEffect::CushionHit, variant)
            }
            GameEvent::BallHit { ball, other, tier }
                if tier == HitTier::Hard && (ball == CUE_BALL || other == CUE_BALL) =>
            {
                (SoundEffect::CueBallHardHit, 0)
            }
            GameEvent::BallHit { .. } => {
                let variant = self.next_ball_hit;
                self.next_ball_hit = (variant + 1) % BALL_HIT_VARIANTS;
                (SoundEffect::BallHit, variant)
            }
            GameEvent::BallPocketed { .. } => (SoundEffect::BallFalling, 0),
            _ => return None,
        };

        let volume = self.effective_volume(effect);
        if volume <= 0.0 {
            return None;
        }
        Some(SoundCue {
            effect,
            variant,
            volume,
        })
    }

    /// Sounds for a batch of drained events, in order
    pub fn cues(&mut self, events: &[GameEvent]) -> Vec<SoundCue> {
        events.iter().filter_map(|e| self.cue_for(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Player;

    #[test]
    fn test_cushion_variants_round_robin() {
        let mut board = SoundBoard::new();
        let hit = GameEvent::CushionHit { ball: 3 };
        let variants: Vec<usize> = (0..12)
            .filter_map(|_| board.cue_for(&hit))
            .map(|c| c.variant)
            .collect();
        assert_eq!(variants, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 1]);
    }

    #[test]
    fn test_hard_cue_hit_has_own_effect() {
        let mut board = SoundBoard::new();
        let hard = GameEvent::BallHit {
            ball: CUE_BALL,
            other: 4,
            tier: HitTier::Hard,
        };
        let soft = GameEvent::BallHit {
            ball: CUE_BALL,
            other: 4,
            tier: HitTier::Soft,
        };
        assert_eq!(
            board.cue_for(&hard).map(|c| c.effect),
            Some(SoundEffect::CueBallHardHit)
        );
        assert_eq!(board.cue_for(&soft).map(|c| c.effect), Some(SoundEffect::BallHit));
    }

    #[test]
    fn test_event_mapping_and_mute() {
        let mut board = SoundBoard::new();
        let events = [
            GameEvent::ShotFired {
                player: Player::One,
                power: 900.0,
            },
            GameEvent::BallPocketed { ball: 6, pocket: 3 },
            GameEvent::Reracked,
        ];
        let effects: Vec<SoundEffect> = board.cues(&events).iter().map(|c| c.effect).collect();
        assert_eq!(effects, vec![SoundEffect::CueStickHit, SoundEffect::BallFalling]);

        board.set_muted(true);
        assert!(board.cues(&events).is_empty());
    }
}
