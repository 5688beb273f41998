use std::f32::consts::FRAC_PI_4;

pub const SLOW_TICK_MS: u32 = 5_000;
pub const FAST_TICK_MS: u32 = 500;

pub const TARGET_SEARCH_RADIUS: f32 = 50.0;
pub const ENGAGE_RANGE: f32 = 2.0;
pub const APPROACH_OFFSET: f32 = 1.0;
pub const FRONT_ARC: f32 = FRAC_PI_4;

pub const AURA_REFRESH_FLOOR_MS: u32 = 10_000;
pub const SELF_HEAL_BELOW_PCT: u32 = 35;

pub const STUCK_GHOST_RADIUS: f32 = 10.0;

pub const DEFAULT_GREETING: &str = "Autopilot engaged.";

/// Undrained controller events kept by the autopilot.
pub const EVENT_LOG_CAPACITY: usize = 1_024;

pub mod paladin {
    use crate::types::SpellId;

    pub const DEVOTION_AURA: SpellId = SpellId(465);
    pub const BLESSING_OF_MIGHT: SpellId = SpellId(19740);
    pub const SEAL_OF_RIGHTEOUSNESS: SpellId = SpellId(21084);
    pub const HOLY_LIGHT: SpellId = SpellId(639);
    pub const JUDGEMENT: SpellId = SpellId(20271);
}
