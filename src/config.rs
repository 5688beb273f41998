use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{paladin, DEFAULT_GREETING};
use crate::error::{ConfigError, Result};
use crate::types::{CharacterClass, SpellId};

pub const ENV_ENABLED: &str = "AUTOPILOT_ENABLED";
pub const ENV_CONFIG_PATH: &str = "AUTOPILOT_CONFIG";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuraPolicy {
    /// Cast only when the aura is absent.
    CastIfMissing,
    /// Cast when absent, and recast once the remaining duration falls to the
    /// refresh floor.
    RefreshBeforeExpiry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuraRule {
    pub aura: SpellId,
    pub policy: AuraPolicy,
}

/// Per-class policy data. Spell ids are opaque to the scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassProfile {
    pub class: CharacterClass,
    #[serde(default)]
    pub auras: Vec<AuraRule>,
    #[serde(default, rename = "selfHeal")]
    pub self_heal: Option<SpellId>,
    #[serde(default, rename = "meleeSpell")]
    pub melee_spell: Option<SpellId>,
}

impl ClassProfile {
    pub fn paladin() -> Self {
        Self {
            class: CharacterClass::Paladin,
            auras: vec![
                AuraRule {
                    aura: paladin::DEVOTION_AURA,
                    policy: AuraPolicy::CastIfMissing,
                },
                AuraRule {
                    aura: paladin::BLESSING_OF_MIGHT,
                    policy: AuraPolicy::RefreshBeforeExpiry,
                },
                AuraRule {
                    aura: paladin::SEAL_OF_RIGHTEOUSNESS,
                    policy: AuraPolicy::RefreshBeforeExpiry,
                },
            ],
            self_heal: Some(paladin::HOLY_LIGHT),
            melee_spell: Some(paladin::JUDGEMENT),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    pub enabled: bool,
    pub greeting: String,
    pub profiles: Vec<ClassProfile>,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            greeting: DEFAULT_GREETING.to_string(),
            profiles: vec![ClassProfile::paladin()],
        }
    }
}

impl AutopilotConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the config from `AUTOPILOT_CONFIG` (a JSON file) and
    /// `AUTOPILOT_ENABLED`, which overrides the file's flag.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup(ENV_CONFIG_PATH) {
            Some(path) => Self::load(&PathBuf::from(path))?,
            None => Self::default(),
        };
        if let Some(raw) = lookup(ENV_ENABLED) {
            config.enabled = parse_flag(&raw).ok_or(ConfigError::InvalidEnv {
                key: ENV_ENABLED,
                value: raw,
            })?;
        }
        Ok(config)
    }

    pub fn profile(&self, class: CharacterClass) -> Option<&ClassProfile> {
        self.profiles.iter().find(|profile| profile.class == class)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
