//! Soldier stat block for data-driven soldier definitions.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Starting health of every soldier.
pub const INITIAL_HEALTH: u32 = 10;

/// Default armor rating.
pub const ARMOR: u32 = 20;

/// Default strength rating.
pub const STRENGTH: u32 = 30;

/// Default skill rating.
pub const SKILL: u32 = 40;

/// Fighting attributes shared by every soldier of a kind.
///
/// The decision procedure never reads these; only strike resolution does.
///
/// # Example RON
///
/// ```ron
/// SoldierProfile(
///     initial_health: 10,
///     armor: 20,
///     strength: 30,
///     skill: 40,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoldierProfile {
    /// Health at enlistment.
    #[serde(default = "default_initial_health")]
    pub initial_health: u32,

    /// Percentage of incoming damage absorbed (capped during resolution).
    #[serde(default = "default_armor")]
    pub armor: u32,

    /// Raw hitting power.
    #[serde(default = "default_strength")]
    pub strength: u32,

    /// Precision; adds half its value to hitting power.
    #[serde(default = "default_skill")]
    pub skill: u32,
}

/// Default initial health for profiles that omit it.
const fn default_initial_health() -> u32 {
    INITIAL_HEALTH
}

const fn default_armor() -> u32 {
    ARMOR
}

const fn default_strength() -> u32 {
    STRENGTH
}

const fn default_skill() -> u32 {
    SKILL
}

impl SoldierProfile {
    /// The basic soldier's stat block.
    pub const BASIC: Self = Self {
        initial_health: INITIAL_HEALTH,
        armor: ARMOR,
        strength: STRENGTH,
        skill: SKILL,
    };

    /// Parse a profile from RON text.
    ///
    /// `source` names the origin in error messages.
    pub fn from_ron_str(source: &str, ron_text: &str) -> Result<Self> {
        let profile: Self = ron::from_str(ron_text).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        profile.validate(source)?;
        Ok(profile)
    }

    /// Reject profiles that would create soldiers already dead.
    pub fn validate(&self, source: &str) -> Result<()> {
        if self.initial_health == 0 {
            return Err(GameError::DataParseError {
                path: source.to_string(),
                message: "initial_health must be positive".into(),
            });
        }
        Ok(())
    }
}

impl Default for SoldierProfile {
    fn default() -> Self {
        Self::BASIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_profile_constants() {
        let profile = SoldierProfile::default();
        assert_eq!(profile.initial_health, 10);
        assert_eq!(profile.armor, 20);
        assert_eq!(profile.strength, 30);
        assert_eq!(profile.skill, 40);
    }

    #[test]
    fn test_profile_from_ron() {
        let ron = r"SoldierProfile(initial_health: 12, armor: 5, strength: 40, skill: 10)";
        let profile = SoldierProfile::from_ron_str("inline", ron).unwrap();
        assert_eq!(profile.initial_health, 12);
        assert_eq!(profile.strength, 40);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let profile = SoldierProfile::from_ron_str("inline", "(strength: 7)").unwrap();
        assert_eq!(profile.initial_health, INITIAL_HEALTH);
        assert_eq!(profile.armor, ARMOR);
        assert_eq!(profile.strength, 7);
        assert_eq!(profile.skill, SKILL);

        let empty = SoldierProfile::from_ron_str("inline", "()").unwrap();
        assert_eq!(empty, SoldierProfile::BASIC);
    }

    #[test]
    fn test_zero_health_rejected() {
        let err = SoldierProfile::from_ron_str("bad.ron", "(initial_health: 0)").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { ref path, .. } if path == "bad.ron"));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(SoldierProfile::from_ron_str("bad.ron", "not ron at all").is_err());
    }
}
