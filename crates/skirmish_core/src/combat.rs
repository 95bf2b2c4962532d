//! Strike resolution with percentage-based armor.
//!
//! The soldier only names a cell to strike. How much that strike hurts is
//! decided here, on the grid's side:
//! - Hitting power is strength plus half of skill
//! - Armor removes a percentage of it, capped at [`MAX_ARMOR`]
//! - The result is scaled down by [`DAMAGE_SCALE`] and never drops below [`MIN_DAMAGE`]

use crate::data::SoldierProfile;

/// Maximum armor percentage (75% damage reduction).
pub const MAX_ARMOR: u32 = 75;

/// Minimum damage floor - a strike always lands for at least this much.
pub const MIN_DAMAGE: u32 = 1;

/// Divisor turning mitigated hitting power into health points.
pub const DAMAGE_SCALE: u32 = 10;

/// Hitting power before armor. Widened so profile stats cannot overflow.
#[must_use]
pub const fn hitting_power(attacker: &SoldierProfile) -> u64 {
    attacker.strength as u64 + attacker.skill as u64 / 2
}

/// Health removed from `defender` by one strike from `attacker`.
///
/// Saturates at `u32::MAX` for absurd profiles.
#[must_use]
pub fn strike_damage(attacker: &SoldierProfile, defender: &SoldierProfile) -> u32 {
    let armor = u64::from(defender.armor.min(MAX_ARMOR));
    let mitigated = hitting_power(attacker) * (100 - armor) / 100;
    let scaled = (mitigated / u64::from(DAMAGE_SCALE)).max(u64::from(MIN_DAMAGE));
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Strikes needed for `attacker` to bring a fresh `defender` to zero.
#[must_use]
pub fn strikes_to_defeat(attacker: &SoldierProfile, defender: &SoldierProfile) -> u32 {
    defender
        .initial_health
        .div_ceil(strike_damage(attacker, defender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_vs_basic() {
        let basic = SoldierProfile::BASIC;
        // (30 + 20) * 80% = 40 -> 4 damage
        assert_eq!(hitting_power(&basic), 50);
        assert_eq!(strike_damage(&basic, &basic), 4);
        assert_eq!(strikes_to_defeat(&basic, &basic), 3);
    }

    #[test]
    fn test_armor_is_capped() {
        let attacker = SoldierProfile::BASIC;
        let tank = SoldierProfile {
            armor: 500,
            ..SoldierProfile::BASIC
        };
        let capped = SoldierProfile {
            armor: MAX_ARMOR,
            ..SoldierProfile::BASIC
        };
        assert_eq!(
            strike_damage(&attacker, &tank),
            strike_damage(&attacker, &capped)
        );
    }

    #[test]
    fn test_min_damage_floor() {
        let weak = SoldierProfile {
            strength: 0,
            skill: 0,
            ..SoldierProfile::BASIC
        };
        assert_eq!(strike_damage(&weak, &SoldierProfile::BASIC), MIN_DAMAGE);
    }

    #[test]
    fn test_huge_stats_do_not_overflow() {
        let brute = SoldierProfile::from_ron_str("brute.ron", "(strength: 60000000)").unwrap();
        // (60_000_000 + 20) * 80% / 10
        assert_eq!(strike_damage(&brute, &SoldierProfile::BASIC), 4_800_001);

        let maxed = SoldierProfile {
            strength: u32::MAX,
            skill: u32::MAX,
            ..SoldierProfile::BASIC
        };
        let bare = SoldierProfile {
            armor: 0,
            ..SoldierProfile::BASIC
        };
        assert_eq!(hitting_power(&maxed), u64::from(u32::MAX) * 3 / 2);
        assert_eq!(strike_damage(&maxed, &bare), (u64::from(u32::MAX) * 3 / 2 / 10) as u32);
        assert_eq!(strikes_to_defeat(&maxed, &bare), 1);
    }

    #[test]
    fn test_unarmored_takes_full_scaled_damage() {
        let attacker = SoldierProfile::BASIC;
        let bare = SoldierProfile {
            armor: 0,
            ..SoldierProfile::BASIC
        };
        assert_eq!(strike_damage(&attacker, &bare), 5);
    }
}
