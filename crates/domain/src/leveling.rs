//! Leveling curve.
//!
//! Levels 1 through 20 follow a hand-tuned threshold table. Past the last
//! tabulated threshold every further level costs a flat
//! [`XP_PER_EXTRAPOLATED_LEVEL`].

use serde::{Deserialize, Serialize};

/// Cumulative XP required to reach level `index + 1`.
pub const LEVEL_THRESHOLDS: [u64; 20] = [
    0, 500, 1_000, 2_000, 3_000, 4_500, 6_000, 8_000, 10_000, 12_500, 15_000, 18_000, 21_000,
    25_000, 30_000, 35_000, 41_000, 48_000, 56_000, 65_000,
];

/// XP cost of each level beyond the threshold table.
pub const XP_PER_EXTRAPOLATED_LEVEL: u64 = 10_000;

const TABULATED_LEVELS: u32 = LEVEL_THRESHOLDS.len() as u32;

/// Position of a cumulative XP total on the leveling curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Current level, starting at 1.
    pub level: u32,
    /// XP earned since entering the current level.
    pub xp_progress: u64,
    /// XP still needed to reach the next level.
    pub xp_to_next_level: u64,
}

impl LevelProgress {
    /// Returns the XP width of the current level.
    #[must_use]
    pub fn level_span(&self) -> u64 {
        self.xp_progress + self.xp_to_next_level
    }
}

/// Returns the cumulative XP at which `level` starts.
///
/// Level 0 is treated as level 1. Saturates at `u64::MAX` for levels beyond
/// what a `u64` total can reach.
#[must_use]
pub fn xp_required_for_level(level: u32) -> u64 {
    let level = level.max(1);
    if level <= TABULATED_LEVELS {
        return LEVEL_THRESHOLDS[(level - 1) as usize];
    }

    let last = LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1];
    u64::from(level - TABULATED_LEVELS)
        .saturating_mul(XP_PER_EXTRAPOLATED_LEVEL)
        .saturating_add(last)
}

/// Computes the level for a cumulative XP total.
///
/// Total for every `u64` input; integer arithmetic only.
#[must_use]
pub fn calculate_level(total_xp: u64) -> LevelProgress {
    let last = LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1];

    if total_xp >= last {
        let extra_levels = (total_xp - last) / XP_PER_EXTRAPOLATED_LEVEL;
        let xp_progress = (total_xp - last) % XP_PER_EXTRAPOLATED_LEVEL;
        let level = u32::try_from(extra_levels)
            .ok()
            .and_then(|extra| extra.checked_add(TABULATED_LEVELS))
            .unwrap_or(u32::MAX);

        return LevelProgress {
            level,
            xp_progress,
            xp_to_next_level: XP_PER_EXTRAPOLATED_LEVEL - xp_progress,
        };
    }

    let index = LEVEL_THRESHOLDS
        .iter()
        .rposition(|threshold| total_xp >= *threshold)
        .unwrap_or(0);

    LevelProgress {
        level: index as u32 + 1,
        xp_progress: total_xp - LEVEL_THRESHOLDS[index],
        xp_to_next_level: LEVEL_THRESHOLDS[index + 1] - total_xp,
    }
}
