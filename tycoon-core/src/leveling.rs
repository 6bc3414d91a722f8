use serde::{Deserialize, Serialize};

/// Result of applying an xp gain to a level/xp pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub new_xp: u64,
    pub new_level: u64,
    pub levels_gained: u64,
}

impl LevelUp {
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Add `xp_delta` and roll any overflow into further levels.
///
/// Leaving level `n` costs `n * xp_per_level`, so a large delta may cross
/// several boundaries in one call. On return `new_xp < new_level * xp_per_level`.
pub fn resolve_level_up(
    current_xp: u64,
    current_level: u64,
    xp_delta: u64,
    xp_per_level: u64,
) -> LevelUp {
    let mut new_xp = current_xp.saturating_add(xp_delta);
    let mut new_level = current_level.max(1);
    let mut levels_gained = 0;

    if xp_per_level == 0 {
        return LevelUp {
            new_xp,
            new_level,
            levels_gained,
        };
    }

    loop {
        let threshold = new_level.saturating_mul(xp_per_level);
        if new_xp < threshold {
            break;
        }
        new_xp -= threshold;
        new_level += 1;
        levels_gained += 1;
    }

    LevelUp {
        new_xp,
        new_level,
        levels_gained,
    }
}

/// Display helper for the xp bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XpProgress {
    pub current: u64,
    pub required: u64,
}

impl XpProgress {
    pub fn new(xp: u64, level: u64, xp_per_level: u64) -> Self {
        Self {
            current: xp,
            required: level.max(1).saturating_mul(xp_per_level),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.required.saturating_sub(self.current)
    }

    /// Whole-number percentage toward the next level, capped at 100.
    pub fn percent(&self) -> u64 {
        if self.required == 0 {
            return 0;
        }
        (self.current.saturating_mul(100) / self.required).min(100)
    }
}
