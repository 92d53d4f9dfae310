use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places kept on stored hour totals.
pub const HOURS_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    Closest,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingConfig {
    pub increment_minutes: u32,
    pub mode: RoundingMode,
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            increment_minutes: 15,
            mode: RoundingMode::Closest,
        }
    }
}

pub fn round_seconds(seconds: i64, cfg: &RoundingConfig) -> i64 {
    if cfg.increment_minutes == 0 {
        return seconds;
    }

    let increment_seconds = i64::from(cfg.increment_minutes) * 60;
    let sign = if seconds < 0 { -1 } else { 1 };
    let abs_seconds = seconds.abs();
    let lower = (abs_seconds / increment_seconds) * increment_seconds;
    let upper = if abs_seconds % increment_seconds == 0 {
        lower
    } else {
        lower + increment_seconds
    };

    let rounded = match cfg.mode {
        RoundingMode::Down => lower,
        RoundingMode::Up => upper,
        RoundingMode::Closest => {
            if upper - abs_seconds <= abs_seconds - lower {
                upper
            } else {
                lower
            }
        }
    };

    rounded.saturating_mul(sign)
}

/// Rounds an hour value to the stored precision, halves away from zero.
pub fn round_hours(hours: Decimal) -> Decimal {
    hours.round_dp_with_strategy(HOURS_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Hours between two clock readings, optionally snapped to an increment first.
pub fn elapsed_hours(
    clock_in: DateTime<Utc>,
    clock_out: DateTime<Utc>,
    rounding: Option<&RoundingConfig>,
) -> Decimal {
    let seconds = (clock_out - clock_in).num_seconds();
    let seconds = rounding
        .map(|cfg| round_seconds(seconds, cfg))
        .unwrap_or(seconds);
    round_hours(Decimal::from(seconds) / Decimal::from(3600))
}
