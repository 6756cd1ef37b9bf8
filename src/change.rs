use serde::Serialize;

use crate::error::ChangeError;
use crate::simulation::PortfolioSnapshot;
use crate::timeframe::Timeframe;

/// Absolute and relative move between a baseline and a value.
///
/// `percent` is in percent units, so a 2.5% gain is `2.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub absolute: f64,
    pub percent: f64,
    pub is_negative: bool,
}

impl Change {
    pub fn zero() -> Change {
        Change {
            absolute: 0.0,
            percent: 0.0,
            is_negative: false,
        }
    }

    pub fn between(baseline: f64, value: f64) -> Result<Change, ChangeError> {
        if baseline == 0.0 || !baseline.is_finite() {
            return Err(ChangeError::InvalidBaseline(baseline));
        }
        let absolute = value - baseline;
        Ok(Change {
            absolute,
            percent: absolute / baseline * 100.0,
            is_negative: absolute < 0.0,
        })
    }
}

/// Change across a displayed window.
///
/// Every timeframe measures from the window's first point, except `ALL`,
/// which always measures from `initial_balance`. The investing screen shows
/// lifetime gains on ALL regardless of where the window starts; keep this
/// asymmetry when touching the function.
pub fn window_change(
    window: &[PortfolioSnapshot],
    timeframe: Timeframe,
    initial_balance: f64,
) -> Result<Change, ChangeError> {
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return Ok(Change::zero());
    };

    let baseline = match timeframe {
        Timeframe::All => initial_balance,
        _ => first.total_value,
    };
    Change::between(baseline, last.total_value)
}
