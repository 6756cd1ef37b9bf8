//! Selection of the snapshots shown for a timeframe.

use chrono::NaiveDateTime;

use crate::simulation::PortfolioSnapshot;
use crate::timeframe::Timeframe;

/// Most points handed to the chart for any timeframe except 1D.
pub const DISPLAY_BUDGET: usize = 200;

/// Snapshots inside `[timeframe.start(..), now]`, thinned to the display budget.
///
/// An empty range falls back to the whole history so the chart is never blank.
pub fn select_window(
    snapshots: &[PortfolioSnapshot],
    timeframe: Timeframe,
    now: NaiveDateTime,
    display_start: NaiveDateTime,
) -> Vec<PortfolioSnapshot> {
    let start = timeframe.start(now, display_start);

    let mut window: Vec<PortfolioSnapshot> = snapshots
        .iter()
        .filter(|s| s.timestamp >= start && s.timestamp <= now)
        .copied()
        .collect();

    if window.is_empty() {
        tracing::debug!(%timeframe, %start, %now, "empty window, showing full history");
        window = snapshots.to_vec();
    }

    if timeframe != Timeframe::OneDay {
        window = downsample(window, DISPLAY_BUDGET);
    }
    window
}

/// Keep every `ceil(len / budget)`-th point, always ending on the last one.
pub fn downsample<T: Clone>(points: Vec<T>, budget: usize) -> Vec<T> {
    if budget == 0 || points.len() <= budget {
        return points;
    }

    let stride = points.len().div_ceil(budget);
    let last_index = points.len() - 1;

    let mut reduced: Vec<T> = points.iter().step_by(stride).cloned().collect();
    if last_index % stride != 0 {
        reduced.push(points[last_index].clone());
    }
    reduced
}
