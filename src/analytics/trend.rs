use crate::models::{Trend, TrendDirection};

/// Change from `previous` to `current`.
///
/// The percentage is the magnitude of the change; `direction` carries the
/// sign. A missing or zero baseline yields a stable 0 % trend, as does a
/// non-finite result.
///
/// ```
/// use fintrack_sdk::analytics::trend;
/// use fintrack_sdk::models::TrendDirection;
///
/// let t = trend(90.0, Some(100.0));
/// assert_eq!(t.percentage, 10.0);
/// assert_eq!(t.direction, TrendDirection::Down);
/// assert_eq!(t.label, "-10.0%");
/// ```
pub fn trend(current: f64, previous: Option<f64>) -> Trend {
    let change = match previous {
        Some(prev) if prev != 0.0 => (current - prev) / prev * 100.0,
        _ => 0.0,
    };
    let change = if change.is_finite() { change } else { 0.0 };

    let direction = if change > 0.0 {
        TrendDirection::Up
    } else if change < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };
    let percentage = change.abs();
    let label = match direction {
        TrendDirection::Up => format!("+{:.1}%", percentage),
        TrendDirection::Down => format!("-{:.1}%", percentage),
        TrendDirection::Stable => format!("{:.1}%", percentage),
    };

    Trend {
        percentage,
        direction,
        label,
    }
}
