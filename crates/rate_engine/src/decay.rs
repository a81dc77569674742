//! Exponential-decay transition between two rates.

/// Rate after `elapsed_sec` of a transition from `start_rate` to `target_rate`.
///
/// `rate = start · exp(-b · t)` with `b = ln(start / target) / duration`, so the curve
/// starts at `start_rate`, reaches `target_rate` at `duration_sec` and never passes it.
/// Degenerate inputs (non-positive duration or rates, equal endpoints) yield `target_rate`.
pub fn decay_rate(start_rate: f64, target_rate: f64, duration_sec: f64, elapsed_sec: f64) -> f64 {
    if duration_sec <= 0.0 || start_rate == target_rate || start_rate <= 0.0 || target_rate <= 0.0
    {
        return target_rate;
    }
    if elapsed_sec >= duration_sec {
        return target_rate;
    }

    let b = (start_rate / target_rate).ln() / duration_sec;
    let rate = start_rate * (-b * elapsed_sec.max(0.0)).exp();

    if start_rate < target_rate {
        rate.min(target_rate)
    } else {
        rate.max(target_rate)
    }
}
