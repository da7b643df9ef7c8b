use rust_decimal::Decimal;
use serde::Serialize;

/// Admin-facing aggregate totals, computed from the live rows at query time.
///
/// `total_revenue` is the sum of listed event prices, not money collected;
/// the name is kept as-is from the original reporting surface.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_events: i64,
    pub total_participants: i64,
    pub total_revenue: Decimal,
}

/// Mean rating score for an event. An unrated event averages 0, not null.
pub fn average_score(scores: &[i32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    sum as f64 / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_no_scores_is_zero() {
        assert_eq!(average_score(&[]), 0.0);
    }

    #[test]
    fn average_of_single_score() {
        assert_eq!(average_score(&[4]), 4.0);
    }

    #[test]
    fn average_is_exact_mean() {
        assert_eq!(average_score(&[1, 2, 3, 4]), 2.5);
        assert_eq!(average_score(&[5, 5, 5]), 5.0);
    }
}
