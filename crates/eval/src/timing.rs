// SPDX-License-Identifier: MIT

use chrono::Duration;
use dashmsg_core::TimingElement;

/// Sums a timing's four fields into a single duration; each field is treated
/// as zero when absent. A monoid homomorphism from the 4-tuple to total
/// seconds (P4): summing two timings component-wise and converting equals
/// converting each and summing.
pub fn timing_to_duration(timing: Option<&TimingElement>) -> Duration {
    match timing {
        None => Duration::zero(),
        Some(timing) => {
            Duration::days(timing.days)
                + Duration::hours(timing.hours)
                + Duration::minutes(timing.minutes)
                + Duration::seconds(timing.seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmsg_core::TimingDirection;

    fn timing(days: i64, hours: i64, minutes: i64, seconds: i64) -> TimingElement {
        TimingElement::builder()
            .days(days)
            .hours(hours)
            .minutes(minutes)
            .seconds(seconds)
            .direction(TimingDirection::After)
            .build()
    }

    #[test]
    fn none_timing_is_zero() {
        assert_eq!(timing_to_duration(None), Duration::zero());
    }

    #[test]
    fn sums_all_four_fields() {
        let t = timing(1, 2, 3, 4);
        let expected = Duration::seconds(1 * 86_400 + 2 * 3_600 + 3 * 60 + 4);
        assert_eq!(timing_to_duration(Some(&t)), expected);
    }

    #[test]
    fn is_homomorphic_under_componentwise_sum() {
        let a = timing(1, 1, 1, 1);
        let b = timing(2, 2, 2, 2);
        let combined = timing(3, 3, 3, 3);
        let sum = timing_to_duration(Some(&a)) + timing_to_duration(Some(&b));
        assert_eq!(sum, timing_to_duration(Some(&combined)));
    }
}
