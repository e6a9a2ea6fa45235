//! Timestamp helpers.

use chrono::{DateTime, SubsecRound, Utc};

/// Current time, truncated to microseconds.
///
/// Every timestamp the queue stamps goes through this. Stored records encode
/// timestamps at microsecond precision, so stamping at the same precision
/// keeps an in-memory record identical to its decoded on-disk twin.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_no_sub_microsecond_component() {
        let t = now();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000, 0);
    }
}
