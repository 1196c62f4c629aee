// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wall-clock timestamps carried in sample metadata.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch, 0 if the clock is before it.
pub fn now_ns() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// `later - earlier` as a duration, zero if negative.
pub fn elapsed_between(earlier_ns: i64, later_ns: i64) -> Duration {
    u64::try_from(later_ns.saturating_sub(earlier_ns))
        .map(Duration::from_nanos)
        .unwrap_or(Duration::ZERO)
}

/// Human-readable nanoseconds: `850ns`, `12.5us`, `3.20ms`, `1.500s`.
pub fn format_ns(ns: i64) -> String {
    let abs = ns.unsigned_abs();
    let sign = if ns < 0 { "-" } else { "" };
    if abs < 1_000 {
        format!("{}{}ns", sign, abs)
    } else if abs < 1_000_000 {
        format!("{}{:.1}us", sign, abs as f64 / 1e3)
    } else if abs < 1_000_000_000 {
        format!("{}{:.2}ms", sign, abs as f64 / 1e6)
    } else {
        format!("{}{:.3}s", sign, abs as f64 / 1e9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_2020() {
        assert!(now_ns() > 1_577_836_800_000_000_000);
    }

    #[test]
    fn elapsed_clamps_at_zero() {
        assert_eq!(elapsed_between(10, 5), Duration::ZERO);
        assert_eq!(elapsed_between(5, 1_000_005), Duration::from_millis(1));
    }

    #[test]
    fn formatting_units() {
        assert_eq!(format_ns(850), "850ns");
        assert_eq!(format_ns(12_500), "12.5us");
        assert_eq!(format_ns(3_200_000), "3.20ms");
        assert_eq!(format_ns(1_500_000_000), "1.500s");
        assert_eq!(format_ns(-2_000), "-2.0us");
    }
}
