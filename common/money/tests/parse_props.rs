use common_money::{normalize_scale, parse_amount};
use bigdecimal::BigDecimal;
use proptest::prelude::*;
use std::str::FromStr;

proptest! {
    // Canonical two-decimal strings survive parsing byte for byte.
    #[test]
    fn canonical_two_decimal_roundtrip(cents in 0i64..100_000_000) {
        let s = format!("{}.{:02}", cents / 100, cents % 100);
        let parsed = parse_amount(&s).unwrap();
        prop_assert_eq!(parsed.to_string(), s);
    }

    // Negative amounts are never accepted regardless of magnitude.
    #[test]
    fn negatives_rejected(cents in 1i64..100_000_000) {
        let s = format!("-{}.{:02}", cents / 100, cents % 100);
        prop_assert!(parse_amount(&s).is_err());
    }

    // Pure-alpha strings can never parse as a decimal.
    #[test]
    fn garbage_rejected(s in "[a-zA-Z _]{1,12}") {
        prop_assert!(parse_amount(&s).is_err());
    }

    // Normalizing an already-normalized value is a no-op.
    #[test]
    fn normalize_idempotent(cents in 0i64..100_000_000) {
        let s = format!("{}.{:02}", cents / 100, cents % 100);
        let bd = BigDecimal::from_str(&s).unwrap();
        let once = normalize_scale(&bd);
        prop_assert_eq!(normalize_scale(&once), once.clone());
    }
}
