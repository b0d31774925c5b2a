use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of decimal digits between the catalog price and the ledger's
/// smallest denomination. A catalog price of `"1.5"` converts to
/// `1_500_000_000_000_000_000` units.
pub const UNIT_SCALE: u32 = 18;

/// Monetary amount in the ledger's smallest denomination.
///
/// All amounts crossing the ledger boundary are integers; no floating point
/// is used anywhere on this path. The catalog-facing decimal price is
/// converted exactly once, at the orchestrator boundary, via
/// [`TokenAmount::from_decimal_str`].
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    /// Create from raw ledger units.
    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// Convert a catalog decimal price (e.g. `"1.5"`) to ledger units at the
    /// fixed scale of 10^[`UNIT_SCALE`].
    ///
    /// The conversion is exact: more than [`UNIT_SCALE`] fractional digits,
    /// empty input, or non-digit characters are rejected rather than rounded.
    pub fn from_decimal_str(input: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidAmount {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (whole, frac) = match input.split_once('.') {
            Some((w, f)) => (w, f),
            None => (input, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("empty amount"));
        }
        if frac.len() as u32 > UNIT_SCALE {
            return Err(invalid("too many fractional digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("expected only decimal digits"));
        }

        let scale = 10u128.pow(UNIT_SCALE);
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| invalid("whole part out of range"))?
                .checked_mul(scale)
                .ok_or_else(|| invalid("amount out of range"))?
        };

        let frac_units = if frac.is_empty() {
            0
        } else {
            let digits = frac
                .parse::<u128>()
                .map_err(|_| invalid("fractional part out of range"))?;
            digits * 10u128.pow(UNIT_SCALE - frac.len() as u32)
        };

        whole_units
            .checked_add(frac_units)
            .map(Self)
            .ok_or_else(|| invalid("amount out of range"))
    }

    /// Raw ledger units.
    pub const fn units(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Render back to a decimal string at the fixed scale, without trailing
    /// fractional zeros.
    pub fn to_decimal_string(&self) -> String {
        let scale = 10u128.pow(UNIT_SCALE);
        let whole = self.0 / scale;
        let frac = self.0 % scale;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{frac:0width$}", width = UNIT_SCALE as usize);
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl fmt::Debug for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenAmount({})", self.0)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn whole_number_conversion() {
        let amount = TokenAmount::from_decimal_str("1000").unwrap();
        assert_eq!(amount.units(), 1000 * 10u128.pow(UNIT_SCALE));
    }

    #[test]
    fn fractional_conversion_is_exact() {
        let amount = TokenAmount::from_decimal_str("1.5").unwrap();
        assert_eq!(amount.units(), 15 * 10u128.pow(UNIT_SCALE - 1));

        let amount = TokenAmount::from_decimal_str("0.000000000000000001").unwrap();
        assert_eq!(amount.units(), 1);
    }

    #[test]
    fn leading_dot_is_accepted() {
        let amount = TokenAmount::from_decimal_str(".25").unwrap();
        assert_eq!(amount.units(), 25 * 10u128.pow(UNIT_SCALE - 2));
    }

    #[test]
    fn zero_parses_to_zero() {
        assert_eq!(TokenAmount::from_decimal_str("0").unwrap(), TokenAmount::ZERO);
        assert!(TokenAmount::from_decimal_str("0.0").unwrap().is_zero());
    }

    #[test]
    fn excess_precision_is_rejected_not_rounded() {
        let err = TokenAmount::from_decimal_str("1.0000000000000000001").unwrap_err();
        assert!(matches!(err, TypeError::InvalidAmount { .. }));
    }

    #[test]
    fn garbage_is_rejected() {
        for bad in ["", ".", "1,5", "-1", "1e9", "1.5.0", "abc"] {
            assert!(
                TokenAmount::from_decimal_str(bad).is_err(),
                "expected {bad:?} to fail"
            );
        }
    }

    #[test]
    fn decimal_string_roundtrip() {
        for s in ["0", "1", "1000", "1.5", "0.25", "12.000000000000000001"] {
            let amount = TokenAmount::from_decimal_str(s).unwrap();
            let rendered = amount.to_decimal_string();
            assert_eq!(
                TokenAmount::from_decimal_str(&rendered).unwrap(),
                amount,
                "roundtrip failed for {s:?}"
            );
        }
    }

    #[test]
    fn checked_math() {
        let a = TokenAmount::from_units(10);
        let b = TokenAmount::from_units(3);
        assert_eq!(a.checked_add(b), Some(TokenAmount::from_units(13)));
        assert_eq!(a.checked_sub(b), Some(TokenAmount::from_units(7)));
        assert_eq!(b.checked_sub(a), None);
    }

    proptest! {
        #[test]
        fn whole_amounts_scale_linearly(n in 0u64..1_000_000) {
            let amount = TokenAmount::from_decimal_str(&n.to_string()).unwrap();
            prop_assert_eq!(amount.units(), n as u128 * 10u128.pow(UNIT_SCALE));
        }
    }
}
