//! Checked arithmetic for token amounts.
//!
//! Amounts are `i128` as in the Soroban token interface. Overflow aborts the
//! invocation, which rolls back every write made by the call.

pub struct SafeMath;

impl SafeMath {
    pub fn add(a: i128, b: i128) -> i128 {
        a.checked_add(b)
            .unwrap_or_else(|| panic!("arithmetic overflow"))
    }

    pub fn sub(a: i128, b: i128) -> i128 {
        a.checked_sub(b)
            .unwrap_or_else(|| panic!("arithmetic underflow"))
    }

    /// `value * numerator / denominator`, rounded toward zero.
    pub fn mul_div(value: i128, numerator: i128, denominator: i128) -> i128 {
        if denominator == 0 {
            panic!("division by zero");
        }
        value
            .checked_mul(numerator)
            .unwrap_or_else(|| panic!("arithmetic overflow"))
            / denominator
    }

    /// Apply a `rate / scale` fraction to `amount`.
    pub fn apply_rate(amount: i128, rate: i128, scale: i128) -> i128 {
        Self::mul_div(amount, rate, scale)
    }

    /// Like [`SafeMath::apply_rate`] but never more than `amount` itself.
    /// Used for forfeitures, which cannot exceed what is being forfeited.
    pub fn capped_rate(amount: i128, rate: i128, scale: i128) -> i128 {
        let portion = Self::apply_rate(amount, rate, scale);
        if portion > amount {
            amount
        } else {
            portion
        }
    }
}
