//! Hryvnia amounts and their dollar snapshot.
//!
//! Amounts are plain `f64` values as they come from the chat and the wire.
//! The dollar value is derived once, at write time, from the rate in effect
//! and rounded to cents:
//!
//! ```rust
//! use engine::to_usd;
//!
//! assert_eq!(to_usd(100.0, 40.0).unwrap(), 2.5);
//! assert_eq!(to_usd(10.0, 3.0).unwrap(), 3.33);
//! ```

use crate::{EngineError, ResultEngine};

/// Converts an amount in hryvnia to dollars using `rate` (UAH per USD),
/// rounded to two decimals.
pub fn to_usd(amount_uah: f64, rate: f64) -> ResultEngine<f64> {
    let amount_uah = validate_amount(amount_uah)?;
    let rate = validate_rate(rate)?;
    Ok(round_cents(amount_uah / rate))
}

/// Amounts must be finite and not negative.
pub(crate) fn validate_amount(amount_uah: f64) -> ResultEngine<f64> {
    if !amount_uah.is_finite() {
        return Err(EngineError::InvalidAmount(
            "amount must be a number".to_string(),
        ));
    }
    if amount_uah < 0.0 {
        return Err(EngineError::InvalidAmount(
            "amount must be >= 0".to_string(),
        ));
    }
    Ok(amount_uah)
}

fn validate_rate(rate: f64) -> ResultEngine<f64> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(EngineError::InvalidRate(format!(
            "rate must be a positive number, got {rate}"
        )));
    }
    Ok(rate)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_and_rounds_to_cents() {
        assert_eq!(to_usd(100.0, 40.0).unwrap(), 2.5);
        assert_eq!(to_usd(200.0, 40.0).unwrap(), 5.0);
        assert_eq!(to_usd(50.5, 41.27).unwrap(), 1.22);
        assert_eq!(to_usd(0.0, 38.0).unwrap(), 0.0);
    }

    #[test]
    fn rejects_negative_and_nan_amounts() {
        assert!(matches!(
            to_usd(-1.0, 40.0),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            to_usd(f64::NAN, 40.0),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn rejects_unusable_rates() {
        assert!(matches!(to_usd(10.0, 0.0), Err(EngineError::InvalidRate(_))));
        assert!(matches!(
            to_usd(10.0, f64::INFINITY),
            Err(EngineError::InvalidRate(_))
        ));
    }
}
