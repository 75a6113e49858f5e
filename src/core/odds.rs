//! American odds conversions
//!
//! American odds quote a favorite as the stake needed to win 100 (-150) and an
//! underdog as the win on a 100 stake (+150). Values in the open interval
//! (-100, 100) do not exist.

use crate::error::EdgeError;

fn validate_odds(odds: i32) -> Result<(), EdgeError> {
    if odds > -100 && odds < 100 {
        return Err(EdgeError::InvalidOdds { odds });
    }
    Ok(())
}

fn validate_probability(probability: f64) -> Result<(), EdgeError> {
    if !(probability > 0.0 && probability < 1.0) {
        return Err(EdgeError::InvalidProbability { probability });
    }
    Ok(())
}

/// Convert American odds to the (vigged) implied probability
///
/// # Examples
/// ```
/// use hoops_edge::core::odds::to_implied_probability;
/// let p = to_implied_probability(-110).unwrap();
/// assert!((p - 0.5238).abs() < 0.0001);
/// ```
pub fn to_implied_probability(odds: i32) -> Result<f64, EdgeError> {
    validate_odds(odds)?;
    let odds = odds as f64;
    if odds >= 100.0 {
        Ok(100.0 / (odds + 100.0))
    } else {
        Ok(-odds / (-odds + 100.0))
    }
}

/// Convert a probability to American odds, rounded to the nearest unit
///
/// Probabilities of one half or more map to favorite (negative) odds, so an
/// even-money price comes back as -100.
pub fn to_american_odds(probability: f64) -> Result<i32, EdgeError> {
    validate_probability(probability)?;
    let odds = if probability >= 0.5 {
        -(probability / (1.0 - probability) * 100.0)
    } else {
        (1.0 - probability) / probability * 100.0
    };
    Ok(odds.round() as i32)
}

/// Net payout per unit staked (`b` in the Kelly formula)
pub fn payout_ratio(odds: i32) -> Result<f64, EdgeError> {
    validate_odds(odds)?;
    if odds > 0 {
        Ok(odds as f64 / 100.0)
    } else {
        Ok(100.0 / (odds as f64).abs())
    }
}

/// Decimal (European) odds, stake included
pub fn to_decimal_odds(odds: i32) -> Result<f64, EdgeError> {
    Ok(1.0 + payout_ratio(odds)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implied_probability_favorite() {
        let p = to_implied_probability(-150).unwrap();
        assert!((p - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_implied_probability_underdog() {
        let p = to_implied_probability(110).unwrap();
        assert!((p - 0.4762).abs() < 0.0001);
    }

    #[test]
    fn test_implied_probability_even() {
        assert!((to_implied_probability(100).unwrap() - 0.5).abs() < 1e-12);
        assert!((to_implied_probability(-100).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_odds_rejected() {
        for odds in [0, 1, -1, 99, -99, 50] {
            assert_eq!(
                to_implied_probability(odds),
                Err(EdgeError::InvalidOdds { odds })
            );
        }
        assert!(payout_ratio(0).is_err());
    }

    #[test]
    fn test_invalid_probability_rejected() {
        for p in [0.0, 1.0, -0.1, 1.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                to_american_odds(p),
                Err(EdgeError::InvalidProbability { .. })
            ));
        }
    }

    #[test]
    fn test_to_american_odds() {
        assert_eq!(to_american_odds(0.6).unwrap(), -150);
        assert_eq!(to_american_odds(0.4).unwrap(), 150);
        assert_eq!(to_american_odds(0.5).unwrap(), -100);
    }

    #[test]
    fn test_round_trip_within_one_unit() {
        let odds_values = (100..=2000)
            .step_by(7)
            .chain((-2000..=-100).step_by(7))
            .chain([101, -101, 5000, -5000, 10000, -10000]);

        for odds in odds_values {
            if odds == 100 {
                // +100 and -100 are the same price; the inverse reports -100
                continue;
            }
            let back = to_american_odds(to_implied_probability(odds).unwrap()).unwrap();
            assert!(
                (back - odds).abs() <= 1,
                "round trip {} -> {} drifted",
                odds,
                back
            );
        }
    }

    #[test]
    fn test_decimal_odds() {
        assert!((to_decimal_odds(150).unwrap() - 2.5).abs() < 1e-12);
        assert!((to_decimal_odds(-200).unwrap() - 1.5).abs() < 1e-12);
        assert!((payout_ratio(-110).unwrap() - 100.0 / 110.0).abs() < 1e-12);
    }
}
