//! Currency conversion against a fetched rate snapshot.

use crate::error::SplitError;
use crate::types::{Amount, ExchangeRates};

/// True when the code has the shape of an ISO 4217 currency code: exactly
/// three ASCII uppercase letters. Whether the code denotes a real currency
/// is up to whoever fetches the rates.
pub fn is_valid_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

/// Convert an amount between two currencies using a rate snapshot.
///
/// Converting a currency into itself returns the amount unchanged without
/// touching the snapshot, so the common case cannot drift or fail. Any
/// other conversion multiplies by `rate(to) / rate(from)`, both expressed
/// relative to the snapshot's base currency.
///
/// Fails with [`SplitError::RateUnavailable`] when either code has no
/// usable rate in the snapshot. The caller decides the fallback, usually
/// showing the unconverted amount: nothing falls back silently in here.
pub fn convert(
    amount: Amount,
    from: &str,
    to: &str,
    rates: &ExchangeRates,
) -> Result<Amount, SplitError> {
    if from == to {
        return Ok(amount);
    }

    let from_rate = lookup(rates, from).ok_or_else(|| SplitError::rate_unavailable(from, to))?;
    let to_rate = lookup(rates, to).ok_or_else(|| SplitError::rate_unavailable(from, to))?;

    Ok(amount * (to_rate / from_rate))
}

/// The base currency is worth 1.0 by definition, whether or not the
/// snapshot lists itself.
fn lookup(rates: &ExchangeRates, code: &str) -> Option<Amount> {
    if code == rates.base {
        Some(1.0)
    } else {
        rates.rate(code)
    }
}
