//! Conversion of market-native amounts into the reporting currency.

use log::warn;
use rust_decimal::Decimal;

use super::{CurrencyConverter, FxError};

/// Which source supplied the rate used for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSource {
    /// Amount already in the reporting currency.
    Identity,
    /// Rate recorded on the originating record at entry time.
    Pinned,
    /// Current global rate from the price feed.
    Current,
}

/// Converts amounts into a single reporting currency.
///
/// A rate pinned on the originating record takes precedence over the current
/// global rate. Valuations of unpinned amounts therefore move with the live
/// rate and two valuations taken at different times need not agree.
#[derive(Debug, Clone, Copy)]
pub struct CurrencyNormalizer<'a> {
    reporting_currency: &'a str,
    converter: &'a CurrencyConverter,
}

impl<'a> CurrencyNormalizer<'a> {
    pub fn new(reporting_currency: &'a str, converter: &'a CurrencyConverter) -> Self {
        Self {
            reporting_currency,
            converter,
        }
    }

    pub fn reporting_currency(&self) -> &'a str {
        self.reporting_currency
    }

    /// Resolves the rate from `currency` to the reporting currency.
    pub fn rate_to_reporting(
        &self,
        currency: &str,
        pinned_rate: Option<Decimal>,
    ) -> Result<(Decimal, RateSource), FxError> {
        if currency == self.reporting_currency {
            return Ok((Decimal::ONE, RateSource::Identity));
        }
        match pinned_rate {
            Some(rate) if rate > Decimal::ZERO => return Ok((rate, RateSource::Pinned)),
            Some(rate) => warn!(
                "Ignoring non-positive pinned rate {} for {} -> {}; using current rate",
                rate, currency, self.reporting_currency
            ),
            None => {}
        }
        let rate = self.converter.get_rate(currency, self.reporting_currency)?;
        Ok((rate, RateSource::Current))
    }

    /// Converts `amount` from `currency` into the reporting currency.
    pub fn to_reporting_currency(
        &self,
        amount: Decimal,
        currency: &str,
        pinned_rate: Option<Decimal>,
    ) -> Result<Decimal, FxError> {
        let (rate, _) = self.rate_to_reporting(currency, pinned_rate)?;
        amount.checked_mul(rate).ok_or_else(|| {
            FxError::ConversionOverflow(format!(
                "{} {} -> {}",
                amount, currency, self.reporting_currency
            ))
        })
    }
}
