use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_REPORTING_CURRENCY, DEFAULT_VALUATION_TIMEZONE};
use crate::errors::{Error, Result, ValidationError};

const MAX_FEED_RETRY_ATTEMPTS: u32 = 10;
const MAX_ASSUMED_GROWTH_RATE: Decimal = dec!(10);

/// Engine configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Currency every summary figure is expressed in
    pub reporting_currency: String,
    /// IANA timezone that decides which calendar day "today" is
    pub valuation_timezone: String,
    /// Yearly growth used to fill years without an observed valuation
    pub assumed_growth_rate: Decimal,
    /// Extra price-feed attempts after the first failure
    pub feed_retry_attempts: u32,
    pub feed_retry_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reporting_currency: DEFAULT_REPORTING_CURRENCY.to_string(),
            valuation_timezone: DEFAULT_VALUATION_TIMEZONE.to_string(),
            assumed_growth_rate: dec!(0.05),
            feed_retry_attempts: 2,
            feed_retry_delay_ms: 250,
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub reporting_currency: Option<String>,
    pub valuation_timezone: Option<String>,
    pub assumed_growth_rate: Option<Decimal>,
    pub feed_retry_attempts: Option<u32>,
    pub feed_retry_delay_ms: Option<u64>,
}

fn invalid(message: String) -> Error {
    Error::Validation(ValidationError::InvalidInput(message))
}

impl Settings {
    /// Parses settings JSON, filling missing keys with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.reporting_currency = settings.reporting_currency.trim().to_uppercase();
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let currency = &self.reporting_currency;
        if currency.is_empty() {
            return Err(ValidationError::MissingField("reportingCurrency".to_string()).into());
        }
        if self.valuation_timezone.trim().is_empty() {
            return Err(ValidationError::MissingField("valuationTimezone".to_string()).into());
        }
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid(format!(
                "Reporting currency must be a 3-letter code, got '{}'",
                currency
            )));
        }
        self.timezone()?;
        if self.assumed_growth_rate <= dec!(-1) || self.assumed_growth_rate > MAX_ASSUMED_GROWTH_RATE {
            return Err(invalid(format!(
                "Assumed growth rate {} is outside (-1, {}]",
                self.assumed_growth_rate, MAX_ASSUMED_GROWTH_RATE
            )));
        }
        if self.feed_retry_attempts > MAX_FEED_RETRY_ATTEMPTS {
            return Err(Error::InvalidConfigValue(format!(
                "feedRetryAttempts {} exceeds {}",
                self.feed_retry_attempts, MAX_FEED_RETRY_ATTEMPTS
            )));
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.valuation_timezone
            .parse::<Tz>()
            .map_err(|_| invalid(format!("Unknown timezone '{}'", self.valuation_timezone)))
    }

    /// Returns the updated settings, leaving `self` untouched when the
    /// result would not validate.
    pub fn apply(&self, update: &SettingsUpdate) -> Result<Settings> {
        let mut next = self.clone();
        if let Some(currency) = &update.reporting_currency {
            next.reporting_currency = currency.trim().to_uppercase();
        }
        if let Some(timezone) = &update.valuation_timezone {
            next.valuation_timezone = timezone.clone();
        }
        if let Some(rate) = update.assumed_growth_rate {
            next.assumed_growth_rate = rate;
        }
        if let Some(attempts) = update.feed_retry_attempts {
            next.feed_retry_attempts = attempts;
        }
        if let Some(delay) = update.feed_retry_delay_ms {
            next.feed_retry_delay_ms = delay;
        }
        next.validate()?;
        Ok(next)
    }
}
