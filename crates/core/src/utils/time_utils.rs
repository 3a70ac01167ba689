use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Converts a UTC instant to a valuation date in the given timezone.
pub fn valuation_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Today's valuation date in `tz`.
pub fn valuation_date_today(tz: Tz) -> NaiveDate {
    valuation_date_from_utc(Utc::now(), tz)
}
