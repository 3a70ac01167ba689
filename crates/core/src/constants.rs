use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Default reporting currency when settings do not provide one
pub const DEFAULT_REPORTING_CURRENCY: &str = "TWD";

/// Default timezone used to derive "today" for valuations
pub const DEFAULT_VALUATION_TIMEZONE: &str = "Asia/Taipei";

/// Days per year used by the annualized return estimate
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// Minimum holding period, in years, before an annualized return is reported
pub const MIN_ANNUALIZATION_YEARS: Decimal = dec!(0.1);

/// Suffix appended to a transfer's id to form the id of its receiving-side entry
pub const TRANSFER_TARGET_SUFFIX: &str = "-target";

/// Decimal precision for displayed percentages
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Decimal precision for derived rates and annualized returns
pub const DECIMAL_PRECISION: u32 = 6;
