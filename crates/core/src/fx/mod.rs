//! FX (Foreign Exchange) module - markets, rate tables and conversion into
//! the reporting currency.

pub mod currency;
pub mod currency_converter;
pub mod currency_normalizer;
mod fx_errors;
mod fx_model;

pub use currency::Market;
pub use currency_converter::CurrencyConverter;
pub use currency_normalizer::{CurrencyNormalizer, RateSource};
pub use fx_errors::FxError;
pub use fx_model::{CurrencyPair, RateTable};
