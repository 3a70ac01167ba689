//! Values positions against the last-known market data.

use log::{debug, warn};
use rust_decimal::Decimal;

use super::holdings_model::{Holding, HoldingsValuation, MonetaryValue, Position, PriceSource};
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::CalculationWarning;
use crate::fx::CurrencyNormalizer;
use crate::market_data::MarketSnapshot;

/// Percentage of `part` in `whole`, zero when `whole` is not positive.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ZERO, |percent| percent.round_dp(DISPLAY_DECIMAL_PRECISION))
}

/// Values each position at its feed price, falling back to the price of its
/// last trade, and converts the result at the current global rate.
pub fn value_positions(
    positions: &[Position],
    market: &MarketSnapshot,
    normalizer: &CurrencyNormalizer<'_>,
) -> HoldingsValuation {
    let mut warnings = Vec::new();
    let mut holdings = Vec::with_capacity(positions.len());

    for position in positions {
        let id = position.id();
        let (current_price, price_source, quote_change) =
            match market.price_of_listing(&id, &position.ticker) {
                Some(quote) => (quote.price, PriceSource::Feed, quote.change),
                None => (
                    position.last_price.unwrap_or(Decimal::ZERO),
                    PriceSource::LastTransaction,
                    None,
                ),
            };

        let rate = match normalizer.rate_to_reporting(position.currency(), None) {
            Ok((rate, _)) => Some(rate),
            Err(e) => {
                let warning = CalculationWarning::new(
                    &id,
                    None,
                    format!("Holding left out of reporting totals: {}", e),
                );
                warn!("{}", warning);
                warnings.push(warning);
                None
            }
        };

        let held = position.quantity.max(Decimal::ZERO);
        let value_local = match held.checked_mul(current_price) {
            Some(value) => value,
            None => {
                let warning = CalculationWarning::new(
                    &id,
                    None,
                    format!("Market value out of range at price {}; valued at zero", current_price),
                );
                warn!("{}", warning);
                warnings.push(warning);
                Decimal::ZERO
            }
        };
        let value_reporting = rate.and_then(|r| value_local.checked_mul(r));
        if rate.is_some() && value_reporting.is_none() {
            let warning = CalculationWarning::new(
                &id,
                None,
                "Reporting value out of range; holding left out of totals".to_string(),
            );
            warn!("{}", warning);
            warnings.push(warning);
        }
        let cost_basis = position.cost_basis();

        let unrealized_pl = MonetaryValue::new(
            value_local - cost_basis.local,
            value_reporting.map_or(Decimal::ZERO, |value| value - cost_basis.reporting),
        );
        let value_reporting = value_reporting.unwrap_or(Decimal::ZERO);

        let day_change = quote_change.and_then(|change| {
            let local = change.checked_mul(held)?;
            let reporting = match rate {
                Some(r) => local.checked_mul(r)?,
                None => Decimal::ZERO,
            };
            Some(MonetaryValue::new(local, reporting))
        });

        holdings.push(Holding {
            id,
            market: position.market,
            ticker: position.ticker.clone(),
            currency: position.currency().to_string(),
            quantity: position.quantity,
            avg_cost: position.average_cost,
            cost_basis,
            current_price,
            price_source,
            market_value: MonetaryValue::new(value_local, value_reporting),
            unrealized_pl,
            unrealized_pl_percent: percent_of(unrealized_pl.reporting, cost_basis.reporting),
            realized_pl: position.realized_pl,
            day_change,
            weight: Decimal::ZERO,
        });
    }

    let total_value: Decimal = holdings.iter().map(|h| h.market_value.reporting).sum();
    for holding in &mut holdings {
        holding.weight = percent_of(holding.market_value.reporting, total_value);
    }
    holdings.sort_by(|a, b| {
        b.market_value
            .reporting
            .cmp(&a.market_value.reporting)
            .then_with(|| a.id.cmp(&b.id))
    });

    let total_cost_basis = holdings.iter().map(|h| h.cost_basis.reporting).sum();
    let unrealized_pl = holdings.iter().map(|h| h.unrealized_pl.reporting).sum();
    let realized_pl = holdings.iter().map(|h| h.realized_pl.reporting).sum();

    debug!(
        "Valued {} holdings at {} {}",
        holdings.len(),
        total_value,
        normalizer.reporting_currency()
    );

    HoldingsValuation {
        holdings,
        total_value,
        total_cost_basis,
        unrealized_pl,
        realized_pl,
        warnings,
    }
}
