//! Recomputation pipeline and the last published snapshot.

use chrono::{Datelike, NaiveDate};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::history::{HistoryInputs, TimeSeriesProjector};
use super::holdings::{value_positions, HoldingsCalculator};
use super::portfolio_model::{dedup_warnings, PortfolioBook, PortfolioSnapshot};
use super::summary::{classify_cash_flows, PortfolioSummaryCalculator, SummaryInputs};
use crate::errors::{Error, Result};
use crate::fx::{CurrencyConverter, CurrencyNormalizer, RateTable};
use crate::ledger::Ledger;
use crate::market_data::{MarketDataError, MarketSnapshot, PriceFeedTrait, PriceMap};
use crate::settings::{Settings, SettingsUpdate};
use crate::utils::time_utils::valuation_date_today;

#[derive(Default)]
struct PublishedState {
    generation: u64,
    snapshot: Option<Arc<PortfolioSnapshot>>,
    /// Last-known prices and rates, merged across successful fetches
    market: MarketSnapshot,
}

/// Runs full recomputations against a price feed and publishes the results.
///
/// Every recomputation is a pure function of the book, the settings and the
/// market data. Overlapping calls are allowed: each takes a generation
/// number and a result is only published if no later generation has been
/// published first.
pub struct PortfolioService {
    settings: RwLock<Settings>,
    price_feed: Arc<dyn PriceFeedTrait>,
    next_generation: AtomicU64,
    state: RwLock<PublishedState>,
}

fn lock_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Unexpected(format!("Portfolio state lock poisoned: {}", e))
}

impl PortfolioService {
    pub fn new(settings: Settings, price_feed: Arc<dyn PriceFeedTrait>) -> Self {
        Self {
            settings: RwLock::new(settings),
            price_feed,
            next_generation: AtomicU64::new(0),
            state: RwLock::new(PublishedState::default()),
        }
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(self.settings.read().map_err(lock_error)?.clone())
    }

    /// Applies a partial settings update. Takes effect on the next recomputation.
    pub fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        let mut settings = self.settings.write().map_err(lock_error)?;
        let next = settings.apply(update)?;
        *settings = next.clone();
        info!("Settings updated: reporting currency {}", next.reporting_currency);
        Ok(next)
    }

    /// Last published snapshot, if any recomputation has succeeded.
    pub fn latest_snapshot(&self) -> Option<Arc<PortfolioSnapshot>> {
        match self.state.read() {
            Ok(state) => state.snapshot.clone(),
            Err(e) => {
                error!("{}", lock_error(e));
                None
            }
        }
    }

    /// Recomputes everything as of today in the valuation timezone.
    pub async fn recompute(&self, book: &PortfolioBook) -> Result<Arc<PortfolioSnapshot>> {
        let tz = self.settings()?.timezone()?;
        self.recompute_as_of(book, valuation_date_today(tz)).await
    }

    /// Recomputes everything as of `as_of`.
    ///
    /// A price feed failure returns `Error::MarketData` and leaves the
    /// published snapshot untouched.
    pub async fn recompute_as_of(
        &self,
        book: &PortfolioBook,
        as_of: NaiveDate,
    ) -> Result<Arc<PortfolioSnapshot>> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let settings = self.settings()?;
        debug!("Recomputation {} started as of {}", generation, as_of);

        let ledger = Ledger::build(&book.accounts, &book.transactions, &book.cash_flows);
        let tickers: Vec<String> = ledger
            .ledger_entries()
            .filter_map(|e| e.ticker.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let (prices, rates) = self.fetch_market_data(&tickers, &settings).await?;
        let market = {
            let state = self.state.read().map_err(lock_error)?;
            state.market.merged_with(prices, rates)
        };

        let snapshot = Self::compute(generation, book, ledger, market, &settings, as_of);
        self.publish(snapshot)
    }

    /// Fetches prices and rates together, retrying retryable failures.
    async fn fetch_market_data(
        &self,
        tickers: &[String],
        settings: &Settings,
    ) -> Result<(PriceMap, RateTable)> {
        let attempts = settings.feed_retry_attempts + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = futures::try_join!(
                self.price_feed.fetch_prices(tickers),
                self.price_feed.fetch_rates()
            );
            match result {
                Ok(data) => return Ok(data),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let delay = settings.feed_retry_delay_ms * u64::from(attempt);
                    warn!(
                        "Price feed attempt {}/{} failed: {}. Retrying in {}ms",
                        attempt, attempts, e, delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    error!("Price feed failed after {} attempt(s): {}", attempt, e);
                    if attempt > 1 {
                        return Err(MarketDataError::RetriesExhausted {
                            attempts: attempt,
                            last_error: e.to_string(),
                        }
                        .into());
                    }
                    return Err(e.into());
                }
            }
        }
    }

    fn compute(
        generation: u64,
        book: &PortfolioBook,
        ledger: Ledger,
        market: MarketSnapshot,
        settings: &Settings,
        as_of: NaiveDate,
    ) -> PortfolioSnapshot {
        let converter = CurrencyConverter::new(&market.rates);
        let normalizer = CurrencyNormalizer::new(&settings.reporting_currency, &converter);

        let positions = HoldingsCalculator::new(&normalizer)
            .calculate_positions(&book.accounts, &book.transactions);
        let holdings = value_positions(&positions.positions, &market, &normalizer);

        let summary = PortfolioSummaryCalculator::new(&normalizer).calculate(&SummaryInputs {
            accounts: &book.accounts,
            cash_flows: &book.cash_flows,
            ledger: &ledger,
            holdings: &holdings,
            as_of,
        });

        let flows = classify_cash_flows(&book.accounts, &book.cash_flows, &normalizer);
        let opening_value = summary.net_invested - flows.net_invested();
        let history = TimeSeriesProjector::new(settings.assumed_growth_rate).project(
            &HistoryInputs {
                opening_value,
                external_flows: &flows.external,
                first_year: ledger.ledger_entries().map(|e| e.date.year()).min(),
                observed: &book.year_end_valuations,
                as_of,
                current_value: summary.total_assets,
            },
        );

        let warnings = dedup_warnings(
            ledger
                .warnings
                .iter()
                .chain(&positions.warnings)
                .chain(&holdings.warnings)
                .chain(&summary.warnings)
                .cloned(),
        );

        PortfolioSnapshot {
            generation,
            as_of,
            ledger,
            holdings,
            summary,
            history,
            market,
            warnings,
        }
    }

    fn publish(&self, snapshot: PortfolioSnapshot) -> Result<Arc<PortfolioSnapshot>> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.generation > snapshot.generation {
            debug!(
                "Discarding recomputation {}; {} already published",
                snapshot.generation, state.generation
            );
            return Err(Error::Superseded {
                generation: snapshot.generation,
                latest: state.generation,
            });
        }
        let snapshot = Arc::new(snapshot);
        state.generation = snapshot.generation;
        state.market = snapshot.market.clone();
        state.snapshot = Some(snapshot.clone());
        info!(
            "Published portfolio snapshot {} ({} warnings)",
            snapshot.generation,
            snapshot.warnings.len()
        );
        Ok(snapshot)
    }
}
