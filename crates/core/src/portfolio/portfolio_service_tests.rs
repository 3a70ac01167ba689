#[cfg(test)]
mod tests {
    use crate::accounts::Account;
    use crate::activities::{CashFlow, CashFlowType, Transaction, TransactionType};
    use crate::errors::Error;
    use crate::fx::{CurrencyPair, Market, RateTable};
    use crate::market_data::{MarketDataError, PriceFeedTrait, PriceMap, PriceQuote};
    use crate::portfolio::holdings::PriceSource;
    use crate::portfolio::{PortfolioBook, PortfolioService};
    use crate::settings::{Settings, SettingsUpdate};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // --- Mock price feed ---

    type PriceResponse = Result<PriceMap, MarketDataError>;

    /// Answers price requests from a queue; once the queue is drained every
    /// call returns `fallback`. Rates are fixed.
    struct MockPriceFeed {
        responses: Mutex<VecDeque<PriceResponse>>,
        fallback: PriceMap,
        rates: RateTable,
        price_calls: AtomicUsize,
        first_call_delay: Option<Duration>,
    }

    impl MockPriceFeed {
        fn new(fallback: PriceMap) -> Self {
            let mut rates = RateTable::new();
            rates.insert(CurrencyPair::new("USD", "TWD"), dec!(32));
            Self {
                responses: Mutex::new(VecDeque::new()),
                fallback,
                rates,
                price_calls: AtomicUsize::new(0),
                first_call_delay: None,
            }
        }

        fn then(self, response: PriceResponse) -> Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        fn calls(&self) -> usize {
            self.price_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceFeedTrait for MockPriceFeed {
        async fn fetch_prices(&self, _tickers: &[String]) -> Result<PriceMap, MarketDataError> {
            let call = self.price_calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                if let Some(delay) = self.first_call_delay {
                    tokio::time::sleep(delay).await;
                }
            }
            let queued = self.responses.lock().unwrap().pop_front();
            queued.unwrap_or_else(|| Ok(self.fallback.clone()))
        }

        async fn fetch_rates(&self) -> Result<RateTable, MarketDataError> {
            Ok(self.rates.clone())
        }
    }

    // --- Helpers ---

    fn prices(entries: &[(&str, Decimal)]) -> PriceMap {
        entries
            .iter()
            .map(|(ticker, price)| (ticker.to_string(), PriceQuote::new(*price)))
            .collect()
    }

    fn settings() -> Settings {
        Settings {
            feed_retry_attempts: 2,
            feed_retry_delay_ms: 1,
            ..Settings::default()
        }
    }

    fn book() -> PortfolioBook {
        PortfolioBook {
            accounts: vec![Account::new("A", "Main", "TWD")],
            transactions: vec![Transaction {
                id: "2".to_string(),
                date: "2023-01-02".to_string(),
                account_id: "A".to_string(),
                ticker: "X".to_string(),
                market: Market::Tw,
                transaction_type: TransactionType::Buy,
                price: dec!(500),
                quantity: dec!(100),
                fees: dec!(20),
                amount: None,
                exchange_rate: None,
                note: None,
            }],
            cash_flows: vec![CashFlow {
                id: "1".to_string(),
                date: "2023-01-01".to_string(),
                account_id: "A".to_string(),
                flow_type: CashFlowType::Deposit,
                amount: dec!(100000),
                fee: None,
                exchange_rate: None,
                target_account_id: None,
                note: None,
            }],
            year_end_valuations: vec![],
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 10).unwrap()
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_recompute_publishes_snapshot() {
        let feed = Arc::new(MockPriceFeed::new(prices(&[("X", dec!(510))])));
        let service = PortfolioService::new(settings(), feed);
        assert!(service.latest_snapshot().is_none());

        let snapshot = service.recompute_as_of(&book(), as_of()).await.unwrap();

        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.ledger.balance_of("A"), dec!(49980));
        assert_eq!(snapshot.holdings.holdings[0].avg_cost, dec!(500.2));
        assert_eq!(snapshot.summary.total_assets, dec!(100980));
        assert_eq!(snapshot.summary.total_pl, dec!(980));
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].end_value, dec!(100980));
        assert!(snapshot.warnings.is_empty());
        assert_eq!(service.latest_snapshot().unwrap().generation, 1);
    }

    #[tokio::test]
    async fn test_feed_failure_keeps_previous_snapshot() {
        let feed = Arc::new(
            MockPriceFeed::new(prices(&[("X", dec!(510))]))
                .then(Ok(prices(&[("X", dec!(510))])))
                .then(Err(MarketDataError::InvalidResponse("garbage".into()))),
        );
        let service = PortfolioService::new(settings(), feed.clone());
        service.recompute_as_of(&book(), as_of()).await.unwrap();

        let result = service.recompute_as_of(&book(), as_of()).await;

        assert!(matches!(
            result,
            Err(Error::MarketData(MarketDataError::InvalidResponse(_)))
        ));
        // Not retryable: one call for each recomputation
        assert_eq!(feed.calls(), 2);
        let latest = service.latest_snapshot().unwrap();
        assert_eq!(latest.generation, 1);
        assert_eq!(latest.summary.holdings_value, dec!(51000));
    }

    #[tokio::test]
    async fn test_retryable_failures_are_retried() {
        let feed = Arc::new(
            MockPriceFeed::new(prices(&[("X", dec!(510))]))
                .then(Err(MarketDataError::Timeout("slow".into())))
                .then(Err(MarketDataError::Unavailable("down".into()))),
        );
        let service = PortfolioService::new(settings(), feed.clone());

        let snapshot = service.recompute_as_of(&book(), as_of()).await.unwrap();

        assert_eq!(feed.calls(), 3);
        assert_eq!(snapshot.summary.holdings_value, dec!(51000));
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_as_market_data_error() {
        let feed = Arc::new(
            MockPriceFeed::new(PriceMap::new())
                .then(Err(MarketDataError::Timeout("1".into())))
                .then(Err(MarketDataError::Timeout("2".into())))
                .then(Err(MarketDataError::Timeout("3".into()))),
        );
        let service = PortfolioService::new(settings(), feed.clone());

        let result = service.recompute_as_of(&book(), as_of()).await;

        assert!(matches!(
            result,
            Err(Error::MarketData(MarketDataError::RetriesExhausted { attempts: 3, .. }))
        ));
        assert!(service.latest_snapshot().is_none());
    }

    #[tokio::test]
    async fn test_partial_feed_answer_keeps_last_known_price() {
        let feed = Arc::new(
            MockPriceFeed::new(PriceMap::new()).then(Ok(prices(&[("X", dec!(510))]))),
        );
        let service = PortfolioService::new(settings(), feed);
        service.recompute_as_of(&book(), as_of()).await.unwrap();

        // Second answer is empty: the price from the first one stands
        let snapshot = service.recompute_as_of(&book(), as_of()).await.unwrap();

        let holding = &snapshot.holdings.holdings[0];
        assert_eq!(holding.current_price, dec!(510));
        assert_eq!(holding.price_source, PriceSource::Feed);
    }

    #[tokio::test]
    async fn test_superseded_recomputation_is_discarded() {
        let mut feed = MockPriceFeed::new(prices(&[("X", dec!(510))]));
        feed.first_call_delay = Some(Duration::from_millis(50));
        let service = PortfolioService::new(settings(), Arc::new(feed));
        let book = book();

        let (slow, fast) = tokio::join!(
            service.recompute_as_of(&book, as_of()),
            service.recompute_as_of(&book, as_of())
        );

        assert_eq!(fast.unwrap().generation, 2);
        assert!(matches!(
            slow,
            Err(Error::Superseded {
                generation: 1,
                latest: 2
            })
        ));
        assert_eq!(service.latest_snapshot().unwrap().generation, 2);
    }

    #[tokio::test]
    async fn test_settings_update_changes_reporting_currency() {
        let feed = Arc::new(MockPriceFeed::new(prices(&[("X", dec!(512))])));
        let service = PortfolioService::new(settings(), feed);
        service
            .update_settings(&SettingsUpdate {
                reporting_currency: Some("USD".to_string()),
                ..Default::default()
            })
            .unwrap();

        let snapshot = service.recompute_as_of(&book(), as_of()).await.unwrap();

        assert_eq!(snapshot.summary.reporting_currency, "USD");
        assert_eq!(snapshot.summary.holdings_value, dec!(1600));
        assert_eq!(snapshot.summary.cash_balance, dec!(1561.875));
    }

    #[tokio::test]
    async fn test_invalid_settings_update_is_rejected() {
        let service = PortfolioService::new(
            settings(),
            Arc::new(MockPriceFeed::new(PriceMap::new())),
        );
        let result = service.update_settings(&SettingsUpdate {
            valuation_timezone: Some("Nowhere/Special".to_string()),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(service.settings().unwrap().valuation_timezone, "Asia/Taipei");
    }
}
