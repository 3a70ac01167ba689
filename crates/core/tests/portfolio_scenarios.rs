//! End-to-end recomputations over a two-currency book.

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerfolio_core::fx::{CurrencyPair, RateTable};
use ledgerfolio_core::market_data::{MarketDataError, PriceFeedTrait, PriceMap, PriceQuote};
use ledgerfolio_core::portfolio::history::ValueSource;
use ledgerfolio_core::{PortfolioBook, PortfolioService};
use ledgerfolio_core::settings::Settings;
use rust_decimal_macros::dec;
use std::sync::Arc;

const BOOK: &str = r#"{
  "accounts": [
    { "id": "tw", "name": "Taiwan broker", "currency": "TWD" },
    { "id": "us", "name": "US broker", "currency": "USD" }
  ],
  "cashFlows": [
    { "id": "1", "date": "2022-01-03", "accountId": "tw", "type": "DEPOSIT", "amount": 500000 },
    { "id": "2", "date": "2022-02-01", "accountId": "tw", "type": "TRANSFER", "amount": 160000,
      "targetAccountId": "us", "exchangeRate": "0.03125" },
    { "id": "3", "date": "2023-03-01", "accountId": "tw", "type": "WITHDRAWAL", "amount": 10000 },
    { "id": "4", "date": "2023-06-30", "accountId": "us", "type": "INTEREST", "amount": 10 },
    { "id": "5", "date": "2023-07-01", "accountId": "closed", "type": "DEPOSIT", "amount": 99999 }
  ],
  "transactions": [
    { "id": "10", "date": "2022-01-05", "accountId": "tw", "ticker": "2330", "market": "TW",
      "type": "BUY", "price": 600, "quantity": 100, "fees": 85 },
    { "id": "11", "date": "2022-02-03T09:30:00Z", "accountId": "us", "ticker": "AAPL", "market": "US",
      "type": "BUY", "price": 150, "quantity": 20, "fees": 1, "exchangeRate": 30 },
    { "id": "12", "date": "2023-05-02", "accountId": "tw", "ticker": "2330", "market": "TW",
      "type": "SELL", "price": 500, "quantity": 50 },
    { "id": "13", "date": "2023-07-01", "accountId": "tw", "ticker": "2330", "market": "TW",
      "type": "CASH_DIVIDEND", "price": "2.75", "quantity": 50 }
  ],
  "yearEndValuations": [ { "year": 2022, "value": 480000 } ]
}"#;

struct FixedFeed;

#[async_trait]
impl PriceFeedTrait for FixedFeed {
    async fn fetch_prices(&self, tickers: &[String]) -> Result<PriceMap, MarketDataError> {
        let mut prices = PriceMap::new();
        for ticker in tickers {
            let price = match ticker.as_str() {
                "2330" => dec!(550),
                "AAPL" => dec!(180),
                _ => continue,
            };
            prices.insert(ticker.clone(), PriceQuote::new(price));
        }
        Ok(prices)
    }

    async fn fetch_rates(&self) -> Result<RateTable, MarketDataError> {
        let mut rates = RateTable::new();
        rates.insert(CurrencyPair::new("USD", "TWD"), dec!(32));
        Ok(rates)
    }
}

#[tokio::test]
async fn two_currency_book_rolls_up_consistently() {
    let book: PortfolioBook = serde_json::from_str(BOOK).unwrap();
    let service = PortfolioService::new(Settings::default(), Arc::new(FixedFeed));
    let as_of = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();

    let snapshot = service.recompute_as_of(&book, as_of).await.unwrap();
    let summary = &snapshot.summary;

    // Cash: TWD account plus 2009 USD at 32
    assert_eq!(snapshot.ledger.balance_of("tw"), dec!(295052));
    assert_eq!(snapshot.ledger.balance_of("us"), dec!(2009));
    assert_eq!(summary.cash_balance, dec!(359340));

    // Holdings: 50 x 550 TWD and 20 x 180 USD
    assert_eq!(summary.holdings_value, dec!(142700));
    assert_eq!(summary.total_assets, dec!(502040));
    assert_eq!(summary.realized_pl, dec!(-5042.5));
    assert_eq!(summary.unrealized_pl, dec!(22627.5));

    // Deposits minus withdrawals; the transfer, the interest and the
    // deposit into the closed account are left out
    assert_eq!(summary.net_invested, dec!(490000));
    assert_eq!(summary.total_pl, dec!(12040));
    assert_eq!(summary.total_pl_percent, dec!(2.46));
    assert!(summary.annualized_return > dec!(0.01) && summary.annualized_return < dec!(0.015));
    assert_eq!(summary.average_funding_rates["USD"], dec!(32));

    let aapl = snapshot
        .holdings
        .holdings
        .iter()
        .find(|h| h.ticker == "AAPL")
        .unwrap();
    assert_eq!(aapl.avg_cost, dec!(150.05));
    assert_eq!(aapl.cost_basis.reporting, dec!(90030));

    assert_eq!(snapshot.history.len(), 2);
    assert_eq!(snapshot.history[0].source, ValueSource::Observed);
    assert_eq!(snapshot.history[0].profit_loss, dec!(-20000));
    assert_eq!(snapshot.history[1].profit_loss, dec!(32040));
    assert_eq!(snapshot.history[1].cumulative_cost, dec!(490000));

    // The dangling deposit is reported once
    assert_eq!(snapshot.warnings.len(), 1);
    assert_eq!(snapshot.warnings[0].record_id, "5");
}

#[tokio::test]
async fn deleting_a_transfer_goes_through_its_cash_flow() {
    let book: PortfolioBook = serde_json::from_str(BOOK).unwrap();
    let service = PortfolioService::new(Settings::default(), Arc::new(FixedFeed));
    let as_of = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    let snapshot = service.recompute_as_of(&book, as_of).await.unwrap();

    let target = snapshot.ledger.entry("2-target").unwrap();
    assert!(target.entry.is_synthetic());
    assert_eq!(target.entry.deletion_target().id(), "2");

    // Deleting cash flow 2 removes both sides
    let mut edited = book.clone();
    edited.cash_flows.retain(|f| f.id != target.entry.deletion_target().id());
    let after = service.recompute_as_of(&edited, as_of).await.unwrap();
    assert!(after.ledger.entry("2").is_none());
    assert!(after.ledger.entry("2-target").is_none());
    assert_eq!(after.ledger.balance_of("us"), dec!(-2991));
}
