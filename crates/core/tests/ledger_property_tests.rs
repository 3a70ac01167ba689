//! Property-based integration tests for the ledger and valuation engine.
//!
//! These tests verify that universal properties hold across generated record
//! streams, using the `proptest` crate for random test case generation.

use chrono::{Duration, NaiveDate};
use ledgerfolio_core::accounts::{Account, AccountIndex};
use ledgerfolio_core::activities::{CashFlow, CashFlowType, Transaction, TransactionType};
use ledgerfolio_core::fx::{CurrencyConverter, CurrencyNormalizer, CurrencyPair, Market, RateTable};
use ledgerfolio_core::ledger::{
    sort_for_display, unify_records, BalanceAccumulator, EntrySubtype, Ledger,
};
use ledgerfolio_core::portfolio::holdings::{HoldingsCalculator, HoldingsValuation};
use ledgerfolio_core::portfolio::summary::{PortfolioSummaryCalculator, SummaryInputs};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Fixtures
// =============================================================================

fn accounts() -> Vec<Account> {
    vec![
        Account::new("A", "Broker", "TWD"),
        Account::new("B", "Bank", "TWD"),
        Account::new("C", "US broker", "USD"),
    ]
}

fn converter() -> CurrencyConverter {
    let mut rates = RateTable::new();
    rates.insert(CurrencyPair::new("USD", "TWD"), Decimal::from(32));
    CurrencyConverter::new(&rates)
}

fn day(offset: i64) -> String {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (start + Duration::days(offset)).format("%Y-%m-%d").to_string()
}

fn net_invested(cash_flows: &[CashFlow]) -> Decimal {
    let accounts = accounts();
    let converter = converter();
    let normalizer = CurrencyNormalizer::new("TWD", &converter);
    let ledger = Ledger::build(&accounts, &[], cash_flows);
    let holdings = HoldingsValuation::default();
    PortfolioSummaryCalculator::new(&normalizer)
        .calculate(&SummaryInputs {
            accounts: &accounts,
            cash_flows,
            ledger: &ledger,
            holdings: &holdings,
            as_of: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        })
        .net_invested
}

// =============================================================================
// Generators
// =============================================================================

fn arb_account_id() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("A"), Just("B"), Just("C"), Just("deleted")]
}

fn arb_flow_type() -> impl Strategy<Value = CashFlowType> {
    prop_oneof![
        Just(CashFlowType::Deposit),
        Just(CashFlowType::Withdraw),
        Just(CashFlowType::Transfer),
        Just(CashFlowType::Interest),
    ]
}

/// Generates a cash flow; transfers get a target account and sometimes a rate.
fn arb_cash_flow() -> impl Strategy<Value = CashFlow> {
    (
        arb_flow_type(),
        arb_account_id(),
        arb_account_id(),
        1i64..200_000,                        // amount
        proptest::option::of(0i64..100),      // fee
        proptest::option::of(1i64..40),       // rate numerator
        0i64..90,                             // day offset
    )
        .prop_map(|(flow_type, account, target, amount, fee, rate, offset)| CashFlow {
            id: String::new(),
            date: day(offset),
            account_id: account.to_string(),
            flow_type,
            amount: Decimal::from(amount),
            fee: fee.map(Decimal::from),
            exchange_rate: rate.map(|r| Decimal::new(r, 1)),
            target_account_id: (flow_type == CashFlowType::Transfer && target != account)
                .then(|| target.to_string()),
            note: None,
        })
}

fn arb_trade_type() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Buy),
        Just(TransactionType::Sell),
        Just(TransactionType::Dividend),
        Just(TransactionType::CashDividend),
    ]
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (
        arb_trade_type(),
        prop_oneof![Just("A"), Just("B")],
        prop_oneof![Just("2330"), Just("0050")],
        1i64..100_000, // price in hundredths
        1i64..500,     // quantity
        0i64..50,      // fees
        0i64..90,
    )
        .prop_map(|(t, account, ticker, price, quantity, fees, offset)| Transaction {
            id: String::new(),
            date: day(offset),
            account_id: account.to_string(),
            ticker: ticker.to_string(),
            market: Market::Tw,
            transaction_type: t,
            price: Decimal::new(price, 2),
            quantity: Decimal::from(quantity),
            fees: Decimal::from(fees),
            amount: None,
            exchange_rate: None,
            note: None,
        })
}

/// Assigns unique numeric ids, transactions first.
fn with_ids(
    mut transactions: Vec<Transaction>,
    mut cash_flows: Vec<CashFlow>,
) -> (Vec<Transaction>, Vec<CashFlow>) {
    for (i, t) in transactions.iter_mut().enumerate() {
        t.id = (i + 1).to_string();
    }
    let offset = transactions.len();
    for (i, f) in cash_flows.iter_mut().enumerate() {
        f.id = (offset + i + 1).to_string();
    }
    (transactions, cash_flows)
}

fn arb_records() -> impl Strategy<Value = (Vec<Transaction>, Vec<CashFlow>)> {
    (
        proptest::collection::vec(arb_transaction(), 0..30),
        proptest::collection::vec(arb_cash_flow(), 0..30),
    )
        .prop_map(|(t, f)| with_ids(t, f))
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Replaying the same records twice yields identical balances.
    #[test]
    fn prop_balance_replay_is_deterministic((transactions, cash_flows) in arb_records()) {
        let accounts = accounts();
        let index = AccountIndex::new(&accounts);
        let entries = unify_records(&accounts, &transactions, &cash_flows).entries;

        let first = BalanceAccumulator::new(&index).replay(&entries, |_| true);
        let second = BalanceAccumulator::new(&index).replay(&entries, |_| true);
        prop_assert_eq!(first, second);
    }

    /// The two sides of a transfer sum to `targetAmount - sourceAmount`.
    #[test]
    fn prop_transfer_sides_are_symmetric((transactions, cash_flows) in arb_records()) {
        let accounts = accounts();
        let ledger = Ledger::build(&accounts, &transactions, &cash_flows);

        for flow in cash_flows.iter().filter(|f| f.is_transfer_with_target()) {
            let source = ledger.entry(&flow.id);
            let target = ledger.entry(&format!("{}-target", flow.id));
            if let (Some(source), Some(target)) = (source, target) {
                prop_assert_eq!(
                    source.entry.cash_effect + target.entry.cash_effect,
                    flow.target_amount() - flow.source_amount()
                );
                if flow.exchange_rate.is_none() && flow.fee.unwrap_or_default().is_zero() {
                    prop_assert_eq!(source.entry.cash_effect + target.entry.cash_effect, Decimal::ZERO);
                }
            }
        }
    }

    /// Adding, dropping or resizing TRANSFER and INTEREST flows never moves
    /// net invested capital.
    #[test]
    fn prop_transfers_and_interest_do_not_change_net_invested(
        (_, cash_flows) in arb_records(),
        extra in proptest::collection::vec(arb_cash_flow(), 0..10),
    ) {
        let baseline = net_invested(&cash_flows);

        let without: Vec<CashFlow> = cash_flows
            .iter()
            .filter(|f| !matches!(f.flow_type, CashFlowType::Transfer | CashFlowType::Interest))
            .cloned()
            .collect();
        prop_assert_eq!(net_invested(&without), baseline);

        let mut with_more = cash_flows.clone();
        for (i, mut flow) in extra.into_iter().enumerate() {
            if !matches!(flow.flow_type, CashFlowType::Transfer | CashFlowType::Interest) {
                continue;
            }
            flow.id = format!("extra-{}", i);
            with_more.push(flow);
        }
        for flow in with_more.iter_mut() {
            if flow.flow_type == CashFlowType::Interest {
                flow.amount += Decimal::ONE;
            }
        }
        prop_assert_eq!(net_invested(&with_more), baseline);
    }

    /// BUYs never decrease quantity, a SELL never changes average cost.
    #[test]
    fn prop_weighted_average_cost_is_monotonic(
        buys in proptest::collection::vec((1i64..100_000, 1i64..500, 0i64..50), 1..15),
        sell_quantity in 1i64..500,
    ) {
        let accounts = accounts();
        let converter = converter();
        let normalizer = CurrencyNormalizer::new("TWD", &converter);
        let calculator = HoldingsCalculator::new(&normalizer);

        let mut transactions = Vec::new();
        let mut last_quantity = Decimal::ZERO;
        for (i, (price, quantity, fees)) in buys.iter().enumerate() {
            transactions.push(Transaction {
                id: (i + 1).to_string(),
                date: day(i as i64),
                account_id: "A".to_string(),
                ticker: "2330".to_string(),
                market: Market::Tw,
                transaction_type: TransactionType::Buy,
                price: Decimal::new(*price, 2),
                quantity: Decimal::from(*quantity),
                fees: Decimal::from(*fees),
                amount: None,
                exchange_rate: None,
                note: None,
            });
            let result = calculator.calculate_positions(&accounts, &transactions);
            let quantity = result.positions[0].quantity;
            prop_assert!(quantity >= last_quantity);
            last_quantity = quantity;
        }

        let before = calculator.calculate_positions(&accounts, &transactions).positions[0].clone();
        transactions.push(Transaction {
            id: "sell".to_string(),
            date: day(buys.len() as i64),
            transaction_type: TransactionType::Sell,
            quantity: Decimal::from(sell_quantity),
            ..transactions[0].clone()
        });
        let after = calculator.calculate_positions(&accounts, &transactions).positions[0].clone();
        prop_assert_eq!(after.average_cost, before.average_cost);
        prop_assert_eq!(after.quantity, before.quantity - Decimal::from(sell_quantity));
    }

    /// Shares bought on a day can be sold that same day, whatever order
    /// the records arrive in.
    #[test]
    fn prop_same_day_sell_draws_on_same_day_buys(
        buys in proptest::collection::vec((1i64..100_000, 1i64..500), 1..8),
        sell_fraction in 1i64..=100,
        sell_first in any::<bool>(),
    ) {
        let accounts = accounts();
        let converter = converter();
        let normalizer = CurrencyNormalizer::new("TWD", &converter);
        let calculator = HoldingsCalculator::new(&normalizer);

        let bought: i64 = buys.iter().map(|(_, quantity)| quantity).sum();
        let sold = (bought * sell_fraction / 100).max(1);
        let mut transactions: Vec<Transaction> = buys
            .iter()
            .enumerate()
            .map(|(i, (price, quantity))| Transaction {
                id: (i + 1).to_string(),
                date: day(0),
                account_id: "A".to_string(),
                ticker: "2330".to_string(),
                market: Market::Tw,
                transaction_type: TransactionType::Buy,
                price: Decimal::new(*price, 2),
                quantity: Decimal::from(*quantity),
                fees: Decimal::ZERO,
                amount: None,
                exchange_rate: None,
                note: None,
            })
            .collect();
        let sell = Transaction {
            id: "0".to_string(),
            transaction_type: TransactionType::Sell,
            quantity: Decimal::from(sold),
            ..transactions[0].clone()
        };
        if sell_first {
            transactions.insert(0, sell);
        } else {
            transactions.push(sell);
        }

        let result = calculator.calculate_positions(&accounts, &transactions);
        prop_assert!(result.warnings.is_empty());
        prop_assert_eq!(result.positions[0].quantity, Decimal::from(bought - sold));
    }

    /// Display order does not depend on input order, and re-sorting an
    /// already sorted list changes nothing.
    #[test]
    fn prop_display_order_is_stable(
        (records, shuffled) in arb_records().prop_flat_map(|(t, f)| {
            let shuffled = (Just(t.clone()).prop_shuffle(), Just(f.clone()).prop_shuffle());
            (Just((t, f)), shuffled)
        })
    ) {
        let accounts = accounts();
        let (transactions, cash_flows) = records;
        let (shuffled_transactions, shuffled_flows) = shuffled;

        let ledger = Ledger::build(&accounts, &transactions, &cash_flows);
        let reordered = Ledger::build(&accounts, &shuffled_transactions, &shuffled_flows);
        let ids = |l: &Ledger| l.entries.iter().map(|e| e.entry.id.clone()).collect::<Vec<_>>();
        prop_assert_eq!(ids(&ledger), ids(&reordered));

        let mut resorted: Vec<_> = ledger.ledger_entries().cloned().collect();
        sort_for_display(&mut resorted);
        let resorted_ids: Vec<String> = resorted.iter().map(|e| e.id.clone()).collect();
        prop_assert_eq!(resorted_ids, ids(&ledger));
    }

    /// Stock dividends move shares, never cash.
    #[test]
    fn prop_stock_dividends_have_no_cash_effect((transactions, cash_flows) in arb_records()) {
        let ledger = Ledger::build(&accounts(), &transactions, &cash_flows);
        for entry in ledger.ledger_entries().filter(|e| e.subtype == EntrySubtype::Dividend) {
            prop_assert_eq!(entry.cash_effect, Decimal::ZERO);
        }
    }
}
