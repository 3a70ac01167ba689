//! Tests for account domain models.

#[cfg(test)]
mod tests {
    use crate::accounts::{Account, AccountIndex};
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_deserialization_defaults() {
        let account: Account =
            serde_json::from_str(r#"{"id":"a1","name":"Broker","currency":"TWD"}"#).unwrap();
        assert_eq!(account.opening_balance, dec!(0));
        assert!(account.is_active);
    }

    #[test]
    fn test_account_validate_rejects_empty_currency() {
        let account = Account::new("a1", "Broker", " ");
        assert!(account.validate().is_err());
        assert!(Account::new("a1", "Broker", "USD").validate().is_ok());
    }

    #[test]
    fn test_index_lookup_and_opening_balance() {
        let accounts = vec![
            Account::new("a1", "Broker", "TWD").with_opening_balance(dec!(1000)),
            Account::new("a2", "Bank", "USD"),
        ];
        let index = AccountIndex::new(&accounts);

        assert!(index.contains("a1"));
        assert!(!index.contains("deleted"));
        assert_eq!(index.currency_of("a2"), Some("USD"));
        assert_eq!(index.opening_balance("a1"), dec!(1000));
        assert_eq!(index.opening_balance("deleted"), dec!(0));
        assert_eq!(index.accounts().count(), 2);
    }
}
