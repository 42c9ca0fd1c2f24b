use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{Address, Amount};

/// A user or module account.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: Amount,
    pub account_number: u64,
    pub sequence: u64,
    /// Set for module accounts.
    #[serde(default)]
    pub module_name: Option<String>,
}

impl Account {
    pub fn new(address: Address, account_number: u64) -> Self {
        Self {
            address,
            balance: 0,
            account_number,
            sequence: 0,
            module_name: None,
        }
    }

    #[must_use]
    pub fn with_balance(mut self, balance: Amount) -> Self {
        self.balance = balance;
        self
    }

    pub fn is_module_account(&self) -> bool {
        self.module_name.is_some()
    }
}
