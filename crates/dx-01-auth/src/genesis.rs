//! Auth genesis state.

use crate::domain::{Account, AuthParams};
use crate::keeper::AccountKeeper;
use serde::{Deserialize, Serialize};
use shared_types::{Context, ModuleError};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGenesis {
    pub params: AuthParams,
    pub accounts: Vec<Account>,
}

impl AuthGenesis {
    pub fn validate(&self) -> Result<(), String> {
        self.params.validate()?;

        let mut addresses = BTreeSet::new();
        let mut numbers = BTreeSet::new();
        for account in &self.accounts {
            if !addresses.insert(account.address) {
                return Err(format!("duplicate account {}", account.address));
            }
            if !numbers.insert(account.account_number) {
                return Err(format!(
                    "duplicate account number {}",
                    account.account_number
                ));
            }
        }
        Ok(())
    }
}

pub fn init_genesis(
    keeper: &AccountKeeper,
    ctx: &mut Context<'_>,
    genesis: &AuthGenesis,
) -> Result<(), ModuleError> {
    keeper.set_params(ctx, &genesis.params)?;
    for account in &genesis.accounts {
        keeper.set_account(ctx, account)?;
    }

    let next = genesis
        .accounts
        .iter()
        .map(|a| a.account_number + 1)
        .max()
        .unwrap_or(0);
    keeper.set_next_account_number(ctx, next)
}

pub fn export_genesis(keeper: &AccountKeeper, ctx: &Context<'_>) -> Result<AuthGenesis, ModuleError> {
    Ok(AuthGenesis {
        params: keeper.params(ctx)?,
        accounts: keeper.accounts(ctx)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::tests::{ctx, setup};
    use shared_types::Address;

    #[test]
    fn test_duplicate_accounts_are_invalid() {
        let account = Account::new(Address::new([1; 20]), 0);
        let genesis = AuthGenesis {
            params: AuthParams::default(),
            accounts: vec![account.clone(), Account::new(Address::new([2; 20]), 0)],
        };
        assert!(genesis.validate().unwrap_err().contains("account number"));

        let genesis = AuthGenesis {
            params: AuthParams::default(),
            accounts: vec![account.clone(), account],
        };
        assert!(genesis.validate().unwrap_err().contains("duplicate account"));
    }

    #[test]
    fn test_import_then_export_is_identity() {
        let (keeper, mut cache) = setup();
        let mut ctx = ctx(&mut cache);
        let genesis = AuthGenesis {
            params: AuthParams::default(),
            accounts: vec![
                Account::new(Address::new([9; 20]), 4).with_balance(10),
                Account::new(Address::new([1; 20]), 7).with_balance(20),
            ],
        };

        init_genesis(&keeper, &mut ctx, &genesis).unwrap();
        let exported = export_genesis(&keeper, &ctx).unwrap();

        // Export is address ordered.
        assert_eq!(exported.accounts[0].address, Address::new([1; 20]));
        assert_eq!(exported.accounts.len(), 2);
        assert_eq!(keeper.next_account_number(&mut ctx).unwrap(), 8);
    }
}
