//! # Account Keeper
//!
//! Owns the `acc` namespace.
//!
//! ## Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `a/<address>` | `Account` |
//! | `n` | next account number (`u64`) |
//! | `p` | `AuthParams` |

use crate::domain::{Account, AuthError, AuthParams};
use shared_types::{Address, Amount, Context, ModuleError, StoreKey};

const ACCOUNT_PREFIX: &[u8] = b"a/";
const NEXT_ACCOUNT_NUMBER: &[u8] = b"n";
const PARAMS: &[u8] = b"p";

fn account_key(addr: &Address) -> Vec<u8> {
    let mut key = ACCOUNT_PREFIX.to_vec();
    key.extend_from_slice(addr.as_bytes());
    key
}

pub struct AccountKeeper {
    key: StoreKey,
}

impl AccountKeeper {
    #[must_use]
    pub fn new(key: StoreKey) -> Self {
        Self { key }
    }

    pub fn params(&self, ctx: &Context<'_>) -> Result<AuthParams, ModuleError> {
        Ok(ctx.get_value(&self.key, PARAMS)?.unwrap_or_default())
    }

    pub fn set_params(&self, ctx: &mut Context<'_>, params: &AuthParams) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, PARAMS, params)
    }

    pub fn get_account(&self, ctx: &Context<'_>, addr: &Address) -> Result<Option<Account>, ModuleError> {
        ctx.get_value(&self.key, &account_key(addr))
    }

    pub fn has_account(&self, ctx: &Context<'_>, addr: &Address) -> Result<bool, ModuleError> {
        ctx.has(&self.key, &account_key(addr))
    }

    pub fn set_account(&self, ctx: &mut Context<'_>, account: &Account) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, &account_key(&account.address), account)
    }

    /// All accounts in address order.
    pub fn accounts(&self, ctx: &Context<'_>) -> Result<Vec<Account>, ModuleError> {
        Ok(ctx
            .iter_values::<Account>(&self.key, ACCOUNT_PREFIX)?
            .into_iter()
            .map(|(_, account)| account)
            .collect())
    }

    pub fn next_account_number(&self, ctx: &mut Context<'_>) -> Result<u64, ModuleError> {
        let number: u64 = ctx
            .get_value(&self.key, NEXT_ACCOUNT_NUMBER)?
            .unwrap_or_default();
        ctx.set_value(&self.key, NEXT_ACCOUNT_NUMBER, &(number + 1))?;
        Ok(number)
    }

    pub(crate) fn set_next_account_number(
        &self,
        ctx: &mut Context<'_>,
        number: u64,
    ) -> Result<(), ModuleError> {
        ctx.set_value(&self.key, NEXT_ACCOUNT_NUMBER, &number)
    }

    /// Create and store a fresh account for `addr`.
    pub fn new_account(&self, ctx: &mut Context<'_>, addr: &Address) -> Result<Account, ModuleError> {
        let account = Account::new(*addr, self.next_account_number(ctx)?);
        self.set_account(ctx, &account)?;
        Ok(account)
    }

    pub fn get_or_create_account(
        &self,
        ctx: &mut Context<'_>,
        addr: &Address,
    ) -> Result<Account, ModuleError> {
        match self.get_account(ctx, addr)? {
            Some(account) => Ok(account),
            None => self.new_account(ctx, addr),
        }
    }

    /// Balance of `addr`; zero for unknown accounts.
    pub fn balance(&self, ctx: &Context<'_>, addr: &Address) -> Result<Amount, ModuleError> {
        Ok(self
            .get_account(ctx, addr)?
            .map_or(0, |account| account.balance))
    }

    /// Credit `amount`, creating the account if needed.
    pub fn add_balance(
        &self,
        ctx: &mut Context<'_>,
        addr: &Address,
        amount: Amount,
    ) -> Result<(), ModuleError> {
        let mut account = self.get_or_create_account(ctx, addr)?;
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(AuthError::BalanceOverflow(*addr))?;
        self.set_account(ctx, &account)
    }

    pub fn sub_balance(
        &self,
        ctx: &mut Context<'_>,
        addr: &Address,
        amount: Amount,
    ) -> Result<(), ModuleError> {
        let mut account = self.get_account(ctx, addr)?.ok_or(AuthError::InsufficientFunds {
            address: *addr,
            available: 0,
            required: amount,
        })?;
        account.balance = account
            .balance
            .checked_sub(amount)
            .ok_or(AuthError::InsufficientFunds {
                address: *addr,
                available: account.balance,
                required: amount,
            })?;
        self.set_account(ctx, &account)
    }

    /// Move `amount` between two accounts. The recipient is created if missing.
    pub fn transfer(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), ModuleError> {
        self.sub_balance(ctx, from, amount)?;
        self.add_balance(ctx, to, amount)
    }

    pub fn increment_sequence(&self, ctx: &mut Context<'_>, addr: &Address) -> Result<(), ModuleError> {
        let mut account = self
            .get_account(ctx, addr)?
            .ok_or(AuthError::UnknownAccount(*addr))?;
        account.sequence += 1;
        self.set_account(ctx, &account)
    }
}
