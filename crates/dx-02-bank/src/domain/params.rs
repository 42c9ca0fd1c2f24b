use crate::domain::BankError;
use serde::{Deserialize, Serialize};

/// Bank parameters. Fees are signed; negative values decode and then fail
/// [`BankParams::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankParams {
    pub activation_fee: i64,
    pub lock_coins_fee: i64,
    pub send_enabled: bool,
}

impl Default for BankParams {
    fn default() -> Self {
        Self {
            activation_fee: 100_000_000,
            lock_coins_fee: 1_000_000,
            send_enabled: true,
        }
    }
}

impl BankParams {
    pub fn validate(&self) -> Result<(), BankError> {
        if self.activation_fee < 0 {
            return Err(BankError::InvalidActivationFee(self.activation_fee));
        }
        if self.lock_coins_fee < 0 {
            return Err(BankError::InvalidLockCoinsFee(self.lock_coins_fee));
        }
        Ok(())
    }

    /// Activation fee as an amount. Negative values count as zero.
    pub fn activation_fee_amount(&self) -> u128 {
        u128::try_from(self.activation_fee).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_fees_are_invalid() {
        let mut params = BankParams::default();
        assert!(params.validate().is_ok());

        params.lock_coins_fee = -1;
        assert_eq!(params.validate(), Err(BankError::InvalidLockCoinsFee(-1)));

        params.activation_fee = -5;
        assert_eq!(params.validate(), Err(BankError::InvalidActivationFee(-5)));
        assert_eq!(params.activation_fee_amount(), 0);
    }
}
