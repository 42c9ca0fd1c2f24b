//! # Staking Genesis
//!
//! A fresh genesis (`exported = false`) computes the initial validator set
//! from the imported validators. An exported genesis carries the last
//! applied validator powers and replays them verbatim, so the consensus set
//! survives an export/import cycle unchanged.

use crate::domain::{Delegation, LastValidatorPower, StakingParams, Validator};
use crate::keeper::{validate_pub_key, StakingKeeper};
use crate::{BONDED_POOL, NOT_BONDED_POOL};
use serde::{Deserialize, Serialize};
use shared_types::{Context, ModuleError, ValidatorUpdate};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingGenesis {
    pub params: StakingParams,
    #[serde(default)]
    pub last_total_power: u64,
    #[serde(default)]
    pub last_validator_powers: Vec<LastValidatorPower>,
    #[serde(default)]
    pub validators: Vec<Validator>,
    #[serde(default)]
    pub delegations: Vec<Delegation>,
    #[serde(default)]
    pub exported: bool,
}

impl StakingGenesis {
    pub fn validate(&self) -> Result<(), String> {
        self.params.validate()?;

        let mut operators = BTreeSet::new();
        let mut pub_keys = BTreeSet::new();
        for validator in &self.validators {
            if !operators.insert(validator.operator) {
                return Err(format!("duplicate validator {}", validator.operator));
            }
            if !pub_keys.insert(validator.pub_key.as_str()) {
                return Err(format!("duplicate consensus key {}", validator.pub_key));
            }
            validate_pub_key(&validator.pub_key).map_err(|e| e.to_string())?;
            if validator.delegator_shares == 0 && validator.tokens > 0 {
                return Err(format!(
                    "validator {} has tokens but no delegator shares",
                    validator.operator
                ));
            }
        }

        for delegation in &self.delegations {
            if !operators.contains(&delegation.validator) {
                return Err(format!(
                    "delegation from {} to unknown validator {}",
                    delegation.delegator, delegation.validator
                ));
            }
        }

        for power in &self.last_validator_powers {
            if !operators.contains(&power.address) {
                return Err(format!("last power recorded for unknown validator {}", power.address));
            }
        }
        Ok(())
    }
}

pub fn init_genesis(
    keeper: &StakingKeeper,
    ctx: &mut Context<'_>,
    genesis: &StakingGenesis,
) -> Result<Vec<ValidatorUpdate>, ModuleError> {
    keeper.set_params(ctx, &genesis.params)?;
    keeper.set_last_total_power(ctx, genesis.last_total_power)?;

    // Pools exist from genesis on, even when empty.
    keeper.supply().get_module_account(ctx, BONDED_POOL)?;
    keeper.supply().get_module_account(ctx, NOT_BONDED_POOL)?;

    for validator in &genesis.validators {
        keeper.set_validator(ctx, validator)?;
        keeper.set_pub_key_index(ctx, validator)?;
    }
    for delegation in &genesis.delegations {
        keeper.set_delegation(ctx, delegation)?;
    }

    if !genesis.exported {
        return keeper.apply_and_return_validator_set_updates(ctx);
    }

    let mut updates = Vec::with_capacity(genesis.last_validator_powers.len());
    for power in &genesis.last_validator_powers {
        keeper.set_last_validator_power(ctx, power)?;
        if let Some(validator) = keeper.validator(ctx, &power.address)? {
            updates.push(ValidatorUpdate::new(validator.pub_key, power.power));
        }
    }
    Ok(updates)
}

pub fn export_genesis(keeper: &StakingKeeper, ctx: &Context<'_>) -> Result<StakingGenesis, ModuleError> {
    Ok(StakingGenesis {
        params: keeper.params(ctx)?,
        last_total_power: keeper.last_total_power(ctx)?,
        last_validator_powers: keeper.last_validator_powers(ctx)?,
        validators: keeper.validators(ctx)?,
        delegations: keeper.delegations(ctx)?,
        exported: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::tests::{ctx, fund, min_self, setup};
    use shared_types::Address;

    #[test]
    fn test_validation_rejects_dangling_delegation() {
        let mut genesis = StakingGenesis::default();
        assert!(genesis.validate().is_ok());

        genesis.delegations.push(Delegation {
            delegator: Address::new([1; 20]),
            validator: Address::new([2; 20]),
            shares: 10,
        });
        assert!(genesis.validate().unwrap_err().contains("unknown validator"));
    }

    #[test]
    fn test_export_then_import_replays_last_powers() {
        let (keeper, mut cache) = setup();
        let mut first = ctx(&mut cache);
        let op = Address::new([1; 20]);
        fund(&keeper, &mut first, &op, min_self());
        keeper
            .create_validator(&mut first, &op, "aa", "", min_self())
            .unwrap();
        let applied = keeper.apply_and_return_validator_set_updates(&mut first).unwrap();

        let exported = export_genesis(&keeper, &first).unwrap();
        assert!(exported.exported);
        assert_eq!(exported.validators.len(), 1);
        assert!(exported.validate().is_ok());

        let (fresh, mut fresh_cache) = setup();
        let mut second = ctx(&mut fresh_cache);
        let replayed = init_genesis(&fresh, &mut second, &exported).unwrap();
        assert_eq!(replayed, applied);
        assert_eq!(export_genesis(&fresh, &second).unwrap(), exported);
    }
}
