use serde::{Deserialize, Serialize};

/// Auth parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParams {
    pub max_memo_characters: u64,
    pub tx_size_cost_per_byte: u64,
}

impl Default for AuthParams {
    fn default() -> Self {
        Self {
            max_memo_characters: 256,
            tx_size_cost_per_byte: 10,
        }
    }
}

impl AuthParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_memo_characters == 0 {
            return Err("max_memo_characters must be positive".to_string());
        }
        if self.tx_size_cost_per_byte == 0 {
            return Err("tx_size_cost_per_byte must be positive".to_string());
        }
        Ok(())
    }
}
