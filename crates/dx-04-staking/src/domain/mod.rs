pub mod errors;
pub mod msgs;
pub mod params;
pub mod validator;

pub use errors::StakingError;
pub use msgs::{MsgCreateValidator, MsgDelegate};
pub use params::StakingParams;
pub use validator::{BondStatus, Delegation, LastValidatorPower, Validator};
