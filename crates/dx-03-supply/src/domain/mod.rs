pub mod errors;
pub mod permissions;

pub use errors::SupplyError;
pub use permissions::{Capability, PermissionTable};
