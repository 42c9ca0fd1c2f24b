pub mod errors;
pub mod msgs;
pub mod params;

pub use errors::BankError;
pub use msgs::MsgSend;
pub use params::BankParams;
