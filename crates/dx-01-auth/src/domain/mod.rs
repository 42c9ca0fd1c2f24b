pub mod account;
pub mod errors;
pub mod params;

pub use account::Account;
pub use errors::AuthError;
pub use params::AuthParams;
