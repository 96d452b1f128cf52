//! Credentials, bearer-token secrets, and token lifecycle models.

pub mod credentials;
pub mod secret;
pub mod token;

pub use credentials::*;
pub use secret::*;
pub use token::*;
