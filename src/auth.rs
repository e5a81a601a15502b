//! Auth-domain secret wrapper and access token model.

pub mod secret;
pub mod token;

pub use secret::*;
pub use token::*;
