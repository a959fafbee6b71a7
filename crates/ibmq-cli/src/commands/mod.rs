//! CLI command implementations.

pub mod account;
pub mod backends;
pub mod common;
pub mod inspect;
pub mod run;
pub mod version;
