//! Services that talk to the auth API.
//!
//! - `auth` - HTTP client for the account endpoints
//! - `account` - Form-driven flows that combine the client with the store

pub mod account;
pub mod auth;
