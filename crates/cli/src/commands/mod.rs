//! Subcommand implementations.

pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod state;
