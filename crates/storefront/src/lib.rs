//! Fudsiti storefront library.
//!
//! Client-side state for the marketplace: cart, orders and session held in
//! a [`store::Store`], persisted to a snapshot backend, plus an async client
//! for the auth API.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod persistence;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
