//! Belgian self-employed tax estimator: VAT, social contributions and income
//! tax from a period's transactions and the owner's profile.

pub mod api;
pub mod cmd;
pub mod config;
pub mod core;
pub mod store;
pub mod tax;
