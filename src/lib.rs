//! Engine for splitting shared expenses and settling the resulting debts.
//!
//! This crate is the calculation core of a bill-splitting app: views and
//! backend sync live elsewhere and hand records in and out. It computes
//! each participant's share under the four allocation strategies, nets
//! those shares against recorded settlement payments and suggests the
//! money exchanges that settle a whole group. A small currency helper
//! converts amounts against a fetched rate snapshot, and a receipt parser
//! turns scanned text into item candidates for a by-item split.
//!
//! Everything is a pure function over plain records: no I/O, no internal
//! state, no concurrency concerns.

pub mod calculator;
pub mod currency;
pub mod error;
pub mod receipt;
pub mod settlement;
pub mod types;
pub mod validator;

pub use error::SplitError;
pub use types::{
    Amount, Expense, ExchangeRates, Item, MoneyExchange, NetBalance, Participant, Settlement,
    Split,
};
pub use validator::ValidationPolicy;
