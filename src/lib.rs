//! Hearth - household budget tracking
//!
//! Households record expenses against categories, plan budgets that split a
//! total across those categories, and track spending progress against them.
//!
//! # Architecture
//!
//! - `models`: plain records (categories, expenses, budgets, allocations)
//! - `storage`: the document store abstraction with in-memory and JSON-file
//!   backends
//! - `services`: allocation strategies, spending aggregation, progress
//!   calculation and the stateful category/expense/budget services
//! - `auth`: identity provider for the expense spender
//! - `audit`: append-only log of every mutation
//! - `config`: paths and persisted settings
//! - `display`, `export`, `cli`: the command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use hearth::models::HouseholdId;
//! use hearth::services::CategoryService;
//! use hearth::storage::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let categories = CategoryService::new(&store, HouseholdId::new());
//! categories.seed_defaults()?;
//! ```

pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{ErrorKind, HearthError, HearthResult};
