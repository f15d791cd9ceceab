//! Core types, the store abstraction and the reviewer queue policy engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::ReviewStore`]; everything else in the
//! workspace builds on the policy engine in [`policy`] and the lifecycle
//! operations in [`workflow`].

// Native `async fn`-style methods in traits, with explicit `Send` futures.
#![allow(async_fn_in_trait)]

pub mod document;
pub mod error;
pub mod person;
pub mod policy;
pub mod review;
pub mod reviewer;
pub mod store;
pub mod team;
pub mod workflow;

pub use error::{Error, Result};
