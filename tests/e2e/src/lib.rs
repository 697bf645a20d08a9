//! End-to-end test support for mnemo-core
//!
//! Shared harness and fixtures for the scenario tests. Each test gets
//! an isolated temp-dir database with a deterministic stub embedding
//! provider, so runs never download a model and never interfere.

pub mod harness;
pub mod mocks;

pub use harness::TestDb;
pub use mocks::{observation, StubProvider};
