//! Test data factories and the stub embedding provider

mod fixtures;

pub use fixtures::{observation, StubProvider};
