//! Testing utilities and mock implementations
//!
//! Provides an in-memory backend so the registry and facade can be
//! exercised without a real logging, error reporting or metrics service.

pub mod mocks;

pub use mocks::*;
