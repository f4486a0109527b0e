//! Infrastructure adapters. Implement ports.
//!
//! Provider shim, notification surface, permissions, persistence, console. Map errors to DomainError.

pub mod cli;
pub mod notify;
pub mod permissions;
pub mod persistence;
pub mod provider;
