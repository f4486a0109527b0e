//! Cross-cutting helpers shared by adapters, use cases and the binary.

pub mod config;
