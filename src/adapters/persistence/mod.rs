//! Durable storage adapters for the reminder store.

pub mod reminders_json;

pub use reminders_json::RemindersJson;
