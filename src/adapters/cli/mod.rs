//! Console front-end.

pub mod console;

pub use console::{ConsoleCommand, ConsoleInputPort, parse_line};
