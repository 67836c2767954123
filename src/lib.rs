//! salesboard: monitor sourcing tasks on a remote task service and chart
//! their transaction data in the terminal.

pub mod cli;
pub mod services;
pub mod tui;
pub mod types;
