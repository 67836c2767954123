//! Type definitions for salesboard

mod aggregate;
pub mod dates;
mod error;
mod record;
mod task;

pub use aggregate::*;
pub use error::*;
pub use record::*;
pub use task::*;
