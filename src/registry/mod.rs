//! Path registry - the durable path table and its transactions.
//!
//! - [`record`]: [`PathRecord`], one persisted row
//! - [`store`]: [`PathRegistry`] and the buffered [`Transaction`]

mod record;
mod store;

pub use record::PathRecord;
pub use store::{Op, PathRegistry, Transaction};
