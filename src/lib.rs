//! This crate contains [NumTable], a hash table for integer keys whose traversal is driven by
//! a visitor that can stop early, and the [capi] module, which exposes a few table scenarios
//! as named entry points for a spec harness.

mod raw;

pub mod capi;
pub mod num_table;

pub use num_table::{Flow, NumTable, TryReserveError};
