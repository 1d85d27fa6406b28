//! Object model: reflection, handles, values and the type registry.

pub use stowage_core::*;
