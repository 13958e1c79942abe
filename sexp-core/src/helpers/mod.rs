//! Low-level building blocks of the reifiers.

pub mod classify;
pub mod coerce;
pub mod fill;
pub mod shape;
