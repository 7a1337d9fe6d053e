//! Game implementations.

pub mod laser;
