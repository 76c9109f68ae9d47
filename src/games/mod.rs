//! Game implementations.

pub mod codenames;
