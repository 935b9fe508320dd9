//! High-level operations

pub mod verify;
