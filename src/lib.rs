//! pkgcheck - consumer-side installability checks for C and C++ packages
//!
//! This crate provides the library functionality behind the `pkgcheck` CLI:
//! settings declaration, runtime artifact staging, CMake example builds and
//! the smoke test that runs the result.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for pkgcheck unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{copy_rule::CopyRule, settings::Settings};
pub use ops::verify::{verify, Verifier, VerifyOptions, VerifyResult};
pub use util::errors::VerifyError;
