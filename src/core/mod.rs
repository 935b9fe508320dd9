//! Core data structures for pkgcheck.
//!
//! - Settings describing a binary-compatible build configuration
//! - The artifact copy-rule table

pub mod copy_rule;
pub mod settings;

pub use copy_rule::{default_rules, CopyRule, Platform};
pub use settings::{is_cross_building, Settings, SettingsOverrides};
