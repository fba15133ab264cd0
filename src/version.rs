//! testmynb version information.
//!
//! The version appears in the report banner, the executor's dialect name and `--version`, and all of them read it
//! from this one constant.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.

/// The testmynb version string (for example, `0.1.0`).
pub const TESTMYNB_VERSION: &str = env!("CARGO_PKG_VERSION");
