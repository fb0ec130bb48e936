//! Centralized settings and repository checks for jade-ecosystem-assist.
//!
//! - **[`settings`]**: resolves the process-wide [`settings::Settings`] from
//!   environment overrides and host-derived defaults.
//! - **[`core`]**: pure logic (value coercion, frontmatter parsing).
//! - **[`io`]**: side-effecting helpers (environment, host paths, child
//!   processes, hook and scaffold checks).
//!
//! [`render`] formats settings for the `jade-assist settings` command.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod render;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
