//! I/O helpers for assist commands.

pub mod env;
pub mod hook;
pub mod host;
pub mod process;
pub mod scaffold;
