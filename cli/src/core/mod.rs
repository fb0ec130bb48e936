//! Pure logic shared by the assist commands.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod coerce;
pub mod frontmatter;
