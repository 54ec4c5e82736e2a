//! # Workflows Module
//!
//! Top-level entry points that tie file I/O and the engine together.
//!
//! - **Trim Workflow** ([`trim`]) - Delete atoms from an ITP file, renumber the
//!   remainder, redistribute the removed charge, and write the result.

pub mod trim;
