//! # Engine Module
//!
//! The editing layer of itpkit. It takes a decoded [`MoleculeTopology`] and
//! applies structural edits to it while keeping the topology self-consistent.
//!
//! - **Transform** ([`transform`]) - Atom deletion, contiguous renumbering,
//!   bonded-term filtering, and charge redistribution.
//! - **Configuration** ([`config`]) - What to delete and how to redistribute charge.
//! - **Error Handling** ([`error`]) - Engine-specific error types.
//!
//! [`MoleculeTopology`]: crate::core::models::system::MoleculeTopology

pub mod config;
pub mod error;
pub mod transform;
