//! # Topology Models
//!
//! Typed records for one molecule definition of a GROMACS-style topology.
//!
//! - [`ids`] - The [`AtomId`](ids::AtomId) newtype used by atoms and bonded terms
//! - [`atom`] - `[ atoms ]` records and the id-indexed [`AtomTable`](atom::AtomTable)
//! - [`schema`] - Column schema and per-column parse policy for `[ atoms ]`
//! - [`topology`] - Bonds, pairs, angles and dihedrals
//! - [`system`] - The section list of a whole molecule definition

pub mod atom;
pub mod ids;
pub mod schema;
pub mod system;
pub mod topology;
