//! Provides input/output functionality for topology file formats.
//!
//! The [`traits::TopologyFile`] trait is the common reading and writing
//! interface; [`itp`] implements it for GROMACS include-topology files.
//! [`staging`] prepares the temporary files behind atomic writes.

pub mod itp;
pub mod staging;
pub mod traits;
