//! # itpkit Core Library
//!
//! Reading, editing, and writing GROMACS include-topology (`.itp`) files.
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** The typed topology model (`MoleculeTopology`,
//!   `AtomTable`, `BondedTerm`) and the lenient ITP reader and fixed-width writer.
//!
//! - **[`engine`]: The Logic Core.** Edits applied to a decoded topology, such as
//!   deleting atoms while renumbering references and redistributing charge.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures that read a file,
//!   transform it, and write the result atomically.

pub mod core;
pub mod engine;
pub mod workflows;
