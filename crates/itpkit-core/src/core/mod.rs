//! # Core Module
//!
//! Stateless building blocks: the typed topology model and the file formats
//! that read and write it.
//!
//! - **Topology Representation** ([`models`]) - Atoms, bonded terms, and section containers
//! - **File I/O** ([`io`]) - The ITP reader and writer

pub mod io;
pub mod models;
