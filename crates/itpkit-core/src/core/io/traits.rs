use crate::core::models::system::MoleculeTopology;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing topology file formats.
///
/// Readers are lenient and describe what they ignored through
/// [`TopologyFile::Report`]; writers take format-specific options.
pub trait TopologyFile {
    /// Diagnostics produced while reading.
    type Report;

    /// Options controlling serialization.
    type Options: Default;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a topology from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails.
    fn read_from(reader: &mut impl BufRead)
    -> Result<(MoleculeTopology, Self::Report), Self::Error>;

    /// Writes a topology to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(
        topology: &MoleculeTopology,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes a topology to a writer with default options.
    fn write_topology_to(
        topology: &MoleculeTopology,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        Self::write_to(topology, &Self::Options::default(), writer)
    }

    /// Reads a topology from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<(MoleculeTopology, Self::Report), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a topology to a file path, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        topology: &MoleculeTopology,
        options: &Self::Options,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(topology, options, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
