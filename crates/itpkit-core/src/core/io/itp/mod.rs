//! The ITP (include topology) format.
//!
//! Reading runs the [`lexer`] over the whole file and hands each section to
//! the [`decode`] functions. Writing renders sections through [`encode`] into
//! a temporary file next to the destination, which replaces the destination
//! only once everything was written.

pub mod decode;
pub mod encode;
pub mod lexer;
pub mod report;

pub use encode::{OpaquePolicy, WriteOptions};
pub use report::{IgnoredColumns, ParseReport, SkipReason, SkippedLine};

use crate::core::io::staging;
use crate::core::io::traits::TopologyFile;
use crate::core::models::system::MoleculeTopology;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ItpError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to replace '{path}': {source}", path = path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct ItpFile;

impl TopologyFile for ItpFile {
    type Report = ParseReport;
    type Options = WriteOptions;
    type Error = ItpError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MoleculeTopology, Self::Report), Self::Error> {
        let lines = reader.lines().collect::<Result<Vec<String>, io::Error>>()?;
        let classified = lexer::classify(&lines);

        let mut report = ParseReport::new();
        let topology = decode::decode_topology(&classified, &mut report);
        debug!(
            lines = lines.len(),
            sections = topology.sections().len(),
            skipped = report.total_skipped(),
            "Read topology."
        );
        Ok((topology, report))
    }

    fn write_to(
        topology: &MoleculeTopology,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        encode::write_topology(writer, topology, options)?;
        Ok(())
    }

    fn write_to_path<P: AsRef<Path>>(
        topology: &MoleculeTopology,
        options: &Self::Options,
        path: P,
    ) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let temp = staging::staging_file(path)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            Self::write_to(topology, options, &mut writer)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| ItpError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        debug!(path = %path.display(), "Wrote topology.");
        Ok(())
    }
}
