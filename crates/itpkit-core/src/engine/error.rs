use super::config::ConfigError;
use crate::core::io::itp::ItpError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Normalization count must be greater than zero")]
    ZeroNormalization,

    #[error("Topology has no [ atoms ] section to delete from")]
    MissingAtoms,

    #[error("Failed to read topology '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ItpError,
    },

    #[error("Failed to write topology '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: ItpError,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
