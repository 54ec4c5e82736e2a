use crate::core::io::itp::WriteOptions;
use crate::core::models::ids::AtomId;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// How the divisor for charge redistribution is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Divide by the number of atoms that survive the deletion.
    #[default]
    Survivors,
    /// Divide by a caller-chosen count, regardless of how many atoms remain.
    Fixed(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrimConfig {
    pub atoms_to_delete: BTreeSet<AtomId>,
    pub normalization: Normalization,
    pub write: WriteOptions,
}

#[derive(Default)]
pub struct TrimConfigBuilder {
    atoms_to_delete: Option<BTreeSet<AtomId>>,
    normalization: Option<Normalization>,
    write: Option<WriteOptions>,
}

impl TrimConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atoms_to_delete<I: IntoIterator<Item = AtomId>>(mut self, ids: I) -> Self {
        self.atoms_to_delete = Some(ids.into_iter().collect());
        self
    }
    pub fn normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = Some(normalization);
        self
    }
    pub fn write_options(mut self, options: WriteOptions) -> Self {
        self.write = Some(options);
        self
    }

    pub fn build(self) -> Result<TrimConfig, ConfigError> {
        let atoms_to_delete = self
            .atoms_to_delete
            .ok_or(ConfigError::MissingParameter("atoms_to_delete"))?;
        let normalization = self.normalization.unwrap_or_default();
        if normalization == Normalization::Fixed(0) {
            return Err(ConfigError::InvalidParameter {
                name: "normalization",
                reason: "a fixed normalization count must be greater than zero".to_string(),
            });
        }
        Ok(TrimConfig {
            atoms_to_delete,
            normalization,
            write: self.write.unwrap_or_default(),
        })
    }
}
