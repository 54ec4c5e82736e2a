use crate::cli::TrimArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use itpkit::core::io::itp::{OpaquePolicy, WriteOptions};
use itpkit::core::models::ids::AtomId;
use itpkit::engine::config::{Normalization, TrimConfig, TrimConfigBuilder};
use serde::Deserialize;
use serde::de::IntoDeserializer;
use serde::de::value::{Error as ValueError, StrDeserializer};
use std::path::Path;
use tracing::debug;

/// One entry of `selection.delete`: a bare id or a selection string such as `"20-22"`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
enum PartialAtomSelector {
    Id(u32),
    List(String),
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSelectionConfig {
    delete: Option<Vec<PartialAtomSelector>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialChargeConfig {
    #[serde(rename = "normalize-over")]
    normalize_over: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    #[serde(rename = "unknown-sections")]
    unknown_sections: Option<OpaquePolicy>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialTrimConfig {
    selection: Option<PartialSelectionConfig>,
    charge: Option<PartialChargeConfig>,
    output: Option<PartialOutputConfig>,
}

impl PartialTrimConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_with_cli(mut self, args: &TrimArgs) -> Result<TrimConfig> {
        self.apply_set_values(&args.set_values)?;

        let selection = self.selection.take().unwrap_or_default();
        let charge = self.charge.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let atoms_to_delete = if !args.delete.is_empty() {
            let mut ids = Vec::new();
            for list in &args.delete {
                ids.extend(
                    parser::parse_id_list(list).map_err(|e| CliError::Argument(e.to_string()))?,
                );
            }
            Some(ids)
        } else {
            selection.delete.map(resolve_selectors).transpose()?
        };

        let normalization = args
            .normalize_over
            .or(charge.normalize_over)
            .map(Normalization::Fixed)
            .unwrap_or_default();

        let opaque_sections = if args.drop_unknown_sections {
            OpaquePolicy::Drop
        } else {
            output.unknown_sections.unwrap_or_default()
        };

        let mut builder = TrimConfigBuilder::new()
            .normalization(normalization)
            .write_options(WriteOptions { opaque_sections });
        if let Some(ids) = atoms_to_delete {
            builder = builder.atoms_to_delete(ids);
        }

        builder.build().map_err(|e| {
            CliError::Config(format!(
                "{}. Select atoms with --delete or `selection.delete`.",
                e
            ))
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "selection.delete" => {
                    parser::parse_id_list(value_str)
                        .map_err(|e| CliError::Config(format!("Invalid value for {}: {}", key, e)))?;
                    self.selection.get_or_insert_with(Default::default).delete =
                        Some(vec![PartialAtomSelector::List(value_str.to_string())]);
                }
                "charge.normalize-over" => {
                    self.charge
                        .get_or_insert_with(Default::default)
                        .normalize_over = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "output.unknown-sections" => {
                    let deserializer: StrDeserializer<'_, ValueError> =
                        value_str.into_deserializer();
                    let policy = OpaquePolicy::deserialize(deserializer).map_err(|_| {
                        CliError::Config(format!(
                            "Invalid value for {}: {}. Expected 'preserve' or 'drop'.",
                            key, value_str
                        ))
                    })?;
                    self.output
                        .get_or_insert_with(Default::default)
                        .unknown_sections = Some(policy);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn resolve_selectors(selectors: Vec<PartialAtomSelector>) -> Result<Vec<AtomId>> {
    let mut ids = Vec::new();
    for selector in selectors {
        match selector {
            PartialAtomSelector::Id(0) => {
                return Err(CliError::Config(
                    "`selection.delete` contains atom id 0; ids start at 1.".to_string(),
                ));
            }
            PartialAtomSelector::Id(id) => ids.push(AtomId::new(id)),
            PartialAtomSelector::List(list) => ids.extend(
                parser::parse_id_list(&list)
                    .map_err(|e| CliError::Config(format!("Invalid `selection.delete`: {}", e)))?,
            ),
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let file_path = dir.path().join("trim.toml");
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn trim_args(extra: &[&str]) -> TrimArgs {
        let mut args = vec!["itpkit", "trim", "-i", "in.itp", "-o", "out.itp"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Trim(args) => args,
            _ => panic!("Expected 'trim' subcommand"),
        }
    }

    fn ids(values: &[u32]) -> Vec<AtomId> {
        values.iter().copied().map(AtomId::new).collect()
    }

    const FULL_CONFIG: &str = r#"
        [selection]
        delete = [15, "20-22"]

        [charge]
        normalize-over = 19

        [output]
        unknown-sections = "drop"
        "#;

    #[test]
    fn test_load_from_file_and_merge() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, FULL_CONFIG);

        let config = PartialTrimConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&trim_args(&[]))
            .unwrap();

        assert_eq!(
            config.atoms_to_delete.into_iter().collect::<Vec<_>>(),
            ids(&[15, 20, 21, 22])
        );
        assert_eq!(config.normalization, Normalization::Fixed(19));
        assert_eq!(config.write.opaque_sections, OpaquePolicy::Drop);
    }

    #[test]
    fn test_defaults_without_config_file() {
        let config = PartialTrimConfig::default()
            .merge_with_cli(&trim_args(&["-d", "3,1"]))
            .unwrap();

        assert_eq!(
            config.atoms_to_delete.into_iter().collect::<Vec<_>>(),
            ids(&[1, 3])
        );
        assert_eq!(config.normalization, Normalization::Survivors);
        assert_eq!(config.write.opaque_sections, OpaquePolicy::Preserve);
    }

    #[test]
    fn test_cli_args_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, FULL_CONFIG);
        let args = trim_args(&["-d", "2", "-d", "4-5", "--normalize-over", "7"]);

        let config = PartialTrimConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(
            config.atoms_to_delete.into_iter().collect::<Vec<_>>(),
            ids(&[2, 4, 5])
        );
        assert_eq!(config.normalization, Normalization::Fixed(7));
    }

    #[test]
    fn test_set_value_overrides_file_but_not_cli() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, FULL_CONFIG);
        let args = trim_args(&[
            "-S",
            "charge.normalize-over=5",
            "-S",
            "output.unknown-sections=preserve",
            "-S",
            "selection.delete=1-2",
            "-d",
            "9",
        ]);

        let config = PartialTrimConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config.normalization, Normalization::Fixed(5));
        assert_eq!(config.write.opaque_sections, OpaquePolicy::Preserve);
        assert_eq!(
            config.atoms_to_delete.into_iter().collect::<Vec<_>>(),
            ids(&[9])
        );
    }

    #[test]
    fn test_set_selection_replaces_file_selection() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, FULL_CONFIG);
        let args = trim_args(&["-S", "selection.delete=1-2"]);

        let config = PartialTrimConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(
            config.atoms_to_delete.into_iter().collect::<Vec<_>>(),
            ids(&[1, 2])
        );
    }

    #[test]
    fn test_drop_flag_wins_over_file() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "[selection]\ndelete = [1]\n[output]\nunknown-sections = \"preserve\"\n",
        );
        let config = PartialTrimConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&trim_args(&["--drop-unknown-sections"]))
            .unwrap();
        assert_eq!(config.write.opaque_sections, OpaquePolicy::Drop);
    }

    #[test]
    fn test_missing_selection_returns_error() {
        let result = PartialTrimConfig::default().merge_with_cli(&trim_args(&[]));
        assert!(matches!(result, Err(CliError::Config(_))));
        if let Err(CliError::Config(msg)) = result {
            assert!(msg.contains("atoms_to_delete"));
        }
    }

    #[test]
    fn test_zero_normalization_is_rejected() {
        let result = PartialTrimConfig::default()
            .merge_with_cli(&trim_args(&["-d", "1", "--normalize-over", "0"]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_unknown_file_key_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "[selection]\nremove = [1]\n");
        let result = PartialTrimConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn test_invalid_set_values_are_rejected() {
        for set in [
            "charge.normalize-over=many",
            "output.unknown-sections=keep",
            "selection.delete=0",
            "nonsense.key=1",
            "no-equals-sign",
        ] {
            let result = PartialTrimConfig::default().merge_with_cli(&trim_args(&["-d", "1", "-S", set]));
            assert!(
                matches!(result, Err(CliError::Config(_))),
                "expected config error for '{}'",
                set
            );
        }
    }

    #[test]
    fn test_invalid_cli_selection_is_an_argument_error() {
        let result = PartialTrimConfig::default().merge_with_cli(&trim_args(&["-d", "5-1"]));
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn test_zero_id_in_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "[selection]\ndelete = [0]\n");
        let result = PartialTrimConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&trim_args(&[]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
