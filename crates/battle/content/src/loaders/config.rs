//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing tables and keys fall back to their defaults, so an empty file
    /// yields [`BattleConfig::default`].
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from a TOML string.
    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{ActionKind, ValidationLevel};

    #[test]
    fn empty_document_is_default() {
        assert_eq!(ConfigLoader::parse("").unwrap(), BattleConfig::default());
    }

    #[test]
    fn partial_tables_override_only_named_keys() {
        let config = ConfigLoader::parse(
            r#"
            max_ticks = 42

            [decision]
            surround_threshold = 2
            fallback_action = "dodge"

            [execution]
            validation_level = "paranoid"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_ticks, 42);
        assert_eq!(config.decision.surround_threshold, 2);
        assert_eq!(config.decision.surround_sectors, 4);
        assert_eq!(config.decision.fallback_action, ActionKind::Dodge);
        assert_eq!(config.execution.validation_level, ValidationLevel::Paranoid);
        assert_eq!(config.execution.retreat_speed_multiplier, 1.5);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = ConfigLoader::parse("[decision]\nfallback_action = \"teleport\"").unwrap_err();
        assert!(err.to_string().contains("config TOML"));
    }
}
