//! Loading of drop configuration manifests.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use item_drop_core::{
    DropConfig, DropLimit, DropWeightEntry, ItemDefinition, ItemTypeId, Side,
    DEFAULT_SCORE_INTERVAL, DEFAULT_TIME_INTERVAL_SECS,
};
use tracing::info;

/// Reads the configuration at `path`, or falls back to the built-in catalog.
pub(crate) fn load(path: Option<&Path>) -> Result<DropConfig> {
    let Some(path) = path else {
        info!(target: "item_drop::config", "using built-in drop configuration");
        return Ok(builtin());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read drop config {}", path.display()))?;
    let config =
        parse(&contents).with_context(|| format!("invalid drop config {}", path.display()))?;
    info!(
        target: "item_drop::config",
        path = %path.display(),
        items = config.items.len(),
        "drop configuration loaded"
    );
    Ok(config)
}

/// Parses and validates a TOML drop configuration.
pub(crate) fn parse(contents: &str) -> Result<DropConfig> {
    let config: DropConfig =
        toml::from_str(contents).context("failed to parse drop config toml")?;
    config.validate().context("drop config failed validation")?;
    Ok(config)
}

/// Catalog used when no manifest is supplied.
pub(crate) fn builtin() -> DropConfig {
    DropConfig {
        time_interval_secs: DEFAULT_TIME_INTERVAL_SECS,
        score_interval: DEFAULT_SCORE_INTERVAL,
        drop_side: Side::Player,
        items: vec![
            ItemDefinition::new("attack", "items/attack_up", DropLimit::Limited(3)),
            ItemDefinition::new("speed", "items/speed_up", DropLimit::Unlimited),
            ItemDefinition::new("shield", "items/shield", DropLimit::Limited(1)),
        ],
        time_weights: vec![
            DropWeightEntry::new(ItemTypeId::new(0), 0.3),
            DropWeightEntry::new(ItemTypeId::new(1), 0.6),
            DropWeightEntry::new(ItemTypeId::new(2), 0.1),
        ],
        score_weights: vec![
            DropWeightEntry::new(ItemTypeId::new(0), 0.5),
            DropWeightEntry::new(ItemTypeId::new(2), 0.5),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../config/drops.toml");

    #[test]
    fn sample_manifest_parses() {
        let config = parse(SAMPLE).expect("sample config is valid");
        assert_eq!(config.items.len(), 3);
        assert_eq!(config.items[0].drop_limit(), DropLimit::Limited(3));
        assert_eq!(config.items[1].drop_limit(), DropLimit::Unlimited);
        assert_eq!(config.score_interval, 500);
        assert_eq!(config.time_weights.len(), 3);
    }

    #[test]
    fn builtin_catalog_is_valid() {
        builtin().validate().expect("built-in config validates");
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let config = parse(
            r#"
            [[items]]
            name = "speed"
            template = "items/speed_up"

            [[time_weights]]
            item = 0
            weight = 1.0
            "#,
        )
        .expect("minimal config is valid");

        assert_eq!(config.time_interval_secs, DEFAULT_TIME_INTERVAL_SECS);
        assert_eq!(config.score_interval, DEFAULT_SCORE_INTERVAL);
        assert_eq!(config.drop_side, Side::Player);
        assert_eq!(config.items[0].drop_limit(), DropLimit::Unlimited);
        assert!(config.score_weights.is_empty());
    }

    #[test]
    fn dangling_weight_reference_is_rejected() {
        let error = parse(
            r#"
            [[items]]
            name = "speed"
            template = "items/speed_up"

            [[score_weights]]
            item = 4
            weight = 1.0
            "#,
        )
        .expect_err("item 4 is not in the catalog");

        assert!(format!("{error:#}").contains("score weight table references item 4"));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = load(Some(Path::new("/definitely/not/here.toml")))
            .expect_err("missing file fails");
        assert!(format!("{error:#}").contains("/definitely/not/here.toml"));
    }
}
