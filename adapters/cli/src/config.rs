//! Optional TOML settings file shared by all subcommands.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use roboyard_system_analysis::TrapPolicy;
use roboyard_system_classification::{CampaignConfig, TierThresholds};
use roboyard_system_generation::GeneratorConfig;
use serde::Deserialize;

/// Settings file layout. Every table and key is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Generator tuning.
    pub(crate) generator: GeneratorConfig,
    /// Trap detection threshold used by `analyze`.
    pub(crate) analysis: TrapPolicy,
    /// Tier boundaries used by `campaign`.
    pub(crate) tiers: TierThresholds,
    /// Campaign defaults.
    pub(crate) campaign: CampaignSettings,
}

/// `[campaign]` table.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CampaignSettings {
    pub(crate) solver: Option<String>,
    pub(crate) output: Option<PathBuf>,
    pub(crate) quota: Option<usize>,
    pub(crate) workers: Option<usize>,
    pub(crate) seed: Option<u64>,
    pub(crate) max_candidates: Option<u64>,
    pub(crate) timeout_secs: Option<u64>,
}

impl Settings {
    /// Reads settings from `path`, or returns the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Campaign configuration from the file, before command-line overrides.
    pub(crate) fn campaign_config(&self) -> CampaignConfig {
        let defaults = CampaignConfig::default();
        CampaignConfig {
            quota: self.campaign.quota.unwrap_or(defaults.quota),
            workers: self.campaign.workers.unwrap_or(defaults.workers),
            seed: self.campaign.seed.unwrap_or(defaults.seed),
            max_candidates: self.campaign.max_candidates,
            generator: self.generator.clone(),
            thresholds: self.tiers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::parse("").expect("empty config");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.generator.max_walls, 50);
        assert_eq!(settings.campaign_config().quota, 35);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let settings = Settings::parse(
            r#"
            [generator]
            width = 16
            max_attempts = 200

            [tiers]
            advanced = 18

            [analysis]
            ratio = 0.25

            [campaign]
            solver = "java -cp . Solver"
            quota = 5
            "#,
        )
        .expect("config parses");

        assert_eq!(settings.generator.width, 16);
        assert_eq!(settings.generator.height, 14);
        assert_eq!(settings.generator.max_attempts, 200);
        assert_eq!(settings.tiers.advanced, 18);
        assert_eq!(settings.tiers.beginner, 6);
        assert_eq!(settings.analysis.ratio, 0.25);
        assert_eq!(settings.campaign.solver.as_deref(), Some("java -cp . Solver"));

        let campaign = settings.campaign_config();
        assert_eq!(campaign.quota, 5);
        assert_eq!(campaign.generator.width, 16);
        assert_eq!(campaign.thresholds.advanced, 18);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::parse("[generatr]\nwidth = 3\n").is_err());
        assert!(Settings::parse("[campaign]\nsolvr = \"x\"\n").is_err());
    }

    #[test]
    fn missing_files_name_the_path() {
        let error = Settings::load(Some(Path::new("/nonexistent/roboyard.toml")))
            .expect_err("file does not exist");
        assert!(error.to_string().contains("/nonexistent/roboyard.toml"));
    }
}
