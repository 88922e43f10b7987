use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tally_core::{CategoryAxis, DEFAULT_HORIZON, DEFAULT_INCOME_LABEL, LabelPolicy, TimePolicy};
use tally_ingest::Normalizer;
use tally_store::{CollectionRouter, Importer, StaticIdentity};

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerSection,
    pub time: TimeSection,
    pub labels: LabelsSection,
    pub identity: IdentitySection,
    pub forecast: ForecastSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    /// Where collection files live (default: ~/.tally/data)
    pub data_dir: Option<PathBuf>,
    /// Records with this `type` go to the incomes collection
    pub income_label: String,
    /// Category axis used by the category and forecast reports, in display order
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSection {
    /// "UTC" or an IANA zone name such as "Europe/Paris"
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsSection {
    /// Trim surrounding whitespace from category labels on import
    pub trim: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySection {
    /// Stamped on imported records; empty means nobody is signed in
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSection {
    pub horizon: usize,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            data_dir: None,
            income_label: DEFAULT_INCOME_LABEL.to_string(),
            categories: CategoryAxis::default().labels().to_vec(),
        }
    }
}

impl Default for TimeSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

impl Default for LabelsSection {
    fn default() -> Self {
        Self { trim: true }
    }
}

impl Default for IdentitySection {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            role: "owner".to_string(),
        }
    }
}

impl Default for ForecastSection {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
        }
    }
}

impl Config {
    pub fn time_policy(&self) -> Result<TimePolicy> {
        self.time
            .timezone
            .parse()
            .context("invalid [time] timezone in config.toml")
    }

    pub fn label_policy(&self) -> LabelPolicy {
        if self.labels.trim {
            LabelPolicy::Trim
        } else {
            LabelPolicy::Verbatim
        }
    }

    pub fn axis(&self) -> CategoryAxis {
        CategoryAxis::new(self.ledger.categories.iter().cloned())
    }

    pub fn router(&self) -> CollectionRouter {
        CollectionRouter::new(self.ledger.income_label.clone())
    }

    pub fn identity(&self) -> StaticIdentity {
        if self.identity.user_id.trim().is_empty() {
            StaticIdentity::anonymous()
        } else {
            StaticIdentity::signed_in(self.identity.user_id.trim(), self.identity.role.clone())
        }
    }

    pub fn importer(&self) -> Result<Importer> {
        let normalizer = Normalizer::new(self.time_policy()?, self.label_policy())?;
        Ok(Importer::new(normalizer, self.router()))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::IdentityProvider;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let cfg = Config::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
        assert_eq!(back.axis().len(), 13);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [time]
            timezone = "Europe/Paris"

            [labels]
            trim = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.time_policy().unwrap().to_string(), "Europe/Paris");
        assert_eq!(cfg.label_policy(), LabelPolicy::Verbatim);
        assert_eq!(cfg.ledger.income_label, DEFAULT_INCOME_LABEL);
        assert_eq!(cfg.forecast.horizon, DEFAULT_HORIZON);
    }

    #[test]
    fn test_bad_timezone() {
        let mut cfg = Config::default();
        cfg.time.timezone = "Mars/Olympus".into();
        assert!(cfg.time_policy().is_err());
        assert!(cfg.importer().is_err());
    }

    #[test]
    fn test_blank_user_is_anonymous() {
        let mut cfg = Config::default();
        assert_eq!(cfg.identity().current_user().unwrap().id, "local");
        cfg.identity.user_id = "  ".into();
        assert!(cfg.identity().current_user().is_none());
    }
}
