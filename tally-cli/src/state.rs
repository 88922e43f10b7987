use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tally_store::JsonFileStore;

use crate::config::Config;

/// `$TALLY_HOME`, or `~/.tally`.
pub fn tally_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("TALLY_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tally"))
}

pub fn ensure_tally_home() -> Result<PathBuf> {
    let dir = tally_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn data_dir(cfg: &Config) -> Result<PathBuf> {
    match &cfg.ledger.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(ensure_tally_home()?.join("data")),
    }
}

pub fn open_store(cfg: &Config) -> Result<JsonFileStore> {
    let dir = data_dir(cfg)?;
    JsonFileStore::open(&dir).with_context(|| format!("open ledger at {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::{EXPENSES, LedgerStore};

    #[test]
    fn test_configured_data_dir_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.ledger.data_dir = Some(tmp.path().join("ledger"));

        let store = open_store(&cfg).unwrap();
        assert!(tmp.path().join("ledger").is_dir());
        assert!(store.list(EXPENSES).unwrap().is_empty());
    }
}
