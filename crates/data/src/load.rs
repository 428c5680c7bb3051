use anyhow::{bail, Context};
use luckydraw_core::{parse_list, DrawEngine, DrawRequest, FortuneTable, LadderConfig};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const LADDER_CONFIG_FILE: &str = "ladder.json";
pub const FORTUNES_FILE: &str = "fortunes.json";

pub fn load_ladder_config(path: &Path) -> anyhow::Result<LadderConfig> {
    let config: LadderConfig = load_json(path)?;
    config
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

pub fn load_fortune_table(path: &Path) -> anyhow::Result<FortuneTable> {
    let table: FortuneTable = load_json(path)?;
    table
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(table)
}

/// Engine built from an assets directory. Either file may be missing, in
/// which case the built-in default is used.
pub fn load_engine(dir: &Path) -> anyhow::Result<DrawEngine> {
    let ladder_path = dir.join(LADDER_CONFIG_FILE);
    let ladder = if ladder_path.exists() {
        load_ladder_config(&ladder_path)?
    } else {
        LadderConfig::default()
    };
    let fortunes_path = dir.join(FORTUNES_FILE);
    let fortunes = if fortunes_path.exists() {
        load_fortune_table(&fortunes_path)?
    } else {
        FortuneTable::default()
    };
    DrawEngine::new(ladder, fortunes).with_context(|| format!("assets in {}", dir.display()))
}

/// Newline-separated list file, trimmed with blank lines dropped.
pub fn read_list(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(parse_list(&raw))
}

pub fn load_request(path: &Path) -> anyhow::Result<DrawRequest> {
    let request: DrawRequest = load_json(path)?;
    if request.mode.uses_candidates() && request.candidates.is_empty() {
        bail!("{}: request has no candidates", path.display());
    }
    Ok(request)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
