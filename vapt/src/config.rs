use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub api_url: Option<String>,
    pub validate_timeout_secs: Option<u64>,
    pub recon_timeout_secs: Option<u64>,
    pub vuln_timeout_secs: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub offline_validate: Option<bool>,
    pub format: Option<String>,
}

/// Load `path`, or `./vapt.yaml` when no path is given and the file exists.
/// An explicit path that cannot be read or parsed is an error.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new("vapt.yaml");
            if p.exists() { p.to_path_buf() } else { return Ok(None); }
        }
    };
    let s = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let cfg = parse_config(&s).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(cfg))
}

pub fn parse_config(s: &str) -> Result<Config> {
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}
