use anyhow::Context;
use climate_types::config::DEFAULT_ARTIFACT_ROOT;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub(crate) struct ApiConfig {
    #[serde(default = "default_artifact_root")]
    pub(crate) artifact_root: String,
    #[serde(default)]
    pub(crate) cors: CorsConfig,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CorsConfig {
    #[serde(default = "default_allow_origins")]
    pub(crate) allow_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            artifact_root: default_artifact_root(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: default_allow_origins(),
        }
    }
}

fn default_artifact_root() -> String {
    DEFAULT_ARTIFACT_ROOT.to_string()
}

fn default_allow_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// Without a config path the built-in defaults apply.
pub(crate) fn load_api_config(path: Option<&Path>) -> anyhow::Result<ApiConfig> {
    let Some(path) = path else {
        return Ok(ApiConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ApiConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    if config.cors.allow_origins.iter().any(|origin| origin.trim().is_empty()) {
        anyhow::bail!("cors.allow_origins cannot contain empty entries");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_uses_defaults() {
        let config = load_api_config(None).expect("config");
        assert_eq!(config.artifact_root, DEFAULT_ARTIFACT_ROOT);
        assert_eq!(config.cors.allow_origins, vec!["*".to_string()]);
    }

    #[test]
    fn parses_partial_file() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("api.toml");
        std::fs::write(
            &path,
            "[cors]\nallow_origins = [\"http://localhost:8501\"]\n",
        )
        .expect("write");
        let config = load_api_config(Some(&path)).expect("config");
        assert_eq!(config.artifact_root, DEFAULT_ARTIFACT_ROOT);
        assert_eq!(config.cors.allow_origins, vec!["http://localhost:8501"]);
    }

    #[test]
    fn rejects_blank_origin() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("api.toml");
        std::fs::write(&path, "artifact_root = \"/tmp/runs\"\n[cors]\nallow_origins = [\" \"]\n")
            .expect("write");
        assert!(load_api_config(Some(&path)).is_err());
    }
}
