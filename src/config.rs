// Runtime configuration assembled from the command line and environment.
use std::path::PathBuf;

use crate::i18n::Locale;
use crate::model::BUNDLED_MODEL;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub name: String,
    /// Directory holding one sub-directory per installed model.
    pub dir: PathBuf,
    /// Optional mirror to download missing models from.
    pub mirror: Option<PathBuf>,
}

impl ModelConfig {
    pub fn resolve(name: Option<String>, dir: Option<PathBuf>, mirror: Option<PathBuf>) -> Self {
        Self {
            name: name.unwrap_or_else(|| BUNDLED_MODEL.to_string()),
            dir: dir.unwrap_or_else(default_model_dir),
            mirror,
        }
    }
}

pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("textplay")
        .join("models")
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub locale: Locale,
    pub json: bool,
    /// Where the word cloud PNG is written.
    pub cloud_out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let cfg = ModelConfig::resolve(None, None, None);
        assert_eq!(cfg.name, BUNDLED_MODEL);
        assert!(cfg.dir.ends_with("textplay/models"));
        assert!(cfg.mirror.is_none());
    }

    #[test]
    fn test_resolve_overrides() {
        let cfg = ModelConfig::resolve(
            Some("custom".to_string()),
            Some(PathBuf::from("/tmp/models")),
            Some(PathBuf::from("/mnt/mirror")),
        );
        assert_eq!(cfg.name, "custom");
        assert_eq!(cfg.dir, PathBuf::from("/tmp/models"));
        assert_eq!(cfg.mirror, Some(PathBuf::from("/mnt/mirror")));
    }
}
