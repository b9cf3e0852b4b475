// Where a missing model gets downloaded from.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use walkdir::WalkDir;

use super::{ModelError, ModelFiles, ARTIFACT_FILES};
use crate::config::ModelConfig;

pub const BUNDLED_MODEL: &str = "en_lexicon_sm";

const BUNDLED_META: &str = include_str!("../../assets/models/en_lexicon_sm/meta.json");
const BUNDLED_STOPWORDS: &str = include_str!("../../assets/models/en_lexicon_sm/stopwords.txt");
const BUNDLED_ABBREVIATIONS: &str =
    include_str!("../../assets/models/en_lexicon_sm/abbreviations.txt");
const BUNDLED_POLARITY: &str = include_str!("../../assets/models/en_lexicon_sm/polarity.tsv");
const BUNDLED_MODIFIERS: &str = include_str!("../../assets/models/en_lexicon_sm/modifiers.tsv");
const BUNDLED_GAZETTEER: &str = include_str!("../../assets/models/en_lexicon_sm/gazetteer.tsv");
const BUNDLED_FIRST_NAMES: &str =
    include_str!("../../assets/models/en_lexicon_sm/first_names.txt");

pub(super) fn bundled_files() -> ModelFiles<'static> {
    ModelFiles {
        meta: BUNDLED_META,
        stopwords: BUNDLED_STOPWORDS,
        abbreviations: BUNDLED_ABBREVIATIONS,
        polarity: BUNDLED_POLARITY,
        modifiers: BUNDLED_MODIFIERS,
        gazetteer: BUNDLED_GAZETTEER,
        first_names: BUNDLED_FIRST_NAMES,
    }
}

/// A place models can be fetched from.
pub trait ModelSource: Send + Sync {
    fn describe(&self) -> String;

    /// Write the artifact files of model `name` into the (empty, existing) `dest`.
    fn fetch(&self, name: &str, dest: &Path) -> Result<(), ModelError>;
}

fn spinner(msg: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(msg);
    pb
}

/// Installs the model compiled into the binary.
pub struct BundledSource;

impl ModelSource for BundledSource {
    fn describe(&self) -> String {
        "bundled".to_string()
    }

    fn fetch(&self, name: &str, dest: &Path) -> Result<(), ModelError> {
        if name != BUNDLED_MODEL {
            return Err(ModelError::UnknownModel {
                source_name: self.describe(),
                model: name.to_string(),
            });
        }
        let files = bundled_files();
        let contents = [
            files.meta,
            files.stopwords,
            files.abbreviations,
            files.polarity,
            files.modifiers,
            files.gazetteer,
            files.first_names,
        ];
        let pb = spinner(format!("installing {}", name));
        for (file, content) in ARTIFACT_FILES.iter().zip(contents) {
            pb.set_message(format!("installing {}/{}", name, file));
            fs::write(dest.join(file), content)?;
        }
        pb.finish_with_message(format!("installed {}", name));
        Ok(())
    }
}

/// Copies a model tree from a mirror directory (`<root>/<name>/...`).
pub struct MirrorSource {
    root: PathBuf,
}

impl MirrorSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ModelSource for MirrorSource {
    fn describe(&self) -> String {
        format!("mirror {}", self.root.display())
    }

    fn fetch(&self, name: &str, dest: &Path) -> Result<(), ModelError> {
        let origin = self.root.join(name);
        if !origin.is_dir() {
            return Err(ModelError::UnknownModel {
                source_name: self.describe(),
                model: name.to_string(),
            });
        }

        let pb = spinner(format!("copying {} from {}", name, self.root.display()));
        for entry in WalkDir::new(&origin).min_depth(1) {
            let entry = entry?;
            let rel = match entry.path().strip_prefix(&origin) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let target = dest.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else if entry.file_type().is_file() {
                debug!(file = %rel.display(), "copying model file");
                fs::copy(entry.path(), &target)?;
                pb.tick();
            }
        }
        pb.finish_with_message(format!("copied {}", name));
        Ok(())
    }
}

/// The mirror when one is configured, otherwise the bundled model.
pub fn source_for(config: &ModelConfig) -> Box<dyn ModelSource> {
    match &config.mirror {
        Some(root) => Box::new(MirrorSource::new(root.clone())),
        None => Box::new(BundledSource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{initialize, model_path, ModelStatus, META_FILE};
    use tempfile::TempDir;

    #[test]
    fn test_bundled_source_rejects_other_names() {
        let temp_dir = TempDir::new().unwrap();
        let err = BundledSource.fetch("fr_lexicon_sm", temp_dir.path()).unwrap_err();
        assert!(matches!(err, ModelError::UnknownModel { .. }));
    }

    #[test]
    fn test_mirror_source_copies_tree() -> anyhow::Result<()> {
        let mirror = TempDir::new()?;
        let published = mirror.path().join(BUNDLED_MODEL);
        fs::create_dir_all(published.join("extra"))?;
        BundledSource.fetch(BUNDLED_MODEL, &published)?;
        fs::write(published.join("extra").join("notes.txt"), "x")?;

        let models = TempDir::new()?;
        let cfg = ModelConfig {
            name: BUNDLED_MODEL.to_string(),
            dir: models.path().to_path_buf(),
            mirror: Some(mirror.path().to_path_buf()),
        };
        let status = initialize(&cfg, source_for(&cfg).as_ref())?;
        assert!(matches!(status, ModelStatus::Ready(_)));
        assert!(model_path(&cfg).join(META_FILE).is_file());
        assert!(model_path(&cfg).join("extra").join("notes.txt").is_file());
        Ok(())
    }

    #[test]
    fn test_mirror_without_model_fails_download() -> anyhow::Result<()> {
        let mirror = TempDir::new()?;
        let models = TempDir::new()?;
        let cfg = ModelConfig {
            name: BUNDLED_MODEL.to_string(),
            dir: models.path().to_path_buf(),
            mirror: Some(mirror.path().to_path_buf()),
        };
        let status = initialize(&cfg, source_for(&cfg).as_ref())?;
        assert!(matches!(status, ModelStatus::DownloadFailed { .. }));
        Ok(())
    }
}
