//! Language model artifact: stop-words, abbreviations, polarity lexicon, gazetteer and
//! given names.
//!
//! A model lives in `<model_dir>/<name>/` as a handful of plain-text files. It is loaded
//! once per process and shared read-only between features.

mod error;
mod source;

pub use error::ModelError;
pub use source::{source_for, BundledSource, MirrorSource, ModelSource, BUNDLED_MODEL};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::nlp::ner::EntityLabel;
use crate::nlp::tokenizer::lex;

pub const META_FILE: &str = "meta.json";
pub const STOPWORDS_FILE: &str = "stopwords.txt";
pub const ABBREVIATIONS_FILE: &str = "abbreviations.txt";
pub const POLARITY_FILE: &str = "polarity.tsv";
pub const MODIFIERS_FILE: &str = "modifiers.tsv";
pub const GAZETTEER_FILE: &str = "gazetteer.tsv";
pub const FIRST_NAMES_FILE: &str = "first_names.txt";

pub const ARTIFACT_FILES: [&str; 7] = [
    META_FILE,
    STOPWORDS_FILE,
    ABBREVIATIONS_FILE,
    POLARITY_FILE,
    MODIFIERS_FILE,
    GAZETTEER_FILE,
    FIRST_NAMES_FILE,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMeta {
    pub name: String,
    pub version: String,
    pub language: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbbreviationKind {
    /// Never ends a sentence ("Dr.", "Mr.").
    Title,
    /// Ends a sentence unless a lower-case word follows ("etc.", "Jan.").
    Abbreviation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modifier {
    Intensifier(f64),
    Negation(f64),
}

#[derive(Debug, Clone)]
pub struct GazetteerEntry {
    pub tokens: Vec<String>,
    pub label: EntityLabel,
}

/// Raw contents of the artifact files, before parsing.
pub struct ModelFiles<'a> {
    pub meta: &'a str,
    pub stopwords: &'a str,
    pub abbreviations: &'a str,
    pub polarity: &'a str,
    pub modifiers: &'a str,
    pub gazetteer: &'a str,
    pub first_names: &'a str,
}

#[derive(Debug)]
pub struct LanguageModel {
    meta: ModelMeta,
    stop_words: HashSet<String>,
    abbreviations: HashMap<String, AbbreviationKind>,
    polarity: HashMap<String, f64>,
    modifiers: HashMap<String, Modifier>,
    // keyed by the first token of each phrase, longest phrase first
    gazetteer: HashMap<String, Vec<GazetteerEntry>>,
    first_names: HashSet<String>,
}

fn normalize(word: &str) -> String {
    word.to_lowercase().replace('’', "'")
}

// Non-empty, non-comment lines with their 1-based line numbers.
fn records<'a>(content: &'a str) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
}

fn fields<'a>(file: &str, line: usize, record: &'a str, n: usize) -> Result<Vec<&'a str>, ModelError> {
    let cols: Vec<&str> = record.split('\t').map(str::trim).collect();
    if cols.len() != n {
        return Err(ModelError::Malformed {
            file: file.to_string(),
            line,
            reason: format!("expected {} tab-separated fields, found {}", n, cols.len()),
        });
    }
    Ok(cols)
}

fn number(file: &str, line: usize, raw: &str) -> Result<f64, ModelError> {
    raw.parse::<f64>().map_err(|e| ModelError::Malformed {
        file: file.to_string(),
        line,
        reason: format!("bad number {:?}: {}", raw, e),
    })
}

impl LanguageModel {
    /// The model compiled into the binary, parsed without touching the filesystem.
    pub fn bundled() -> Result<Self, ModelError> {
        Self::parse(&source::bundled_files())
    }

    /// Load a model from its artifact directory.
    pub fn load(dir: &Path) -> Result<Self, ModelError> {
        if !dir.join(META_FILE).is_file() {
            return Err(ModelError::NotFound(dir.to_path_buf()));
        }
        let read = |name: &str| fs::read_to_string(dir.join(name));
        let (meta, stopwords, abbreviations) =
            (read(META_FILE)?, read(STOPWORDS_FILE)?, read(ABBREVIATIONS_FILE)?);
        let (polarity, modifiers, gazetteer) =
            (read(POLARITY_FILE)?, read(MODIFIERS_FILE)?, read(GAZETTEER_FILE)?);
        let first_names = read(FIRST_NAMES_FILE)?;

        Self::parse(&ModelFiles {
            meta: &meta,
            stopwords: &stopwords,
            abbreviations: &abbreviations,
            polarity: &polarity,
            modifiers: &modifiers,
            gazetteer: &gazetteer,
            first_names: &first_names,
        })
    }

    pub fn parse(files: &ModelFiles<'_>) -> Result<Self, ModelError> {
        let meta: ModelMeta = serde_json::from_str(files.meta)?;

        let stop_words = records(files.stopwords).map(|(_, w)| normalize(w)).collect();

        let mut abbreviations = HashMap::new();
        for (line, rec) in records(files.abbreviations) {
            let cols = fields(ABBREVIATIONS_FILE, line, rec, 2)?;
            let kind = match cols[1] {
                "title" => AbbreviationKind::Title,
                "abbrev" => AbbreviationKind::Abbreviation,
                other => {
                    return Err(ModelError::Malformed {
                        file: ABBREVIATIONS_FILE.to_string(),
                        line,
                        reason: format!("unknown abbreviation kind {:?}", other),
                    })
                }
            };
            abbreviations.insert(normalize(cols[0]), kind);
        }

        let mut polarity = HashMap::new();
        for (line, rec) in records(files.polarity) {
            let cols = fields(POLARITY_FILE, line, rec, 2)?;
            let value = number(POLARITY_FILE, line, cols[1])?;
            if !(-1.0..=1.0).contains(&value) {
                return Err(ModelError::Malformed {
                    file: POLARITY_FILE.to_string(),
                    line,
                    reason: format!("polarity {} outside [-1, 1]", value),
                });
            }
            polarity.insert(normalize(cols[0]), value);
        }

        let mut modifiers = HashMap::new();
        for (line, rec) in records(files.modifiers) {
            let cols = fields(MODIFIERS_FILE, line, rec, 3)?;
            let factor = number(MODIFIERS_FILE, line, cols[2])?;
            let modifier = match cols[1] {
                "intensifier" => Modifier::Intensifier(factor),
                "negation" => Modifier::Negation(factor),
                other => {
                    return Err(ModelError::Malformed {
                        file: MODIFIERS_FILE.to_string(),
                        line,
                        reason: format!("unknown modifier kind {:?}", other),
                    })
                }
            };
            modifiers.insert(normalize(cols[0]), modifier);
        }

        let mut gazetteer: HashMap<String, Vec<GazetteerEntry>> = HashMap::new();
        for (line, rec) in records(files.gazetteer) {
            let cols = fields(GAZETTEER_FILE, line, rec, 2)?;
            let label = cols[1].parse::<EntityLabel>().map_err(|reason| ModelError::Malformed {
                file: GAZETTEER_FILE.to_string(),
                line,
                reason,
            })?;
            let tokens: Vec<String> = lex(cols[0]).iter().map(|l| l.text.to_string()).collect();
            if let Some(first) = tokens.first() {
                gazetteer
                    .entry(first.clone())
                    .or_default()
                    .push(GazetteerEntry { tokens, label });
            }
        }
        for entries in gazetteer.values_mut() {
            entries.sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));
        }

        let first_names = records(files.first_names).map(|(_, w)| normalize(w)).collect();

        Ok(Self {
            meta,
            stop_words,
            abbreviations,
            polarity,
            modifiers,
            gazetteer,
            first_names,
        })
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&normalize(word))
    }

    pub fn is_first_name(&self, word: &str) -> bool {
        self.first_names.contains(&normalize(word))
    }

    pub fn abbreviation(&self, word: &str) -> Option<AbbreviationKind> {
        self.abbreviations.get(&normalize(word)).copied()
    }

    pub fn polarity(&self, word: &str) -> Option<f64> {
        self.polarity.get(&normalize(word)).copied()
    }

    pub fn modifier(&self, word: &str) -> Option<Modifier> {
        self.modifiers.get(&normalize(word)).copied()
    }

    /// Gazetteer phrases starting with `first`, longest first. Matching is case-sensitive.
    pub fn phrases_starting_with(&self, first: &str) -> &[GazetteerEntry] {
        self.gazetteer.get(first).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Outcome of the explicit model initialisation step.
#[derive(Debug, Clone)]
pub enum ModelStatus {
    Ready(Arc<LanguageModel>),
    DownloadFailed { name: String, reason: String },
}

pub fn model_path(config: &ModelConfig) -> PathBuf {
    config.dir.join(&config.name)
}

/// Fetch the model from `source` into its directory, replacing any existing copy.
pub fn provision(config: &ModelConfig, source: &dyn ModelSource) -> Result<PathBuf, ModelError> {
    let dest = model_path(config);
    let staging = config.dir.join(format!(".{}.partial", config.name));
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    info!(model = %config.name, source = %source.describe(), "provisioning model");
    if let Err(e) = source.fetch(&config.name, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }

    if dest.exists() {
        fs::remove_dir_all(&dest)?;
    }
    fs::rename(&staging, &dest)?;
    Ok(dest)
}

/// Load the configured model; when it is missing, provision it once and reload.
///
/// Only a missing model triggers provisioning. A model that exists but fails to parse is
/// an error, while a freshly provisioned model that fails is reported as `DownloadFailed`.
pub fn initialize(config: &ModelConfig, source: &dyn ModelSource) -> Result<ModelStatus, ModelError> {
    let path = model_path(config);
    match LanguageModel::load(&path) {
        Ok(model) => {
            info!(model = %model.meta().name, version = %model.meta().version, "model loaded");
            return Ok(ModelStatus::Ready(Arc::new(model)));
        }
        Err(ModelError::NotFound(_)) => {
            warn!(path = %path.display(), "model missing, downloading");
        }
        Err(e) => return Err(e),
    }

    let reloaded = provision(config, source).and_then(|dir| LanguageModel::load(&dir));
    Ok(match reloaded {
        Ok(model) => ModelStatus::Ready(Arc::new(model)),
        Err(e) => ModelStatus::DownloadFailed {
            name: config.name.clone(),
            reason: e.to_string(),
        },
    })
}

static SHARED: OnceCell<Arc<LanguageModel>> = OnceCell::new();

/// Process-wide model instance; initialised on first call only.
pub fn shared(config: &ModelConfig, source: &dyn ModelSource) -> Result<ModelStatus, ModelError> {
    if let Some(model) = SHARED.get() {
        return Ok(ModelStatus::Ready(Arc::clone(model)));
    }
    let status = initialize(config, source)?;
    if let ModelStatus::Ready(model) = &status {
        let _ = SHARED.set(Arc::clone(model));
    }
    Ok(status)
}
