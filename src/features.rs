// Feature selection and the per-invocation report.
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::ValueEnum;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AppConfig;
use crate::model::LanguageModel;
use crate::nlp::{
    analyze_sentiment, extract_entities, extract_keywords, summarize_text, wordcloud, EntityRecord,
    Keyword, ModelTokenizer, PlacedWord, SentimentResult, SUMMARY_SENTENCES, TOP_KEYWORDS,
};

/// Declaration order is display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Sentiment,
    Summary,
    Ner,
    Keywords,
    #[value(name = "wordcloud", alias = "word-cloud")]
    WordCloud,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Sentiment,
        Feature::Summary,
        Feature::Ner,
        Feature::Keywords,
        Feature::WordCloud,
    ];
}

/// The features to show; duplicates collapse and iteration follows display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSelection(BTreeSet<Feature>);

impl FeatureSelection {
    pub fn all() -> Self {
        Feature::ALL.into_iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.0.iter().copied()
    }
}

impl Default for FeatureSelection {
    fn default() -> Self {
        Self(BTreeSet::from([Feature::Sentiment]))
    }
}

impl FromIterator<Feature> for FeatureSelection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The text was empty, nothing was computed.
    Advisory { message: String },
    Sentiment(SentimentResult),
    Summary { sentences: Vec<String> },
    Entities { entities: Vec<EntityRecord> },
    Keywords { keywords: Vec<Keyword> },
    WordCloud { path: PathBuf, words: Vec<PlacedWord> },
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub feature: Feature,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub sections: Vec<Section>,
}

/// Run every selected feature on `text`. Sections come back in display order.
pub fn run(
    text: &str,
    selection: &FeatureSelection,
    model: &LanguageModel,
    config: &AppConfig,
) -> Result<Report> {
    let features: Vec<Feature> = selection.iter().collect();
    let sections = features
        .par_iter()
        .map(|&feature| -> Result<Section> {
            let started = Instant::now();
            let outcome = run_feature(feature, text, model, config)?;
            debug!(?feature, elapsed_ms = started.elapsed().as_millis() as u64, "feature done");
            Ok(Section { feature, outcome })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Report { sections })
}

fn run_feature(feature: Feature, text: &str, model: &LanguageModel, config: &AppConfig) -> Result<Outcome> {
    if text.trim().is_empty() {
        return Ok(Outcome::Advisory {
            message: config.locale.advisory(feature).to_string(),
        });
    }

    let tokenizer = ModelTokenizer::new(model);
    Ok(match feature {
        Feature::Sentiment => Outcome::Sentiment(analyze_sentiment(model, text)),
        Feature::Summary => Outcome::Summary {
            sentences: summarize_text(&tokenizer, text, SUMMARY_SENTENCES),
        },
        Feature::Ner => Outcome::Entities {
            entities: extract_entities(model, text),
        },
        Feature::Keywords => Outcome::Keywords {
            keywords: extract_keywords(&tokenizer, text, TOP_KEYWORDS),
        },
        Feature::WordCloud => {
            let cloud = wordcloud::generate(model, text);
            cloud.save_png(&config.cloud_out)?;
            Outcome::WordCloud {
                path: config.cloud_out.clone(),
                words: cloud.words,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::i18n::Locale;
    use crate::nlp::SentimentLabel;
    use std::path::Path;
    use tempfile::TempDir;

    fn app_config(dir: &Path, locale: Locale) -> AppConfig {
        AppConfig {
            model: ModelConfig::resolve(None, Some(dir.join("models")), None),
            locale,
            json: false,
            cloud_out: dir.join("cloud.png"),
        }
    }

    #[test]
    fn test_selection_is_ordered_and_deduplicated() {
        let selection: FeatureSelection = [Feature::WordCloud, Feature::Sentiment, Feature::WordCloud]
            .into_iter()
            .collect();
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![Feature::Sentiment, Feature::WordCloud]);
        assert_eq!(FeatureSelection::default().iter().collect::<Vec<_>>(), vec![Feature::Sentiment]);
    }

    #[test]
    fn test_empty_text_gives_advisories() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = app_config(temp_dir.path(), Locale::Fr);
        let model = LanguageModel::bundled()?;
        let report = run("  \n ", &FeatureSelection::all(), &model, &config)?;

        assert_eq!(report.sections.len(), 5);
        for section in &report.sections {
            match &section.outcome {
                Outcome::Advisory { message } => {
                    assert_eq!(message, Locale::Fr.advisory(section.feature));
                }
                other => panic!("expected advisory, got {:?}", other),
            }
        }
        assert!(!config.cloud_out.exists());
        Ok(())
    }

    #[test]
    fn test_unselected_features_do_not_run() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = app_config(temp_dir.path(), Locale::En);
        let model = LanguageModel::bundled()?;
        let report = run(
            "I love sunny days but hate traffic.",
            &FeatureSelection::default(),
            &model,
            &config,
        )?;

        assert_eq!(report.sections.len(), 1);
        match &report.sections[0].outcome {
            Outcome::Sentiment(result) => assert_eq!(result.label, SentimentLabel::Positive),
            other => panic!("expected sentiment, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_all_features_in_display_order() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = app_config(temp_dir.path(), Locale::En);
        let model = LanguageModel::bundled()?;
        let text = "Barack Obama was born in Hawaii. He was elected president in 2008. \
                    He lived in Chicago before moving to Washington. The campaign was long.";
        let report = run(text, &FeatureSelection::all(), &model, &config)?;

        let order: Vec<Feature> = report.sections.iter().map(|s| s.feature).collect();
        assert_eq!(order, Feature::ALL.to_vec());
        assert!(matches!(report.sections[1].outcome, Outcome::Summary { ref sentences } if sentences.len() == 3));
        assert!(matches!(report.sections[3].outcome, Outcome::Keywords { ref keywords } if keywords.len() <= 5));
        assert!(config.cloud_out.exists());
        Ok(())
    }

    #[test]
    fn test_report_serializes_with_kind_tag() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = app_config(temp_dir.path(), Locale::En);
        let model = LanguageModel::bundled()?;
        let selection: FeatureSelection = [Feature::Keywords].into_iter().collect();
        let report = run("", &selection, &model, &config)?;

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["sections"][0]["feature"], "keywords");
        assert_eq!(json["sections"][0]["kind"], "advisory");
        Ok(())
    }
}
