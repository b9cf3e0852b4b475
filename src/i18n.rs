// User-facing strings. French is the playground's original wording; English is the default.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::features::Feature;
use crate::nlp::SentimentLabel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub fn title(self, feature: Feature) -> &'static str {
        match (self, feature) {
            (Locale::En, Feature::Sentiment) => "Sentiment Analysis",
            (Locale::En, Feature::Summary) => "Text Summarization",
            (Locale::En, Feature::Ner) => "Named Entity Recognition",
            (Locale::En, Feature::Keywords) => "Keyword Extraction",
            (Locale::En, Feature::WordCloud) => "Word Cloud",
            (Locale::Fr, Feature::Sentiment) => "Analyse de Sentiment",
            (Locale::Fr, Feature::Summary) => "Résumé de Texte",
            (Locale::Fr, Feature::Ner) => "Reconnaissance des Entités Nommées",
            (Locale::Fr, Feature::Keywords) => "Extraction de Mots-Clés",
            (Locale::Fr, Feature::WordCloud) => "Nuage de Mots",
        }
    }

    /// Shown instead of a result when the input text is empty.
    pub fn advisory(self, feature: Feature) -> &'static str {
        match (self, feature) {
            (Locale::En, Feature::Sentiment) => "Please enter some text for sentiment analysis!",
            (Locale::En, Feature::Summary) => "Please enter some text to summarize!",
            (Locale::En, Feature::Ner) => "Please enter some text for named entity recognition!",
            (Locale::En, Feature::Keywords) => "Please enter some text to extract keywords from!",
            (Locale::En, Feature::WordCloud) => "Please enter some text to generate a word cloud!",
            (Locale::Fr, Feature::Sentiment) => "Veuillez entrer un texte pour l'analyse de sentiment !",
            (Locale::Fr, Feature::Summary) => "Veuillez entrer un texte à résumer !",
            (Locale::Fr, Feature::Ner) => {
                "Veuillez entrer un texte pour la reconnaissance des entités nommées !"
            }
            (Locale::Fr, Feature::Keywords) => "Veuillez entrer un texte pour extraire des mots-clés !",
            (Locale::Fr, Feature::WordCloud) => "Veuillez entrer un texte pour générer un nuage de mots !",
        }
    }

    pub fn sentiment(self, label: SentimentLabel) -> &'static str {
        match (self, label) {
            (Locale::En, SentimentLabel::Positive) => "Positive 😊",
            (Locale::En, SentimentLabel::Neutral) => "Neutral 😐",
            (Locale::En, SentimentLabel::Negative) => "Negative 😠",
            (Locale::Fr, SentimentLabel::Positive) => "Positif 😊",
            (Locale::Fr, SentimentLabel::Neutral) => "Neutre 😐",
            (Locale::Fr, SentimentLabel::Negative) => "Négatif 😠",
        }
    }

    pub fn text(self, key: Text) -> &'static str {
        match self {
            Locale::En => match key {
                Text::Sentiment => "Sentiment:",
                Text::Polarity => "Polarity score:",
                Text::Summary => "Summary:",
                Text::EntitiesFound => "Entities found:",
                Text::Entity => "Entity",
                Text::Category => "Category",
                Text::NoEntities => "No entities found.",
                Text::TopKeywords => "Top keywords:",
                Text::NoKeywords => "No keywords found.",
                Text::CloudSaved => "Word cloud saved to",
                Text::CloudEmpty => "No words left to draw once stop-words are removed.",
            },
            Locale::Fr => match key {
                Text::Sentiment => "Sentiment :",
                Text::Polarity => "Score de polarité :",
                Text::Summary => "Résumé :",
                Text::EntitiesFound => "Entités trouvées :",
                Text::Entity => "Entité",
                Text::Category => "Catégorie",
                Text::NoEntities => "Aucune entité trouvée.",
                Text::TopKeywords => "Principaux mots-clés :",
                Text::NoKeywords => "Aucun mot-clé trouvé.",
                Text::CloudSaved => "Nuage de mots enregistré dans",
                Text::CloudEmpty => "Aucun mot à dessiner une fois les mots vides retirés.",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    Sentiment,
    Polarity,
    Summary,
    EntitiesFound,
    Entity,
    Category,
    NoEntities,
    TopKeywords,
    NoKeywords,
    CloudSaved,
    CloudEmpty,
}
