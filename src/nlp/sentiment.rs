// Sentiment analysis using the model's polarity lexicon.
// Polarity is the mean of the lexicon hits, each scaled by a preceding intensifier and
// flipped/dampened by a negation up to two words back.
use serde::{Deserialize, Serialize};

use crate::model::{LanguageModel, Modifier};
use crate::nlp::tokenizer::ModelTokenizer;

// how far back a negation reaches ("not good", "not at all good" is out of scope)
const NEGATION_WINDOW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            SentimentLabel::Positive
        } else if polarity < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    /// In [-1.0, 1.0].
    pub polarity: f64,
    pub label: SentimentLabel,
}

pub fn analyze_sentiment(model: &LanguageModel, text: &str) -> SentimentResult {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = ModelTokenizer::new(model)
        .tokens(&lowered)
        .into_iter()
        .filter(|t| t.is_alpha || model.modifier(t.text).is_some())
        .map(|t| t.text)
        .collect();

    let mut contributions = Vec::new();
    for (i, word) in words.iter().enumerate() {
        let Some(mut score) = model.polarity(word) else {
            continue;
        };

        // the negation window starts before an intensifier, so "not very good" still flips
        let mut scope_end = i;
        if i > 0 {
            if let Some(Modifier::Intensifier(factor)) = model.modifier(words[i - 1]) {
                score *= factor;
                scope_end = i - 1;
            }
        }

        let negation = words[scope_end.saturating_sub(NEGATION_WINDOW)..scope_end]
            .iter()
            .rev()
            .find_map(|w| match model.modifier(w) {
                Some(Modifier::Negation(factor)) => Some(factor),
                _ => None,
            });
        if let Some(factor) = negation {
            score *= factor;
        }

        contributions.push(score.clamp(-1.0, 1.0));
    }

    let polarity = if contributions.is_empty() {
        0.0
    } else {
        (contributions.iter().sum::<f64>() / contributions.len() as f64).clamp(-1.0, 1.0)
    };

    SentimentResult {
        polarity,
        label: SentimentLabel::from_polarity(polarity),
    }
}
