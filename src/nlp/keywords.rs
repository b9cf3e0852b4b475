use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::nlp::tokenizer::ModelTokenizer;

/// How many keywords the playground shows.
pub const TOP_KEYWORDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub frequency: usize,
}

/// Most frequent alphabetic, non-stop words of `text` (lower-cased).
///
/// Sorted by descending frequency; words with the same frequency keep the order in which
/// they first appear in the text.
pub fn extract_keywords(tokenizer: &ModelTokenizer<'_>, text: &str, top_n: usize) -> Vec<Keyword> {
    let lowered = text.to_lowercase();

    let mut counts: Vec<Keyword> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for token in tokenizer.tokens(&lowered) {
        if !token.is_alpha || token.is_stop {
            continue;
        }
        match slots.get(token.text) {
            Some(&slot) => counts[slot].frequency += 1,
            None => {
                slots.insert(token.text, counts.len());
                counts.push(Keyword {
                    word: token.text.to_string(),
                    frequency: 1,
                });
            }
        }
    }

    // sort_by is stable, so first-occurrence order survives among equal counts
    counts.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    counts.truncate(top_n);
    counts
}
