// Cloud word counting: token normalization and bigram collocations.
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::LanguageModel;

static CLOUD_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w[\w']+").unwrap());

/// Counted cloud words in first-occurrence order, collocated bigrams last.
///
/// With a `collocation_threshold`, adjacent non-stop word pairs whose Dunning
/// log-likelihood score exceeds it are counted as one entry and their count is taken
/// away from both words.
pub fn word_frequencies(
    model: &LanguageModel,
    text: &str,
    collocation_threshold: Option<f64>,
) -> Vec<(String, usize)> {
    let words: Vec<&str> = CLOUD_WORD
        .find_iter(text)
        .map(|m| {
            let word = m.as_str();
            if word.to_lowercase().ends_with("'s") {
                &word[..word.len() - 2]
            } else {
                word
            }
        })
        .filter(|w| !w.is_empty() && !w.chars().all(|c| c.is_ascii_digit()))
        .collect();

    let unigrams: Vec<String> = words
        .iter()
        .filter(|w| !model.is_stop_word(w))
        .map(|w| w.to_string())
        .collect();
    let (counts, standard) = fuse_counts(&unigrams);

    let Some(threshold) = collocation_threshold else {
        return counts;
    };

    // pairs are taken before stop-words are dropped so "thank you very much" has none
    let bigrams: Vec<String> = words
        .windows(2)
        .filter(|pair| !pair.iter().any(|w| model.is_stop_word(w)))
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect();
    let (bigram_counts, _) = fuse_counts(&bigrams);

    let n_words = unigrams.len();
    let original: HashMap<String, usize> = counts.iter().cloned().collect();
    let mut merged: Vec<(String, i64)> = counts.into_iter().map(|(w, c)| (w, c as i64)).collect();
    let position: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, (w, _))| (w.clone(), i))
        .collect();

    for (bigram, count) in bigram_counts {
        let Some((first, second)) = bigram.split_once(' ') else {
            continue;
        };
        let (Some(w1), Some(w2)) = (
            standard.get(&first.to_lowercase()),
            standard.get(&second.to_lowercase()),
        ) else {
            continue;
        };
        let (Some(&c1), Some(&c2)) = (original.get(w1), original.get(w2)) else {
            continue;
        };
        if collocation_score(count, c1, c2, n_words) > threshold {
            // a word can sit in several collocations and go negative
            for w in [w1, w2] {
                if let Some(&i) = position.get(w) {
                    merged[i].1 -= count as i64;
                }
            }
            merged.push((bigram, count as i64));
        }
    }

    merged
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(word, count)| (word, count as usize))
        .collect()
}

/// Counts per lower-cased form, a plural folded into its singular when both occur, each
/// reported under its most common casing. The map takes every lower-cased form,
/// folded plurals included, to that casing.
fn fuse_counts(tokens: &[String]) -> (Vec<(String, usize)>, HashMap<String, String>) {
    // lower-cased form -> (casing -> count), insertion ordered
    let mut order: Vec<String> = Vec::new();
    let mut cases: HashMap<String, Vec<(String, usize)>> = HashMap::new();
    for token in tokens {
        let lower = token.to_lowercase();
        let variants = cases.entry(lower.clone()).or_insert_with(|| {
            order.push(lower);
            Vec::new()
        });
        match variants.iter_mut().find(|(w, _)| w == token) {
            Some((_, count)) => *count += 1,
            None => variants.push((token.clone(), 1)),
        }
    }

    // fold "cats" into "cat" when both appear
    let plurals: Vec<String> = order
        .iter()
        .filter(|k| k.ends_with('s') && !k.ends_with("ss") && cases.contains_key(&k[..k.len() - 1]))
        .cloned()
        .collect();
    for plural in &plurals {
        if let Some(variants) = cases.remove(plural) {
            let singular = cases.entry(plural[..plural.len() - 1].to_string()).or_default();
            for (word, count) in variants {
                let stem = word[..word.len() - 1].to_string();
                match singular.iter_mut().find(|(w, _)| *w == stem) {
                    Some((_, c)) => *c += count,
                    None => singular.push((stem, count)),
                }
            }
        }
    }

    let mut standard = HashMap::new();
    let mut counts = Vec::new();
    for lower in &order {
        let Some(variants) = cases.get(lower) else {
            continue;
        };
        let total: usize = variants.iter().map(|(_, c)| c).sum();
        // most common casing, first seen on ties
        let mut best = &variants[0];
        for v in variants.iter().skip(1) {
            if v.1 > best.1 {
                best = v;
            }
        }
        standard.insert(lower.clone(), best.0.clone());
        counts.push((best.0.clone(), total));
    }
    for plural in &plurals {
        if let Some(form) = standard.get(&plural[..plural.len() - 1]).cloned() {
            standard.insert(plural.clone(), form);
        }
    }
    (counts, standard)
}

fn log_likelihood(k: f64, n: f64, x: f64) -> f64 {
    x.max(1e-10).ln() * k + (1.0 - x).max(1e-10).ln() * (n - k)
}

/// Dunning's likelihood ratio for a bigram seen `pair` times whose words occur `first` and
/// `second` times among `n_words`.
fn collocation_score(pair: usize, first: usize, second: usize, n_words: usize) -> f64 {
    if n_words <= first || n_words <= second {
        // one word makes up the whole text
        return 0.0;
    }
    let (c12, c1, c2, n) = (pair as f64, first as f64, second as f64, n_words as f64);
    let p = c2 / n;
    let p1 = c12 / c1;
    let p2 = (c2 - c12) / (n - c1);
    let ratio = log_likelihood(c12, c1, p) + log_likelihood(c2 - c12, n - c1, p)
        - log_likelihood(c12, c1, p1)
        - log_likelihood(c2 - c12, n - c1, p2);
    -2.0 * ratio
}
