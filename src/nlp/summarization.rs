// Text summarization by latent semantic analysis.
// Sentences are ranked by their weight in the SVD of a term-sentence matrix and the best
// ones are returned in their original order.
use std::collections::HashMap;

use ndarray::Array2;

use crate::nlp::svd::truncated_svd;
use crate::nlp::tokenizer::Tokenizer;

/// Number of sentences in a summary.
pub const SUMMARY_SENTENCES: usize = 3;

const MIN_DIMENSIONS: usize = 3;
const TF_SMOOTHING: f64 = 0.4;

pub fn summarize_text<T: Tokenizer + ?Sized>(tokenizer: &T, text: &str, count: usize) -> Vec<String> {
    let sentences = tokenizer.to_sentences(text);
    if sentences.len() <= count {
        return sentences;
    }

    let words: Vec<Vec<String>> = sentences
        .iter()
        .map(|s| tokenizer.to_words(s).into_iter().map(|w| w.to_lowercase()).collect())
        .collect();

    let mut dictionary: HashMap<&str, usize> = HashMap::new();
    for w in words.iter().flatten() {
        let next = dictionary.len();
        dictionary.entry(w.as_str()).or_insert(next);
    }
    if dictionary.is_empty() {
        return sentences.into_iter().take(count).collect();
    }

    let matrix = term_frequency_matrix(&dictionary, &words);
    let ranks = sentence_ranks(&matrix);

    let mut order: Vec<usize> = (0..sentences.len()).collect();
    // stable: equal ranks keep the earlier sentence first
    order.sort_by(|&a, &b| {
        ranks[b]
            .partial_cmp(&ranks[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut selected: Vec<usize> = order.into_iter().take(count).collect();
    selected.sort_unstable();

    selected.into_iter().map(|i| sentences[i].clone()).collect()
}

// terms x sentences, each column scaled by its most frequent term and smoothed;
// absent terms of a non-empty sentence get the smoothing floor
fn term_frequency_matrix(dictionary: &HashMap<&str, usize>, words: &[Vec<String>]) -> Array2<f64> {
    let mut matrix = Array2::<f64>::zeros((dictionary.len(), words.len()));
    for (col, sentence) in words.iter().enumerate() {
        for w in sentence {
            if let Some(&row) = dictionary.get(w.as_str()) {
                matrix[[row, col]] += 1.0;
            }
        }
    }

    for mut column in matrix.columns_mut() {
        let max = column.iter().cloned().fold(0.0, f64::max);
        if max > 0.0 {
            column.mapv_inplace(|count| TF_SMOOTHING + (1.0 - TF_SMOOTHING) * count / max);
        }
    }
    matrix
}

fn sentence_ranks(matrix: &Array2<f64>) -> Vec<f64> {
    let k = matrix.nrows().min(matrix.ncols());
    let svd = truncated_svd(matrix, k);
    let dimensions = MIN_DIMENSIONS.max(svd.sigma.len());
    let powered: Vec<f64> = svd
        .sigma
        .iter()
        .enumerate()
        .map(|(i, s)| if i < dimensions { s * s } else { 0.0 })
        .collect();

    (0..matrix.ncols())
        .map(|col| {
            powered
                .iter()
                .enumerate()
                .map(|(i, p)| p * svd.vt[[i, col]].powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .collect()
}
