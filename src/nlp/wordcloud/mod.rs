//! Word cloud generation.
//!
//! Word weights come from raw counts (stop-words removed, possessives stripped, plurals folded
//! into their singular, casing fused to the most common form, strong bigrams kept as one entry).
//! The starting font size comes from a trial layout of the two biggest words. The biggest word
//! is placed first near the centre; every next word's size follows the frequency ratio to the
//! previous one with a relative scaling of 0.5, shrinking step by step when it does not fit.

mod frequencies;
mod glyphs;
mod layout;

use std::path::Path;

use anyhow::Result;
use image::{ImageFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::LanguageModel;
use frequencies::word_frequencies;
use glyphs::{rasterize, Mask};
use layout::OccupancyMap;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

// viridis, minus the yellows that vanish on white
const PALETTE: [Rgb<u8>; 9] = [
    Rgb([68, 1, 84]),
    Rgb([72, 40, 120]),
    Rgb([62, 74, 137]),
    Rgb([49, 104, 142]),
    Rgb([38, 130, 142]),
    Rgb([31, 158, 137]),
    Rgb([53, 183, 121]),
    Rgb([109, 205, 89]),
    Rgb([180, 222, 44]),
];

#[derive(Debug, Clone)]
pub struct WordCloudConfig {
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    pub relative_scaling: f64,
    pub min_font_size: u32,
    pub font_step: u32,
    /// Empty pixels kept around every word.
    pub margin: u32,
    /// Minimum Dunning score for a bigram to become an entry; `None` keeps single words only.
    pub collocation_threshold: Option<f64>,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            max_words: 200,
            relative_scaling: 0.5,
            min_font_size: 7,
            font_step: 1,
            margin: 2,
            collocation_threshold: Some(30.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedWord {
    pub word: String,
    /// Frequency relative to the most frequent word, in (0, 1].
    pub weight: f64,
    pub font_size: u32,
    pub x: u32,
    pub y: u32,
    pub orientation: Orientation,
}

impl PlacedWord {
    fn mask(&self) -> Mask {
        let mask = rasterize(&self.word, self.font_size);
        match self.orientation {
            Orientation::Horizontal => mask,
            Orientation::Vertical => mask.rotate_ccw(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCloud {
    pub width: u32,
    pub height: u32,
    pub words: Vec<PlacedWord>,
}

pub fn generate(model: &LanguageModel, text: &str) -> WordCloud {
    generate_with(&WordCloudConfig::default(), model, text)
}

pub fn generate_with(config: &WordCloudConfig, model: &LanguageModel, text: &str) -> WordCloud {
    let mut frequencies = word_frequencies(model, text, config.collocation_threshold);
    frequencies.sort_by(|a, b| b.1.cmp(&a.1));
    frequencies.truncate(config.max_words);
    layout_words(config, &frequencies)
}

fn layout_words(config: &WordCloudConfig, frequencies: &[(String, usize)]) -> WordCloud {
    let mut cloud = WordCloud {
        width: config.width,
        height: config.height,
        words: Vec::new(),
    };
    let max_freq = match frequencies.first() {
        Some((_, f)) if *f > 0 => *f as f64,
        _ => return cloud,
    };
    let weighted: Vec<(&str, f64)> = frequencies
        .iter()
        .map(|(word, freq)| (word.as_str(), *freq as f64 / max_freq))
        .collect();

    let Some(font_size) = initial_font_size(config, &weighted) else {
        debug!("no word fits the canvas");
        return cloud;
    };
    cloud.words = place_words(config, &weighted, font_size);
    cloud
}

/// Harmonic mean of the sizes the two biggest words get when laid out alone from the
/// canvas height. A single word starts at the canvas height.
fn initial_font_size(config: &WordCloudConfig, weighted: &[(&str, f64)]) -> Option<u32> {
    if weighted.len() == 1 {
        return Some(config.height);
    }
    let trial = place_words(config, &weighted[..weighted.len().min(2)], config.height);
    match trial.as_slice() {
        [first, second, ..] => {
            let (a, b) = (first.font_size, second.font_size);
            Some(2 * a * b / (a + b))
        }
        [only] => Some(only.font_size),
        [] => None,
    }
}

fn place_words(config: &WordCloudConfig, weighted: &[(&str, f64)], start_size: u32) -> Vec<PlacedWord> {
    let mut occupancy = OccupancyMap::new(config.width, config.height);
    let mut placed_words = Vec::new();
    let mut font_size = start_size;
    let mut last_weight = 1.0;
    let rs = config.relative_scaling;

    for &(word, weight) in weighted {
        if rs != 0.0 {
            font_size = ((rs * (weight / last_weight) + (1.0 - rs)) * font_size as f64).round() as u32;
        }

        let mut orientation = Orientation::Horizontal;
        let mut tried_vertical = false;
        let mut spot = None;
        while font_size >= config.min_font_size {
            let (w, h) = glyphs::text_size(word, font_size);
            let (w, h) = match orientation {
                Orientation::Horizontal => (w, h),
                Orientation::Vertical => (h, w),
            };
            spot = occupancy.find_position(w + config.margin, h + config.margin);
            if spot.is_some() {
                break;
            }
            if !tried_vertical {
                orientation = Orientation::Vertical;
                tried_vertical = true;
            } else {
                font_size = font_size.saturating_sub(config.font_step);
                orientation = Orientation::Horizontal;
            }
        }

        let Some((x, y)) = spot else {
            debug!(word = %word, "word cloud is full");
            break;
        };
        let placed = PlacedWord {
            word: word.to_string(),
            weight,
            font_size,
            x: x + config.margin / 2,
            y: y + config.margin / 2,
            orientation,
        };
        let mask = placed.mask();
        occupancy.mark(x, y, mask.width + config.margin, mask.height + config.margin);
        placed_words.push(placed);
        last_weight = weight;
    }

    placed_words
}

impl WordCloud {
    pub fn render(&self) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, WHITE);
        for (rank, placed) in self.words.iter().enumerate() {
            let color = PALETTE[rank % PALETTE.len()];
            let mask = placed.mask();
            for dy in 0..mask.height {
                for dx in 0..mask.width {
                    let (px, py) = (placed.x + dx, placed.y + dy);
                    if mask.get(dx, dy) && px < self.width && py < self.height {
                        img.put_pixel(px, py, color);
                    }
                }
            }
        }
        img
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.render().save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}
