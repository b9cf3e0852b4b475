// Named Entity Recognition using the model gazetteer plus pattern rules.
// Candidates from every rule are collected, then overlaps are resolved: earliest start wins,
// then the longest span, then the rule with the higher priority.
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::LanguageModel;
use crate::nlp::tokenizer::ModelTokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Loc,
    Date,
    Money,
    Percent,
    Cardinal,
    Email,
}

impl EntityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Org => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Loc => "LOC",
            EntityLabel::Date => "DATE",
            EntityLabel::Money => "MONEY",
            EntityLabel::Percent => "PERCENT",
            EntityLabel::Cardinal => "CARDINAL",
            EntityLabel::Email => "EMAIL",
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERSON" => Ok(EntityLabel::Person),
            "ORG" => Ok(EntityLabel::Org),
            "GPE" => Ok(EntityLabel::Gpe),
            "LOC" => Ok(EntityLabel::Loc),
            "DATE" => Ok(EntityLabel::Date),
            "MONEY" => Ok(EntityLabel::Money),
            "PERCENT" => Ok(EntityLabel::Percent),
            "CARDINAL" => Ok(EntityLabel::Cardinal),
            "EMAIL" => Ok(EntityLabel::Email),
            other => Err(format!("unknown entity label {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b").unwrap()
});

static MONEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[$€£]\s?\d+(?:,\d{3})*(?:\.\d+)?(?:\s?(?:million|billion|thousand|[mMbBkK])\b)?|\b\d+(?:,\d{3})*(?:\.\d+)?\s?(?:million\s|billion\s)?(?:USD|EUR|GBP|dollars?|euros?|pounds?)\b").unwrap()
});

static PERCENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d+(?:\.\d+)?\s?(?:%|percent\b|per cent\b)").unwrap()
});

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{4}-\d{1,2}-\d{1,2}|(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}|\d{1,2}\s+(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}|(?:January|February|March|April|June|July|August|September|October|November|December)\s+\d{4}|(?:19|20)\d{2}s?)\b").unwrap()
});

// "yesterday", "next Monday evening", "last year"
static RELATIVE_DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:yesterday|today|tomorrow|tonight|(?:(?:this|next|last)\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)(?:\s+(?:morning|afternoon|evening|night))?|(?:this|next|last)\s+(?:week|weekend|month|year))\b").unwrap()
});

const DAY_WORDS: [&str; 11] = [
    "yesterday",
    "today",
    "tomorrow",
    "tonight",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

static ORGANIZATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[A-Z][\w&]*\s+)*[A-Z][\w&]*\s+(?:(?:Inc|Corp|Ltd|Co)\b\.?|(?:LLC|Corporation|Limited|Company|Group|Institute|University|College|Bank|Foundation|Agency|Association)\b)").unwrap()
});

static HONORIFIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Mr|Mrs|Ms|Dr|Prof|Sir|Madam)\.?\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)").unwrap()
});

static PERSON_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z]\.)?(?:\s+[A-Z][a-z]+)+\b").unwrap()
});

static CARDINAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d+(?:,\d{3})*(?:\.\d+)?\b").unwrap()
});

// lower rank wins when two candidates cover exactly the same span
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rule {
    Email,
    Money,
    Percent,
    Date,
    Gazetteer,
    Organization,
    Honorific,
    Person,
    Cardinal,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    end: usize,
    label: EntityLabel,
    rule: Rule,
}

fn pattern_candidates(
    out: &mut Vec<Candidate>,
    pattern: &Regex,
    text: &str,
    label: EntityLabel,
    rule: Rule,
) {
    for m in pattern.find_iter(text) {
        let trimmed = m.as_str().trim_end_matches(|c: char| c.is_whitespace());
        out.push(Candidate {
            start: m.start(),
            end: m.start() + trimmed.len(),
            label,
            rule,
        });
    }
}

fn gazetteer_candidates(out: &mut Vec<Candidate>, model: &LanguageModel, text: &str) {
    let tokens = ModelTokenizer::new(model).tokens(text);
    for (i, token) in tokens.iter().enumerate() {
        let matched = model.phrases_starting_with(token.text).iter().find(|entry| {
            let window = tokens.get(i..i + entry.tokens.len());
            window.map_or(false, |w| w.iter().zip(&entry.tokens).all(|(t, p)| t.text == p.as_str()))
        });
        if let Some(entry) = matched {
            out.push(Candidate {
                start: token.start,
                end: tokens[i + entry.tokens.len() - 1].end,
                label: entry.label,
                rule: Rule::Gazetteer,
            });
        }
    }
}

// Words of `s` with their byte offsets, `base` added.
fn words_with_offsets(s: &str, base: usize) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut rest = 0;
    for word in s.split_whitespace() {
        let at = s[rest..].find(word).map_or(rest, |p| rest + p);
        out.push((base + at, word));
        rest = at + word.len();
    }
    out
}

fn starts_sentence(text: &str, at: usize) -> bool {
    text[..at]
        .trim_end()
        .chars()
        .last()
        .map_or(true, |c| matches!(c, '.' | '!' | '?'))
}

fn is_day_word(word: &str) -> bool {
    DAY_WORDS.contains(&word.to_lowercase().as_str())
}

// Capitalisation says nothing about the first word of a sentence, so a name starting
// there needs a known given name. Leading stop-words and day words are trimmed.
fn person_candidates(out: &mut Vec<Candidate>, model: &LanguageModel, text: &str) {
    for m in PERSON_PATTERN.find_iter(text) {
        let words = words_with_offsets(m.as_str(), m.start());
        let mut skip = 0;
        while let Some(&(at, word)) = words.get(skip) {
            let unnamed = skip == 0
                && starts_sentence(text, at)
                && (!model.is_first_name(word) || model.polarity(word).is_some());
            if !(unnamed || model.is_stop_word(word) || is_day_word(word)) {
                break;
            }
            skip += 1;
        }
        if let Some(&(start, _)) = words.get(skip) {
            if words.len() - skip >= 2 {
                out.push(Candidate {
                    start,
                    end: m.end(),
                    label: EntityLabel::Person,
                    rule: Rule::Person,
                });
            }
        }
    }
}

pub fn extract_entities(model: &LanguageModel, text: &str) -> Vec<EntityRecord> {
    let mut candidates = Vec::new();

    pattern_candidates(&mut candidates, &EMAIL_PATTERN, text, EntityLabel::Email, Rule::Email);
    pattern_candidates(&mut candidates, &MONEY_PATTERN, text, EntityLabel::Money, Rule::Money);
    pattern_candidates(&mut candidates, &PERCENT_PATTERN, text, EntityLabel::Percent, Rule::Percent);
    pattern_candidates(&mut candidates, &DATE_PATTERN, text, EntityLabel::Date, Rule::Date);
    pattern_candidates(
        &mut candidates,
        &RELATIVE_DATE_PATTERN,
        text,
        EntityLabel::Date,
        Rule::Date,
    );
    gazetteer_candidates(&mut candidates, model, text);
    pattern_candidates(
        &mut candidates,
        &ORGANIZATION_PATTERN,
        text,
        EntityLabel::Org,
        Rule::Organization,
    );
    for cap in HONORIFIC_PATTERN.captures_iter(text) {
        if let Some(name) = cap.get(1) {
            candidates.push(Candidate {
                start: name.start(),
                end: name.end(),
                label: EntityLabel::Person,
                rule: Rule::Honorific,
            });
        }
    }
    person_candidates(&mut candidates, model, text);
    pattern_candidates(
        &mut candidates,
        &CARDINAL_PATTERN,
        text,
        EntityLabel::Cardinal,
        Rule::Cardinal,
    );

    candidates.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then((b.end - b.start).cmp(&(a.end - a.start)))
            .then(a.rule.cmp(&b.rule))
    });

    let mut entities = Vec::new();
    let mut covered_until = 0;
    for c in candidates {
        if c.start < covered_until || c.start == c.end {
            continue;
        }
        covered_until = c.end;
        entities.push(EntityRecord {
            text: text[c.start..c.end].to_string(),
            label: c.label,
            start: c.start,
            end: c.end,
        });
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(entities: &[EntityRecord]) -> Vec<(&str, EntityLabel)> {
        entities.iter().map(|e| (e.text.as_str(), e.label)).collect()
    }

    #[test]
    fn test_extract_entities_from_text() {
        let model = LanguageModel::bundled().unwrap();
        let text = "Barack Obama was born in Hawaii. He worked in Chicago and later became the 44th President of the United States.";
        let entities = extract_entities(&model, text);
        assert_eq!(
            labels(&entities),
            vec![
                ("Barack Obama", EntityLabel::Person),
                ("Hawaii", EntityLabel::Gpe),
                ("Chicago", EntityLabel::Gpe),
                ("United States", EntityLabel::Gpe),
            ]
        );
    }

    #[test]
    fn test_extract_email() {
        let model = LanguageModel::bundled().unwrap();
        let entities = extract_entities(&model, "Contact us at support@example.com for more information.");
        assert_eq!(labels(&entities), vec![("support@example.com", EntityLabel::Email)]);
    }

    #[test]
    fn test_extract_date_money_percent() {
        let model = LanguageModel::bundled().unwrap();
        let text = "On Jan 15, 2024 the company raised $5 million, up 12% on last year.";
        let entities = extract_entities(&model, text);
        assert_eq!(
            labels(&entities),
            vec![
                ("Jan 15, 2024", EntityLabel::Date),
                ("$5 million", EntityLabel::Money),
                ("12%", EntityLabel::Percent),
                ("last year", EntityLabel::Date),
            ]
        );
    }

    #[test]
    fn test_honorific_and_organization() {
        let model = LanguageModel::bundled().unwrap();
        let text = "Dr. Jane Goodall spoke at Stanford University about Google.";
        let entities = extract_entities(&model, text);
        assert_eq!(
            labels(&entities),
            vec![
                ("Jane Goodall", EntityLabel::Person),
                ("Stanford University", EntityLabel::Org),
                ("Google", EntityLabel::Org),
            ]
        );
    }

    #[test]
    fn test_repeated_entities_are_separate_rows_in_order() {
        let model = LanguageModel::bundled().unwrap();
        let text = "Paris is lovely. I moved from London to Paris.";
        let entities = extract_entities(&model, text);
        assert_eq!(
            labels(&entities),
            vec![
                ("Paris", EntityLabel::Gpe),
                ("London", EntityLabel::Gpe),
                ("Paris", EntityLabel::Gpe),
            ]
        );
        assert!(entities.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn test_leading_stop_word_is_not_part_of_a_name() {
        let model = LanguageModel::bundled().unwrap();
        let entities = extract_entities(&model, "Then Jane Smith arrived.");
        assert_eq!(labels(&entities), vec![("Jane Smith", EntityLabel::Person)]);
    }

    #[test]
    fn test_sentence_initial_word_is_not_a_first_name() {
        let model = LanguageModel::bundled().unwrap();
        let text = "Yesterday Barack Obama visited Paris. Apple Pie tastes great.";
        let entities = extract_entities(&model, text);
        assert_eq!(
            labels(&entities)[..3],
            [
                ("Yesterday", EntityLabel::Date),
                ("Barack Obama", EntityLabel::Person),
                ("Paris", EntityLabel::Gpe),
            ]
        );
        assert!(entities
            .iter()
            .all(|e| e.label != EntityLabel::Person || e.text == "Barack Obama"));
    }

    #[test]
    fn test_relative_dates() {
        let model = LanguageModel::bundled().unwrap();
        let text = "We met on Monday John Smith and will meet again next Friday evening, not tomorrow.";
        let entities = extract_entities(&model, text);
        assert_eq!(
            labels(&entities),
            vec![
                ("Monday", EntityLabel::Date),
                ("John Smith", EntityLabel::Person),
                ("next Friday evening", EntityLabel::Date),
                ("tomorrow", EntityLabel::Date),
            ]
        );
    }

    #[test]
    fn test_name_after_sentence_break_needs_known_first_name() {
        let model = LanguageModel::bundled().unwrap();
        let entities = extract_entities(&model, "It rained. Mary Jones stayed in. Great Scott laughed.");
        assert_eq!(labels(&entities), vec![("Mary Jones", EntityLabel::Person)]);
    }

    #[test]
    fn test_no_entities_in_plain_text() {
        let model = LanguageModel::bundled().unwrap();
        assert!(extract_entities(&model, "nothing to see here").is_empty());
        assert!(extract_entities(&model, "").is_empty());
    }

    #[test]
    fn test_label_round_trips_through_str() {
        for label in [EntityLabel::Person, EntityLabel::Gpe, EntityLabel::Email] {
            assert_eq!(label.as_str().parse::<EntityLabel>().unwrap(), label);
        }
        assert!("THING".parse::<EntityLabel>().is_err());
    }
}
