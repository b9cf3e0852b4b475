// Tokenizer adapter: sentence and content-word splitting backed by the language model.
// The summarizer only talks to the `Tokenizer` trait; the other features use `tokens()`
// directly because they need offsets and the stop-word flag.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{AbbreviationKind, LanguageModel};

// Numbers keep their decimal/thousand separators so "3.5" never ends a sentence.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:[.,]\d+)*|\w+(?:['’]\w+)*|[^\w\s]").unwrap()
});

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[^\S\n]*\n").unwrap());

const CLITICS: [&str; 14] = [
    "n't", "n’t", "'s", "’s", "'re", "’re", "'ll", "’ll", "'ve", "’ve", "'d", "’d", "'m", "’m",
];

/// A raw lexical unit with byte offsets into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// A lexeme annotated with the attributes the features filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub is_alpha: bool,
    pub is_stop: bool,
}

/// What a summarizer needs from a document parser.
pub trait Tokenizer {
    fn to_sentences(&self, text: &str) -> Vec<String>;
    fn to_words(&self, text: &str) -> Vec<String>;
}

/// Split `text` into lexemes. Contractions are split the usual English way
/// ("don't" -> "do" + "n't", "Anna's" -> "Anna" + "'s").
pub fn lex(text: &str) -> Vec<Lexeme<'_>> {
    let mut out = Vec::new();
    for m in TOKEN_PATTERN.find_iter(text) {
        let (start, word) = (m.start(), m.as_str());
        match split_clitic(word) {
            Some(at) => {
                out.push(Lexeme { text: &word[..at], start, end: start + at });
                out.push(Lexeme { text: &word[at..], start: start + at, end: m.end() });
            }
            None => out.push(Lexeme { text: word, start, end: m.end() }),
        }
    }
    out
}

fn split_clitic(word: &str) -> Option<usize> {
    let lower = word.to_lowercase();
    // to_lowercase can change byte lengths for some scripts; only split when it didn't
    if lower.len() != word.len() {
        return None;
    }
    CLITICS
        .iter()
        .find(|c| lower.ends_with(*c) && lower.len() > c.len())
        .map(|c| word.len() - c.len())
}

fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

fn is_terminal(s: &str) -> bool {
    matches!(s, "." | "!" | "?" | "…")
}

fn is_closing(s: &str) -> bool {
    matches!(s, "\"" | "'" | "”" | "’" | ")" | "]" | "»")
}

fn starts_lowercase(s: &str) -> bool {
    s.chars().next().map(char::is_lowercase).unwrap_or(false)
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().map(char::is_uppercase).unwrap_or(false)
}

/// Tokenizer backed by a loaded `LanguageModel` (stop-words and abbreviations).
#[derive(Clone, Copy)]
pub struct ModelTokenizer<'m> {
    model: &'m LanguageModel,
}

impl<'m> ModelTokenizer<'m> {
    pub fn new(model: &'m LanguageModel) -> Self {
        Self { model }
    }

    pub fn tokens<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        lex(text)
            .into_iter()
            .map(|l| Token {
                text: l.text,
                start: l.start,
                end: l.end,
                is_alpha: is_alpha(l.text),
                is_stop: self.model.is_stop_word(l.text),
            })
            .collect()
    }

    /// Byte spans of the sentences in `text`, in order.
    pub fn sentence_spans(&self, text: &str) -> Vec<(usize, usize)> {
        let lexemes = lex(text);
        let mut spans = Vec::new();
        let mut begin: Option<usize> = None;
        let mut i = 0;

        while i < lexemes.len() {
            let tok = lexemes[i];
            let start = *begin.get_or_insert(tok.start);
            let mut end = tok.end;
            let mut split = false;

            if is_terminal(tok.text) {
                // absorb "?!", "..." and closing quotes glued to the terminator
                while let Some(next) = lexemes.get(i + 1) {
                    if next.start == end && (is_terminal(next.text) || is_closing(next.text)) {
                        end = next.end;
                        i += 1;
                    } else {
                        break;
                    }
                }
                split = self.ends_sentence(&lexemes, i, end);
            }

            if !split {
                if let Some(next) = lexemes.get(i + 1) {
                    split = BLANK_LINE.is_match(&text[end..next.start]);
                }
            }

            if split || i + 1 == lexemes.len() {
                spans.push((start, end));
                begin = None;
            }
            i += 1;
        }
        spans
    }

    // `last` is the index of the final lexeme of the terminator run ending at `end`.
    fn ends_sentence(&self, lexemes: &[Lexeme<'_>], last: usize, end: usize) -> bool {
        let next = match lexemes.get(last + 1) {
            Some(next) => next,
            None => return true,
        };
        // "example.com", "U.S.A" and friends
        if next.start == end {
            return false;
        }
        let run_start = lexemes[..=last]
            .iter()
            .rposition(|l| !is_terminal(l.text) && !is_closing(l.text))
            .map(|p| p + 1)
            .unwrap_or(0);
        if lexemes[run_start].text != "." || run_start == 0 {
            return true;
        }
        let prev = lexemes[run_start - 1];
        if prev.end != lexemes[run_start].start {
            return true;
        }
        match self.model.abbreviation(prev.text) {
            Some(AbbreviationKind::Title) => false,
            Some(AbbreviationKind::Abbreviation) => !starts_lowercase(next.text),
            // initials and dotted acronyms: "J. Smith", "the U.S. government"
            None if prev.text.chars().count() == 1 && is_alpha(prev.text) => {
                !starts_uppercase(prev.text) && !starts_lowercase(next.text)
            }
            None => true,
        }
    }
}

impl Tokenizer for ModelTokenizer<'_> {
    fn to_sentences(&self, text: &str) -> Vec<String> {
        self.sentence_spans(text)
            .into_iter()
            .map(|(s, e)| text[s..e].split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn to_words(&self, text: &str) -> Vec<String> {
        self.tokens(text)
            .into_iter()
            .filter(|t| t.is_alpha && !t.is_stop)
            .map(|t| t.text.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LanguageModel;

    fn texts(lexemes: &[Lexeme<'_>]) -> Vec<String> {
        lexemes.iter().map(|l| l.text.to_string()).collect()
    }

    #[test]
    fn test_lex_splits_contractions() {
        assert_eq!(texts(&lex("I don't know")), vec!["I", "do", "n't", "know"]);
        assert_eq!(texts(&lex("Anna's cat.")), vec!["Anna", "'s", "cat", "."]);
    }

    #[test]
    fn test_lex_keeps_decimals() {
        assert_eq!(texts(&lex("It costs 3.50 now")), vec!["It", "costs", "3.50", "now"]);
    }

    #[test]
    fn test_lex_offsets_point_into_source() {
        let text = "Hello, world";
        for l in lex(text) {
            assert_eq!(&text[l.start..l.end], l.text);
        }
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let model = LanguageModel::bundled().unwrap();
        let tokenizer = ModelTokenizer::new(&model);
        assert!(tokenizer.to_sentences("").is_empty());
        assert!(tokenizer.to_words("").is_empty());
        assert!(tokenizer.to_sentences("   \n ").is_empty());
    }

    #[test]
    fn test_to_words_filters_stop_words_and_punctuation() {
        let model = LanguageModel::bundled().unwrap();
        let tokenizer = ModelTokenizer::new(&model);
        let words = tokenizer.to_words("The quick brown fox jumps over the lazy dog, 42 times!");
        assert_eq!(words, vec!["quick", "brown", "fox", "jumps", "lazy", "dog", "times"]);
    }

    #[test]
    fn test_to_sentences_basic() {
        let model = LanguageModel::bundled().unwrap();
        let tokenizer = ModelTokenizer::new(&model);
        let sentences = tokenizer.to_sentences("First one. Second one!  Third one?");
        assert_eq!(sentences, vec!["First one.", "Second one!", "Third one?"]);
    }

    #[test]
    fn test_to_sentences_respects_abbreviations() {
        let model = LanguageModel::bundled().unwrap();
        let tokenizer = ModelTokenizer::new(&model);
        let sentences = tokenizer
            .to_sentences("Mr. Smith met Dr. Jones at 3.30 today. They talked, e.g. about work.");
        assert_eq!(
            sentences,
            vec!["Mr. Smith met Dr. Jones at 3.30 today.", "They talked, e.g. about work."]
        );
    }

    #[test]
    fn test_to_sentences_trailing_fragment_and_quotes() {
        let model = LanguageModel::bundled().unwrap();
        let tokenizer = ModelTokenizer::new(&model);
        let sentences = tokenizer.to_sentences("She said \"stop!\" Then\nwe left");
        assert_eq!(sentences, vec!["She said \"stop!\"", "Then we left"]);
    }

    #[test]
    fn test_to_sentences_blank_line_breaks() {
        let model = LanguageModel::bundled().unwrap();
        let tokenizer = ModelTokenizer::new(&model);
        let sentences = tokenizer.to_sentences("A heading\n\nBody text here.");
        assert_eq!(sentences, vec!["A heading", "Body text here."]);
    }

    #[test]
    fn test_email_does_not_split_sentence() {
        let model = LanguageModel::bundled().unwrap();
        let tokenizer = ModelTokenizer::new(&model);
        let sentences = tokenizer.to_sentences("Write to support@example.com today. Thanks.");
        assert_eq!(sentences.len(), 2);
    }
}
