// Text analysis features. Each one is a pure function of the input text and the shared model.
pub mod keywords;
pub mod ner;
pub mod sentiment;
pub mod summarization;
pub mod svd;
pub mod tokenizer;
pub mod wordcloud;

pub use keywords::{extract_keywords, Keyword, TOP_KEYWORDS};
pub use ner::{extract_entities, EntityLabel, EntityRecord};
pub use sentiment::{analyze_sentiment, SentimentLabel, SentimentResult};
pub use summarization::{summarize_text, SUMMARY_SENTENCES};
pub use tokenizer::{ModelTokenizer, Tokenizer};
pub use wordcloud::{PlacedWord, WordCloud};
