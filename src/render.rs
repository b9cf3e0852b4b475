// Terminal rendering of a `Report`.
use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::features::{Outcome, Report, Section};
use crate::i18n::{Locale, Text};
use crate::nlp::{EntityRecord, Keyword, SentimentLabel, SentimentResult};

// cells on each side of zero
const BAR_HALF_WIDTH: usize = 20;

pub fn render_report<W: WriteColor>(out: &mut W, report: &Report, locale: Locale) -> io::Result<()> {
    for (i, section) in report.sections.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        render_section(out, section, locale)?;
    }
    Ok(())
}

fn render_section<W: WriteColor>(out: &mut W, section: &Section, locale: Locale) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Cyan)))?;
    writeln!(out, "== {} ==", locale.title(section.feature))?;
    out.reset()?;

    match &section.outcome {
        Outcome::Advisory { message } => {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            writeln!(out, "{}", message)?;
            out.reset()
        }
        Outcome::Sentiment(result) => render_sentiment(out, result, locale),
        Outcome::Summary { sentences } => {
            bold_line(out, locale.text(Text::Summary))?;
            for sentence in sentences {
                writeln!(out, "- {}", sentence)?;
            }
            Ok(())
        }
        Outcome::Entities { entities } => render_entities(out, entities, locale),
        Outcome::Keywords { keywords } => render_keywords(out, keywords, locale),
        Outcome::WordCloud { path, words } => {
            if words.is_empty() {
                writeln!(out, "{}", locale.text(Text::CloudEmpty))?;
            }
            writeln!(out, "{} {}", locale.text(Text::CloudSaved), path.display())
        }
    }
}

fn bold_line<W: WriteColor>(out: &mut W, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, "{}", text)?;
    out.reset()
}

fn render_sentiment<W: WriteColor>(out: &mut W, result: &SentimentResult, locale: Locale) -> io::Result<()> {
    let color = match result.label {
        SentimentLabel::Positive => Color::Green,
        SentimentLabel::Neutral => Color::White,
        SentimentLabel::Negative => Color::Red,
    };
    write!(out, "{} ", locale.text(Text::Sentiment))?;
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    writeln!(out, "{}", locale.sentiment(result.label))?;
    out.reset()?;
    writeln!(out, "{} {:.2}", locale.text(Text::Polarity), result.polarity)?;

    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    writeln!(out, "-1 {} +1", polarity_bar(result.polarity))?;
    out.reset()
}

/// Horizontal bar over [-1, 1] with the zero mark in the middle.
pub fn polarity_bar(polarity: f64) -> String {
    let filled = (polarity.abs().min(1.0) * BAR_HALF_WIDTH as f64).round() as usize;
    let (left, right) = if polarity < 0.0 { (filled, 0) } else { (0, filled) };
    format!(
        "{}{}|{}{}",
        " ".repeat(BAR_HALF_WIDTH - left),
        "█".repeat(left),
        "█".repeat(right),
        " ".repeat(BAR_HALF_WIDTH - right),
    )
}

fn render_entities<W: WriteColor>(out: &mut W, entities: &[EntityRecord], locale: Locale) -> io::Result<()> {
    bold_line(out, locale.text(Text::EntitiesFound))?;
    if entities.is_empty() {
        return writeln!(out, "{}", locale.text(Text::NoEntities));
    }

    let header = locale.text(Text::Entity);
    let width = entities
        .iter()
        .map(|e| e.text.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0);

    out.set_color(ColorSpec::new().set_underline(true))?;
    writeln!(out, "{:<width$}  {}", header, locale.text(Text::Category), width = width)?;
    out.reset()?;
    for entity in entities {
        writeln!(out, "{:<width$}  {}", entity.text, entity.label, width = width)?;
    }
    Ok(())
}

fn render_keywords<W: WriteColor>(out: &mut W, keywords: &[Keyword], locale: Locale) -> io::Result<()> {
    bold_line(out, locale.text(Text::TopKeywords))?;
    if keywords.is_empty() {
        return writeln!(out, "{}", locale.text(Text::NoKeywords));
    }
    for (i, keyword) in keywords.iter().enumerate() {
        writeln!(out, "{}. {} ({})", i + 1, keyword.word, keyword.frequency)?;
    }
    Ok(())
}
