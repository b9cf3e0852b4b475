// textplay: a terminal NLP playground over a local lexicon model.
use std::fs::File;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use clap::{ArgAction, Parser, Subcommand};
use termcolor::{ColorChoice, StandardStream};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod features;
mod i18n;
mod model;
mod nlp;
mod render;

use config::{AppConfig, ModelConfig};
use features::{Feature, FeatureSelection};
use i18n::Locale;
use model::{LanguageModel, ModelError, ModelStatus};

#[derive(Parser)]
#[command(
    name = "textplay",
    about = "NLP playground: sentiment, summaries, named entities, keywords and word clouds"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Name of the language model to load
    #[arg(long, env = "TEXTPLAY_MODEL", global = true)]
    model: Option<String>,
    /// Directory holding installed models
    #[arg(long, env = "TEXTPLAY_MODEL_DIR", global = true)]
    model_dir: Option<PathBuf>,
    /// Directory tree to download missing models from (the bundled model otherwise)
    #[arg(long, env = "TEXTPLAY_MODEL_MIRROR", global = true)]
    mirror: Option<PathBuf>,
    /// More logging (-v info, -vv debug); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze text from --text, --file or stdin
    Analyze {
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,
        /// txt/md/csv/json read as UTF-8; pdf goes through text extraction
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(
            short = 'F',
            long,
            value_enum,
            value_delimiter = ',',
            default_value = "sentiment"
        )]
        features: Vec<Feature>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        #[arg(long, value_enum, default_value_t = Locale::En)]
        lang: Locale,
        /// Where the word cloud PNG goes
        #[arg(long, default_value = "wordcloud.png")]
        cloud_out: PathBuf,
    },
    /// Inspect or install the language model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Show whether the configured model is installed
    Status,
    /// Download the configured model
    Install {
        /// Reinstall even when the model is already present
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_text_file(p: &Path) -> Result<String> {
    let mut s = String::new();
    let mut f = File::open(p)?;
    f.read_to_string(&mut s)?;
    Ok(s)
}

fn read_file_content(p: &Path) -> Result<String> {
    let ext = p.extension().and_then(|s| s.to_str()).unwrap_or("");
    if ext.eq_ignore_ascii_case("pdf") {
        pdf_extract::extract_text(p).map_err(|e| anyhow!("PDF extraction failed: {}", e))
    } else {
        read_text_file(p)
    }
}

/// The input text: `--text`, then `--file`, then piped stdin. A terminal stdin means no text.
fn read_input(text: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return read_file_content(path);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut s = String::new();
    stdin.lock().read_to_string(&mut s)?;
    Ok(s)
}

fn load_model(config: &ModelConfig) -> Result<std::sync::Arc<LanguageModel>> {
    let source = model::source_for(config);
    match model::shared(config, source.as_ref())? {
        ModelStatus::Ready(model) => Ok(model),
        ModelStatus::DownloadFailed { name, reason } => {
            bail!("could not download model {}: {}", name, reason)
        }
    }
}

fn analyze(config: &AppConfig, text: &str, selection: &FeatureSelection) -> Result<()> {
    let model = load_model(&config.model)?;
    let report = features::run(text, selection, &model, config)?;
    info!(sections = report.sections.len(), "analysis complete");

    if config.json {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        let mut out = StandardStream::stdout(ColorChoice::Auto);
        render::render_report(&mut out, &report, config.locale)?;
    }
    Ok(())
}

fn model_status(config: &ModelConfig) -> Result<()> {
    let path = model::model_path(config);
    match LanguageModel::load(&path) {
        Ok(model) => println!(
            "{} {} installed at {}",
            model.meta().name,
            model.meta().version,
            path.display()
        ),
        Err(ModelError::NotFound(_)) => println!("{} is not installed ({})", config.name, path.display()),
        Err(e) => println!("{} is broken: {}", config.name, e),
    }
    Ok(())
}

fn model_install(config: &ModelConfig, force: bool) -> Result<()> {
    let path = model::model_path(config);
    if !force && LanguageModel::load(&path).is_ok() {
        println!("{} is already installed at {}", config.name, path.display());
        return Ok(());
    }
    let source = model::source_for(config);
    let dir = model::provision(config, source.as_ref())?;
    let installed = LanguageModel::load(&dir)?;
    println!(
        "Installed {} {} to {}",
        installed.meta().name,
        installed.meta().version,
        dir.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let model_config = ModelConfig::resolve(cli.model, cli.model_dir, cli.mirror);

    match cli.command {
        Commands::Analyze { text, file, features, json, lang, cloud_out } => {
            let text = read_input(text, file.as_deref())?;
            let selection: FeatureSelection = features.into_iter().collect();
            let config = AppConfig {
                model: model_config,
                locale: lang,
                json,
                cloud_out,
            };
            analyze(&config, &text, &selection)?
        }
        Commands::Model { action: ModelAction::Status } => model_status(&model_config)?,
        Commands::Model { action: ModelAction::Install { force } } => model_install(&model_config, force)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_text_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file_path = temp_dir.path().join("test.txt");
        let mut file = File::create(&file_path)?;
        writeln!(file, "Hello, World!")?;

        let content = read_text_file(&file_path)?;
        assert_eq!(content, "Hello, World!\n");
        Ok(())
    }

    #[test]
    fn test_read_file_content_markdown() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file_path = temp_dir.path().join("notes.md");
        let mut file = File::create(&file_path)?;
        writeln!(file, "# Notes\nRust is fast.")?;

        let content = read_file_content(&file_path)?;
        assert_eq!(content, "# Notes\nRust is fast.\n");
        Ok(())
    }

    #[test]
    fn test_read_file_content_missing() {
        assert!(read_file_content(Path::new("/nonexistent/input.txt")).is_err());
    }

    #[test]
    fn test_read_input_prefers_text() -> Result<()> {
        let input = read_input(Some("hello".to_string()), Some(Path::new("/nonexistent")))?;
        assert_eq!(input, "hello");
        Ok(())
    }

    #[test]
    fn test_cli_parses_feature_list() {
        let cli = Cli::try_parse_from([
            "textplay", "analyze", "--text", "hi", "-F", "ner,keywords,wordcloud,ner", "--lang", "fr",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze { features, lang, cloud_out, .. } => {
                let selection: FeatureSelection = features.into_iter().collect();
                assert_eq!(
                    selection.iter().collect::<Vec<_>>(),
                    vec![Feature::Ner, Feature::Keywords, Feature::WordCloud]
                );
                assert_eq!(lang, Locale::Fr);
                assert_eq!(cloud_out, PathBuf::from("wordcloud.png"));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_cli_defaults_to_sentiment() {
        let cli = Cli::try_parse_from(["textplay", "analyze"]).unwrap();
        match cli.command {
            Commands::Analyze { features, json, lang, .. } => {
                assert_eq!(features, vec![Feature::Sentiment]);
                assert!(!json);
                assert_eq!(lang, Locale::En);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_cli_rejects_text_and_file_together() {
        let parsed = Cli::try_parse_from(["textplay", "analyze", "--text", "a", "--file", "b.txt"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cli_model_install() {
        let cli = Cli::try_parse_from(["textplay", "model", "install", "--force", "--model", "custom"]).unwrap();
        assert_eq!(cli.model.as_deref(), Some("custom"));
        assert!(matches!(
            cli.command,
            Commands::Model { action: ModelAction::Install { force: true } }
        ));
    }

    #[test]
    fn test_model_install_then_status() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = ModelConfig::resolve(None, Some(temp_dir.path().to_path_buf()), None);
        model_install(&config, false)?;
        assert!(model::model_path(&config).join(model::META_FILE).exists());
        // second install is a no-op
        model_install(&config, false)?;
        model_status(&config)?;
        Ok(())
    }
}
