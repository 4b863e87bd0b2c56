//! Verification code extraction CLI.
//!
//! Reads a JSON array of mailbox messages (REST or Graph spelling) and prints
//! the ranked verification codes found in them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};

use otpscan::domain::ContentNormalizer;
use otpscan::extraction::adapt_messages;
use otpscan::{CodeCharset, DedupMode, ExtractionConfig, ExtractionService, RankedResult};

/// Verification code extractor
///
/// Finds one-time verification codes in mailbox messages and ranks them.
/// By default, extracts codes. Use 'explain' or 'normalize' for debugging.
#[derive(Parser)]
#[command(name = "otpscan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON file with an array of messages ('-' for stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// JSON config file (missing fields take defaults)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// How duplicate codes are collapsed
    #[arg(long, value_enum)]
    dedup: Option<DedupArg>,

    /// Characters of context inspected around each candidate
    #[arg(long, value_name = "CHARS")]
    window: Option<usize>,

    /// Also accept uppercase alphanumeric codes after a strong keyword
    #[arg(long)]
    alphanumeric: bool,

    /// Keep 5-digit codes instead of treating them as ZIP codes
    #[arg(long)]
    keep_zip: bool,

    /// Print only the best code
    #[arg(long)]
    top: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized text of an HTML body (for debugging)
    Normalize {
        /// HTML or text file ('-' for stdin)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show every candidate per message with its score and verdict
    Explain {
        /// JSON file with an array of messages ('-' for stdin)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DedupArg {
    /// Same code from the same sender collapses
    CodeSender,
    /// Same code collapses regardless of sender
    Code,
}

impl From<DedupArg> for DedupMode {
    fn from(arg: DedupArg) -> Self {
        match arg {
            DedupArg::CodeSender => DedupMode::CodeSender,
            DedupArg::Code => DedupMode::Code,
        }
    }
}

/// Command handler owning the configured service.
struct ExtractionHandler {
    service: ExtractionService,
    verbose: bool,
}

impl ExtractionHandler {
    fn new(config: ExtractionConfig, verbose: bool) -> Result<Self> {
        let service = ExtractionService::new(config).context("Invalid configuration")?;
        Ok(Self { service, verbose })
    }

    fn load_batch(&self, input: &Path) -> Result<serde_json::Value> {
        let raw = read_input(input)?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse JSON from {}", input.display()))
    }

    /// Extracts and prints ranked codes.
    fn extract(&self, input: &Path, top: bool, json: bool) -> Result<()> {
        let batch = self.load_batch(input)?;
        let mut results = self
            .service
            .extract_json(&batch)
            .with_context(|| "Extraction failed")?;

        if top {
            results.truncate(1);
        }

        if self.verbose {
            let total = batch.as_array().map_or(0, Vec::len);
            eprintln!("Input:    {}", input.display());
            eprintln!("Messages: {}", total);
            eprintln!("Results:  {}", results.len());
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else if results.is_empty() {
            println!("⚠ No code found");
        } else {
            println!("✓ Found {} code(s)", results.len());
            for (rank, result) in results.iter().enumerate() {
                println!("{}", format_result(rank + 1, result));
            }
        }

        Ok(())
    }

    /// Prints per-message candidate analysis.
    fn explain(&self, input: &Path) -> Result<()> {
        let batch = self.load_batch(input)?;
        let items = batch
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Expected a JSON array of messages"))?;

        for message in adapt_messages(items) {
            let analysis = self.service.analyze(&message);
            println!("{} ({})", analysis.message_id, analysis.sender);
            if analysis.candidates.is_empty() {
                println!("  no candidates");
            }
            for c in &analysis.candidates {
                println!(
                    "  {:<8} {:<6} pos {:<5} score {:>6.2}  {}",
                    c.code,
                    c.tier,
                    c.position,
                    c.score,
                    c.verdict.reason()
                );
                if self.verbose {
                    let b = &c.breakdown;
                    println!(
                        "           tier {:.1} + keywords {:.1} + format {:.1} + position {:.1} + subject {:.1}",
                        b.tier, b.keywords, b.format, b.position, b.subject
                    );
                }
            }
        }

        Ok(())
    }

    /// Prints the normalized text of an HTML body.
    fn normalize(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        let html = read_input(input)?;
        let text = ContentNormalizer::clean_text(&html);

        if let Some(output_path) = output {
            std::fs::write(output_path, &text)
                .with_context(|| format!("Failed to write to {}", output_path.display()))?;
            println!(
                "✓ Normalized {} characters → {}",
                text.chars().count(),
                output_path.display()
            );
        } else {
            println!("{}", text);
        }

        Ok(())
    }
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn format_result(rank: usize, result: &RankedResult) -> String {
    format!(
        "  {}. {:<8} score {:>6.2}  {:<6}  {}  {}  \"{}\"",
        rank,
        result.code,
        result.score,
        result.priority,
        result.sender,
        result.received_at.to_rfc3339(),
        result.subject
    )
}

/// Builds the effective config from an optional file plus flag overrides.
fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let mut config = match &cli.config {
        Some(path) => ExtractionConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExtractionConfig::default(),
    };

    if let Some(dedup) = cli.dedup {
        config = config.with_dedup(dedup.into());
    }
    if let Some(window) = cli.window {
        config = config.with_context_window(window);
    }
    if cli.alphanumeric {
        config = config.with_charset(CodeCharset::Alphanumeric);
    }
    if cli.keep_zip {
        config = config.with_zip_rejection(false);
    }

    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        otpscan::logging::init_tracing_json(cli.verbose);
    } else {
        otpscan::logging::init_tracing(cli.verbose);
    }

    let handler = ExtractionHandler::new(build_config(&cli)?, cli.verbose)?;

    match &cli.command {
        Some(Commands::Normalize { input, output }) => {
            handler.normalize(input, output.as_deref())?;
        }
        Some(Commands::Explain { input }) => {
            handler.explain(input)?;
        }
        None => {
            let input = cli
                .input
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--input is required"))?;
            handler.extract(input, cli.top, cli.json)?;
        }
    }

    Ok(())
}
