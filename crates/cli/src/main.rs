mod echo;

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use scanwise_core::report::{self, ReportFormat};
use scanwise_core::{
    Analyzer, AnalyzerConfig, FetchConfig, InputSource, LayoutEstimator, PresetLoader, PresetLoaderBuilder, fetch_file,
    fetch_stdin, fetch_url,
};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    JsonCompact,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" | "jsonl" => Ok(Self::JsonCompact),
            _ => Err(format!("Invalid format: {}. Valid options: text, json, json-compact", s)),
        }
    }
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::JsonCompact => ReportFormat::JsonCompact,
        }
    }
}

/// Score how scannable a web page or HTML document is
#[derive(Parser, Debug)]
#[command(name = "scanwise")]
#[command(author = "Scanwise Contributors")]
#[command(version)]
#[command(about = "Score how scannable a web page or HTML document is", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", required_unless_present = "list_presets")]
    input: Option<String>,

    /// Preset id (default: chosen by URL domain, else "base")
    #[arg(short, long, value_name = "ID")]
    preset: Option<String>,

    /// Directory with <id>.json preset overrides
    #[arg(long, value_name = "DIR")]
    preset_dir: Option<PathBuf>,

    /// Output format (text, json, json-compact)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Lines a paragraph may span before it counts as dense
    #[arg(long, default_value = "5", value_name = "N")]
    line_threshold: usize,

    /// Characters per rendered line for the layout estimate
    #[arg(long, default_value = "80", value_name = "N")]
    chars_per_line: usize,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Skip suggestion evaluation
    #[arg(long)]
    no_suggestions: bool,

    /// List available presets and exit
    #[arg(long)]
    list_presets: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn preset_loader(args: &Args) -> PresetLoader {
    match &args.preset_dir {
        Some(dir) => PresetLoaderBuilder::new().custom_dir(dir).build(),
        None => PresetLoader::default(),
    }
}

fn list_presets(loader: &mut PresetLoader) -> anyhow::Result<()> {
    for id in loader.available_ids() {
        match loader.load(&id) {
            Ok(preset) => println!("{:<14} {}", id.bold(), preset.name),
            Err(e) => echo::print_warning(&format!("{}: {}", id, e)),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut loader = preset_loader(&args);

    if args.list_presets {
        return list_presets(&mut loader);
    }

    let input = args.input.as_deref().context("No input given")?;
    let source = InputSource::detect(input);
    let started = Instant::now();

    if args.verbose {
        echo::print_banner();
    }

    let html = match &source {
        InputSource::Stdin => {
            if args.verbose {
                echo::print_step(1, 4, "Reading from stdin");
            }
            fetch_stdin().context("Failed to read from stdin")?
        }
        InputSource::Url(url) => {
            if args.verbose {
                echo::print_step(1, 4, &format!("Fetching from {}", url.bright_white().underline()));
            }
            let config = FetchConfig {
                timeout: args.timeout,
                user_agent: args.user_agent.clone().unwrap_or_else(|| FetchConfig::default().user_agent),
            };
            fetch_url(url, &config).await.context("Failed to fetch URL")?
        }
        InputSource::File(path) => {
            if args.verbose {
                echo::print_step(1, 4, &format!("Reading from file {}", path.bright_white()));
            }
            fetch_file(path).with_context(|| format!("Failed to read file: {}", path))?
        }
    };

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
        eprintln!();
        echo::print_step(2, 4, "Resolving preset");
    }

    let preset = match (&args.preset, source.url()) {
        (Some(id), _) => loader.load(id).with_context(|| format!("Failed to load preset: {}", id))?,
        (None, Some(url)) => loader.load_for_url(url).context("Failed to select preset for URL")?,
        (None, None) => loader.load("base").context("Failed to load base preset")?,
    };
    tracing::debug!(preset = %preset.id, explicit = args.preset.is_some(), "resolved preset");

    if args.verbose {
        eprintln!("  {} {} ({})", "Preset:".dimmed(), preset.name.bright_white(), preset.id.dimmed());
        eprintln!();
        echo::print_step(3, 4, "Analyzing document");
    }

    let config = AnalyzerConfig::builder()
        .line_threshold(args.line_threshold)
        .skip_suggestions(args.no_suggestions)
        .build();
    let mut analyzer =
        Analyzer::with_config(preset, config).layout(LayoutEstimator::with_chars_per_line(args.chars_per_line));

    let result = analyzer.analyze_html(&html, true).context("Failed to analyze document")?;

    if args.verbose {
        echo::print_score(&result);
        echo::print_timing("Analysis", started.elapsed());
        eprintln!();
        echo::print_step(4, 4, "Writing report");
    }

    let output = report::render(&result, args.format.into()).context("Failed to render report")?;

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Report written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}
