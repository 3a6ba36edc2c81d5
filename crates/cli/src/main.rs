use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use seoscope_core::{
    Analyzer, AnalyzerConfig, JsonConfig, TextConfig, convert_to_json, convert_to_text, fetch_file, fetch_stdin,
    fetch_url,
};
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

use echo::{format_size, print_banner, print_detail, print_info, print_step, print_success, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for the analysis report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, json", s)),
        }
    }
}

/// Score the SEO content quality of a web page
#[derive(Parser, Debug)]
#[command(name = "seoscope")]
#[command(author = "Seoscope Contributors")]
#[command(version)]
#[command(about = "Score web page content quality, readability and near-duplicates", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "10", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Reference corpus CSV with url, title and embedding columns
    #[arg(long, value_name = "FILE")]
    reference: Option<PathBuf>,

    /// Quality model JSON
    #[arg(long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Label encoder JSON
    #[arg(long, value_name = "FILE")]
    encoder: Option<PathBuf>,

    /// Fitted TF-IDF vectorizer shared with the reference corpus
    #[arg(long, value_name = "FILE")]
    vectorizer: Option<PathBuf>,

    /// Minimum similarity for a reference page to be reported
    #[arg(long, default_value = "0.70", value_name = "SCORE")]
    threshold: f64,

    /// Number of keywords to report
    #[arg(long, default_value = "5", value_name = "NUM")]
    keywords: usize,

    /// Include reading level, verdict source and class probabilities
    #[arg(long)]
    details: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Args {
    fn analyzer_config(&self) -> AnalyzerConfig {
        let mut builder = AnalyzerConfig::builder()
            .timeout(self.timeout)
            .threshold(self.threshold)
            .keyword_count(self.keywords);

        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(path) = &self.reference {
            builder = builder.reference_path(path);
        }
        if let Some(path) = &self.model {
            builder = builder.model_path(path);
        }
        if let Some(path) = &self.encoder {
            builder = builder.encoder_path(path);
        }
        if let Some(path) = &self.vectorizer {
            builder = builder.vectorizer_path(path);
        }

        builder.build()
    }
}

fn is_web_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seoscope_core=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "seoscope", &mut io::stdout());
        return Ok(());
    }

    let input = args.input.clone().context("No input given")?;

    if args.verbose {
        init_tracing();
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let config = args.analyzer_config();

    let html = if input == "-" {
        if args.verbose {
            print_step(1, 4, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")?
    } else if is_web_url(&input) {
        if args.verbose {
            print_step(1, 4, &format!("Fetching from {}", input.bright_white().underline()));
        }
        fetch_url(&input, &config.fetch).await.context("Failed to fetch URL")?
    } else {
        if args.verbose {
            print_step(1, 4, &format!("Reading from file {}", input.bright_white()));
        }
        fetch_file(&input).with_context(|| format!("Failed to read file: {}", input))?
    };

    if args.verbose {
        print_detail("Size", &format_size(html.len()));
        eprintln!();
        print_step(2, 4, "Loading quality model");
    }

    let analyzer = Analyzer::new(config).context("Failed to load analysis artifacts")?;

    if args.verbose {
        if analyzer.classifier().is_trained() {
            print_detail("Classifier", "trained model");
        } else {
            print_warning("No usable model found, using heuristic rules");
        }
        eprintln!();
        print_step(3, 4, "Analyzing content");
    }

    let analysis = analyzer.analyze_html(&html, &input).context("Failed to analyze page")?;

    if args.verbose {
        print_detail("Title", analysis.title());
        print_detail("Words", &analysis.features.word_count.to_string());
        print_detail("Similar pages", &analysis.similar.len().to_string());
        eprintln!();
        print_step(4, 4, "Writing report");
        print_detail("Format", &format!("{:?}", args.format));
        eprintln!();
    }

    let output = match args.format {
        OutputFormat::Text => {
            let config = TextConfig { show_weights: args.details, include_details: args.details };
            convert_to_text(&analysis, &config).context("Failed to render text report")?
        }
        OutputFormat::Json => {
            let config = JsonConfig { include_details: args.details, pretty: true };
            convert_to_json(&analysis, &config).context("Failed to render JSON report")?
        }
    };

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Report written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
