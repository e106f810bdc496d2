mod config;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use assertive_rewriter::console::{render_outcome, Console, OutputFormat};
use assertive_rewriter::controller::{Analyzer, Outcome};
use assertive_rewriter::provider::HubModelProvider;
use assertive_rewriter::text_classification::DeviceRequest;
use assertive_rewriter::HubModel;

use config::Config;

/// Detect the emotion of a sentence and rewrite it in an assertive tone
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Analyze this sentence and exit instead of starting a session
    #[arg(short, long)]
    sentence: Option<String>,

    /// Config file (default: ~/.assertive-rewriter/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run on a CUDA device (index defaults to 0)
    #[arg(long, num_args = 0..=1, default_missing_value = "0", value_name = "INDEX")]
    cuda: Option<usize>,

    /// Skip sentiment analysis
    #[arg(long)]
    no_sentiment: bool,

    /// Sentiment checkpoint, as owner/name[@revision]
    #[arg(long, value_name = "MODEL")]
    sentiment_model: Option<HubModel>,

    /// Emotion checkpoint, as owner/name[@revision]
    #[arg(long, value_name = "MODEL")]
    emotion_model: Option<HubModel>,

    /// Load models on the first request instead of at startup
    #[arg(long)]
    lazy: bool,

    /// Print one JSON object per result
    #[arg(long)]
    json: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_to(&self, config: &mut Config) {
        if let Some(model) = &self.sentiment_model {
            config.sentiment_model = Some(model.clone());
        }
        if self.no_sentiment {
            config.sentiment_model = None;
        }
        if let Some(model) = &self.emotion_model {
            config.emotion_model = model.clone();
        }
        if self.cuda.is_some() {
            config.cuda_device = self.cuda;
        }
        if self.lazy {
            config.eager_load = false;
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries results only.
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };
    let mut config = Config::load(&config_path)?;
    args.apply_to(&mut config);

    if args.write_config {
        config
            .save(&config_path)
            .with_context(|| format!("Could not write {}", config_path.display()))?;
        println!("Wrote {}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let device = DeviceRequest::from(config.cuda_device);
    let provider = HubModelProvider::new(config.sentiment_model.clone(), config.emotion_model.clone())
        .on_device(device);
    let mut analyzer = Analyzer::new(provider);
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    if let Some(sentence) = &args.sentence {
        let outcome = analyzer.analyze(sentence);
        let mut stdout = io::stdout().lock();
        render_outcome(&mut stdout, &outcome, format)?;
        return Ok(match outcome {
            Outcome::Failed { .. } => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        });
    }

    if config.eager_load {
        if let Err(e) = analyzer.warm_up() {
            error!(error = %e, "could not load the models, will retry on the first request");
        }
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut console = Console::new(stdin.lock(), io::stdout().lock()).format(format);
    if !interactive {
        console = console.without_prompt();
    }

    let summary = console.run(&mut analyzer)?;
    info!(total = summary.total(), "bye");
    Ok(ExitCode::SUCCESS)
}
