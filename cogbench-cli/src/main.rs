//! Command-line interface for running and scoring experiments.
//!
//! `cogbench run` sends repeated prompts for each example to a provider
//! and writes results files; `cogbench evaluate` scores results files
//! against gold datasets.

mod config;

use clap::{Parser, Subcommand};
use cogbench_core::{
    ExperimentConfig, GenerationConfig, PromptType, ProviderKind, ProviderRegistry, TaskType,
};
use cogbench_eval::{EvalReport, Evaluator, Metric};
use cogbench_runner::{ExperimentRunner, RunProgress, RunSummary};
use config::CliConfig;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Benchmark harness for categorical reasoning experiments on LLMs.
#[derive(Parser, Debug)]
#[command(name = "cogbench")]
#[command(about = "Run NLI and factual-correctness experiments and score the results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the credentials config file
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an experiment against a provider
    Run(RunArgs),
    /// Score results files against gold datasets
    Evaluate(EvalArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Input data files, relative to --data-dir
    #[arg(required = true)]
    files: Vec<String>,

    /// Provider: openai, azure-openai, gemini, ollama
    #[arg(long, short = 'p')]
    provider: String,

    /// Model name, e.g. "gpt-4o" or "gemini-2.5-pro"
    #[arg(long, short = 'm')]
    model: String,

    /// Task: nli or factual
    #[arg(long, short = 't')]
    task: String,

    /// Prompting strategy: direct or cot
    #[arg(long, default_value = "direct")]
    prompt_type: String,

    /// Directory containing input data files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory to write results files into
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,

    /// Project root containing the prompts/ directory
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Repeated generations per example
    #[arg(long, default_value_t = 10)]
    num_runs: usize,

    /// Maximum concurrent generation calls
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Maximum tokens per response
    #[arg(long, default_value_t = 2000)]
    max_tokens: u32,

    /// Sampling temperature
    #[arg(long, default_value_t = 1.0)]
    temperature: f32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// API key (overrides the config file and environment)
    #[arg(long)]
    api_key: Option<String>,
}

impl RunArgs {
    /// Validate and convert CLI strings into an experiment config.
    fn experiment_config(&self, cli_config: &CliConfig) -> Result<ExperimentConfig, String> {
        let provider: ProviderKind = self.provider.parse().map_err(|e| format!("{e}"))?;
        let task: TaskType = self.task.parse().map_err(|e| format!("{e}"))?;
        let prompt_type: PromptType = self.prompt_type.parse().map_err(|e| format!("{e}"))?;

        if self.num_runs == 0 {
            return Err("num-runs must be greater than 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature ({}) must be between 0.0 and 2.0",
                self.temperature
            ));
        }

        let generation = GenerationConfig::default()
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_timeout(Duration::from_secs(self.timeout));

        Ok(
            ExperimentConfig::new(provider, &self.model, task, prompt_type)
                .with_dirs(&self.data_dir, &self.output_dir)
                .with_input_files(self.files.clone())
                .with_num_runs(self.num_runs)
                .with_concurrency(self.concurrency)
                .with_generation(generation)
                .with_credentials(cli_config.credentials(provider, self.api_key.as_deref())),
        )
    }
}

#[derive(clap::Args, Debug)]
struct EvalArgs {
    /// Task: nli or factual
    #[arg(long, short = 't')]
    task: String,

    /// Directory of results files, one subdirectory per model
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Directory containing gold data files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Restrict evaluation to one model directory
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Metric to render: accuracy or f1
    #[arg(long, default_value = "accuracy")]
    metric: String,

    /// Output format: table, latex, or json
    #[arg(long, short = 'o', default_value = "table")]
    output: String,

    /// Output file (defaults to stdout)
    #[arg(long)]
    output_file: Option<PathBuf>,
}

impl EvalArgs {
    fn validate(&self) -> Result<(TaskType, Metric), String> {
        let task: TaskType = self.task.parse().map_err(|e| format!("{e}"))?;
        let metric = match self.metric.to_lowercase().as_str() {
            "accuracy" => Metric::Accuracy,
            "f1" | "macro-f1" => Metric::F1,
            other => return Err(format!("Invalid metric '{other}'. Use accuracy or f1.")),
        };
        if !["table", "latex", "json"].contains(&self.output.as_str()) {
            return Err(format!(
                "Invalid output format '{}'. Use table, latex, or json.",
                self.output
            ));
        }
        Ok((task, metric))
    }
}

async fn run_experiment(args: &RunArgs, cli_config: &CliConfig) -> Result<RunSummary, String> {
    let config = args.experiment_config(cli_config)?;
    let client = ProviderRegistry::builtin()
        .create(&config)
        .map_err(|e| format!("{e}"))?;

    eprintln!("=== Cogbench Run ===");
    eprintln!("Provider: {}", config.provider);
    eprintln!("Model: {}", config.model_name);
    eprintln!("Task: {} ({})", config.task, config.prompt_type);
    eprintln!("Files: {}", config.input_files.join(", "));
    eprintln!(
        "Runs per example: {} (concurrency {})",
        config.num_runs, config.concurrency
    );
    eprintln!();

    let runner = ExperimentRunner::new(config, client, &args.project_root);

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .map_err(|e| format!("Invalid progress template: {e}"))?
            .progress_chars("#>-"),
    );

    let summary = runner
        .run_with_progress(|progress| match progress {
            RunProgress::FileStarted {
                file, total_calls, ..
            } => {
                progress_bar.inc_length(total_calls as u64);
                progress_bar.set_message(file);
            }
            RunProgress::CallFinished { succeeded } => {
                progress_bar.inc(1);
                if !succeeded {
                    progress_bar.set_message("(some failures)");
                }
            }
            RunProgress::FileWritten { path } => {
                progress_bar.println(format!("Wrote {}", path.display()));
            }
        })
        .await
        .map_err(|e| format!("{e}"))?;

    progress_bar.finish_with_message("Complete");

    eprintln!();
    eprintln!(
        "{} calls, {} recorded as errors, {} files written",
        summary.total_calls,
        summary.failed_calls,
        summary.files_written.len()
    );
    Ok(summary)
}

async fn run_evaluation(args: &EvalArgs) -> Result<EvalReport, String> {
    let (task, _) = args.validate()?;

    let mut evaluator = Evaluator::new(&args.results_dir, &args.data_dir, task);
    if let Some(model) = &args.model {
        evaluator = evaluator.with_model(model);
    }
    evaluator.evaluate().await.map_err(|e| format!("{e}"))
}

fn output_report(report: &EvalReport, args: &EvalArgs) -> Result<(), String> {
    let (_, metric) = args.validate()?;
    let rendered = match args.output.as_str() {
        "table" => report.render_table(metric),
        "latex" => report.render_latex(metric),
        "json" => report
            .to_json()
            .map_err(|e| format!("Failed to serialize report: {e}"))?,
        _ => unreachable!(), // Already validated
    };

    match &args.output_file {
        Some(path) => {
            std::fs::write(path, &rendered)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            eprintln!("Report written to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    for failure in &report.failures {
        eprintln!(
            "Skipped {}/{}: {}",
            failure.model, failure.unit, failure.reason
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let cli_config = match CliConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match &cli.command {
        Command::Run(args) => match run_experiment(args, &cli_config).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
        Command::Evaluate(args) => match run_evaluation(args).await {
            Ok(report) => {
                if let Err(e) = output_report(&report, args) {
                    eprintln!("Error: {e}");
                    return ExitCode::FAILURE;
                }
                if report.has_failures() {
                    return ExitCode::FAILURE;
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}
