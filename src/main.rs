mod cancel;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod report;
mod services;
#[cfg(test)]
mod testing;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cmd::config as config_cmd;
use crate::cmd::summarize::{self, SummarizeArgs};
use crate::config::{AppConfig, ConfigOverrides, SummarizerProvider};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::git::GitCli;
use crate::infra::llm::{CommandSummarizer, HttpSummarizer};
use crate::services::LanguageModelService;

#[derive(Parser)]
#[command(
    name = "worklog",
    author,
    version,
    about = "Summarize who did what in a git repository, day by day"
)]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group commits by author and date and summarize each group.
    Summarize(SummarizeArgs),
    /// Show the effective configuration.
    Config,
}

#[derive(Args)]
struct BackendArgs {
    /// Repository to inspect; defaults to the current directory.
    #[arg(long, global = true)]
    repo: Option<PathBuf>,
    /// Summarization backend: `command` or `http`.
    #[arg(long, global = true)]
    summarizer: Option<String>,
    /// Program and arguments to run per group; the text is written to its stdin.
    #[arg(long, global = true)]
    summarizer_command: Option<String>,
    /// Endpoint for the `http` summarizer.
    #[arg(long, global = true)]
    summarizer_url: Option<String>,
    /// Seconds before a single summarization call is abandoned.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Extra attempts for a failed summarization call.
    #[arg(long, global = true)]
    retries: Option<u32>,
    /// Summarization calls allowed in flight at once.
    #[arg(long, global = true)]
    concurrency: Option<usize>,
    /// Commit diff fetches allowed in flight at once.
    #[arg(long, global = true)]
    fetch_concurrency: Option<usize>,
    /// Abort on the first failed summary instead of reporting it and continuing.
    #[arg(long, global = true)]
    fail_fast: bool,
}

impl From<BackendArgs> for ConfigOverrides {
    fn from(args: BackendArgs) -> Self {
        Self {
            repo: args.repo,
            summarizer: args.summarizer,
            summarizer_command: args.summarizer_command,
            summarizer_url: args.summarizer_url,
            timeout_secs: args.timeout_secs,
            retries: args.retries,
            concurrency: args.concurrency,
            fetch_concurrency: args.fetch_concurrency,
            fail_fast: args.fail_fast,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("worklog={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir()?;
    let config = AppConfig::load(&cwd, cli.backend.into())?;

    match cli.command {
        Commands::Config => {
            config_cmd::run(&config);
            Ok(())
        }
        Commands::Summarize(args) => run_summarize(config, args).await,
    }
}

async fn run_summarize(config: AppConfig, args: SummarizeArgs) -> AppResult<()> {
    let language_model: Arc<dyn LanguageModelService> = match &config.summarizer {
        SummarizerProvider::Command {
            program,
            args: command_args,
        } => Arc::new(CommandSummarizer::new(program.clone(), command_args.clone())),
        SummarizerProvider::Http { endpoint } => Arc::new(HttpSummarizer::new(endpoint.clone())),
    };
    let git = Arc::new(GitCli::new(config.workspace_root.clone()));

    let (cancel_handle, cancellation) = cancel::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; no new backend calls will be issued");
            cancel_handle.cancel();
        }
    });

    let context = AppContext::new(config, git, language_model, cancellation);
    let outcome = summarize::run(&context, args).await?;

    print!("{}", outcome.rendered);
    outcome.into_result()
}
