//! CLI for yaml-updater.
//!
//! Updates a key in YAML files on GitHub, either one file given on the command
//! line or a batch described in a TOML file, and optionally opens pull
//! requests for the changes.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use yaml_updater::{
    load_inputs, ConfigError, Input, RunSummary, Runner, RunnerConfig, RunnerError,
    TemplateRenderer, UpdateDefinition,
};

const COMMAND_LINE: &str = "<command line>";

/// yaml-updater - Set a key in a YAML file on GitHub and optionally open a PR.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// GitHub API base URL, for GitHub Enterprise.
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// TOML file with `[[update]]` tables. Replaces the single-update flags.
    #[arg(long, conflicts_with_all = ["repo", "file", "key", "value"])]
    config: Option<PathBuf>,

    /// Repository in owner/name form.
    #[arg(long)]
    repo: Option<String>,

    /// Path of the YAML file in the repository.
    #[arg(long)]
    file: Option<String>,

    /// Source branch.
    #[arg(long, default_value = "main")]
    branch: String,

    /// Dotted key path to set.
    #[arg(long)]
    key: Option<String>,

    /// New value for the key.
    #[arg(long)]
    value: Option<String>,

    /// Commit to a new branch with this prefix and open a pull request.
    #[arg(long)]
    branch_generate_name: Option<String>,

    /// Commit message template.
    #[arg(long)]
    commit_message: Option<String>,

    /// Pull request title template.
    #[arg(long)]
    pr_title: Option<String>,

    /// Pull request body template.
    #[arg(long)]
    pr_body: Option<String>,

    /// Preview changes without touching the repositories.
    #[arg(long)]
    dry_run: bool,

    /// Maximum concurrent updates.
    #[arg(long, default_value_t = 5)]
    concurrency: usize,

    /// Abandon an update that takes longer than this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Installs the global subscriber: compact single-line output, filtered by
/// `RUST_LOG` (default "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let renderer = TemplateRenderer::new();
    let inputs = match &args.config {
        Some(path) => load_inputs(path, &renderer)?,
        None => vec![single_input(&args, &renderer)?],
    };

    let mut config = RunnerConfig::new(args.token, args.dry_run, args.concurrency);
    if let Some(api_url) = args.api_url {
        config = config.with_api_url(api_url);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let runner = Runner::new(config)?;
    Ok(runner.run(&inputs).await)
}

/// Builds the update described by the single-update flags.
fn single_input(args: &Args, renderer: &TemplateRenderer) -> Result<Input, ConfigError> {
    let (Some(repo), Some(file), Some(key), Some(value)) =
        (&args.repo, &args.file, &args.key, &args.value)
    else {
        return Err(ConfigError::ValidationError {
            path: COMMAND_LINE.to_string(),
            message: "either --config or all of --repo, --file, --key and --value are required"
                .to_string(),
        });
    };

    let mut definition = UpdateDefinition::new(repo, file, key, value);
    definition.branch.clone_from(&args.branch);
    definition
        .branch_generate_name
        .clone_from(&args.branch_generate_name);
    if let Some(message) = &args.commit_message {
        definition.commit_message.clone_from(message);
    }
    if let Some(title) = &args.pr_title {
        definition.pull_request.title.clone_from(title);
    }
    if let Some(body) = &args.pr_body {
        definition.pull_request.body.clone_from(body);
    }

    definition.validate(COMMAND_LINE)?;
    definition.to_input(renderer, COMMAND_LINE)
}

fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Updates processed: {}", summary.updates_processed);

    if !summary.dry_run {
        println!("  Files updated: {}", summary.files_updated);
        println!("  PRs created: {}", summary.prs_created);
        println!("  Failed: {}", summary.failed);
    }
}
