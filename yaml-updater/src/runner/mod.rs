//! Runs a batch of updates through a shared [`Updater`].

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::client::{GitClient, OctocrabClient};
use crate::summary::{ProcessingResult, RunSummary};
use crate::updater::{Input, Updater};
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};
use url::Url;

/// Orchestrates a batch of updates.
pub struct Runner<C> {
    config: RunnerConfig,
    updater: Updater<C>,
}

impl Runner<OctocrabClient> {
    /// Builds a runner talking to GitHub.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the API URL is invalid or the client cannot
    /// be created.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        if let Some(api_url) = config.api_url() {
            Url::parse(api_url).map_err(|source| RunnerError::InvalidApiUrl {
                url: api_url.to_string(),
                source,
            })?;
        }
        let client = OctocrabClient::for_token(config.token(), config.api_url())?;
        Ok(Self::with_updater(config, Updater::new(client)))
    }
}

impl<C: GitClient> Runner<C> {
    /// Builds a runner around an existing updater.
    pub fn with_updater(config: RunnerConfig, updater: Updater<C>) -> Self {
        Self { config, updater }
    }

    /// Returns the updater shared by all updates.
    pub fn updater(&self) -> &Updater<C> {
        &self.updater
    }

    /// Applies every input, up to `concurrency` at a time.
    ///
    /// Failures are recorded in the summary; they never stop the rest of the
    /// batch.
    pub async fn run(&self, inputs: &[Input]) -> RunSummary {
        let mut summary = RunSummary::new(self.config.dry_run());

        if inputs.is_empty() {
            warn!("No updates to apply");
            return summary;
        }
        info!(count = inputs.len(), "Applying updates");

        if self.config.dry_run() {
            print_dry_run_preview(inputs);
            for input in inputs {
                summary.record_result(&ProcessingResult::Skipped {
                    repository: input.repo.clone(),
                    reason: "dry run".to_string(),
                });
            }
            return summary;
        }

        let results: Vec<ProcessingResult> = stream::iter(inputs)
            .map(|input| self.process_update(input))
            .buffer_unordered(self.config.concurrency())
            .collect()
            .await;

        for result in &results {
            summary.record_result(result);
        }
        summary
    }

    async fn process_update(&self, input: &Input) -> ProcessingResult {
        info!(repo = %input.repo, filename = %input.filename, key = %input.key, "Processing update");

        let outcome = match self.config.timeout() {
            Some(limit) => match tokio::time::timeout(limit, self.updater.update_yaml(input)).await
            {
                Ok(outcome) => outcome.map_err(|e| e.to_string()),
                Err(_) => Err(format!("timed out after {} seconds", limit.as_secs())),
            },
            None => self
                .updater
                .update_yaml(input)
                .await
                .map_err(|e| e.to_string()),
        };

        match outcome {
            Ok(pull_request) => {
                if let Some(pr) = &pull_request {
                    info!(repo = %input.repo, pr_number = pr.number, link = %pr.link, "Pull request opened");
                } else {
                    info!(repo = %input.repo, branch = %input.branch, "Committed directly");
                }
                ProcessingResult::Updated {
                    repository: input.repo.clone(),
                    filename: input.filename.clone(),
                    pull_request,
                }
            }
            Err(e) => {
                error!(repo = %input.repo, filename = %input.filename, error = %e, "Update failed");
                ProcessingResult::Failed {
                    repository: input.repo.clone(),
                    filename: input.filename.clone(),
                    error: e,
                }
            }
        }
    }
}

fn print_dry_run_preview(inputs: &[Input]) {
    for (i, input) in inputs.iter().enumerate() {
        println!(
            "\n[DRY RUN] [{}/{}] {}:{}@{}",
            i + 1,
            inputs.len(),
            input.repo,
            input.filename,
            input.branch
        );
        println!("  Would set: {} = {}", input.key, input.new_value);
        println!("  Commit message: {}", input.commit_message);
        if input.branch_generate_name.is_empty() {
            println!("  Would commit directly to {}", input.branch);
        } else {
            println!(
                "  Would create branch {}<suffix> and open PR \"{}\" into {}",
                input.branch_generate_name, input.pull_request.title, input.branch
            );
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FakeGitClient;
    use crate::names::RandomNameGenerator;
    use crate::updater::PullRequestInput;

    const REPO: &str = "testorg/testrepo";

    fn input(filename: &str, branch_generate_name: &str) -> Input {
        Input {
            repo: REPO.to_string(),
            filename: filename.to_string(),
            key: "image.tag".to_string(),
            new_value: "v2".to_string(),
            branch: "main".to_string(),
            branch_generate_name: branch_generate_name.to_string(),
            commit_message: "bump".to_string(),
            pull_request: PullRequestInput {
                title: "bump".to_string(),
                body: String::new(),
            },
        }
    }

    fn fake_client() -> FakeGitClient {
        let client = FakeGitClient::new();
        client.add_branch_head(REPO, "main", "980a0d5f19a64b4b30a87d4206aade58726b60e3");
        client.add_file_contents(REPO, "a.yaml", "main", b"image:\n  tag: v1\n");
        client.add_file_contents(REPO, "b.yaml", "main", b"image:\n  tag: v1\n");
        client
    }

    #[tokio::test]
    async fn records_each_update() {
        let updater =
            Updater::new(fake_client()).with_name_generator(RandomNameGenerator::with_seed(3));
        let runner = Runner::with_updater(RunnerConfig::new(String::new(), false, 2), updater);

        let summary = runner
            .run(&[
                input("a.yaml", ""),
                input("b.yaml", "bump-"),
                input("missing.yaml", ""),
            ])
            .await;

        assert_eq!(summary.updates_processed, 3);
        assert_eq!(summary.files_updated, 2);
        assert_eq!(summary.prs_created, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            runner
                .updater()
                .client()
                .updated_contents(REPO, "a.yaml", "main")
                .as_deref(),
            Some(&b"image:\n  tag: v2\n"[..])
        );
    }

    #[tokio::test]
    async fn dry_run_touches_nothing() {
        let runner = Runner::with_updater(
            RunnerConfig::new(String::new(), true, 1),
            Updater::new(fake_client()),
        );

        let summary = runner.run(&[input("a.yaml", "bump-")]).await;

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.files_updated, 0);
        assert_eq!(runner.updater().client().commit_count(), 0);
        assert!(runner.updater().client().created_branches().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let runner = Runner::with_updater(
            RunnerConfig::new(String::new(), false, 1),
            Updater::new(fake_client()),
        );

        assert_eq!(runner.run(&[]).await, RunSummary::new(false));
    }
}
