//! Orchestration of a single file update.
//!
//! An update runs these steps in order and stops at the first failure:
//!
//! 1. Fetch the file and its blob SHA from the source branch
//! 2. Apply the content update locally
//! 3. Resolve the head commit of the source branch
//! 4. Create a generated branch from that commit, if a prefix was given
//! 5. Commit the new content, guarded by the SHA from step 1
//! 6. Open a pull request from the generated branch, if there is one
//!
//! Nothing is retried or rolled back. A failure in step 5 or 6 leaves the
//! earlier remote changes in place.
//!
//! Dropping the returned future cancels the update: no later step is started,
//! but steps already acknowledged by the host remain.

mod error;
mod input;

pub use error::UpdateError;
pub use input::{Input, PullRequestInput};

use crate::client::{GitClient, NewPullRequest, PullRequest};
use crate::content::{ContentUpdater, YamlUpdate};
use crate::names::{NameGenerator, RandomNameGenerator};
use tracing::{debug, error, info, info_span, Instrument};

/// Updates files in a repository, optionally through a pull request.
///
/// An `Updater` holds no per-request state and can serve concurrent updates
/// as long as its client can.
pub struct Updater<C> {
    client: C,
    name_generator: Box<dyn NameGenerator>,
}

impl<C: GitClient> Updater<C> {
    /// Creates an updater whose generated branch names use a time-seeded
    /// random suffix.
    pub fn new(client: C) -> Self {
        Self {
            client,
            name_generator: Box::new(RandomNameGenerator::from_time()),
        }
    }

    /// Replaces the branch name generator.
    #[must_use]
    pub fn with_name_generator(mut self, name_generator: impl NameGenerator + 'static) -> Self {
        self.name_generator = Box::new(name_generator);
        self
    }

    /// Returns the hosting client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Sets `input.key` to `input.new_value` in `input.filename`.
    ///
    /// # Returns
    ///
    /// The pull request that was opened, or `None` when the change was
    /// committed directly to `input.branch`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] naming the step that failed.
    pub async fn update_yaml(&self, input: &Input) -> Result<Option<PullRequest>, UpdateError> {
        let updater = YamlUpdate::new(input.key.as_str(), input.new_value.as_str());
        self.update_file(input, &updater).await
    }

    /// Runs the update with an arbitrary content transformation.
    ///
    /// `input.key` and `input.new_value` are ignored; `content` decides the
    /// new file bytes.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] naming the step that failed.
    pub async fn update_file(
        &self,
        input: &Input,
        content: &dyn ContentUpdater,
    ) -> Result<Option<PullRequest>, UpdateError> {
        let span = info_span!(
            "update_file",
            repo = %input.repo,
            branch = %input.branch,
            filename = %input.filename
        );

        async {
            let current = match self
                .client
                .get_file(&input.repo, &input.branch, &input.filename)
                .await
            {
                Ok(current) => current,
                Err(e) => {
                    error!(error = %e, "Failed to get file from repo");
                    return Err(UpdateError::GetFile(e));
                }
            };
            debug!(sha = %current.sha, "Got existing file");

            let updated = content.update(&current.data)?;

            let branch_ref = self
                .client
                .get_branch_head(&input.repo, &input.branch)
                .await
                .map_err(UpdateError::BranchHead)?;

            let target_branch = self.create_branch_if_necessary(input, &branch_ref).await?;

            self.client
                .update_file(
                    &input.repo,
                    &target_branch,
                    &input.filename,
                    &input.commit_message,
                    &current.sha,
                    &updated,
                )
                .await
                .map_err(UpdateError::UpdateFile)?;
            info!(target_branch = %target_branch, "Updated file");

            self.create_pr_if_necessary(input, &target_branch).await
        }
        .instrument(span)
        .await
    }

    async fn create_branch_if_necessary(
        &self,
        input: &Input,
        source_ref: &str,
    ) -> Result<String, UpdateError> {
        if input.branch_generate_name.is_empty() {
            debug!(
                branch = %input.branch,
                "No branch_generate_name configured, reusing source branch"
            );
            return Ok(input.branch.clone());
        }

        let new_branch = self
            .name_generator
            .prefixed_name(&input.branch_generate_name);
        debug!(name = %new_branch, "Generating new branch");

        self.client
            .create_branch(&input.repo, &new_branch, source_ref)
            .await
            .map_err(UpdateError::CreateBranch)?;
        debug!(branch = %new_branch, source_ref, "Created branch");

        Ok(new_branch)
    }

    async fn create_pr_if_necessary(
        &self,
        input: &Input,
        target_branch: &str,
    ) -> Result<Option<PullRequest>, UpdateError> {
        if input.branch == target_branch {
            return Ok(None);
        }

        let pr = self
            .client
            .create_pull_request(
                &input.repo,
                &NewPullRequest {
                    title: input.pull_request.title.clone(),
                    body: input.pull_request.body.clone(),
                    head: target_branch.to_string(),
                    base: input.branch.clone(),
                },
            )
            .await
            .map_err(UpdateError::CreatePullRequest)?;
        info!(number = pr.number, link = %pr.link, "Created pull request");

        Ok(Some(pr))
    }
}
