#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod client;
pub mod config;
pub mod content;
pub mod names;
pub mod rate_limit;
pub mod runner;
pub mod summary;
pub mod syaml;
pub mod templates;
pub mod updater;

pub use client::{ClientError, FileContent, GitClient, NewPullRequest, OctocrabClient, PullRequest};
pub use config::{
    load_inputs, load_updates, parse_updates, ConfigError, PullRequestDefinition,
    UpdateDefinition,
};
pub use content::{ContentUpdater, ReplaceContents, YamlUpdate};
pub use names::{NameGenerator, RandomNameGenerator};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use summary::{ProcessingResult, RunSummary};
pub use syaml::PatchError;
pub use templates::{TemplateContext, TemplateError, TemplateRenderer};
pub use updater::{Input, PullRequestInput, UpdateError, Updater};
