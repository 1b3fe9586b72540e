//! Git and GitHub operations.

pub mod client;
pub mod github;
pub mod remote_url;

pub use client::GitCli;
pub use github::GitHubClient;
