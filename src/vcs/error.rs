use thiserror::Error;

use super::Provider;

/// Failures of the repository browsing layer.
///
/// Display strings are returned verbatim to the calling agent, so they stay
/// plain text.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("Unsupported repository host in '{0}'. Only github.com and gitlab.com are supported.")]
    UnsupportedProvider(String),

    #[error("Could not find an owner and repository name in '{0}'.")]
    InvalidUrl(String),

    #[error("Repository not found or access denied.")]
    RepositoryNotFound,

    #[error("The {0} repository is empty.")]
    EmptyRepository(Provider),

    #[error("You need a plan in order to access your private data.")]
    PlanRequired,

    #[error("Branch '{0}' not found.")]
    BranchNotFound(String),

    #[error("File '{0}' not found.")]
    PathNotFound(String),

    #[error("'{0}' is a directory, not a file.")]
    NotAFile(String),

    #[error("'{0}' is a binary file and cannot be returned as text.")]
    BinaryFile(String),

    #[error("{provider} request failed{}: {message}", status_suffix(.status))]
    Provider {
        provider: Provider,
        status: Option<u16>,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" with status {s}"))
}
