pub mod object_ids;
pub mod objects;

// Re-export command functions for convenience
pub use object_ids::object_ids;
pub use objects::objects;

use ccdc::error::{Error, ErrorCategory};

/// Log a failed command with the category of its underlying crate error
pub fn report_failure(err: &anyhow::Error) {
    match classify(err) {
        Some((category, recoverable)) => tracing::error!(
            category = category.as_str(),
            recoverable,
            error = %format!("{err:#}"),
            "Command failed"
        ),
        None => tracing::error!(error = %format!("{err:#}"), "Command failed"),
    }
}

/// Category and recoverability of the crate error behind a failure, if any
fn classify(err: &anyhow::Error) -> Option<(ErrorCategory, bool)> {
    err.downcast_ref::<Error>()
        .map(|cause| (cause.category(), cause.is_recoverable()))
}
