//! Error-to-exit-code mapping.
//!
//! Calling agents branch on the exit code; the stderr line leads with a
//! stable kind label so the outcome is machine-readable without parsing
//! prose. Code 2 is left to clap's usage errors.

use std::process::ExitCode;

use codealive_client::Error;

/// Print the error and map it to the process exit code.
pub fn report(err: &anyhow::Error) -> ExitCode {
    let (kind, code) = classify(err);
    eprintln!("error[{}]: {:#}", kind, err);
    ExitCode::from(code)
}

fn classify(err: &anyhow::Error) -> (&'static str, u8) {
    match err.downcast_ref::<Error>() {
        Some(Error::NoCredential) => ("no_credential", 3),
        Some(Error::AuthenticationFailed(_)) => ("authentication_failed", 4),
        Some(Error::DataSourceNotFound(_)) => ("data_source_not_found", 5),
        Some(Error::Transport(_)) => ("transport", 6),
        Some(Error::ExpiredConversation) => ("expired_conversation", 7),
        Some(Error::UnknownWorkflow(_)) => ("unknown_workflow", 8),
        Some(Error::MalformedResponse(_)) => ("malformed_response", 9),
        Some(Error::DataSourceMismatch { .. }) => ("data_source_mismatch", 10),
        Some(Error::Api { .. }) | Some(Error::Config(_)) | None => ("failure", 1),
    }
}
