use crate::RunError;
use colored::*;
use pangenome_api_core::{CallError, RemoteError, TransportError};
use std::fmt::Display;

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<serde_json::Value> for FormattedString {
    fn from(value: serde_json::Value) -> Self {
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<RemoteError> for FormattedString {
    fn from(fault: RemoteError) -> Self {
        let mut out = format!(
            "{} code={} message={:?}",
            "Server Error:".red().bold(),
            fault.code,
            fault.message
        );
        if let Some(name) = &fault.name {
            out.push_str(&format!(" name={name:?}"));
        }
        if let Some(trace) = fault.trace.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(&format!("\n\n{}\n{}", "Trace:".yellow(), trace.dimmed()));
        }
        FormattedString(out)
    }
}

impl From<CallError> for FormattedString {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Remote(fault) => FormattedString::from(fault),
            CallError::Unauthorized { status, message } => FormattedString(format!(
                "{} HTTP {}\n\n'{}'",
                "Authorization Rejected:".red().bold(),
                status,
                message
            )),
            CallError::Transport(err) => FormattedString::from(err),
            err => FormattedString(format!("{}\n\n'{}'", "Call Failed:".red().bold(), err)),
        }
    }
}

impl From<RunError> for FormattedString {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Call(err) => FormattedString::from(err),
            RunError::Render(err) => {
                FormattedString::from(GenericError("Failed to render the result", err))
            }
        }
    }
}

impl From<TransportError> for FormattedString {
    fn from(err: TransportError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Connection Error:".red().bold(), err))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}
