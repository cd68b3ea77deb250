//! Failures that decide the process exit code
//!
//! Everything else travels as a plain `anyhow::Error` and maps to exit code 1.

use thiserror::Error;

/// Errors carrying the exit code a hook or command should terminate with.
#[derive(Debug, Error)]
pub enum HookError {
    /// A delegated external command returned a non-zero status.
    #[error("{step} failed with exit code {code}")]
    StepFailed { step: String, code: i32 },

    /// A tool could not be made usable, even after one reinstall attempt.
    #[error("{tool} is not usable: {reason}")]
    ToolUnusable { tool: String, reason: String },
}

impl HookError {
    pub fn step_failed(step: impl Into<String>, code: Option<i32>) -> Self {
        Self::StepFailed {
            step: step.into(),
            // Killed by a signal: no code to forward
            code: code.filter(|c| *c != 0).unwrap_or(1),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            HookError::StepFailed { code, .. } => *code,
            HookError::ToolUnusable { .. } => 1,
        }
    }
}

/// Pick the process exit code for an error bubbling out of a command.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<HookError>()
        .map(HookError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failure_keeps_code() {
        let err: anyhow::Error = HookError::step_failed("pnpm install", Some(3)).into();
        assert_eq!(exit_code_for(&err), 3);
    }

    #[test]
    fn test_signal_kill_maps_to_one() {
        let err = HookError::step_failed("dotnet test", None);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_plain_errors_map_to_one() {
        let err = anyhow::anyhow!("could not read index");
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_context_does_not_hide_code() {
        let err = anyhow::Error::from(HookError::step_failed("npx nx run-many", Some(2)))
            .context("pre-push hook failed");
        assert_eq!(exit_code_for(&err), 2);
    }
}
