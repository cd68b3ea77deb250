//! Post-repair tool verification
//!
//! Runs the Nx version check; on failure reinstalls once and checks again.

use anyhow::Result;
use std::path::Path;

use crate::cli::Output;
use crate::config::RepairConfig;
use crate::error::HookError;
use crate::external::{CommandInvocationResult, CommandSpec, ProcessRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The version check passed; holds its trimmed output
    Healthy(String),
    /// The check failed, the reinstall fixed it
    Reinstalled(String),
}

pub fn verify_tool(
    root: &Path,
    config: &RepairConfig,
    runner: &dyn ProcessRunner,
    output: &Output,
) -> Result<Verification> {
    let check = CommandSpec::from_argv(&config.version_check, root)?.capture();
    let tool = check.display();

    let first = attempt(runner, &check);
    if first.success() {
        let version = first.stdout.trim().to_string();
        output.success(&format!("{tool}: {version}"));
        return Ok(Verification::Healthy(version));
    }

    output.warning(&format!("'{tool}' failed; attempting one reinstall"));
    tracing::debug!("version check stderr: {}", first.stderr.trim());

    let reinstall = CommandSpec::from_argv(&config.reinstall, root)?;
    let reinstalled = attempt(runner, &reinstall);
    if !reinstalled.success() {
        return Err(HookError::ToolUnusable {
            tool,
            reason: format!(
                "reinstall '{}' failed: {}",
                reinstall.display(),
                reinstalled.stderr.trim()
            ),
        }
        .into());
    }

    let second = attempt(runner, &check);
    if !second.success() {
        return Err(HookError::ToolUnusable {
            tool,
            reason: format!("still failing after reinstall: {}", second.stderr.trim()),
        }
        .into());
    }

    let version = second.stdout.trim().to_string();
    output.success(&format!("Reinstalled; {tool}: {version}"));
    Ok(Verification::Reinstalled(version))
}

/// Run `spec`, treating a failure to spawn as a failed run
fn attempt(runner: &dyn ProcessRunner, spec: &CommandSpec) -> CommandInvocationResult {
    runner.run(spec).unwrap_or_else(|err| {
        tracing::debug!("{}: {err:#}", spec.display());
        CommandInvocationResult {
            code: None,
            stdout: String::new(),
            stderr: format!("{err:#}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code_for;
    use crate::external::process::testing::RecordingRunner;

    fn repair_config() -> RepairConfig {
        RepairConfig {
            required_plugins: vec![],
            version_check: vec!["npx".into(), "nx".into(), "--version".into()],
            reinstall: vec!["npm".into(), "install".into(), "--save-dev".into(), "nx".into()],
        }
    }

    #[test]
    fn test_healthy_tool_skips_reinstall() {
        let runner = RecordingRunner::new().respond("npx nx --version", 0, "21.2.0\n", "");
        let output = Output::new(false, true);

        let result = verify_tool(Path::new("/repo"), &repair_config(), &runner, &output).unwrap();
        assert_eq!(result, Verification::Healthy("21.2.0".to_string()));
        assert_eq!(runner.command_lines(), vec!["npx nx --version"]);
    }

    #[test]
    fn test_single_reinstall_recovers() {
        let runner = RecordingRunner::new().respond_once("npx nx --version", 1);
        let output = Output::new(false, true);

        let result = verify_tool(Path::new("/repo"), &repair_config(), &runner, &output).unwrap();
        assert!(matches!(result, Verification::Reinstalled(_)));
        assert_eq!(
            runner.command_lines(),
            vec!["npx nx --version", "npm install --save-dev nx", "npx nx --version"]
        );
    }

    #[test]
    fn test_failed_reinstall_is_fatal() {
        let runner = RecordingRunner::new()
            .respond("npx nx --version", 1, "", "nx: not found")
            .respond("npm install", 1, "", "EACCES");
        let output = Output::new(false, true);

        let err = verify_tool(Path::new("/repo"), &repair_config(), &runner, &output).unwrap_err();
        assert!(err.to_string().contains("reinstall"));
        assert_eq!(exit_code_for(&err), 1);
        // Exactly one reinstall attempt
        assert_eq!(runner.command_lines().len(), 2);
    }

    #[test]
    fn test_still_broken_after_reinstall_is_fatal() {
        let runner = RecordingRunner::new().respond("npx nx --version", 1, "", "boom");
        let output = Output::new(false, true);

        let err = verify_tool(Path::new("/repo"), &repair_config(), &runner, &output).unwrap_err();
        assert!(err.to_string().contains("still failing"));
        assert_eq!(runner.command_lines().len(), 3);
    }

    #[test]
    fn test_unspawnable_check_still_reinstalls_once() {
        let runner = RecordingRunner::new().missing("npx");
        let output = Output::new(false, true);

        let err = verify_tool(Path::new("/repo"), &repair_config(), &runner, &output).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HookError>(),
            Some(HookError::ToolUnusable { .. })
        ));
        let lines = runner.command_lines();
        assert_eq!(
            lines.iter().filter(|line| line.as_str() == "npm install --save-dev nx").count(),
            1
        );
        assert_eq!(lines.len(), 3);
    }
}
