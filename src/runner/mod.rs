//! Safe command runner
//!
//! Runs a bulk multi-project task exactly once and forwards its exit code.
//! The one exception: when a `--target` was given and the tool reports that
//! no project matched the selector, the run is treated as a success so an
//! empty project set does not break a pipeline.

use anyhow::{Context, Result};
use regex::Regex;
use std::io::Write;
use std::path::Path;

mod args;

pub use args::TaskSelection;

use crate::cli::Output;
use crate::config::RunnerConfig;
use crate::external::{CommandSpec, ProcessRunner};

/// How a runner invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub exit_code: i32,
    /// Failure reclassified as "no projects matched"
    pub no_projects: bool,
}

pub struct SafeRunner<'a> {
    command: &'a [String],
    no_projects: Vec<Regex>,
    runner: &'a dyn ProcessRunner,
    output: &'a Output,
}

impl<'a> SafeRunner<'a> {
    pub fn new(config: &'a RunnerConfig, runner: &'a dyn ProcessRunner, output: &'a Output) -> Result<Self> {
        let no_projects = config
            .no_projects_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("Invalid no-projects pattern '{pattern}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            command: &config.command,
            no_projects,
            runner,
            output,
        })
    }

    pub fn run(&self, args: &[String], cwd: &Path) -> Result<RunOutcome> {
        let selection = TaskSelection::parse(args);
        let spec = CommandSpec::from_argv(self.command, cwd)?
            .args(args.iter().cloned())
            .capture();

        match &selection {
            Some(selection) => tracing::info!("Running target {}", selection.describe()),
            None => tracing::debug!("No --target given; passing through: {}", spec.display()),
        }

        let result = self.runner.run(&spec)?;
        relay(&result.stdout, &result.stderr);

        if result.success() {
            return Ok(RunOutcome { exit_code: 0, no_projects: false });
        }

        let exit_code = result.code.unwrap_or(1);
        let Some(selection) = selection else {
            return Ok(RunOutcome { exit_code, no_projects: false });
        };

        let combined = result.combined_output();
        if self.no_projects.iter().any(|re| re.is_match(&combined)) {
            self.output.warning(&format!(
                "No projects matched target {}; nothing to run",
                selection.describe()
            ));
            return Ok(RunOutcome { exit_code: 0, no_projects: true });
        }

        self.output
            .error(&format!("Target {} failed with exit code {exit_code}", selection.describe()));
        Ok(RunOutcome { exit_code, no_projects: false })
    }
}

/// Re-emit captured child output unchanged
///
/// Output is replayed once the child exits, since the "no projects" check
/// needs the whole text.
fn relay(stdout: &str, stderr: &str) {
    relay_to(std::io::stdout().lock(), std::io::stderr().lock(), stdout, stderr);
}

fn relay_to(mut out: impl Write, mut err: impl Write, stdout: &str, stderr: &str) {
    if !stdout.is_empty()
        && let Err(e) = out.write_all(stdout.as_bytes()).and_then(|()| out.flush())
    {
        tracing::debug!("Failed to relay child stdout: {e}");
    }
    if !stderr.is_empty()
        && let Err(e) = err.write_all(stderr.as_bytes())
    {
        tracing::debug!("Failed to relay child stderr: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::process::testing::RecordingRunner;

    fn runner_config() -> RunnerConfig {
        RunnerConfig {
            command: vec!["npx".into(), "nx".into(), "run-many".into()],
            no_projects_patterns: vec!["No projects found".into(), "(?i)no projects matched".into()],
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_passthrough_without_target_keeps_args_and_code() {
        let config = runner_config();
        let runner = RecordingRunner::new().respond("npx nx run-many", 7, "", "No projects found");
        let output = Output::new(false, true);
        let safe = SafeRunner::new(&config, &runner, &output).unwrap();

        let forwarded = args(&["--all", "--parallel=2", "--skip-nx-cache"]);
        let outcome = safe.run(&forwarded, Path::new("/repo")).unwrap();

        assert_eq!(outcome, RunOutcome { exit_code: 7, no_projects: false });
        let call = runner.find("npx nx run-many").unwrap();
        assert_eq!(call.program, "npx");
        assert_eq!(
            call.args,
            args(&["nx", "run-many", "--all", "--parallel=2", "--skip-nx-cache"])
        );
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_no_projects_with_target_is_success() {
        let config = runner_config();
        let runner = RecordingRunner::new().respond(
            "npx nx run-many",
            1,
            "",
            "NX   No projects found for target test with tag:python",
        );
        let output = Output::new(false, true);
        let safe = SafeRunner::new(&config, &runner, &output).unwrap();

        let outcome = safe
            .run(&args(&["--target=test", "--projects=tag:python"]), Path::new("/repo"))
            .unwrap();
        assert_eq!(outcome, RunOutcome { exit_code: 0, no_projects: true });
    }

    #[test]
    fn test_real_failure_propagates() {
        let config = runner_config();
        let runner = RecordingRunner::new().respond("npx nx run-many", 2, "FAIL api:test", "");
        let output = Output::new(false, true);
        let safe = SafeRunner::new(&config, &runner, &output).unwrap();

        let outcome = safe.run(&args(&["--target", "test"]), Path::new("/repo")).unwrap();
        assert_eq!(outcome, RunOutcome { exit_code: 2, no_projects: false });
    }

    #[test]
    fn test_success_is_zero() {
        let config = runner_config();
        let runner = RecordingRunner::new();
        let output = Output::new(false, true);
        let safe = SafeRunner::new(&config, &runner, &output).unwrap();

        let outcome = safe.run(&args(&["--target=build"]), Path::new("/repo")).unwrap();
        assert_eq!(outcome.exit_code, 0);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut config = runner_config();
        config.no_projects_patterns.push("(unclosed".into());
        let runner = RecordingRunner::new();
        let output = Output::new(false, true);

        assert!(SafeRunner::new(&config, &runner, &output).is_err());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_relay_survives_closed_stdout() {
        let mut stderr = Vec::new();
        relay_to(ClosedPipe, &mut stderr, "lost\n", "kept\n");
        assert_eq!(stderr, b"kept\n");
    }
}
