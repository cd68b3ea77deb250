//! Integration tests for the monohook CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// monohook command isolated from the user's own configuration
fn monohook(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("monohook").unwrap();
    cmd.current_dir(dir).env("HOME", dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let temp_dir = TempDir::new().unwrap();
    monohook(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("repairs Nx workspace metadata"));
}

#[test]
fn test_cli_short_help() {
    let temp_dir = TempDir::new().unwrap();
    monohook(temp_dir.path())
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("polyglot monorepos"));
}

#[test]
fn test_version_command() {
    let temp_dir = TempDir::new().unwrap();
    monohook(temp_dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("monohook "));
}

#[test]
fn test_unknown_hook_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    monohook(temp_dir.path())
        .args(["run", "commit-msg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_classify_prints_languages() {
    let temp_dir = TempDir::new().unwrap();
    monohook(temp_dir.path())
        .args(["-q", "classify", "apps/x/src/y.py", "README.md", "src/Api/Api.csproj"])
        .assert()
        .success()
        .stdout("python, dotnet, markdown, xml\n");
}

#[test]
fn test_config_show_json() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("monohook.toml"), "[python]\nvenv_dir = \"tools/.venv\"\n").unwrap();

    monohook(temp_dir.path())
        .args(["config", "show", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"venv_dir\": \"tools/.venv\""))
        .stdout(predicate::str::contains("\"no_projects_patterns\""));
}

#[test]
fn test_repair_twice_is_stable() {
    let temp_dir = TempDir::new().unwrap();

    monohook(temp_dir.path())
        .args(["repair", "--skip-verify"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nx.json"));

    let nx_json = fs::read(temp_dir.path().join("nx.json")).unwrap();
    assert!(String::from_utf8_lossy(&nx_json).contains("@nxlv/python"));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join(".nx/cache/nx-cloud.env")).unwrap(),
        "NX_NO_CLOUD=true\n"
    );

    monohook(temp_dir.path())
        .args(["repair", "--skip-verify"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace already in order"));
    assert_eq!(fs::read(temp_dir.path().join("nx.json")).unwrap(), nx_json);
}

#[test]
fn test_repair_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();

    monohook(temp_dir.path())
        .args(["repair", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));

    assert!(!temp_dir.path().join("nx.json").exists());
    assert!(!temp_dir.path().join(".nx").exists());
}

#[cfg(unix)]
mod unix {
    use super::*;

    fn write_config(dir: &Path, body: &str) {
        fs::write(dir.join("monohook.toml"), body).unwrap();
    }

    const NO_PROJECTS_RUNNER: &str = r#"
[runner]
command = ["sh", "-c", "echo 'No projects found for target' >&2; exit 3", "sh"]
"#;

    #[test]
    fn test_nx_no_projects_with_target_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        write_config(temp_dir.path(), NO_PROJECTS_RUNNER);

        monohook(temp_dir.path())
            .args(["nx", "--target=test", "--projects=tag:python"])
            .assert()
            .success()
            .stderr(predicate::str::contains("No projects found for target"));
    }

    #[test]
    fn test_nx_without_target_keeps_exit_code() {
        let temp_dir = TempDir::new().unwrap();
        write_config(temp_dir.path(), NO_PROJECTS_RUNNER);

        monohook(temp_dir.path())
            .args(["nx", "--all", "--parallel=2"])
            .assert()
            .code(3);
    }

    const ECHO_RUNNER: &str = r#"
[runner]
command = ["sh", "-c", "echo \"forwarded: $*\"", "sh"]
"#;

    #[test]
    fn test_nx_forwards_flags_that_clash_with_global_ones() {
        let temp_dir = TempDir::new().unwrap();
        write_config(temp_dir.path(), ECHO_RUNNER);

        monohook(temp_dir.path())
            .args(["nx", "--target=test", "--verbose", "-q"])
            .assert()
            .success()
            .stdout(predicate::str::contains("forwarded: --target=test --verbose -q"));

        monohook(temp_dir.path())
            .args(["nx", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("forwarded: --help"));

        monohook(temp_dir.path())
            .args(["nx", "--", "-v", "--all"])
            .assert()
            .success()
            .stdout(predicate::str::contains("forwarded: -v --all"));
    }

    #[test]
    fn test_pre_commit_exports_venv_path_to_check() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            temp_dir.path(),
            r#"
[hooks.pre_commit]
staged_check = ["sh", "-c", "case \"$PYTHON_VENV_BIN\" in */.venv/bin) exit 0;; *) exit 9;; esac"]
"#,
        );

        monohook(temp_dir.path())
            .args(["run", "pre-commit", "--file", "README.md"])
            .assert()
            .success();
        assert!(!temp_dir.path().join(".venv").exists());
    }

    #[test]
    fn test_pre_commit_failure_code_is_forwarded() {
        let temp_dir = TempDir::new().unwrap();
        write_config(temp_dir.path(), "[hooks.pre_commit]\nstaged_check = [\"sh\", \"-c\", \"exit 4\"]\n");

        monohook(temp_dir.path())
            .args(["run", "pre-commit", "--file", "web/app.ts"])
            .assert()
            .code(4);
    }

    #[test]
    fn test_install_and_uninstall_hooks() {
        let temp_dir = TempDir::new().unwrap();
        git2::Repository::init(temp_dir.path()).unwrap();
        let hooks_dir = temp_dir.path().join(".git/hooks");
        fs::create_dir_all(&hooks_dir).unwrap();
        fs::write(hooks_dir.join("pre-push"), "#!/bin/sh\necho custom\n").unwrap();

        monohook(temp_dir.path())
            .args(["install", "--hooks", "pre-commit,pre-push"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Kept existing pre-push"));

        let script = fs::read_to_string(hooks_dir.join("pre-commit")).unwrap();
        assert!(script.contains("exec monohook run pre-commit"));
        assert_eq!(fs::read_to_string(hooks_dir.join("pre-push")).unwrap(), "#!/bin/sh\necho custom\n");

        monohook(temp_dir.path()).arg("uninstall").assert().success();
        assert!(!hooks_dir.join("pre-commit").exists());
        assert!(hooks_dir.join("pre-push").exists());
    }
}
