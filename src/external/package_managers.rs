//! Package manager utilities
//!
//! Install/restore commands for the dependency-manifest families the
//! post-merge hook reacts to.

use std::path::Path;

/// Node package manager, chosen by the lockfile at the workspace root
struct PackageManager {
    name: &'static str,
    lockfile: &'static str,
    install_args: &'static [&'static str],
}

const NODE_PACKAGE_MANAGERS: &[PackageManager] = &[
    PackageManager {
        name: "pnpm",
        lockfile: "pnpm-lock.yaml",
        install_args: &["install"],
    },
    PackageManager {
        name: "yarn",
        lockfile: "yarn.lock",
        install_args: &["install"],
    },
    PackageManager {
        name: "npm",
        lockfile: "package-lock.json",
        install_args: &["install"],
    },
];

/// Program and arguments installing Node dependencies for `root`
///
/// Falls back to npm when no lockfile is present.
pub fn node_install_command(root: &Path) -> (&'static str, &'static [&'static str]) {
    NODE_PACKAGE_MANAGERS
        .iter()
        .find(|pm| root.join(pm.lockfile).exists())
        .map(|pm| (pm.name, pm.install_args))
        .unwrap_or(("npm", &["install"]))
}

/// Arguments for `<venv-python>` installing one requirements file
pub fn pip_install_args(requirements: &str) -> Vec<String> {
    ["-m", "pip", "install", "-r", requirements]
        .into_iter()
        .map(String::from)
        .collect()
}
