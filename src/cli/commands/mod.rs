//! Subcommand implementations, one module per command

pub mod classify;
pub mod config;
pub mod install;
pub mod nx;
pub mod repair;
pub mod run;
pub mod uninstall;
pub mod version;

use crate::hooks::HookKind;

/// Hooks selected by `--hooks`, all of them when none were named
pub(crate) fn selected_hooks(hooks: &[HookKind]) -> Vec<HookKind> {
    if hooks.is_empty() {
        HookKind::ALL.to_vec()
    } else {
        hooks.to_vec()
    }
}
