//! CLI entry point for the repo-local architecture lint.
//!
//! Walks up from the working directory (or `CARGO_WORKSPACE_DIR`) to the
//! workspace manifest, then lints `backend/src`.

use std::io::{self, Write};
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;

fn declares_workspace(dir: &Utf8Path) -> bool {
    Dir::open_ambient_dir(dir, ambient_authority())
        .and_then(|dir| dir.read_to_string("Cargo.toml"))
        .is_ok_and(|manifest| manifest.contains("[workspace]"))
}

fn workspace_root(start: &Utf8Path) -> Option<Utf8PathBuf> {
    start
        .ancestors()
        .find(|dir| declares_workspace(dir))
        .map(Utf8Path::to_path_buf)
}

fn starting_points() -> Vec<Utf8PathBuf> {
    let from_env = std::env::var("CARGO_WORKSPACE_DIR")
        .ok()
        .map(Utf8PathBuf::from);
    let from_cwd = std::env::current_dir()
        .ok()
        .and_then(|cwd| Utf8PathBuf::from_path_buf(cwd).ok());
    let from_manifest = Some(Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")));
    [from_env, from_cwd, from_manifest]
        .into_iter()
        .flatten()
        .collect()
}

fn main() -> ExitCode {
    let mut stderr = io::stderr().lock();
    let Some(root) = starting_points()
        .iter()
        .find_map(|start| workspace_root(start))
    else {
        let _ = writeln!(
            stderr,
            "unable to locate the workspace root (a Cargo.toml declaring [workspace])"
        );
        return ExitCode::FAILURE;
    };

    match architecture_lint::lint_backend_sources(&root.join("backend")) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(stderr, "{err}");
            ExitCode::FAILURE
        }
    }
}
