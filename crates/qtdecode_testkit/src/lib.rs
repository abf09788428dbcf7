//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Per-test scratch file under `<target>/qtdecode-scratch`, with its parent created.
pub fn scratch_path(name: &str) -> PathBuf {
	let dir = target_dir().join("qtdecode-scratch");
	std::fs::create_dir_all(&dir).expect("scratch directory is creatable");
	dir.join(name)
}

/// Run `bin` with `args`, assert success, and parse stdout as JSON.
pub fn run_json(bin: &str, args: &[&str]) -> Value {
	let output = Command::new(bin).args(args).output().expect("command executes");
	assert!(
		output.status.success(),
		"command should succeed: {}",
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}
