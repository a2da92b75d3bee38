use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Metadata recorded next to a generated matrix file.
pub struct Payload {
    pub params: Value,
    pub inputs: Vec<String>,
    pub counts: Value,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            inputs: Vec::new(),
            counts: Value::Null,
        }
    }

    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = String>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn with_counts(mut self, counts: Value) -> Self {
        self.counts = counts;
        self
    }
}

/// Base document shared by sidecars and `cli report`.
pub fn header() -> Value {
    json!({
        "code_rev": current_git_rev(),
        "polydd_version": polydd::VERSION,
    })
}

/// Write `<artifact>.provenance.json` with revision, callsite, params, inputs and row counts.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let mut doc = header();
    doc["callsite"] = json!({
        "file": callsite.file(),
        "line": callsite.line()
    });
    doc["params"] = payload.params;
    doc["inputs"] = json!(payload.inputs);
    doc["counts"] = payload.counts;
    doc["outputs"] = json!([artifact.to_string_lossy()]);
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    Ok(provenance_path)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map_or_else(|| OsString::from("artifact"), |s| s.to_os_string());
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// Commit from `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`.
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty());
    from_env
        .or_else(|| {
            let output = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
            if !output.status.success() {
                return None;
            }
            String::from_utf8(output.stdout).ok().map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn provenance_path_replaces_extension() {
        let derived = provenance_path(Path::new("/tmp/out/cube.ext"));
        assert_eq!(derived, Path::new("/tmp/out/cube.provenance.json"));
    }

    #[test]
    fn sidecar_records_inputs_counts_and_outputs() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("cube.ext");
        fs::write(&artifact, "V-representation\n").unwrap();
        let payload = Payload::new(json!({"direction": "h-to-v"}))
            .with_inputs(["cube.ine".to_string()])
            .with_counts(json!({"input_rows": 6, "output_rows": 8}));
        let prov_path = write_sidecar(&artifact, payload).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["inputs"][0], "cube.ine");
        assert_eq!(parsed["counts"]["output_rows"], 8);
        assert_eq!(parsed["polydd_version"], polydd::VERSION);
        assert!(parsed["callsite"]["line"].as_u64().is_some());
    }
}
