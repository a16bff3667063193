#![allow(dead_code)]

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn svg2vector() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_svg2vector"));
    // Keep the caller's environment from leaking into expectations.
    cmd.env_remove("SVG2VECTOR_TARGET")
        .env_remove("SVG2VECTOR_LOG");
    cmd
}

pub fn run(mut cmd: Command) -> Result<Output> {
    let output = cmd.output().context("failed to execute svg2vector")?;
    if !output.status.success() {
        bail!(
            "svg2vector exited with {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

/// Status a process reports after exiting with the negative `code`.
pub fn exit_status_for(code: i32) -> i32 {
    code.rem_euclid(256)
}

pub fn parse_stdout(output: &Output) -> Result<Value> {
    serde_json::from_slice(&output.stdout).context("stdout is not JSON")
}

pub fn validate_against_schema(schema_path: &Path, instance: &Value) -> Result<()> {
    let schema: Value = serde_json::from_reader(
        File::open(schema_path)
            .with_context(|| format!("opening schema {}", schema_path.display()))?,
    )
    .with_context(|| format!("parsing schema {}", schema_path.display()))?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| anyhow!("compiling schema: {err}"))?;
    if let Err(errors) = compiled.validate(instance) {
        let details = errors.map(|err| err.to_string()).collect::<Vec<_>>().join("\n");
        bail!("report failed schema validation:\n{details}");
    }
    Ok(())
}
