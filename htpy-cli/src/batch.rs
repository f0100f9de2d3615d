//! Batch mode: convert files into an output directory.
//!
//! Every file is converted independently. A file that cannot be read,
//! converted or written is recorded in the report and the batch moves on.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use htpy_common::Diagnostics;
use htpy_convert::{ConvertOptions, FormatBackend, convert_bytes};
use serde::Serialize;

/// Extension of generated files.
const OUTPUT_EXTENSION: &str = "py";

/// A file that could not be converted.
#[derive(Debug, Serialize)]
pub struct FailedFile {
    /// The input path as given on the command line.
    pub path: PathBuf,
    /// The full error chain.
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Paths of the files written.
    pub succeeded: Vec<PathBuf>,
    /// Inputs that failed, in command-line order.
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    /// Human readable summary, one section per list.
    pub fn summary(&self) -> String {
        let written: Vec<String> = self
            .succeeded
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        let mut summary = format!("Files written: [{}]\n", written.join(", "));
        if !self.failed.is_empty() {
            summary.push_str("Failed files:\n");
            for failed in &self.failed {
                let _ = writeln!(summary, "  - {}: {}", failed.path.display(), failed.error);
            }
        }
        summary
    }
}

/// `<output>/<stem of input>.py`
pub fn output_path(output_dir: &Path, input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| anyhow!("{} has no file name", input.display()))?;
    let mut file_name = stem.to_os_string();
    file_name.push(".");
    file_name.push(OUTPUT_EXTENSION);
    Ok(output_dir.join(file_name))
}

/// Read `input`, convert it and write the source to `target`.
pub fn convert_file(
    input: &Path,
    target: &Path,
    options: &ConvertOptions,
    backend: &dyn FormatBackend,
) -> Result<Diagnostics> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let conversion = convert_bytes(&bytes, options, backend)
        .with_context(|| format!("failed to convert {}", input.display()))?;
    fs::write(target, &conversion.source)
        .with_context(|| format!("failed to write {}", target.display()))?;
    Ok(conversion.diagnostics)
}

/// Convert every file in `inputs`, calling `on_diagnostics` with each
/// successful file's diagnostics.
///
/// Fails only when `output_dir` is not an existing directory; per-file
/// failures end up in the report. An input whose output path was already
/// claimed by an earlier input in the same run is reported as failed
/// instead of overwriting that file.
pub fn run(
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &ConvertOptions,
    backend: &dyn FormatBackend,
    mut on_diagnostics: impl FnMut(&Path, &Diagnostics),
) -> Result<BatchReport> {
    if !output_dir.is_dir() {
        bail!("output directory {} does not exist", output_dir.display());
    }

    let mut report = BatchReport::default();
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    for input in inputs {
        let result = output_path(output_dir, input).and_then(|target| {
            if let Some(first) = claimed.get(&target) {
                bail!(
                    "{} would overwrite {}, already written from {}",
                    input.display(),
                    target.display(),
                    first.display()
                );
            }
            let _ = claimed.insert(target.clone(), input);
            let diagnostics = convert_file(input, &target, options, backend)?;
            Ok((target, diagnostics))
        });
        match result {
            Ok((target, diagnostics)) => {
                on_diagnostics(input, &diagnostics);
                report.succeeded.push(target);
            }
            Err(err) => report.failed.push(FailedFile {
                path: input.clone(),
                error: format!("{err:#}"),
            }),
        }
    }
    Ok(report)
}
