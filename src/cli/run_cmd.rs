//! The `run` command: load, invert, persist
//!
//! The write only happens after the full read and transform succeed, so a
//! malformed or missing input never clobbers the target file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::RunMode;
use crate::storage::Dump;

/// Container key holding the array this plug-in transforms
const DATA_KEY: &str = "/0/data";

pub fn run(
    output: &Output,
    mode: RunMode,
    file: &Path,
    redirect: Option<PathBuf>,
) -> Result<()> {
    // The transform has no parameters, so both supported run modes behave
    // identically once the token has been validated.
    output.verbose_ctx("run", &format!("mode: {}, file: {}", mode, file.display()));

    let mut dump = Dump::load(file)
        .with_context(|| format!("Failed to load dump: {}", file.display()))?;

    if let Some(target) = redirect {
        output.verbose_ctx("run", &format!("redirecting output to: {}", target.display()));
        dump.set_target(target);
    }

    let mut field = dump
        .data_field(DATA_KEY)
        .with_context(|| format!("Failed to read '{}' from {}", DATA_KEY, file.display()))?
        .clone();

    let (min, max) = field.value_range();
    output.verbose_ctx(
        "run",
        &format!(
            "field {}x{}, range {} .. {}",
            field.xres(),
            field.yres(),
            min,
            max
        ),
    );

    field.invert_values();

    let (xres, yres) = (field.xres(), field.yres());
    dump.set_field(DATA_KEY, field);

    let target = dump
        .target()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| file.to_path_buf());
    dump.save()
        .with_context(|| format!("Failed to save dump: {}", target.display()))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "key": DATA_KEY,
            "xres": xres,
            "yres": yres,
            "min": min,
            "max": max,
            "target": target.display().to_string(),
        }));
    } else {
        output.success(&format!(
            "Inverted {} ({}x{}) in {}",
            DATA_KEY,
            xres,
            yres,
            target.display()
        ));
    }

    Ok(())
}
