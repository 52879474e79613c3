//! The `info` command: dump a dump
//!
//! Read-only listing of every entry in a dump file. Text entries print as
//! they appear on disk; data fields print their dimensions and value range
//! instead of the raw samples.

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::storage::{Dump, DumpValue};

pub fn run(output: &Output, file: &Path) -> Result<()> {
    let dump = Dump::load(file)
        .with_context(|| format!("Failed to load dump: {}", file.display()))?;

    output.verbose_ctx("info", &format!("{} entries", dump.entries().len()));

    if output.is_json() {
        let items: Vec<_> = dump
            .entries()
            .iter()
            .map(|(key, value)| match value {
                DumpValue::Text(text) => serde_json::json!({
                    "key": key,
                    "kind": "text",
                    "value": text,
                }),
                DumpValue::Field(field) => {
                    let (min, max) = field.value_range();
                    serde_json::json!({
                        "key": key,
                        "kind": "field",
                        "xres": field.xres(),
                        "yres": field.yres(),
                        "min": min,
                        "max": max,
                    })
                }
            })
            .collect();
        output.data(&items);
    } else {
        for (key, value) in dump.entries() {
            match value {
                DumpValue::Text(text) => println!("{}={}", key, text),
                DumpValue::Field(field) => {
                    let (min, max) = field.value_range();
                    println!(
                        "{}=[{}x{} doubles, range {} .. {}]",
                        key,
                        field.xres(),
                        field.yres(),
                        min,
                        max
                    );
                }
            }
        }
    }

    Ok(())
}
