//! The `register` command
//!
//! Emits the plug-in descriptor in the line-oriented format the host's
//! registration scan parses: name, menu path, then one supported run-mode
//! token per line. JSON mode emits the descriptor as a single object
//! instead.

use anyhow::Result;

use super::output::Output;
use crate::domain::DESCRIPTOR;

pub fn run(output: &Output) -> Result<()> {
    if output.is_json() {
        output.data(&DESCRIPTOR);
    } else {
        print!("{}", DESCRIPTOR.to_registration_lines());
    }

    Ok(())
}
