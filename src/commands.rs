//! Internal command representation
//!
//! Decouples what to run from how the arguments were parsed, so the
//! dispatcher never sees clap types.

use std::path::PathBuf;

use crate::reports::SectionKind;

/// A resolved briefing command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Every daily section in order
    Run,
    /// A single section; `mandate` only applies to allocation and hedge
    Section {
        kind: SectionKind,
        mandate: Option<String>,
    },
    /// Create an empty warehouse schema
    InitDb { path: PathBuf },
}

impl Command {
    pub fn section(kind: SectionKind) -> Self {
        Command::Section { kind, mandate: None }
    }
}

/// How results are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub json: bool,
    pub color: bool,
    /// Write CSV artifacts under the output directory
    pub export: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            json: false,
            color: true,
            export: true,
        }
    }
}
