pub mod config;
pub mod fflow;
pub mod idents;
pub mod ir;
pub mod lint;
pub mod normalize;
pub mod renpy;
pub mod twee;

use config::Config;
use ir::{Node, Script};

/// One of the three supported surface syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    FFlow,
    Twee,
    Renpy,
}

impl Format {
    /// Map a file extension (without the dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "fflow" => Some(Format::FFlow),
            "twee" | "tw" => Some(Format::Twee),
            "rpy" => Some(Format::Renpy),
            _ => None,
        }
    }

    /// Extension used when deriving an output path.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::FFlow => "fflow",
            Format::Twee => "twee",
            Format::Renpy => "rpy",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::FFlow => "fflow",
            Format::Twee => "twee",
            Format::Renpy => "renpy",
        }
    }
}

/// Parse text in the given syntax into the shared node sequence.
/// Infallible: malformed input degrades to the most specific matching
/// node, never an error.
pub fn parse(text: &str, format: Format) -> Script {
    match format {
        Format::FFlow => fflow::parse(text),
        Format::Twee => twee::parse(text),
        Format::Renpy => renpy::parse(text),
    }
}

/// Render a node sequence in the given syntax. Infallible.
pub fn generate(ir: &[Node], format: Format, config: &Config) -> String {
    match format {
        Format::FFlow => fflow::generate(ir, config),
        Format::Twee => twee::generate(ir, config),
        Format::Renpy => renpy::generate(ir, config),
    }
}

/// Parse then generate in one step.
pub fn convert(text: &str, from: Format, to: Format, config: &Config) -> String {
    let ir = parse(text, from);
    generate(&ir, to, config)
}
