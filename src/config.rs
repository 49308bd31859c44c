use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Spaces per indent level in generated Ren'Py.
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Sigil prepended to bare identifiers in Twee conditions and set
    /// macros.
    #[serde(default = "default_variable_sigil")]
    pub variable_sigil: String,

    /// Extra tokens exempt from sigil rewriting, on top of the built-in
    /// keyword set.
    #[serde(default)]
    pub condition_keywords: Vec<String>,

    /// Link target emitted for a Twee choice whose effect lives in inline
    /// nodes rather than a jump.
    #[serde(default = "default_placeholder_target")]
    pub placeholder_target: String,
}

fn default_indent_width() -> usize {
    4
}
fn default_variable_sigil() -> String {
    "$".to_string()
}
fn default_placeholder_target() -> String {
    "NEXT_STEP".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indent_width: 4,
            variable_sigil: "$".to_string(),
            condition_keywords: Vec::new(),
            placeholder_target: "NEXT_STEP".to_string(),
        }
    }
}
