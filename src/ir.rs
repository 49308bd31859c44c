use indexmap::IndexMap;

/// One narrative node. The set is closed: every parser produces these
/// variants and every generator matches exhaustively over them.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Initial declared variables. At most one per script, always first.
    Frontmatter { variables: IndexMap<String, String> },
    /// Screenplay scene marker (INT./EXT.). `text` is the full heading line.
    SceneHeading { scene_id: String, text: String },
    /// Named jump/link target.
    SectionHeading { text: String, anchor: String },
    /// Descriptive prose line.
    Action { text: String },
    Dialogue {
        character: String,
        text: String,
        parenthetical: Option<String>,
    },
    /// Media directive. `kind` is a free-form tag (BG/SHOW/MUSIC/...).
    Asset { kind: String, data: String },
    /// Variable mutation; the expression is carried unparsed.
    StateChange { expression: String },
    /// One edge of an if/else/end run. A condition node has `condition`
    /// set and both flags false. Runs are not validated here; malformed
    /// runs pass through to the generators.
    Logic {
        condition: Option<String>,
        is_else: bool,
        is_end: bool,
    },
    /// Opens a choice menu.
    Decision { prompt: String },
    /// One selectable branch. An empty `target` means the choice's effect
    /// is the inline nodes that follow, a degraded case each generator
    /// handles explicitly. `conditions` is reserved and currently always
    /// empty.
    Choice {
        label: String,
        text: String,
        target: String,
        conditions: Vec<String>,
    },
    /// Unconditional transfer.
    Jump { target: String },
}

/// Ordered node sequence; order equals document/execution order.
pub type Script = Vec<Node>;

/// Recognized scene-heading prefixes, longest first so `INT./EXT.` wins
/// over `INT.`.
pub const SCENE_PREFIXES: &[&str] = &["INT./EXT.", "INT.", "EXT.", "EST.", "I/E"];
