use crate::config::Config;
use crate::ir::{Node, Script, SCENE_PREFIXES};
use crate::normalize;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static RE_ASSET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*!\s*(\w+):\s*(.+)").unwrap());
static RE_STATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*~\s*(.+)").unwrap());
static RE_DECISION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\?\s*(.+)").unwrap());
static RE_CHOICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\+\s*\[(.*?)\]\s*(.*?)\s*(?:->\s*#(\w+))?\s*$").unwrap());
static RE_COND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\(IF:\s*(.+)\)").unwrap());
static RE_ELSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\(ELSE\)").unwrap());
static RE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\(END\)").unwrap());
static RE_JUMP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*->\s*#(\w+)").unwrap());
static RE_SECTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#\s*(\w+)").unwrap());
static RE_CHARACTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z0-9 ]*[A-Z0-9])(\s*\(.*\))?$").unwrap());
static RE_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\(.*\))\s*$").unwrap());

fn is_scene_heading(line: &str) -> bool {
    SCENE_PREFIXES
        .iter()
        .any(|p| line.starts_with(p) && !line[p.len()..].trim().is_empty())
}

enum State {
    Scanning,
    InFrontmatter,
}

/// Parse FFlow text into the node sequence. Never fails: every line
/// resolves to exactly one node or is dropped (blank lines), with Action
/// as the final fallback.
pub fn parse(text: &str) -> Script {
    let lines = normalize::clean_lines(text);
    let n = lines.len();

    let mut nodes: Script = Vec::new();
    let mut vars: IndexMap<String, String> = IndexMap::new();
    let mut state = State::Scanning;
    let mut seen_content = false;
    let mut scene_count = 0usize;

    let mut i = 0;
    while i < n {
        let line = lines[i].trim().to_string();
        if line.is_empty() {
            i += 1;
            continue;
        }

        if let State::InFrontmatter = state {
            if line == "===" {
                nodes.push(Node::Frontmatter {
                    variables: std::mem::take(&mut vars),
                });
                state = State::Scanning;
                i += 1;
                continue;
            }
            if line.starts_with('$') && !line.contains("===") {
                // Variable lines without a colon are silently ignored.
                if let Some((key, val)) = line.trim_start_matches('$').split_once(':') {
                    vars.insert(key.trim().to_string(), val.trim().to_string());
                }
                i += 1;
                continue;
            }
            // Stray line inside the block: close it early so declared
            // variables stay first, then classify this line normally.
            nodes.push(Node::Frontmatter {
                variables: std::mem::take(&mut vars),
            });
            state = State::Scanning;
        }

        if !seen_content {
            seen_content = true;
            // A frontmatter block opens only at the very first content line.
            if line.starts_with('$') && !line.contains("===") {
                state = State::InFrontmatter;
                continue;
            }
        }

        if let Some(c) = RE_ASSET.captures(&line) {
            nodes.push(Node::Asset {
                kind: c[1].to_string(),
                data: c[2].to_string(),
            });
            i += 1;
            continue;
        }

        if let Some(c) = RE_STATE.captures(&line) {
            nodes.push(Node::StateChange {
                expression: c[1].to_string(),
            });
            i += 1;
            continue;
        }

        if let Some(c) = RE_DECISION.captures(&line) {
            nodes.push(Node::Decision {
                prompt: c[1].to_string(),
            });
            i += 1;
            continue;
        }

        if let Some(c) = RE_CHOICE.captures(&line) {
            nodes.push(Node::Choice {
                label: c[1].to_string(),
                text: c[2].to_string(),
                target: c.get(3).map_or(String::new(), |m| m.as_str().to_string()),
                conditions: Vec::new(),
            });
            i += 1;
            continue;
        }

        if let Some(c) = RE_JUMP.captures(&line) {
            nodes.push(Node::Jump {
                target: c[1].to_string(),
            });
            i += 1;
            continue;
        }

        if let Some(c) = RE_COND.captures(&line) {
            nodes.push(Node::Logic {
                condition: Some(c[1].to_string()),
                is_else: false,
                is_end: false,
            });
            i += 1;
            continue;
        }

        if RE_ELSE.is_match(&line) {
            nodes.push(Node::Logic {
                condition: None,
                is_else: true,
                is_end: false,
            });
            i += 1;
            continue;
        }

        if RE_END.is_match(&line) {
            nodes.push(Node::Logic {
                condition: None,
                is_else: false,
                is_end: true,
            });
            i += 1;
            continue;
        }

        if let Some(c) = RE_SECTION.captures(&line) {
            nodes.push(Node::SectionHeading {
                text: line.clone(),
                anchor: c[1].to_string(),
            });
            i += 1;
            continue;
        }

        if is_scene_heading(&line) {
            scene_count += 1;
            nodes.push(Node::SceneHeading {
                scene_id: format!("SCENE_{}", scene_count),
                text: line.clone(),
            });
            i += 1;
            continue;
        }

        // Character cue: all-caps line with at least one following
        // non-blank line. Without the lookahead this is just loud action
        // text.
        if RE_CHARACTER.is_match(&line) && i + 1 < n && !lines[i + 1].trim().is_empty() {
            let character = line.clone();
            let mut j = i + 1;
            let mut parenthetical = None;
            if let Some(c) = RE_PARENTHETICAL.captures(lines[j].trim()) {
                parenthetical = Some(c[1].to_string());
                j += 1;
            }
            let mut dialogue: Vec<String> = Vec::new();
            while j < n {
                let d = lines[j].trim();
                if d.is_empty() {
                    break;
                }
                dialogue.push(d.to_string());
                j += 1;
            }
            nodes.push(Node::Dialogue {
                character,
                text: dialogue.join(" "),
                parenthetical,
            });
            i = j;
            continue;
        }

        nodes.push(Node::Action { text: line });
        i += 1;
    }

    nodes
}

/// Render the node sequence back to canonical FFlow. Each node becomes a
/// chunk of lines; chunks are separated by one blank line, which is what
/// keeps dialogue blocks terminated and cue lookahead isolated on
/// re-parse.
pub fn generate(ir: &[Node], _config: &Config) -> String {
    let mut chunks: Vec<String> = Vec::new();

    for node in ir {
        let mut lines: Vec<String> = Vec::new();
        match node {
            Node::Frontmatter { variables } => {
                for (k, v) in variables {
                    lines.push(format!("$ {}: {}", k, v));
                }
                lines.push("===".to_string());
            }
            Node::SceneHeading { text, .. } => lines.push(text.clone()),
            Node::SectionHeading { anchor, .. } => lines.push(format!("# {}", anchor)),
            Node::Action { text } => lines.push(text.clone()),
            Node::Dialogue {
                character,
                text,
                parenthetical,
            } => {
                lines.push(character.clone());
                if let Some(p) = parenthetical {
                    lines.push(p.clone());
                }
                if !text.is_empty() {
                    lines.push(text.clone());
                }
            }
            Node::Asset { kind, data } => lines.push(format!("! {}: {}", kind, data)),
            Node::StateChange { expression } => lines.push(format!("~ {}", expression)),
            Node::Logic {
                condition,
                is_else,
                is_end,
            } => {
                if let Some(cond) = condition {
                    lines.push(format!("(IF: {})", cond));
                } else if *is_else {
                    lines.push("(ELSE)".to_string());
                } else if *is_end {
                    lines.push("(END)".to_string());
                }
            }
            Node::Decision { prompt } => lines.push(format!("? {}", prompt)),
            Node::Choice {
                label,
                text,
                target,
                ..
            } => {
                let arrow = if target.is_empty() {
                    String::new()
                } else {
                    format!(" -> #{}", target)
                };
                lines.push(format!("+ [{}] {}{}", label, text, arrow));
            }
            Node::Jump { target } => lines.push(format!("-> #{}", target)),
        }
        if !lines.is_empty() {
            chunks.push(lines.join("\n"));
        }
    }

    let mut out = chunks.join("\n\n");
    out.push('\n');
    out
}
