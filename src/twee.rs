use crate::config::Config;
use crate::idents;
use crate::ir::{Node, Script, SCENE_PREFIXES};
use crate::normalize;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static RE_PASSAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^::\s*(.+)").unwrap());
static RE_SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<<set\s+\$(\w+)\s*(?:to|=)\s*(.+)>>").unwrap());
static RE_IF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<<if\s+(.+)>>").unwrap());
static RE_ELSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<<else>>").unwrap());
static RE_ENDIF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:<<endif>>|<</if>>)").unwrap());
static RE_GOTO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^<<goto\s+"(.+)">>"#).unwrap());
static RE_BG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^<<bg\s+"(.+)">>"#).unwrap());
static RE_SHOW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^<<show\s+"(.+)">>"#).unwrap());
static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(.*?)(?:\|(.*?))?\]\]").unwrap());
static RE_DIALOGUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^*]+)\*\*:\s*(.*)$").unwrap());

fn is_scene_name(name: &str) -> bool {
    SCENE_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Parse Twee (SugarCube) text into the node sequence. A `StoryInit`
/// passage is collected into one Frontmatter node prepended to the
/// result; the passage itself produces no node.
pub fn parse(text: &str) -> Script {
    let lines = normalize::clean_lines(text);

    let mut nodes: Script = Vec::new();
    let mut vars: IndexMap<String, String> = IndexMap::new();
    let mut in_story_init = false;

    for raw in &lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(c) = RE_PASSAGE.captures(line) {
            let name = c[1].trim().to_string();
            if name == "StoryInit" {
                in_story_init = true;
            } else {
                in_story_init = false;
                if is_scene_name(&name) {
                    nodes.push(Node::SceneHeading {
                        scene_id: name.clone(),
                        text: name,
                    });
                } else {
                    nodes.push(Node::SectionHeading {
                        text: name.clone(),
                        anchor: name,
                    });
                }
            }
            continue;
        }

        if in_story_init {
            // Only set macros matter here; everything else in StoryInit
            // is ignored.
            if let Some(c) = RE_SET.captures(line) {
                vars.insert(c[1].to_string(), c[2].trim().to_string());
            }
            continue;
        }

        if let Some(c) = RE_IF.captures(line) {
            nodes.push(Node::Logic {
                condition: Some(c[1].to_string()),
                is_else: false,
                is_end: false,
            });
            continue;
        }

        if RE_ELSE.is_match(line) {
            nodes.push(Node::Logic {
                condition: None,
                is_else: true,
                is_end: false,
            });
            continue;
        }

        if RE_ENDIF.is_match(line) {
            nodes.push(Node::Logic {
                condition: None,
                is_else: false,
                is_end: true,
            });
            continue;
        }

        if let Some(c) = RE_SET.captures(line) {
            nodes.push(Node::StateChange {
                expression: format!("{} = {}", &c[1], c[2].trim()),
            });
            continue;
        }

        if let Some(c) = RE_BG.captures(line) {
            nodes.push(Node::Asset {
                kind: "BG".to_string(),
                data: c[1].to_string(),
            });
            continue;
        }

        if let Some(c) = RE_SHOW.captures(line) {
            nodes.push(Node::Asset {
                kind: "SHOW".to_string(),
                data: c[1].to_string(),
            });
            continue;
        }

        if let Some(c) = RE_GOTO.captures(line) {
            nodes.push(Node::Jump {
                target: c[1].to_string(),
            });
            continue;
        }

        let links: Vec<regex::Captures> = RE_LINK.captures_iter(line).collect();
        if !links.is_empty() {
            let mut prev_end = 0;
            for c in &links {
                let whole = c.get(0).unwrap();
                let label = c.get(1).map_or("", |m| m.as_str()).to_string();
                // [[Target]] uses the link text as both label and target,
                // as does the degenerate [[Label|]] form.
                let target = match c.get(2).map(|m| m.as_str()) {
                    Some(t) if !t.is_empty() => t.to_string(),
                    _ => label.clone(),
                };
                let text = line[prev_end..whole.start()].trim().to_string();
                prev_end = whole.end();
                nodes.push(Node::Choice {
                    label,
                    text,
                    target,
                    conditions: Vec::new(),
                });
            }
            continue;
        }

        if let Some(c) = RE_DIALOGUE.captures(line) {
            nodes.push(Node::Dialogue {
                character: c[1].trim().to_string(),
                text: c[2].to_string(),
                parenthetical: None,
            });
            continue;
        }

        nodes.push(Node::Action {
            text: line.to_string(),
        });
    }

    if !vars.is_empty() {
        nodes.insert(0, Node::Frontmatter { variables: vars });
    }
    nodes
}

fn push_header(out: &mut Vec<String>, header: String) {
    if !out.is_empty() {
        out.push(String::new());
    }
    out.push(header);
}

/// Render the node sequence as Twee. State is one carried flag: whether
/// the previous node opened a named passage that the next scene heading
/// should fold into instead of starting a second one.
pub fn generate(ir: &[Node], config: &Config) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut last_was_section = false;

    for node in ir {
        match node {
            Node::Frontmatter { variables } => {
                push_header(&mut out, ":: StoryInit".to_string());
                for (k, v) in variables {
                    out.push(format!("<<set {}{} to {}>>", config.variable_sigil, k, v));
                }
                last_was_section = false;
            }
            Node::SceneHeading { text, .. } => {
                if !last_was_section {
                    push_header(&mut out, format!(":: {}", idents::passage_id(text)));
                }
                out.push(format!("**{}**", text));
                last_was_section = false;
            }
            Node::SectionHeading { anchor, .. } => {
                push_header(&mut out, format!(":: {}", anchor));
                last_was_section = true;
            }
            Node::Action { text } => {
                out.push(text.clone());
                last_was_section = false;
            }
            Node::Dialogue {
                character,
                text,
                parenthetical,
            } => {
                match parenthetical {
                    Some(p) => out.push(format!("**{}** {}: {}", character, p, text)),
                    None => out.push(format!("**{}**: {}", character, text)),
                }
                last_was_section = false;
            }
            Node::Asset { kind, data } => {
                match kind.as_str() {
                    "BG" => out.push(format!(
                        r#"<script>$("body").css("background-image", "url('{}.jpg')");</script>"#,
                        data
                    )),
                    "SHOW" => out.push(format!("<!-- SHOW: {} -->", data)),
                    _ => out.push(format!("<!-- Asset: {} {} -->", kind, data)),
                }
                last_was_section = false;
            }
            Node::StateChange { expression } => {
                let (var, rest) = expression
                    .split_once(' ')
                    .unwrap_or((expression.as_str(), ""));
                let var = if var.starts_with(&config.variable_sigil) {
                    var.to_string()
                } else {
                    format!("{}{}", config.variable_sigil, var)
                };
                if rest.is_empty() {
                    out.push(format!("<<set {}>>", var));
                } else {
                    out.push(format!("<<set {} {}>>", var, rest));
                }
                last_was_section = false;
            }
            Node::Logic {
                condition,
                is_else,
                is_end,
            } => {
                if let Some(cond) = condition {
                    out.push(format!(
                        "<<if {}>>",
                        idents::sigilize(cond, &config.variable_sigil, &config.condition_keywords)
                    ));
                } else if *is_else {
                    out.push("<<else>>".to_string());
                } else if *is_end {
                    out.push("<<endif>>".to_string());
                }
                last_was_section = false;
            }
            Node::Decision { prompt } => {
                out.push(prompt.clone());
                last_was_section = false;
            }
            Node::Choice {
                label,
                text,
                target,
                ..
            } => {
                let display = if text.is_empty() { label } else { text };
                if target.is_empty() {
                    // Inline-body choice: the flat sequence cannot attach
                    // the nodes that follow, so make the degradation loud.
                    out.push(format!(
                        "<!-- choice '{}' has an inline body; flat export cannot attach it -->",
                        label
                    ));
                    out.push(format!("[[{}|{}]]", display, config.placeholder_target));
                } else {
                    out.push(format!("[[{}|{}]]", display, target));
                }
                last_was_section = false;
            }
            Node::Jump { target } => {
                out.push(format!("<<goto \"{}\">>", target));
                last_was_section = false;
            }
        }
    }

    let mut s = out.join("\n");
    s.push('\n');
    s
}
