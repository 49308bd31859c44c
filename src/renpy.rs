use crate::config::Config;
use crate::idents;
use crate::ir::{Node, Script};
use crate::normalize;
use regex::Regex;
use std::sync::LazyLock;

static RE_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^label\s+(\w+):").unwrap());
static RE_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\$\s*(\w+)\s*=\s*(.+)").unwrap());
static RE_SCENE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^scene\s+(.+)").unwrap());
static RE_SHOW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^show\s+(.+)").unwrap());
static RE_MENU: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^menu:").unwrap());
static RE_JUMP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^jump\s+(\w+)").unwrap());
static RE_IF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^if\s+(.+):").unwrap());
static RE_ELSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^else:").unwrap());
static RE_DIALOGUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^(\w+)\s+"(.+)""#).unwrap());
static RE_ACTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^"(.+)""#).unwrap());

/// Parse Ren'Py script into the node sequence. Indentation is not
/// tracked, so Logic-end nodes are never produced by this path; the
/// resulting IR is known-incomplete for generators that assume balanced
/// runs.
pub fn parse(text: &str) -> Script {
    let lines = normalize::clean_lines(text);

    let mut nodes: Script = Vec::new();
    let mut in_menu = false;
    let mut pending_label: Option<String> = None;

    for raw in &lines {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if in_menu {
            // A control line ends the menu; it is classified normally
            // below.
            if RE_IF.is_match(line) || RE_ELSE.is_match(line) || RE_LABEL.is_match(line) {
                in_menu = false;
                pending_label = None;
            } else if line.ends_with(':') {
                pending_label =
                    Some(line.trim_matches(|c| c == '"' || c == ':' || c == ' ').to_string());
                continue;
            } else if let Some(c) = RE_JUMP.captures(line) {
                if let Some(label) = pending_label.take() {
                    nodes.push(Node::Choice {
                        label,
                        text: String::new(),
                        target: c[1].to_string(),
                        conditions: Vec::new(),
                    });
                    continue;
                }
            }
        }

        if let Some(c) = RE_LABEL.captures(line) {
            let label = c[1].to_string();
            // `label start:` is the implicit entry point, not a section.
            if label != "start" {
                nodes.push(Node::SectionHeading {
                    text: label.clone(),
                    anchor: label,
                });
            }
            continue;
        }

        if let Some(c) = RE_VAR.captures(line) {
            nodes.push(Node::StateChange {
                expression: format!("{} = {}", &c[1], &c[2]),
            });
            continue;
        }

        if let Some(c) = RE_SCENE.captures(line) {
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

        if RE_MENU.is_match(line) {
            in_menu = true;
            pending_label = None;
            nodes.push(Node::Decision {
                prompt: "Choice".to_string(),
            });
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

        if let Some(c) = RE_DIALOGUE.captures(line) {
            nodes.push(Node::Dialogue {
                character: c[1].to_string(),
                text: c[2].to_string(),
                parenthetical: None,
            });
            continue;
        }

        if let Some(c) = RE_ACTION.captures(line) {
            nodes.push(Node::Action {
                text: c[1].to_string(),
            });
            continue;
        }

        if let Some(c) = RE_JUMP.captures(line) {
            nodes.push(Node::Jump {
                target: c[1].to_string(),
            });
            continue;
        }

        // Anything else (returns, transitions, audio statements we do not
        // model) is dropped.
    }

    nodes
}

/// One open block in the generated script. Indent depth is the stack
/// length, so mismatched closers can never underflow it.
#[derive(Debug, PartialEq)]
enum Frame {
    Label,
    If,
    Else,
    Menu,
}

/// Render the node sequence as Ren'Py script. Nesting is re-linearized
/// through an explicit block stack; unbalanced Logic runs degrade to
/// misindented output, never to a panic.
pub fn generate(ir: &[Node], config: &Config) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    let width = config.indent_width;
    let pad = |frames: &Vec<Frame>| " ".repeat(frames.len() * width);

    for node in ir {
        // A menu block ends at the first node that is not one of its
        // choices.
        if !matches!(node, Node::Choice { .. }) && frames.last() == Some(&Frame::Menu) {
            frames.pop();
        }

        match node {
            Node::Frontmatter { variables } => {
                if !out.is_empty() {
                    out.push(String::new());
                }
                out.push("label start:".to_string());
                frames.clear();
                frames.push(Frame::Label);
                for (k, v) in variables {
                    out.push(format!("{}$ {} = {}", pad(&frames), k, v));
                }
            }
            Node::SceneHeading { text, .. } => {
                out.push(format!("{}# {}", pad(&frames), text));
            }
            Node::SectionHeading { anchor, .. } => {
                frames.clear();
                if !out.is_empty() {
                    out.push(String::new());
                }
                out.push(format!("label {}:", anchor));
                frames.push(Frame::Label);
            }
            Node::Action { text } => {
                out.push(format!("{}\"{}\"", pad(&frames), text));
            }
            Node::Dialogue {
                character, text, ..
            } => {
                out.push(format!(
                    "{}{} \"{}\"",
                    pad(&frames),
                    idents::character_id(character),
                    text
                ));
            }
            Node::Asset { kind, data } => {
                let stmt = match kind.as_str() {
                    "BG" => format!("scene {}", data),
                    "SHOW" => format!("show {}", data),
                    "MUSIC" => format!("play music \"{}\"", data),
                    _ => format!("# asset {}: {}", kind, data),
                };
                out.push(format!("{}{}", pad(&frames), stmt));
            }
            Node::StateChange { expression } => {
                out.push(format!("{}$ {}", pad(&frames), expression));
            }
            Node::Logic {
                condition,
                is_else,
                is_end,
            } => {
                if let Some(cond) = condition {
                    out.push(format!("{}if {}:", pad(&frames), cond));
                    frames.push(Frame::If);
                } else if *is_else {
                    if frames.last() == Some(&Frame::If) {
                        frames.pop();
                    }
                    out.push(format!("{}else:", pad(&frames)));
                    frames.push(Frame::Else);
                } else if *is_end {
                    if matches!(frames.last(), Some(Frame::If) | Some(Frame::Else)) {
                        frames.pop();
                    }
                }
            }
            Node::Decision { prompt } => {
                out.push(format!("{}menu:", pad(&frames)));
                frames.push(Frame::Menu);
                out.push(format!("{}\"{}\"", pad(&frames), prompt));
            }
            Node::Choice {
                label,
                text,
                target,
                ..
            } => {
                out.push(format!("{}\"{}\":", pad(&frames), label));
                let body = " ".repeat((frames.len() + 1) * width);
                if !text.is_empty() {
                    out.push(format!("{}\"{}\"", body, text));
                }
                if target.is_empty() {
                    // Inline-body choice: there is no jump target to emit,
                    // keep the block valid and make the gap visible.
                    out.push(format!("{}# inline choice body is not representable", body));
                    out.push(format!("{}pass", body));
                } else {
                    out.push(format!("{}jump {}", body, target));
                }
            }
            Node::Jump { target } => {
                out.push(format!("{}jump {}", pad(&frames), target));
            }
        }
    }

    let mut s = out.join("\n");
    s.push('\n');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indent_of(line: &str) -> usize {
        line.len() - line.trim_start().len()
    }

    #[test]
    fn test_label_start_is_consumed() {
        let nodes = parse("label start:\n    \"Hello.\"");
        assert_eq!(nodes.len(), 1);
        assert!(matches!(&nodes[0], Node::Action { text } if text == "Hello."));
    }

    #[test]
    fn test_label_becomes_section() {
        let nodes = parse("label cellar:");
        assert!(matches!(
            &nodes[0],
            Node::SectionHeading { anchor, .. } if anchor == "cellar"
        ));
    }

    #[test]
    fn test_statements() {
        let script = "label start:\n    $ hp = 100\n    scene bg room\n    show eve happy\n    eve \"Hello\"\n    \"It is dark.\"\n    jump cellar";
        let nodes = parse(script);
        assert!(matches!(&nodes[0], Node::StateChange { expression } if expression == "hp = 100"));
        assert!(
            matches!(&nodes[1], Node::Asset { kind, data } if kind == "BG" && data == "bg room")
        );
        assert!(
            matches!(&nodes[2], Node::Asset { kind, data } if kind == "SHOW" && data == "eve happy")
        );
        assert!(
            matches!(&nodes[3], Node::Dialogue { character, text, .. } if character == "eve" && text == "Hello")
        );
        assert!(matches!(&nodes[4], Node::Action { text } if text == "It is dark."));
        assert!(matches!(&nodes[5], Node::Jump { target } if target == "cellar"));
    }

    #[test]
    fn test_menu_produces_decision_and_choices() {
        let script = "menu:\n    \"Go West\":\n        jump west_room\n    \"Stay\":\n        jump bar";
        let nodes = parse(script);
        assert!(matches!(&nodes[0], Node::Decision { .. }));
        assert!(matches!(
            &nodes[1],
            Node::Choice { label, target, .. } if label == "Go West" && target == "west_room"
        ));
        assert!(matches!(
            &nodes[2],
            Node::Choice { label, target, .. } if label == "Stay" && target == "bar"
        ));
    }

    #[test]
    fn test_if_after_menu_exits_menu_mode() {
        let script = "menu:\n    \"Go\":\n        jump west\nif hp < 0:\n    \"Dead\"";
        let nodes = parse(script);
        assert!(matches!(&nodes[0], Node::Decision { .. }));
        assert!(matches!(&nodes[1], Node::Choice { .. }));
        assert!(matches!(
            &nodes[2],
            Node::Logic { condition: Some(c), .. } if c == "hp < 0"
        ));
        assert!(matches!(&nodes[3], Node::Action { text } if text == "Dead"));
    }

    #[test]
    fn test_no_logic_end_is_emitted() {
        let nodes = parse("if hp > 0:\n    \"Alive\"\nelse:\n    \"Dead\"");
        assert!(!nodes
            .iter()
            .any(|n| matches!(n, Node::Logic { is_end: true, .. })));
    }

    #[test]
    fn test_comments_are_skipped() {
        let nodes = parse("# just a note\n\"Text.\"");
        assert_eq!(nodes.len(), 1);
        assert!(matches!(&nodes[0], Node::Action { .. }));
    }

    #[test]
    fn test_generate_if_else_indentation() {
        let ir = vec![
            Node::SceneHeading {
                scene_id: "SCENE_1".into(),
                text: "INT. START".into(),
            },
            Node::Logic {
                condition: Some("x > 1".into()),
                is_else: false,
                is_end: false,
            },
            Node::Action {
                text: "True".into(),
            },
            Node::Logic {
                condition: None,
                is_else: true,
                is_end: false,
            },
            Node::Action {
                text: "False".into(),
            },
            Node::Logic {
                condition: None,
                is_else: false,
                is_end: true,
            },
            Node::Action {
                text: "Done.".into(),
            },
        ];
        let out = generate(&ir, &Config::default());
        let lines: Vec<&str> = out.lines().filter(|l| !l.trim().is_empty()).collect();

        let if_idx = lines.iter().position(|l| l.contains("if x > 1:")).unwrap();
        assert!(indent_of(lines[if_idx + 1]) > indent_of(lines[if_idx]));

        let else_idx = lines.iter().position(|l| l.contains("else:")).unwrap();
        assert!(indent_of(lines[else_idx + 1]) > indent_of(lines[else_idx]));

        let true_line = lines.iter().find(|l| l.contains("True")).unwrap();
        let done_line = lines.iter().find(|l| l.contains("Done.")).unwrap();
        assert!(indent_of(done_line) < indent_of(true_line));
    }

    #[test]
    fn test_generate_section_resets_depth() {
        let ir = vec![
            Node::Logic {
                condition: Some("x".into()),
                is_else: false,
                is_end: false,
            },
            Node::SectionHeading {
                text: "CELLAR".into(),
                anchor: "CELLAR".into(),
            },
            Node::Action {
                text: "Cold down here.".into(),
            },
        ];
        let out = generate(&ir, &Config::default());
        assert!(out.contains("\nlabel CELLAR:"));
        assert!(out.contains("\n    \"Cold down here.\""));
    }

    #[test]
    fn test_generate_menu_block() {
        let ir = vec![
            Node::Decision {
                prompt: "What now?".into(),
            },
            Node::Choice {
                label: "Go".into(),
                text: "Move out".into(),
                target: "WEST".into(),
                conditions: Vec::new(),
            },
            Node::Action {
                text: "Later.".into(),
            },
        ];
        let out = generate(&ir, &Config::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "menu:");
        assert_eq!(lines[1], "    \"What now?\"");
        assert_eq!(lines[2], "    \"Go\":");
        assert_eq!(lines[3], "        \"Move out\"");
        assert_eq!(lines[4], "        jump WEST");
        // the node after the last choice closes the menu block
        assert_eq!(lines[5], "\"Later.\"");
    }

    #[test]
    fn test_generate_inline_choice_emits_pass() {
        let ir = vec![
            Node::Decision {
                prompt: "?".into(),
            },
            Node::Choice {
                label: "Search".into(),
                text: String::new(),
                target: String::new(),
                conditions: Vec::new(),
            },
        ];
        let out = generate(&ir, &Config::default());
        assert!(out.contains("pass"));
        assert!(out.contains("# inline choice body is not representable"));
        assert!(!out.contains("jump\n"));
    }

    #[test]
    fn test_generate_unbalanced_closers_do_not_underflow() {
        let ir = vec![
            Node::Logic {
                condition: None,
                is_else: false,
                is_end: true,
            },
            Node::Logic {
                condition: None,
                is_else: true,
                is_end: false,
            },
            Node::Action {
                text: "Still standing.".into(),
            },
        ];
        let out = generate(&ir, &Config::default());
        assert!(out.contains("else:"));
        assert!(out.contains("Still standing."));
    }

    #[test]
    fn test_generate_frontmatter_opens_start_label() {
        let mut variables = indexmap::IndexMap::new();
        variables.insert("hp".to_string(), "100".to_string());
        let out = generate(&[Node::Frontmatter { variables }], &Config::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "label start:");
        assert_eq!(lines[1], "    $ hp = 100");
    }

    #[test]
    fn test_generate_assets() {
        let ir = vec![
            Node::Asset {
                kind: "BG".into(),
                data: "bar".into(),
            },
            Node::Asset {
                kind: "MUSIC".into(),
                data: "tension".into(),
            },
            Node::Asset {
                kind: "SFX".into(),
                data: "thunder".into(),
            },
        ];
        let out = generate(&ir, &Config::default());
        assert!(out.contains("scene bar"));
        assert!(out.contains("play music \"tension\""));
        assert!(out.contains("# asset SFX: thunder"));
    }

    #[test]
    fn test_generate_dialogue_character_id() {
        let ir = vec![Node::Dialogue {
            character: "OLD MAN".into(),
            text: "Leave.".into(),
            parenthetical: None,
        }];
        let out = generate(&ir, &Config::default());
        assert!(out.contains("OldMan \"Leave.\""));
    }
}
