use crate::ir::Node;
use std::fmt;

/// A structural problem in a node sequence. Diagnostics never abort a
/// conversion; the driver reports them on stderr.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Index of the offending node in the sequence.
    pub index: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}: {}", self.index, self.message)
    }
}

fn diag(index: usize, message: impl Into<String>) -> Diagnostic {
    Diagnostic {
        index,
        message: message.into(),
    }
}

/// Check a node sequence for structural problems the generators can only
/// degrade on: unbalanced logic runs, inline-body choices, misplaced
/// frontmatter. Narrative consistency (unreachable branches, unknown jump
/// targets) is deliberately not checked.
pub fn check(ir: &[Node]) -> Vec<Diagnostic> {
    let mut out: Vec<Diagnostic> = Vec::new();
    // (opening node index, else already seen)
    let mut open: Vec<(usize, bool)> = Vec::new();

    for (i, node) in ir.iter().enumerate() {
        match node {
            Node::Logic {
                condition: Some(_), ..
            } => open.push((i, false)),
            Node::Logic { is_else: true, .. } => match open.last_mut() {
                Some((_, seen)) if !*seen => *seen = true,
                Some(_) => out.push(diag(i, "second (ELSE) in one logic run")),
                None => out.push(diag(i, "(ELSE) with no open condition")),
            },
            Node::Logic { is_end: true, .. } => {
                if open.pop().is_none() {
                    out.push(diag(i, "(END) with no open condition"));
                }
            }
            Node::Choice { label, target, .. } if target.is_empty() => {
                out.push(diag(
                    i,
                    format!(
                        "choice '{}' relies on an inline body; linked formats cannot attach it",
                        label
                    ),
                ));
            }
            Node::Frontmatter { .. } if i > 0 => {
                out.push(diag(i, "frontmatter is not the first node"));
            }
            _ => {}
        }
    }

    for (i, _) in open {
        out.push(diag(i, "condition is never closed by (END)"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(c: &str) -> Node {
        Node::Logic {
            condition: Some(c.to_string()),
            is_else: false,
            is_end: false,
        }
    }
    fn an_else() -> Node {
        Node::Logic {
            condition: None,
            is_else: true,
            is_end: false,
        }
    }
    fn an_end() -> Node {
        Node::Logic {
            condition: None,
            is_else: false,
            is_end: true,
        }
    }

    #[test]
    fn test_balanced_run_is_clean() {
        let ir = vec![cond("x"), an_else(), an_end()];
        assert!(check(&ir).is_empty());
    }

    #[test]
    fn test_nested_runs_are_clean() {
        let ir = vec![cond("x"), cond("y"), an_end(), an_else(), an_end()];
        assert!(check(&ir).is_empty());
    }

    #[test]
    fn test_unclosed_condition() {
        let ir = vec![cond("x")];
        let diags = check(&ir);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].index, 0);
        assert!(diags[0].message.contains("never closed"));
    }

    #[test]
    fn test_stray_else_and_end() {
        let ir = vec![an_else(), an_end()];
        let diags = check(&ir);
        assert_eq!(diags.len(), 2);
        assert!(diags[0].message.contains("(ELSE) with no open condition"));
        assert!(diags[1].message.contains("(END) with no open condition"));
    }

    #[test]
    fn test_double_else() {
        let ir = vec![cond("x"), an_else(), an_else(), an_end()];
        let diags = check(&ir);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("second (ELSE)"));
    }

    #[test]
    fn test_inline_choice_reported() {
        let ir = vec![Node::Choice {
            label: "Search".into(),
            text: String::new(),
            target: String::new(),
            conditions: Vec::new(),
        }];
        let diags = check(&ir);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("Search"));
    }

    #[test]
    fn test_misplaced_frontmatter() {
        let ir = vec![
            Node::Action { text: "x".into() },
            Node::Frontmatter {
                variables: indexmap::IndexMap::new(),
            },
        ];
        let diags = check(&ir);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].index, 1);
    }
}
