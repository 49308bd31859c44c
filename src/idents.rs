use regex::Regex;
use std::sync::LazyLock;

static RE_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Tokens never treated as variable references when rewriting conditions.
const CONDITION_KEYWORDS: &[&str] = &["true", "false", "and", "or", "not"];

/// Rewrite a condition for a sigil-based target syntax: every
/// whitespace-separated token that is a bare identifier and not a keyword
/// gets the variable sigil prepended. Tokens already carrying the sigil,
/// numbers, and operators pass through untouched.
pub fn sigilize(condition: &str, sigil: &str, extra_keywords: &[String]) -> String {
    condition
        .split_whitespace()
        .map(|t| {
            if RE_IDENT.is_match(t)
                && !CONDITION_KEYWORDS.contains(&t)
                && !extra_keywords.iter().any(|k| k == t)
            {
                format!("{}{}", sigil, t)
            } else {
                t.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive a passage identifier from scene-heading text: spaces become
/// underscores, periods are dropped ("INT. BAR - NIGHT" -> "INT_BAR_-_NIGHT").
pub fn passage_id(text: &str) -> String {
    text.replace(' ', "_").replace('.', "")
}

/// Turn a screenplay character cue into a Ren'Py speaker identifier:
/// title-case each word and strip the spaces ("OLD MAN" -> "OldMan").
pub fn character_id(name: &str) -> String {
    name.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}
