//! Source lints for the render/click-target contract.
//!
//! 1. Bracket-key text (`[X]`) in a `render.rs` must be registered as a click
//!    target. `cl.push(Line::from("[S] Shop"))` renders a button-looking label
//!    that cannot be tapped, which is easy to miss on mobile.
//! 2. Action id constants in an `actions.rs` must be unique, otherwise two
//!    buttons dispatch the same action.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Check if a string literal contains a bracket-key pattern like `[B]`, `[S]`, `[1]`.
fn contains_bracket_key(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 3 {
        return false;
    }
    for i in 0..bytes.len() - 2 {
        if bytes[i] == b'[' && bytes[i + 2] == b']' {
            let ch = bytes[i + 1];
            if ch.is_ascii_alphanumeric() || b"-=!~{}|\\".contains(&ch) {
                return true;
            }
        }
    }
    false
}

/// Scan source for `push(` calls (non-clickable) containing bracket-key patterns.
fn find_bracket_key_in_push(source: &str) -> Vec<(usize, String)> {
    let mut violations = Vec::new();

    for (line_num_0, line) in source.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with("//") {
            continue;
        }
        if !contains_bracket_key(line) {
            continue;
        }

        let has_push = line.contains(".push(");
        let has_clickable = line.contains("push_clickable(");

        if has_push && !has_clickable {
            violations.push((line_num_0 + 1, trimmed.to_string()));
        }
    }

    violations
}

/// `pub const NAME: u16 = VALUE;` declarations, in source order.
fn action_constants(source: &str) -> Vec<(String, u16)> {
    source
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("pub const ")?;
            let (name, rest) = rest.split_once(':')?;
            let (ty, value) = rest.split_once('=')?;
            if ty.trim() != "u16" {
                return None;
            }
            let value = value.trim().trim_end_matches(';').replace('_', "");
            Some((name.trim().to_string(), value.parse().ok()?))
        })
        .collect()
}

/// Names that share a value with an earlier constant.
fn find_duplicate_actions(source: &str) -> Vec<(String, String, u16)> {
    let mut seen: HashMap<u16, String> = HashMap::new();
    let mut duplicates = Vec::new();
    for (name, value) in action_constants(source) {
        if let Some(first) = seen.get(&value) {
            duplicates.push((first.clone(), name, value));
        } else {
            seen.insert(value, name);
        }
    }
    duplicates
}

fn visit_files(dir: &Path, file_name: &str, found: &mut Vec<(String, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            visit_files(&path, file_name, found);
        } else if path.file_name().map(|n| n == file_name).unwrap_or(false) {
            if let Ok(source) = fs::read_to_string(&path) {
                found.push((path.display().to_string(), source));
            }
        }
    }
}

fn games_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src/games")
}

#[test]
fn no_bracket_keys_in_non_clickable_push() {
    let mut files = Vec::new();
    visit_files(&games_dir(), "render.rs", &mut files);
    assert!(!files.is_empty(), "no render.rs found under src/games");

    let mut msg = String::new();
    for (path, source) in &files {
        for (line_num, line) in find_bracket_key_in_push(source) {
            msg.push_str(&format!("  {}:{}: {}\n", path, line_num, line));
        }
    }
    if !msg.is_empty() {
        panic!(
            "Found bracket-key text [X] in non-clickable cl.push() calls.\n\
             These should use push_clickable().\n\n{}",
            msg
        );
    }
}

#[test]
fn action_ids_are_unique() {
    let mut files = Vec::new();
    visit_files(&games_dir(), "actions.rs", &mut files);
    assert!(!files.is_empty(), "no actions.rs found under src/games");

    let mut msg = String::new();
    for (path, source) in &files {
        for (first, second, value) in find_duplicate_actions(source) {
            msg.push_str(&format!("  {}: {} and {} are both {}\n", path, first, second, value));
        }
    }
    if !msg.is_empty() {
        panic!("Duplicate action ids:\n{}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_bracket_key_in_push() {
        let source = r#"cl.push(Line::from(" [S] Shop  [M] Menu"));"#;
        let violations = find_bracket_key_in_push(source);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn allows_push_clickable() {
        let source = r#"cl.push_clickable(Line::from(" [S] Shop"), TOGGLE_SHOP);"#;
        let violations = find_bracket_key_in_push(source);
        assert!(violations.is_empty());
    }

    #[test]
    fn ignores_comments() {
        let source = r#"// cl.push(Line::from(" [S] Shop"));"#;
        let violations = find_bracket_key_in_push(source);
        assert!(violations.is_empty());
    }

    #[test]
    fn bracket_key_detection() {
        assert!(contains_bracket_key("[I]"));
        assert!(contains_bracket_key("[S]"));
        assert!(contains_bracket_key("[1]"));
        assert!(contains_bracket_key("[-]"));
        assert!(!contains_bracket_key("[]"));
        assert!(!contains_bracket_key("[II]"));
        assert!(!contains_bracket_key("abc"));
    }

    #[test]
    fn parses_action_constants() {
        let source = "pub const CLICK_PIXEL: u16 = 0;\npub const BUY_ITEM_BASE: u16 = 1_00;\npub const NAME: &str = \"x\";";
        assert_eq!(
            action_constants(source),
            vec![("CLICK_PIXEL".to_string(), 0), ("BUY_ITEM_BASE".to_string(), 100)]
        );
    }

    #[test]
    fn detects_duplicate_action_ids() {
        let source = "pub const A: u16 = 1;\npub const B: u16 = 2;\npub const C: u16 = 1;";
        assert_eq!(
            find_duplicate_actions(source),
            vec![("A".to_string(), "C".to_string(), 1)]
        );
    }
}
