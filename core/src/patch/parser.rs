//! Parses the `*** Begin Patch ... *** End Patch` text envelope into a
//! [`ParsedPatch`].

use super::{Hunk, PatchError, PatchOp, ParsedPatch};

const BEGIN_SENTINEL: &str = "*** begin patch";
const END_SENTINEL: &str = "*** end patch";
const ADD_PREFIX: &str = "*** add file:";
const UPDATE_PREFIX: &str = "*** update file:";
const DELETE_PREFIX: &str = "*** delete file:";
const MOVE_PREFIX: &str = "*** move to:";
const EOF_MARKER: &str = "*** end of file";

/// Normalizes CRLF/CR to LF (parsing only; the applier tracks the file's own
/// original line ending separately).
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

struct ActionLine {
    op: PatchOp,
    path: String,
    line_no: usize,
}

fn find_action_line(lines: &[&str]) -> Result<ActionLine, PatchError> {
    let mut found: Option<ActionLine> = None;
    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        let (op, prefix) = if lower.starts_with(ADD_PREFIX) {
            (PatchOp::Add, ADD_PREFIX)
        } else if lower.starts_with(UPDATE_PREFIX) {
            (PatchOp::Update, UPDATE_PREFIX)
        } else if lower.starts_with(DELETE_PREFIX) {
            (PatchOp::Delete, DELETE_PREFIX)
        } else {
            continue;
        };
        if found.is_some() {
            return Err(PatchError::MultipleOps);
        }
        let path = line[prefix.len()..].trim().to_string();
        found = Some(ActionLine {
            op,
            path,
            line_no: i,
        });
    }
    found.ok_or(PatchError::EmptyPatch)
}

/// Parses a patch envelope. `strict=true` requires both sentinels to be
/// present; `strict=false` allows them to be absent as long as a recognized
/// file-action line is found.
pub fn parse_patch(patch_text: &str, strict: bool) -> Result<ParsedPatch, PatchError> {
    let normalized = normalize_newlines(patch_text);
    let all_lines: Vec<&str> = normalized.lines().collect();
    if all_lines.iter().all(|l| l.trim().is_empty()) {
        return Err(PatchError::EmptyPatch);
    }

    let has_begin = all_lines
        .first()
        .map(|l| l.trim().to_lowercase() == BEGIN_SENTINEL)
        .unwrap_or(false);
    let has_end = all_lines
        .iter()
        .rev()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim().to_lowercase() == END_SENTINEL)
        .unwrap_or(false);

    if strict && !(has_begin && has_end) {
        return Err(PatchError::MissingSentinel);
    }

    let body_start = if has_begin { 1 } else { 0 };
    let body_end = if has_end {
        all_lines
            .iter()
            .rposition(|l| l.trim().to_lowercase() == END_SENTINEL)
            .unwrap_or(all_lines.len())
    } else {
        all_lines.len()
    };
    let body = &all_lines[body_start..body_end];

    let action = find_action_line(body)?;
    let mut rest = &body[action.line_no + 1..];

    let mut move_to = None;
    if !rest.is_empty() && rest[0].trim().to_lowercase().starts_with(MOVE_PREFIX) {
        if action.op != PatchOp::Update {
            return Err(PatchError::InvalidMoveTarget(
                "Move to is only valid for Update File".to_string(),
            ));
        }
        let target = rest[0][rest[0].to_lowercase().find(MOVE_PREFIX).unwrap() + MOVE_PREFIX.len()..]
            .trim()
            .to_string();
        if target.is_empty() {
            return Err(PatchError::InvalidMoveTarget("empty move target".to_string()));
        }
        move_to = Some(target);
        rest = &rest[1..];
    }

    match action.op {
        PatchOp::Add => {
            let content = parse_add_body(rest)?;
            Ok(ParsedPatch {
                op: PatchOp::Add,
                path: action.path,
                hunks: vec![],
                add_content: Some(content),
                move_to: None,
            })
        }
        PatchOp::Delete => {
            for line in rest {
                if !line.trim().is_empty() {
                    return Err(PatchError::InvalidLine {
                        line_no: action.line_no + 1,
                        text: "Delete File body must be empty".to_string(),
                    });
                }
            }
            Ok(ParsedPatch {
                op: PatchOp::Delete,
                path: action.path,
                hunks: vec![],
                add_content: None,
                move_to: None,
            })
        }
        PatchOp::Update => {
            let hunks = parse_update_body(rest)?;
            if hunks.is_empty() {
                return Err(PatchError::NoHunks);
            }
            Ok(ParsedPatch {
                op: PatchOp::Update,
                path: action.path,
                hunks,
                add_content: None,
                move_to,
            })
        }
    }
}

fn parse_add_body(lines: &[&str]) -> Result<String, PatchError> {
    let mut out = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            out.push(String::new());
            continue;
        }
        if !line.starts_with('+') {
            return Err(PatchError::InvalidLine {
                line_no: i,
                text: line.to_string(),
            });
        }
        out.push(line[1..].to_string());
    }
    Ok(out.join("\n"))
}

fn parse_update_body(lines: &[&str]) -> Result<Vec<Hunk>, PatchError> {
    let mut hunks: Vec<Hunk> = Vec::new();
    // True once the active hunk has seen a context/removed/inserted line;
    // a further "@@" line after that starts a brand new hunk instead of
    // extending the scope list of the current one.
    let mut active_hunk_has_body = false;

    for (i, raw) in lines.iter().enumerate() {
        let line = *raw;
        if line.to_lowercase().starts_with("@@") {
            if hunks.is_empty() || active_hunk_has_body {
                hunks.push(Hunk::default());
                active_hunk_has_body = false;
            }
            let scope = line[2..].trim().to_string();
            if !scope.is_empty() {
                hunks.last_mut().unwrap().scope_lines.push(scope);
            }
            continue;
        }
        if line.trim().to_lowercase() == EOF_MARKER {
            if hunks.is_empty() {
                hunks.push(Hunk::default());
            }
            hunks.last_mut().unwrap().is_eof = true;
            continue;
        }
        if line.is_empty() {
            // Wholly blank line: empty context line.
            if hunks.is_empty() {
                hunks.push(Hunk::default());
            }
            let h = hunks.last_mut().unwrap();
            h.old_lines.push(String::new());
            h.new_lines.push(String::new());
            active_hunk_has_body = true;
            continue;
        }
        let (kind, content) = match line.chars().next() {
            Some(' ') => ('c', &line[1..]),
            Some('-') => ('-', &line[1..]),
            Some('+') => ('+', &line[1..]),
            _ => {
                return Err(PatchError::InvalidLine {
                    line_no: i,
                    text: line.to_string(),
                })
            }
        };
        if hunks.is_empty() {
            hunks.push(Hunk::default());
        }
        let h = hunks.last_mut().unwrap();
        match kind {
            'c' => {
                h.old_lines.push(content.to_string());
                h.new_lines.push(content.to_string());
            }
            '-' => h.old_lines.push(content.to_string()),
            '+' => h.new_lines.push(content.to_string()),
            _ => unreachable!(),
        }
        active_hunk_has_body = true;
    }
    Ok(hunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_add_file() {
        let patch = "*** Begin Patch\n*** Add File: a.md\n+hello\n+world\n*** End Patch";
        let parsed = parse_patch(patch, true).unwrap();
        assert_eq!(parsed.op, PatchOp::Add);
        assert_eq!(parsed.path, "a.md");
        assert_eq!(parsed.add_content.unwrap(), "hello\nworld");
    }

    #[test]
    fn strict_mode_requires_sentinels() {
        let patch = "*** Add File: a.md\n+hello";
        assert_eq!(parse_patch(patch, true).unwrap_err(), PatchError::MissingSentinel);
        assert!(parse_patch(patch, false).is_ok());
    }

    #[test]
    fn delete_file_rejects_nonempty_body() {
        let patch = "*** Begin Patch\n*** Delete File: a.md\nsomething\n*** End Patch";
        assert!(matches!(
            parse_patch(patch, true).unwrap_err(),
            PatchError::InvalidLine { .. }
        ));
    }

    #[test]
    fn update_file_parses_single_hunk_context_and_change() {
        let patch = "\
*** Begin Patch
*** Update File: a.py
@@ def foo():
 line1
-old
+new
*** End Patch";
        let parsed = parse_patch(patch, true).unwrap();
        assert_eq!(parsed.hunks.len(), 1);
        let h = &parsed.hunks[0];
        assert_eq!(h.scope_lines, vec!["def foo():".to_string()]);
        assert_eq!(h.old_lines, vec!["line1".to_string(), "old".to_string()]);
        assert_eq!(h.new_lines, vec!["line1".to_string(), "new".to_string()]);
    }

    #[test]
    fn consecutive_at_at_lines_before_body_share_one_hunk() {
        let patch = "\
*** Begin Patch
*** Update File: a.py
@@ class Foo
@@ def bar():
 ctx
-old
+new
*** End Patch";
        let parsed = parse_patch(patch, true).unwrap();
        assert_eq!(parsed.hunks.len(), 1);
        assert_eq!(
            parsed.hunks[0].scope_lines,
            vec!["class Foo".to_string(), "def bar():".to_string()]
        );
    }

    #[test]
    fn at_at_after_body_starts_new_hunk() {
        let patch = "\
*** Begin Patch
*** Update File: a.py
@@ def foo():
 ctx1
-a
+b
@@ def bar():
 ctx2
-c
+d
*** End Patch";
        let parsed = parse_patch(patch, true).unwrap();
        assert_eq!(parsed.hunks.len(), 2);
    }

    #[test]
    fn update_with_no_hunks_errors() {
        let patch = "*** Begin Patch\n*** Update File: a.py\n*** End Patch";
        assert_eq!(parse_patch(patch, true).unwrap_err(), PatchError::NoHunks);
    }

    #[test]
    fn eof_marker_sets_is_eof_on_hunk() {
        let patch = "\
*** Begin Patch
*** Update File: a.py
 line1
-old
+new
*** End of File
*** End Patch";
        let parsed = parse_patch(patch, true).unwrap();
        assert!(parsed.hunks[0].is_eof);
    }

    #[test]
    fn move_to_only_valid_for_update() {
        let patch = "\
*** Begin Patch
*** Add File: a.md
*** Move to: b.md
+x
*** End Patch";
        assert!(matches!(
            parse_patch(patch, true).unwrap_err(),
            PatchError::InvalidMoveTarget(_)
        ));
    }

    #[test]
    fn move_to_parsed_for_update() {
        let patch = "\
*** Begin Patch
*** Update File: a.md
*** Move to: b.md
 ctx
-old
+new
*** End Patch";
        let parsed = parse_patch(patch, true).unwrap();
        assert_eq!(parsed.move_to.as_deref(), Some("b.md"));
    }

    #[test]
    fn multiple_ops_rejected() {
        let patch = "\
*** Begin Patch
*** Add File: a.md
+x
*** Delete File: b.md
*** End Patch";
        assert_eq!(parse_patch(patch, true).unwrap_err(), PatchError::MultipleOps);
    }

    #[test]
    fn crlf_is_normalized_before_parsing() {
        let patch = "*** Begin Patch\r\n*** Add File: a.md\r\n+hi\r\n*** End Patch\r\n";
        let parsed = parse_patch(patch, true).unwrap();
        assert_eq!(parsed.add_content.unwrap(), "hi");
    }
}
