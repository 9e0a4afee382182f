//! Applies a [`ParsedPatch`] to the filesystem under a [`PathSandbox`].
//!
//! Writes are atomic (temp file + rename), preserve the target's byte-order
//! mark and dominant line ending, and respect size limits on both the patch
//! text and any file touched.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use super::{find_hunk, Hunk, ParsedPatch, PatchError, PatchOp};
use crate::sandbox::PathSandbox;

/// Default cap on the raw patch text, enforced by [`check_patch_size`].
pub const DEFAULT_MAX_PATCH_BYTES: usize = 1 << 20;
/// Default cap on any single file read or written.
pub const DEFAULT_MAX_FILE_BYTES: usize = 10 << 20;

const UTF8_BOM: &str = "\u{feff}";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// The line ending used by the majority of terminated lines in `text`,
    /// defaulting to LF when there are none (e.g. new or single-line files).
    fn detect(text: &str) -> Self {
        let crlf = text.matches("\r\n").count();
        let total_newlines = text.matches('\n').count();
        let lf_only = total_newlines.saturating_sub(crlf);
        if crlf > lf_only {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

/// Options controlling how a patch is applied.
#[derive(Clone, Debug)]
pub struct ApplyOptions {
    /// When true, compute and return the result without touching the filesystem.
    pub dry_run: bool,
    pub max_patch_bytes: usize,
    pub max_file_bytes: usize,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        ApplyOptions {
            dry_run: false,
            max_patch_bytes: DEFAULT_MAX_PATCH_BYTES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Checks the raw patch text against `options.max_patch_bytes` before parsing.
pub fn check_patch_size(raw: &str, options: &ApplyOptions) -> Result<(), PatchError> {
    let actual = raw.len();
    if actual > options.max_patch_bytes {
        return Err(PatchError::TooLarge {
            limit: options.max_patch_bytes,
            actual,
        });
    }
    Ok(())
}

/// Outcome of applying one [`ParsedPatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyResult {
    pub op: PatchOp,
    pub path: String,
    pub moved_to: Option<String>,
    pub lines_added: usize,
    pub lines_removed: usize,
    /// Highest fuzz level required across all hunks (0 for Add/Delete).
    pub max_fuzz: u32,
}

/// Applies parsed patches to files confined to a [`PathSandbox`].
pub struct PatchApplier<'a> {
    sandbox: &'a PathSandbox,
}

impl<'a> PatchApplier<'a> {
    pub fn new(sandbox: &'a PathSandbox) -> Self {
        PatchApplier { sandbox }
    }

    pub fn apply(&self, parsed: &ParsedPatch, options: &ApplyOptions) -> Result<ApplyResult, PatchError> {
        match parsed.op {
            PatchOp::Add => self.apply_add(parsed, options),
            PatchOp::Delete => self.apply_delete(parsed, options),
            PatchOp::Update => self.apply_update(parsed, options),
        }
    }

    fn apply_add(&self, parsed: &ParsedPatch, options: &ApplyOptions) -> Result<ApplyResult, PatchError> {
        let (abs, rel) = self.sandbox.resolve(&parsed.path)?;
        if abs.exists() {
            return Err(PatchError::TargetExists(abs));
        }
        let content = parsed.add_content.clone().unwrap_or_default();
        if content.len() > options.max_file_bytes {
            return Err(PatchError::TooLarge {
                limit: options.max_file_bytes,
                actual: content.len(),
            });
        }
        let lines_added = content.split('\n').count();
        if !options.dry_run {
            atomic_write(&abs, content.as_bytes())?;
        }
        Ok(ApplyResult {
            op: PatchOp::Add,
            path: rel,
            moved_to: None,
            lines_added,
            lines_removed: 0,
            max_fuzz: 0,
        })
    }

    fn apply_delete(&self, parsed: &ParsedPatch, options: &ApplyOptions) -> Result<ApplyResult, PatchError> {
        let (abs, rel) = self.sandbox.resolve(&parsed.path)?;
        if !abs.exists() {
            return Err(PatchError::TargetMissing(abs));
        }
        if !abs.is_file() {
            return Err(PatchError::NotRegularFile(abs));
        }
        if !options.dry_run {
            fs::remove_file(&abs).map_err(|e| PatchError::Io(e.to_string()))?;
        }
        Ok(ApplyResult {
            op: PatchOp::Delete,
            path: rel,
            moved_to: None,
            lines_added: 0,
            lines_removed: 0,
            max_fuzz: 0,
        })
    }

    fn apply_update(&self, parsed: &ParsedPatch, options: &ApplyOptions) -> Result<ApplyResult, PatchError> {
        let (abs, rel) = self.sandbox.resolve(&parsed.path)?;
        if !abs.exists() {
            return Err(PatchError::TargetMissing(abs.clone()));
        }
        if !abs.is_file() {
            return Err(PatchError::NotRegularFile(abs));
        }

        let raw = fs::read(&abs).map_err(|e| PatchError::Io(e.to_string()))?;
        if raw.len() > options.max_file_bytes {
            return Err(PatchError::TooLarge {
                limit: options.max_file_bytes,
                actual: raw.len(),
            });
        }
        if raw.contains(&0u8) {
            return Err(PatchError::ContainsNulBytes(abs));
        }
        let text = String::from_utf8(raw).map_err(|_| PatchError::InvalidUtf8)?;

        let has_bom = text.starts_with(UTF8_BOM);
        let body = if has_bom { &text[UTF8_BOM.len()..] } else { text.as_str() };
        let line_ending = LineEnding::detect(body);

        let mut lines: Vec<String> = body.split('\n').map(|s| s.trim_end_matches('\r').to_string()).collect();

        let (new_lines, lines_added, lines_removed, max_fuzz) = apply_hunks(&mut lines, &parsed.hunks)?;

        let mut out = String::new();
        if has_bom {
            out.push_str(UTF8_BOM);
        }
        out.push_str(&new_lines.join(line_ending.as_str()));

        let moved_to = parsed.move_to.clone();
        let (dest_abs, dest_rel) = match &moved_to {
            Some(target) => self.sandbox.resolve(target)?,
            None => (abs.clone(), rel.clone()),
        };
        if moved_to.is_some() && dest_abs != abs && dest_abs.exists() {
            return Err(PatchError::TargetExists(dest_abs));
        }

        if !options.dry_run {
            atomic_write(&dest_abs, out.as_bytes())?;
            if dest_abs != abs {
                if let Err(e) = fs::remove_file(&abs) {
                    let _ = fs::remove_file(&dest_abs);
                    return Err(PatchError::Io(e.to_string()));
                }
            }
        }

        Ok(ApplyResult {
            op: PatchOp::Update,
            path: rel,
            moved_to: if moved_to.is_some() { Some(dest_rel) } else { None },
            lines_added,
            lines_removed,
            max_fuzz,
        })
    }
}

/// Applies hunks to `lines` in order, enforcing a monotonically advancing
/// search cursor between hunks. Returns the rewritten lines and totals.
fn apply_hunks(lines: &mut Vec<String>, hunks: &[Hunk]) -> Result<(Vec<String>, usize, usize, u32), PatchError> {
    let mut cursor = 0usize;
    let mut max_fuzz = 0u32;
    let mut lines_added = 0usize;
    let mut lines_removed = 0usize;
    let mut result = lines.clone();
    let mut offset: isize = 0;

    for hunk in hunks {
        let (pos, fuzz) = find_hunk(lines, hunk, cursor)?;
        if pos < cursor {
            return Err(PatchError::OutOfOrderHunk);
        }
        max_fuzz = max_fuzz.max(fuzz);

        let old_len = hunk.old_lines.len();
        let start = (pos as isize + offset) as usize;
        let end = start + old_len;
        result.splice(start..end, hunk.new_lines.iter().cloned());
        offset += hunk.new_lines.len() as isize - old_len as isize;

        lines_added += hunk.new_lines.len().saturating_sub(old_len.min(hunk.new_lines.len()));
        lines_removed += old_len.saturating_sub(hunk.new_lines.len().min(old_len));

        cursor = pos + old_len;
    }

    Ok((result, lines_added, lines_removed, max_fuzz))
}

fn atomic_write(dest: &Path, content: &[u8]) -> Result<(), PatchError> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| PatchError::Io(e.to_string()))?;
    let tmp_name = format!(
        ".{}.tmp-{}",
        dest.file_name().and_then(|n| n.to_str()).unwrap_or("patch"),
        std::process::id()
    );
    let tmp_path: PathBuf = parent.join(tmp_name);
    {
        let mut f = fs::File::create(&tmp_path).map_err(|e| PatchError::Io(e.to_string()))?;
        f.write_all(content).map_err(|e| PatchError::Io(e.to_string()))?;
        f.sync_all().map_err(|e| PatchError::Io(e.to_string()))?;
    }
    fs::rename(&tmp_path, dest).map_err(|e| PatchError::Io(e.to_string()))?;
    Ok(())
}
