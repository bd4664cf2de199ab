//! Line-level rewriting of `pair:` index entries.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Prefix prepended to the input file name to form the output file name.
pub const OUTPUT_PREFIX: &str = "new-";

/// Marker identifying lines that carry a cross-reference pair.
const PAIR_MARKER: &str = "pair: ";

/// Counters collected while reformatting a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReformatStats {
    /// Number of lines read (and written)
    pub total: usize,
    /// Number of lines that were rewritten
    pub rewritten: usize,
}

/// Rewrite a single index line.
///
/// Lines without `"pair: "`, and lines already ending in `)`, are returned
/// borrowed and unchanged. Matching lines keep the text before the first
/// `;` and replace everything after it with `member (class)`, built from the
/// first two dot-separated components of the last `;` segment.
///
/// Returns `None` when the last segment has no member component.
///
/// # Example
///
/// ```
/// use doctools::index::reformat_line;
///
/// let line = reformat_line("pair: foo; bar; alpha.Beta.gamma").unwrap();
/// assert_eq!(line, "pair: foo; Beta (alpha)");
/// ```
pub fn reformat_line(line: &str) -> Option<Cow<'_, str>> {
    if !line.contains(PAIR_MARKER) || line.ends_with(')') {
        return Some(Cow::Borrowed(line));
    }

    let head = line.split_once(';').map_or(line, |(head, _)| head);
    let tail = line.rsplit_once(';').map_or(line, |(_, tail)| tail);

    let mut refs = tail.split('.');
    let class = refs.next()?.trim();
    let member = refs.next()?;

    Some(Cow::Owned(format!("{}; {} ({})", head, member, class)))
}

/// Rewrite every line of `text`, joining the result with `\n`.
///
/// The output has exactly as many lines as the input and no trailing newline.
pub fn reformat_text(text: &str) -> Result<(String, ReformatStats)> {
    let mut stats = ReformatStats::default();
    let mut out_lines = Vec::new();

    for (idx, line) in split_lines(text).into_iter().enumerate() {
        let rewritten = reformat_line(line).ok_or_else(|| Error::MalformedEntry {
            line: idx + 1,
            content: line.to_string(),
        })?;

        stats.total += 1;
        if let Cow::Owned(_) = rewritten {
            stats.rewritten += 1;
            log::debug!("line {}: {:?} -> {:?}", idx + 1, line, rewritten);
        }
        out_lines.push(rewritten);
    }

    Ok((out_lines.join("\n"), stats))
}

/// Split `text` at every line boundary, dropping the terminators.
///
/// Besides `\n` and `\r\n` this accepts a lone `\r` and the other Unicode
/// line separators (`\x0b`, `\x0c`, `\x1c`-`\x1e`, `\u{85}`, `\u{2028}`,
/// `\u{2029}`). A trailing terminator does not start an extra empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_line_break(ch) {
            continue;
        }
        lines.push(&text[start..idx]);
        start = idx + ch.len_utf8();
        if ch == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                start = next + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Compute the output path for an input file: `new-<file name>`, placed in
/// `dir` if given, otherwise relative to the working directory.
pub fn output_path_for(input: &Path, dir: Option<&Path>) -> Result<PathBuf> {
    let name = input.file_name().ok_or_else(|| {
        Error::InvalidOption(format!("input path has no file name: {}", input.display()))
    })?;

    let mut file_name = std::ffi::OsString::from(OUTPUT_PREFIX);
    file_name.push(name);

    Ok(match dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    })
}

/// Reformat `input` and write `new-<file name>` into the working directory.
///
/// The input file is never modified.
pub fn reformat_file<P: AsRef<Path>>(input: P) -> Result<(PathBuf, ReformatStats)> {
    reformat_file_to(input, None)
}

/// Reformat `input` and write the result into `dir` (working directory if `None`).
///
/// Nothing is written when a line is malformed. The output directory must exist.
pub fn reformat_file_to<P: AsRef<Path>>(
    input: P,
    dir: Option<&Path>,
) -> Result<(PathBuf, ReformatStats)> {
    let input = input.as_ref();
    let output = output_path_for(input, dir)?;

    let text = fs::read_to_string(input)?;
    let (reformatted, stats) = reformat_text(&text)?;
    fs::write(&output, reformatted)?;

    log::info!(
        "Reformatted {} of {} lines into {}",
        stats.rewritten,
        stats.total,
        output.display()
    );

    Ok((output, stats))
}
