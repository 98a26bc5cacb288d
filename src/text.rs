//! Line and indentation helpers shared by the adapters.

use std::ops::Range;

/// Width of leading spaces and tabs.
pub fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Strip the common leading indentation of all non-blank lines.
///
/// Leading and trailing blank lines are dropped so that snippets pasted
/// with surrounding newlines parse as top-level code.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().position(|l| !is_blank(l));
    let last = lines.iter().rposition(|l| !is_blank(l));
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let lines = &lines[first..=last];

    let common = lines
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);

    let mut out = String::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if !is_blank(line) {
            out.push_str(&line[common..]);
        }
    }
    out.push('\n');
    out
}

/// Shift every line after the first by `delta` columns.
///
/// The first segment continues whatever line the text is spliced into, so
/// it is left alone. Blank lines in the middle stay untouched; the final
/// segment is always shifted so gaps keep ending at the new indentation.
/// Negative deltas strip at most the available leading spaces.
pub fn reindent(text: &str, delta: isize) -> String {
    reindent_except(text, delta, &[])
}

/// [`reindent`] that leaves alone every line starting inside one of
/// `literals`, given as byte ranges into `text`.
///
/// Leading whitespace on such a line belongs to a string's value.
pub fn reindent_except(text: &str, delta: isize, literals: &[Range<usize>]) -> String {
    if delta == 0 {
        return text.to_string();
    }

    let segments: Vec<&str> = text.split('\n').collect();
    let last = segments.len() - 1;
    let mut out = String::with_capacity(text.len() + segments.len() * delta.unsigned_abs());
    let mut offset = 0;

    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let quoted = literals.iter().any(|r| r.start < offset && offset < r.end);
        let shift = i > 0 && !quoted && (i == last || !is_blank(segment));
        offset += segment.len() + 1;

        if !shift {
            out.push_str(segment);
        } else if delta > 0 {
            out.extend(std::iter::repeat(' ').take(delta as usize));
            out.push_str(segment);
        } else {
            let strip = segment
                .bytes()
                .take(delta.unsigned_abs())
                .take_while(|&b| b == b' ')
                .count();
            out.push_str(&segment[strip..]);
        }
    }
    out
}

/// The parts of `ranges` that fall inside `window`, relative to its start.
pub fn clip_ranges(ranges: &[Range<usize>], window: Range<usize>) -> Vec<Range<usize>> {
    ranges
        .iter()
        .filter(|r| r.start < window.end && window.start < r.end)
        .map(|r| r.start.max(window.start) - window.start..r.end.min(window.end) - window.start)
        .collect()
}

/// Indentation of the line containing `offset`.
pub fn line_indent(source: &str, offset: usize) -> usize {
    indent_width(&source[line_start(source, offset)..])
}

/// Byte offset of the start of the line containing `offset`.
pub fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Grow `range` to whole lines when only whitespace surrounds it on its
/// first and last line. The trailing newline is included.
pub fn whole_lines(source: &str, range: Range<usize>) -> Range<usize> {
    let line_begin = line_start(source, range.start);
    let rest = &source[range.end..];
    let line_rest = rest.find('\n').map_or(rest, |i| &rest[..i]);

    if !source[line_begin..range.start].trim().is_empty() || !line_rest.trim().is_empty() {
        return range;
    }

    let mut end = range.end + line_rest.len();
    if source[end..].starts_with('\n') {
        end += 1;
    }
    line_begin..end
}

/// Remove the lines covering `range`, collapsing the blank lines that
/// would otherwise pile up at the seam.
pub fn remove_lines(source: &str, range: Range<usize>) -> String {
    let range = whole_lines(source, range);
    let before = &source[..range.start];
    let mut after = &source[range.end..];

    let seam_blank = before.is_empty() || before.ends_with("\n\n");
    if seam_blank {
        while let Some(newline) = after.find('\n') {
            if !is_blank(&after[..newline]) {
                break;
            }
            after = &after[newline + 1..];
        }
    }

    if after.trim().is_empty() && !before.is_empty() {
        let mut out = before.trim_end().to_string();
        out.push('\n');
        return out;
    }

    let mut out = String::with_capacity(before.len() + after.len());
    out.push_str(before);
    out.push_str(after);
    out
}
