//
// line_scan.rs
//
// Line-level scanning for path completion triggers
//
// This module provides:
// 1. Quote-state detection, used to gate whether completion should run at all
// 2. Extraction of the partial path the user has typed on the current line
//

/// Check whether the cursor sits inside an open quoted region.
///
/// Scans `[0, cursor_offset)` maintaining three independent parity toggles,
/// one per quote kind (`'`, `"`, `` ` ``). A quote character toggles its
/// counter only when the immediately preceding character is not a backslash.
/// The three kinds do not interact: an unescaped `"` has no effect on the
/// single-quote state.
///
/// `cursor_offset` is a character offset into `line`; offsets past the end of
/// the line are clamped.
pub fn is_inside_quoted_region(line: &str, cursor_offset: usize) -> bool {
    let mut single = false;
    let mut double = false;
    let mut backtick = false;

    let mut prev: Option<char> = None;
    for c in line.chars().take(cursor_offset) {
        if prev != Some('\\') {
            match c {
                '\'' => single = !single,
                '"' => double = !double,
                '`' => backtick = !backtick,
                _ => {}
            }
        }
        prev = Some(c);
    }

    single || double || backtick
}

/// Extract the partial path the user has typed before the cursor.
///
/// Scans `[0, cursor_offset)` tracking the position of the most recent
/// unescaped quote and the most recent whitespace character (space or tab)
/// independently. A backslash skips the following character unconditionally,
/// so `\'` neither terminates the fragment nor registers as a quote. The
/// fragment starts right after the last quote if one was seen, else right
/// after the last whitespace, else at the start of the line.
///
/// Note the quote delimiter wins even when whitespace occurs later in the
/// line, so `source("data raw/` yields `data raw/` as the fragment.
pub fn extract_user_fragment(line: &str, cursor_offset: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    let end = cursor_offset.min(chars.len());

    let mut last_quote: Option<usize> = None;
    let mut last_whitespace: Option<usize> = None;

    let mut i = 0;
    while i < end {
        let c = chars[i];

        // skip the character after an escape
        if c == '\\' {
            i += 2;
            continue;
        }

        match c {
            ' ' | '\t' => last_whitespace = Some(i),
            '\'' | '"' | '`' => last_quote = Some(i),
            _ => {}
        }

        i += 1;
    }

    let start = match last_quote.or(last_whitespace) {
        Some(pos) => pos + 1,
        None => 0,
    };

    chars[start..end].iter().collect()
}
