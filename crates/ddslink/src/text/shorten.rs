// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bracket-aware shortening of JSON-like text for logs and reports.
//!
//! ```text
//! max-length output
//! ---------- ---------------------------------------------------
//!          7 { ... }
//!          8 {" ... }
//!          9 {"a ... }
//!         22 {"a[1]":1,"b[2": ... }
//!         29 {"a[1]":1,"b[2":3,"d":[ ... }
//!         41 {"a[1]":1,"b[2":3,"d":[1,2,{3,4,5, ... ]}
//!         42 {"a[1]":1,"b[2":3,"d":[1,2,{ ... },6,7,8]}
//!         43 {"a[1]":1,"b[2":3,"d":[1,2,{3 ... },6,7,8]}
//!         49 {"a[1]":1,"b[2":3,"d":[1,2,{3,4,5,6 ... },6,7,8]}
//!         50 {"a[1]":1,"b[2":3,"d":[1,2,{3,4,5,6,7,8,9},6,7,8]}   <- input
//! ```

use super::ellipsis::Ellipsis;
use super::slice::StrRef;

/// Budget used for log previews when none is given.
pub const DEFAULT_SHORTEN_LENGTH: usize = 96;

/// Shortest output that can still show structure: `{ ... }`.
pub const MIN_SHORTEN_LENGTH: usize = 7;

/// Shorten a JSON string representation to at most `max_length` bytes.
///
/// Both `[]` and `{}` blocks are candidates for elision. Every top-level
/// block is evaluated, whole and recursively, and the longest rendering that
/// fits wins:
///
/// ```text
/// {"one":1,"two":[1,2,3],"three":{"longassblock":{"insideblock":89012}},"four":4}
///     -> {"one":1,"two":[1,2,3],"three":{"longassblock":{ ... }},"four":4}
///     -> {"one":1,"two":[1,2,3],"three":{ ... },"four":4}
/// ```
///
/// When no block helps, the text is cut: `{"one":1,"two":2,"thr ... }`.
///
/// Returns `(text, empty)` when the text already fits, and the invalid
/// `(empty, text)` when `max_length` is below [`MIN_SHORTEN_LENGTH`].
pub fn shorten_json_string(text: StrRef<'_>, max_length: usize) -> Ellipsis<'_> {
    if text.len() <= max_length {
        return Ellipsis::new(text, StrRef::empty());
    }
    if max_length < MIN_SHORTEN_LENGTH {
        return Ellipsis::invalid(text);
    }

    let mut best = Ellipsis::default();
    let mut range = text;
    while let Some(block) = find_inside_block(range) {
        // Whole block out:
        //        {"one":1,"two":[1,2,3],"three":{ ... },"four":4}
        //        ^_______________________________^    ^__________^
        let candidate = Ellipsis::new(
            text.sub(text.begin(), block.begin() + 1),
            text.sub(block.end() - 1, text.end()),
        );
        consider(&mut best, candidate, max_length);

        // Only part of the block out:
        //        {"one":1,"two":[1,2,3],"three":{"longassblock":{ ... }},"four":4}
        //        ^_________________________________________________^    ^_______^
        let outside = (block.begin() - text.begin()) + (text.end() - block.end());
        if max_length > outside + 6 {
            let inside = shorten_json_string(block, max_length - outside);
            if inside.is_valid() && inside.second.as_bool() {
                let candidate = Ellipsis::new(
                    text.sub(text.begin(), inside.first.end()),
                    text.sub(inside.second.begin(), text.end()),
                );
                consider(&mut best, candidate, max_length);
            }
        }

        range = text.sub(block.end(), text.end());
    }

    if best.is_valid() {
        best
    } else {
        truncate_keeping_last(text, max_length)
    }
}

/// Shorten `text` and render the result.
pub fn shorten_json(text: &str, max_length: usize) -> String {
    shorten_json_string(StrRef::new(text), max_length).to_string()
}

/// Ties keep the earlier candidate.
fn consider<'a>(best: &mut Ellipsis<'a>, candidate: Ellipsis<'a>, max_length: usize) {
    let length = candidate.len();
    if length <= max_length && length > best.len() {
        *best = candidate;
    }
}

/// Cut the head to fit and keep the last character (the closing delimiter).
fn truncate_keeping_last(text: StrRef<'_>, max_length: usize) -> Ellipsis<'_> {
    let base = text.base();
    let mut last = text.end() - 1;
    while last > text.begin() && !base.is_char_boundary(last) {
        last -= 1;
    }
    let tail = text.sub(last, text.end());

    let head_budget = max_length.saturating_sub(Ellipsis::EXTRA_LENGTH + tail.len());
    let mut head_end = (text.begin() + head_budget).min(last);
    while head_end > text.begin() && !base.is_char_boundary(head_end) {
        head_end -= 1;
    }
    if head_end == text.begin() {
        return Ellipsis::invalid(text);
    }
    Ellipsis::new(text.sub(text.begin(), head_end), tail)
}

/// Find the first block inside `outside`, delimiters included.
///
/// ```text
///        {"one":1,"two":[1,2,3],"three":{"longassblock":{"insideblock":89012}},"four":4}
///                       ^_____^         ^___________________________________^
/// ```
///
/// The scan starts one byte in (past an opening brace, separating comma,
/// etc.). Quoted strings are skipped, honoring backslash escapes. Returns
/// `None` when there is no block or the text is unterminated.
fn find_inside_block(outside: StrRef<'_>) -> Option<StrRef<'_>> {
    let bytes = outside.base().as_bytes();
    let end = outside.end();
    let mut it = (outside.begin() + 1).min(end);
    let mut in_quote = false;

    // opening
    while it < end {
        let c = bytes[it];
        if in_quote {
            if c == b'\\' {
                it += 2;
                continue;
            }
            if c == b'"' {
                in_quote = false;
            }
        } else if c == b'"' {
            in_quote = true;
        } else if c == b'[' || c == b'{' {
            break;
        }
        it += 1;
    }
    if it >= end {
        return None;
    }
    let begin = it;
    let open = bytes[begin];
    let close = if open == b'[' { b']' } else { b'}' };

    // matching close
    let mut nesting = 0usize;
    loop {
        it += 1;
        if it >= end {
            return None;
        }
        let c = bytes[it];
        if in_quote {
            if c == b'\\' {
                it += 1;
            } else if c == b'"' {
                in_quote = false;
            }
        } else if c == b'"' {
            in_quote = true;
        } else if c == close {
            if nesting == 0 {
                break;
            }
            nesting -= 1;
        } else if c == open {
            nesting += 1;
        }
    }
    Some(outside.sub(begin, it + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"{"a[1]":1,"b[2":3,"d":[1,2,{3,4,5,6,7,8,9},6,7,8]}"#;
    const NESTED: &str =
        r#"{"one":1,"two":[1,2,3],"three":{"longassblock":{"insideblock":89012}},"four":4}"#;

    #[test]
    fn table_of_budgets() {
        let cases = [
            (7, "{ ... }"),
            (8, "{\" ... }"),
            (9, "{\"a ... }"),
            (22, r#"{"a[1]":1,"b[2": ... }"#),
            (29, r#"{"a[1]":1,"b[2":3,"d":[ ... }"#),
            (41, r#"{"a[1]":1,"b[2":3,"d":[1,2,{3,4,5, ... ]}"#),
            (42, r#"{"a[1]":1,"b[2":3,"d":[1,2,{ ... },6,7,8]}"#),
            (43, r#"{"a[1]":1,"b[2":3,"d":[1,2,{3 ... },6,7,8]}"#),
            (49, r#"{"a[1]":1,"b[2":3,"d":[1,2,{3,4,5,6 ... },6,7,8]}"#),
            (50, TABLE),
        ];
        for (max_length, expected) in cases {
            let el = shorten_json_string(StrRef::new(TABLE), max_length);
            assert!(el.is_valid(), "max_length {}", max_length);
            assert_eq!(el.to_string(), expected, "max_length {}", max_length);
            assert_eq!(el.len(), expected.len(), "max_length {}", max_length);
        }
    }

    #[test]
    fn nested_blocks_prefer_the_innermost_fit() {
        assert_eq!(
            shorten_json(NESTED, 65),
            r#"{"one":1,"two":[1,2,3],"three":{"longassblock":{ ... }},"four":4}"#
        );
        assert_eq!(
            shorten_json(NESTED, 48),
            r#"{"one":1,"two":[1,2,3],"three":{ ... },"four":4}"#
        );
        // Too small to keep "four": the block is cut instead.
        assert_eq!(
            shorten_json(NESTED, 47),
            r#"{"one":1,"two":[1,2,3],"three":{"longassb ... }"#
        );
    }

    #[test]
    fn flat_object_falls_back_to_truncation() {
        let flat = r#"{"one":1,"two":2,"three":3,"four":4}"#;
        assert_eq!(shorten_json(flat, 27), r#"{"one":1,"two":2,"thr ... }"#);
        assert_eq!(shorten_json(flat, 23), r#"{"one":1,"two":2, ... }"#);
    }

    #[test]
    fn too_small_budget_is_invalid() {
        for max_length in 0..MIN_SHORTEN_LENGTH {
            let el = shorten_json_string(StrRef::new(TABLE), max_length);
            assert!(!el.is_valid());
            assert_eq!(el.second.as_str(), TABLE);
        }
    }

    #[test]
    fn short_enough_is_untouched() {
        let text = r#"{"a":1,"b":[1,2,3]}"#;
        let el = shorten_json_string(StrRef::new(text), 1000);
        assert_eq!(el.first.as_str(), text);
        assert!(el.second.is_empty());
        assert_eq!(el.to_string(), text);
    }

    #[test]
    fn brackets_inside_strings_are_ignored() {
        let text = r#"{"s":"a\"[b","x":[1,2,3,4,5,6,7,8,9,10,11,12]}"#;
        assert_eq!(shorten_json(text, 30), r#"{"s":"a\"[b","x":[1,2,3 ... ]}"#);
        assert_eq!(shorten_json(text, 20), r#"{"s":"a\"[b"," ... }"#);
    }

    #[test]
    fn inside_block_search() {
        let text = StrRef::new(NESTED);
        let first = find_inside_block(text).expect("first block");
        assert_eq!(first.as_str(), "[1,2,3]");
        let rest = text.sub(first.end(), text.end());
        let second = find_inside_block(rest).expect("second block");
        assert_eq!(second.as_str(), r#"{"longassblock":{"insideblock":89012}}"#);
        let rest = text.sub(second.end(), text.end());
        assert!(find_inside_block(rest).is_none());
    }

    #[test]
    fn unterminated_block_is_not_a_candidate() {
        assert!(find_inside_block(StrRef::new(r#"{"a":[1,2,3"#)).is_none());
        assert!(find_inside_block(StrRef::new(r#"{"a":"[1,2]"#)).is_none());
        assert!(find_inside_block(StrRef::empty()).is_none());
    }

    #[test]
    fn multibyte_text_stays_on_char_boundaries() {
        let text = "{\"name\":\"caméra de profondeur très longue\",\"ok\":\"ü\"}é";
        for max_length in MIN_SHORTEN_LENGTH..text.len() {
            let out = shorten_json(text, max_length);
            assert!(out.len() <= max_length, "{} > {}", out.len(), max_length);
        }
    }
}
