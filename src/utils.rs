//! Text helpers shared across passes.

use std::sync::LazyLock;

use regex::Regex;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run (newlines included) into one space.
pub fn normalize_ws(s: &str) -> String {
    WS_RE.replace_all(s.trim(), " ").into_owned()
}

pub fn first_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

pub fn token_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// True when the string has cased letters and all of them are upper case.
pub fn is_all_caps(s: &str) -> bool {
    let mut has_cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// "JOHN TRONOLONE" -> "John Tronolone". Letters after an apostrophe stay lower.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    let mut prev = ' ';
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha || prev == '\'' {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
        prev = c;
    }
    out
}

fn floor_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Byte-window around `start..end`, widened by `before`/`after` and clamped to char boundaries.
pub fn window(text: &str, start: usize, end: usize, before: usize, after: usize) -> &str {
    let lo = floor_boundary(text, start.saturating_sub(before));
    let hi = ceil_boundary(text, end.saturating_add(after));
    &text[lo..hi]
}

/// Text following `end`, at most `len` bytes.
pub fn tail(text: &str, end: usize, len: usize) -> &str {
    let lo = ceil_boundary(text, end);
    let hi = ceil_boundary(text, lo.saturating_add(len));
    &text[lo..hi]
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
