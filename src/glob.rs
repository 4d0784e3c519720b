//! EditorConfig section glob matching
//!
//! Section patterns are translated into anchored regular expressions once and
//! matched against `/`-separated paths relative to the declaration file's
//! directory. Nothing here touches the filesystem.

use regex::Regex;

use crate::error::GlobError;

/// A compiled section pattern.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
    /// Inclusive bounds for each `{n1..n2}` range, in capture group order.
    ranges: Vec<(i64, i64)>,
}

impl Glob {
    /// Compile an EditorConfig glob.
    ///
    /// A pattern without `/` matches a file name at any depth. A pattern that
    /// contains `/` is anchored to the declaration file's directory, with a
    /// leading `/` dropped.
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        let chars: Vec<char> = pattern.chars().collect();
        let anchored = chars.contains(&'/');
        let body = match chars.split_first() {
            Some(('/', rest)) => rest,
            _ => &chars[..],
        };

        let mut ranges = Vec::new();
        let mut source = String::from("^");
        if !anchored {
            source.push_str("(?:.*/)?");
        }
        source.push_str(&translate(body, &mut ranges));
        source.push('$');

        let regex = Regex::new(&source).map_err(|source| GlobError {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            ranges,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Match a relative, `/`-separated path.
    pub fn is_match(&self, path: &str) -> bool {
        let Some(caps) = self.regex.captures(path) else {
            return false;
        };

        self.ranges
            .iter()
            .enumerate()
            .all(|(idx, &(lo, hi))| match caps.get(idx + 1) {
                Some(m) => m
                    .as_str()
                    .parse::<i64>()
                    .is_ok_and(|n| lo <= n && n <= hi),
                // Range inside an alternative that did not participate.
                None => true,
            })
    }
}

fn translate(chars: &[char], ranges: &mut Vec<(i64, i64)>) -> String {
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                match chars.get(i + 1) {
                    Some(&next) => {
                        push_literal(&mut out, next);
                        i += 2;
                    }
                    None => {
                        push_literal(&mut out, '\\');
                        i += 1;
                    }
                }
                continue;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    // `**/` may also match zero directories
                    out.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' => match class_end(chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i + 1..end]));
                    i = end + 1;
                }
                None => {
                    push_literal(&mut out, '[');
                    i += 1;
                }
            },
            '{' => match brace_end(chars, i) {
                Some(end) => {
                    out.push_str(&translate_braces(&chars[i + 1..end], ranges));
                    i = end + 1;
                }
                None => {
                    push_literal(&mut out, '{');
                    i += 1;
                }
            },
            c => {
                push_literal(&mut out, c);
                i += 1;
            }
        }
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Index of the `]` closing the class opened at `start`. A class never spans
/// a path separator; such a `[` is literal.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if matches!(chars.get(j), Some('!') | Some('^')) {
        j += 1;
    }
    // A leading `]` is part of the class
    if chars.get(j) == Some(&']') {
        j += 1;
    }

    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '/' => return None,
            ']' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn translate_class(inner: &[char]) -> String {
    let mut out = String::from("[");
    let body = match inner.split_first() {
        Some(('!', rest)) | Some(('^', rest)) => {
            out.push_str("^/");
            rest
        }
        _ => inner,
    };

    let mut i = 0;
    while i < body.len() {
        let c = body[i];
        if c == '\\' && i + 1 < body.len() {
            push_class_char(&mut out, body[i + 1]);
            i += 2;
            continue;
        }
        if c == '-' && i > 0 && i + 1 < body.len() {
            out.push('-');
        } else {
            push_class_char(&mut out, c);
        }
        i += 1;
    }

    out.push(']');
    out
}

fn push_class_char(out: &mut String, c: char) {
    if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~' | '-') {
        out.push('\\');
    }
    out.push(c);
}

/// Index of the `}` matching the `{` at `start`, honoring nesting and escapes.
fn brace_end(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = start;

    while j < chars.len() {
        match chars[j] {
            '\\' => j += 1,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}

fn translate_braces(inner: &[char], ranges: &mut Vec<(i64, i64)>) -> String {
    if let Some((lo, hi)) = numeric_range(inner) {
        ranges.push((lo.min(hi), lo.max(hi)));
        return "([+-]?[0-9]+)".to_string();
    }

    let alternatives = split_alternatives(inner);
    if alternatives.len() < 2 {
        // `{single}` is matched literally
        let mut out = String::from(r"\{");
        out.push_str(&translate(inner, ranges));
        out.push_str(r"\}");
        return out;
    }

    let translated: Vec<String> = alternatives
        .into_iter()
        .map(|alt| translate(alt, ranges))
        .collect();
    format!("(?:{})", translated.join("|"))
}

fn numeric_range(inner: &[char]) -> Option<(i64, i64)> {
    let text: String = inner.iter().collect();
    let (lo, hi) = text.split_once("..")?;
    Some((lo.parse().ok()?, hi.parse().ok()?))
}

/// Split on commas that are not nested inside inner braces or escaped.
fn split_alternatives(inner: &[char]) -> Vec<&[char]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut begin = 0;
    let mut j = 0;

    while j < inner.len() {
        match inner[j] {
            '\\' => j += 1,
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&inner[begin..j]);
                begin = j + 1;
            }
            _ => {}
        }
        j += 1;
    }
    parts.push(&inner[begin.min(inner.len())..]);
    parts
}
