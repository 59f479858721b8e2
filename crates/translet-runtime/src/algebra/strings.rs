//! XPath 1.0 string functions. Positions and lengths count Unicode code points.
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::algebra::numeric::round;

pub(crate) fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// `substring(s, start, len?)` with 1-based positions. A character at position `p` is kept
/// when `round(start) <= p < round(start) + round(len)`.
pub fn substring(s: &str, start: f64, len: Option<f64>) -> String {
    if start.is_nan() {
        return String::new();
    }
    let first = round(start);
    let end = match len {
        None => f64::INFINITY,
        Some(l) if l.is_nan() || start.is_infinite() => return String::new(),
        Some(l) => first + round(l),
    };
    if end.is_nan() {
        return String::new();
    }
    s.chars()
        .zip(1u32..)
        .filter(|(_, p)| {
            let p = f64::from(*p);
            p >= first && p < end
        })
        .map(|(c, _)| c)
        .collect()
}

pub fn substring_before(s: &str, sub: &str) -> String {
    if sub.is_empty() {
        return String::new();
    }
    s.find(sub).map(|i| s[..i].to_string()).unwrap_or_default()
}

pub fn substring_after(s: &str, sub: &str) -> String {
    if sub.is_empty() {
        return s.to_string();
    }
    s.find(sub).map(|i| s[i + sub.len()..].to_string()).unwrap_or_default()
}

/// Characters of `from` without a counterpart in `to` are removed. When a character
/// repeats in `from`, its first position decides.
pub fn translate(s: &str, from: &str, to: &str) -> String {
    let mut table: HashMap<char, Option<char>> = HashMap::new();
    let mut to_chars = to.chars();
    for m in from.chars() {
        let repl = to_chars.next();
        if let Entry::Vacant(e) = table.entry(m) {
            e.insert(repl);
        }
    }
    s.chars()
        .filter_map(|ch| match table.get(&ch) {
            Some(mapped) => *mapped,
            None => Some(ch),
        })
        .collect()
}

/// Strip leading and trailing XML whitespace and collapse inner runs to one space.
pub fn normalize_space(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split(is_xml_whitespace).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

pub fn concat<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts.into_iter().fold(String::new(), |mut acc, p| {
        acc.push_str(p.as_ref());
        acc
    })
}

pub fn contains(s: &str, sub: &str) -> bool {
    s.contains(sub)
}

pub fn starts_with(s: &str, prefix: &str) -> bool {
    s.starts_with(prefix)
}

pub fn string_length(s: &str) -> usize {
    s.chars().count()
}
