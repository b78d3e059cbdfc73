//! Precedence ordering of version strings, used to pick "latest" versions
//!
//! This is not a general version-range implementation. Strings that read as
//! semver rank above strings that don't. Within the semver group versions
//! follow semver precedence, the rest follow natural ordering where digit
//! runs compare numerically. The raw string breaks remaining ties, so the
//! result is a total order usable with `sort_by`.

use std::cmp::Ordering;

use semver::Version;

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// A leading `v` is ignored and partial versions are padded with zeros.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "v1.2" -> Version(1, 2, 0)
/// - "1.2.3-SNAPSHOT" -> Version(1, 2, 3, pre: SNAPSHOT)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let (core, suffix) = match version.find(['-', '+']) {
        Some(idx) => version.split_at(idx),
        None => (version, ""),
    };
    let parts: Vec<&str> = core.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0{}", parts[0], suffix),
        2 => format!("{}.{}.0{}", parts[0], parts[1], suffix),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Orders version strings, lowest first
pub fn compare_precedence(a: &str, b: &str) -> Ordering {
    let ordering = match (parse_version(a), parse_version(b)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => natural_cmp(a, b),
    };
    ordering.then_with(|| a.cmp(b))
}

/// The item whose name has the highest precedence
pub fn latest<'a, T, I, F>(items: I, name: F) -> Option<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> &str,
{
    items
        .into_iter()
        .max_by(|a, b| compare_precedence(name(a), name(b)))
}

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn chunks(value: &str) -> Vec<Chunk<'_>> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (idx, c) in value.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(previous) if previous != is_digit => {
                result.push(make_chunk(&value[start..idx], previous));
                start = idx;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(previous) = in_digits {
        result.push(make_chunk(&value[start..], previous));
    }
    result
}

fn make_chunk(text: &str, is_digit: bool) -> Chunk<'_> {
    if is_digit {
        Chunk::Number(text)
    } else {
        Chunk::Text(text)
    }
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ordering = match (l, r) {
            (Chunk::Number(x), Chunk::Number(y)) => compare_numbers(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left.len().cmp(&right.len())
}
