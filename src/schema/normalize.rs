// src/schema/normalize.rs

use tracing::debug;

use super::types::{Field, NormalizedRecord};
use crate::process::RawRow;

/// Source columns accepted for `id`, highest priority first.
pub const ID_ALIASES: &[&str] = &["id", "ID"];

/// Source columns accepted for each string field, highest priority first.
/// Sheets mix Latin and Korean headers for the same concept.
pub fn aliases(field: Field) -> &'static [&'static str] {
    match field {
        Field::Major => &["major", "전공", "Major"],
        Field::MajorRef => &["major_ref", "major-ref", "유사학과코드"],
        Field::MajorType => &["major_type", "type", "계열"],
        Field::Friends => &["friends", "유사학과"],
        Field::Desc => &["desc", "설명"],
        Field::Sub1 => &["sub1", "과목1", "일반선택"],
        Field::Sub2 => &["sub2", "과목2", "진로선택"],
        Field::Sub3 => &["sub3", "과목3", "융합선택"],
        Field::Univ => &["univ", "대표대학"],
        Field::Group => &["group", "그룹", "계열그룹"],
    }
}

/// First alias present in `row`. Presence is what counts: an empty cell
/// under a higher-priority alias still wins.
fn resolve<'r>(row: &'r RawRow, names: &[&str]) -> Option<&'r str> {
    names
        .iter()
        .find_map(|name| row.get(*name))
        .map(String::as_str)
}

/// Lenient base-10 integer parse: leading whitespace, optional sign, then as
/// many digits as follow. `"12abc"` is 12, `"3.7"` is 3, `"abc"` is `None`.
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (neg, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }
    let n: i64 = digits.parse().ok()?;
    Some(if neg { -n } else { n })
}

/// Map raw rows onto `NormalizedRecord`s, 1:1 and in order.
///
/// `id` falls back to the 1-based row position when no id column is present
/// or its value does not parse.
pub fn normalize(rows: &[RawRow]) -> Vec<NormalizedRecord> {
    let out: Vec<NormalizedRecord> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut rec = NormalizedRecord {
                id: resolve(row, ID_ALIASES)
                    .and_then(parse_int)
                    .or(Some(i as i64 + 1)),
                ..Default::default()
            };
            for field in Field::ALL {
                if let Some(v) = resolve(row, aliases(field)) {
                    *rec.field_mut(field) = v.to_string();
                }
            }
            rec
        })
        .collect();
    debug!(records = out.len(), "normalized rows");
    out
}
