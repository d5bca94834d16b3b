use super::RawRow;

/// Trim every header and cell; drop columns whose header trims to nothing.
/// If two headers trim to the same key the later column wins.
pub fn clean_row<'a, I>(cells: I) -> RawRow
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut row = RawRow::new();
    for (key, value) in cells {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        row.insert(key.to_string(), value.trim().to_string());
    }
    row
}
