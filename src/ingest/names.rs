//! Name-list ingestion for door tags.

const HEADER_NAMES: [&str; 2] = ["name", "full name"];

/// Split a free-form list on newlines and commas.
pub fn parse_name_list(text: &str) -> Vec<String> {
    text.split(['\n', '\r', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Extract names from CSV text.
///
/// A header row containing a `name` or `full name` column selects that column. Without one,
/// every line's first field is the name (the first line included).
pub fn parse_names_csv(text: &str) -> Vec<String> {
    let mut rows = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(split_csv_line);

    let Some(first) = rows.next() else {
        return Vec::new();
    };

    let header_col = first.iter().position(|h| {
        let h = h.trim().to_ascii_lowercase();
        HEADER_NAMES.contains(&h.as_str())
    });

    let (col, head) = match header_col {
        Some(col) => (col, None),
        None => (0, Some(first)),
    };

    head.into_iter()
        .chain(rows)
        .filter_map(|fields| fields.into_iter().nth(col))
        .map(|f| f.trim().to_owned())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Split one CSV record, honoring double-quoted fields and `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if quoted && chars.peek() == Some(&'"') => {
                cur.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut cur)),
            _ => cur.push(ch),
        }
    }
    fields.push(cur);
    fields
}

#[cfg(test)]
#[path = "../../tests/unit/ingest/names.rs"]
mod tests;
