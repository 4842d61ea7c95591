//! Header layout rules.
//!
//! Every managed tab keeps the same shape: the checkbox column first, data
//! columns in the middle, the user-identity column last. Data columns from
//! the live sheet keep their established order; newly discovered columns
//! append after them.

use serde_json::Value;

/// Default checkbox (bookkeeping) column name.
pub const TICK_COLUMN: &str = "Done";

/// Default user-identity column name.
pub const USER_COLUMN: &str = "userID";

/// Build the final header: `[tick, ...data fields..., user]`.
///
/// Incoming names are trimmed, deduplicated, and stripped of the bookkeeping
/// names — a raw record that happens to carry a `Done` or `userID` key must
/// not produce a second bookkeeping column.
pub fn enforce_header_shape<S: AsRef<str>>(headers: &[S], tick: &str, user: &str) -> Vec<String> {
    let mut shaped = vec![tick.to_string()];
    shaped.extend(data_fields(headers, tick, user));
    shaped.push(user.to_string());
    shaped
}

/// Merge the live sheet's header with newly discovered fields: established
/// data columns keep their order, new fields append in first-seen order.
pub fn merge_header_shape<S: AsRef<str>, T: AsRef<str>>(
    existing: &[S],
    incoming: &[T],
    tick: &str,
    user: &str,
) -> Vec<String> {
    let mut data = data_fields(existing, tick, user);
    for name in data_fields(incoming, tick, user) {
        if !data.contains(&name) {
            data.push(name);
        }
    }

    let mut shaped = vec![tick.to_string()];
    shaped.extend(data);
    shaped.push(user.to_string());
    shaped
}

fn data_fields<S: AsRef<str>>(headers: &[S], tick: &str, user: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for header in headers {
        let name = header.as_ref().trim();
        if name.is_empty() || name == tick || name == user {
            continue;
        }
        if !fields.iter().any(|existing| existing == name) {
            fields.push(name.to_string());
        }
    }
    fields
}

/// 0-based column index to A1 letters: 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = String::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters
}

/// Render one cell for the values API: absent and null become the empty
/// string, strings pass through, other scalars use their display form,
/// and anything structured is JSON-stringified.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(structured) => serde_json::to_string(structured).unwrap_or_default(),
    }
}

/// Project one record onto the final header order. The checkbox column is
/// always written unchecked; the user column falls back to empty when the
/// record does not carry it.
pub fn project_row(
    record: &serde_json::Map<String, Value>,
    headers: &[String],
    tick: &str,
) -> Vec<String> {
    headers
        .iter()
        .map(|header| {
            if header == tick {
                "FALSE".to_string()
            } else {
                cell_text(record.get(header))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_shape_pins_bookkeeping_columns() {
        let headers = enforce_header_shape(&["title", "company"], TICK_COLUMN, USER_COLUMN);
        assert_eq!(headers, vec!["Done", "title", "company", "userID"]);
    }

    #[test]
    fn test_header_shape_drops_colliding_bookkeeping_names() {
        let headers = enforce_header_shape(
            &["Done", "title", "userID", "company", "title", ""],
            TICK_COLUMN,
            USER_COLUMN,
        );
        assert_eq!(headers, vec!["Done", "title", "company", "userID"]);
        assert_eq!(headers.iter().filter(|h| *h == "Done").count(), 1);
        assert_eq!(headers.iter().filter(|h| *h == "userID").count(), 1);
    }

    #[test]
    fn test_merge_keeps_established_columns_and_order() {
        let existing = ["Done", "title", "company", "userID"];
        let incoming = ["company", "salary", "title", "location"];
        let merged = merge_header_shape(&existing, &incoming, TICK_COLUMN, USER_COLUMN);
        assert_eq!(
            merged,
            vec!["Done", "title", "company", "salary", "location", "userID"]
        );
    }

    #[test]
    fn test_merge_with_empty_sheet_is_plain_shape() {
        let merged =
            merge_header_shape(&[] as &[&str], &["a", "b"], TICK_COLUMN, USER_COLUMN);
        assert_eq!(merged, vec!["Done", "a", "b", "userID"]);
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_cell_text_serialization() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("plain"))), "plain");
        assert_eq!(cell_text(Some(&json!(42))), "42");
        assert_eq!(cell_text(Some(&json!(true))), "true");
        assert_eq!(cell_text(Some(&json!({"k": 1}))), r#"{"k":1}"#);
        assert_eq!(cell_text(Some(&json!(["a", "b"]))), r#"["a","b"]"#);
    }

    #[test]
    fn test_project_row_forces_unchecked_tick() {
        let mut record = serde_json::Map::new();
        record.insert("Done".to_string(), json!("TRUE"));
        record.insert("title".to_string(), json!("Engineer"));
        record.insert("userID".to_string(), json!("u-1"));

        let headers = vec![
            "Done".to_string(),
            "title".to_string(),
            "missing".to_string(),
            "userID".to_string(),
        ];
        let row = project_row(&record, &headers, TICK_COLUMN);
        assert_eq!(row, vec!["FALSE", "Engineer", "", "u-1"]);
    }
}
