//! Plain aligned tables for `--format table`.

use serde_json::Value;

use super::value_to_cell;

/// Cells longer than this are cut with an ellipsis.
const MAX_CELL: usize = 60;

/// Render arrays of objects as rows, objects as key/value pairs.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::Array(items) if items.is_empty() => String::from("(no rows)"),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let mut headers: Vec<String> = Vec::new();
            for map in items.iter().filter_map(Value::as_object) {
                for key in map.keys() {
                    if !headers.contains(key) {
                        headers.push(key.clone());
                    }
                }
            }
            let rows = items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| {
                    headers
                        .iter()
                        .map(|h| map.get(h).map_or_else(|| String::from("-"), value_to_cell))
                        .collect()
                })
                .collect::<Vec<Vec<String>>>();
            aligned(&headers, &rows)
        }
        Value::Array(items) => {
            let rows = items.iter().map(|v| vec![value_to_cell(v)]).collect::<Vec<_>>();
            aligned(&[String::from("value")], &rows)
        }
        Value::Object(map) => {
            let rows = map
                .iter()
                .map(|(k, v)| vec![k.clone(), value_to_cell(v)])
                .collect::<Vec<_>>();
            aligned(&[String::from("key"), String::from("value")], &rows)
        }
        scalar => value_to_cell(scalar),
    }
}

fn aligned(headers: &[String], rows: &[Vec<String>]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| clip(cell)).collect())
        .collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header = line(headers);
    let mut out = vec![header.clone(), "-".repeat(header.chars().count())];
    out.extend(rows.iter().map(|r| line(r)));
    out.join("\n")
}

fn clip(cell: &str) -> String {
    let flat = cell.replace('\n', " ");
    if flat.chars().count() <= MAX_CELL {
        return flat;
    }
    let cut: String = flat.chars().take(MAX_CELL - 1).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_align_under_headers() {
        let out = render(&json!([
            {"id": "ses-1", "status": "active"},
            {"id": "ses-200", "status": "archived"},
        ]));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("id"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2].find("active"), lines[0].find("status"));
    }

    #[test]
    fn long_cells_are_clipped() {
        let long = "x".repeat(200);
        let out = render(&json!({ "text": long }));
        assert!(out.contains('…'));
        assert!(out.lines().all(|l| l.chars().count() < 100));
    }

    #[test]
    fn empty_array_has_placeholder() {
        assert_eq!(render(&json!([])), "(no rows)");
    }
}
