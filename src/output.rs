use crate::activity::{ActivityMatrix, UserArrays};
use crate::histogram::Histogram;
use crate::ids::IdMapper;
use anyhow::{Result, anyhow};
use chrono::DateTime;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One exported row keyed by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetRow {
    pub time: i64,
    pub time_utc: Option<String>,
    pub values: Vec<Value>,
}

/// Tabular view shared by every export format.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub columns: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    pub fn from_histogram(histogram: &Histogram) -> Self {
        let rows = histogram
            .iter()
            .map(|(time, bucket)| {
                let mut users: Vec<&str> = bucket.iter().map(|r| r.user.as_str()).collect();
                users.dedup();
                SheetRow::new(time, vec![Value::from(bucket.len()), Value::from(users)])
            })
            .collect();
        Self {
            columns: vec!["messages".into(), "users".into()],
            rows,
        }
    }

    pub fn from_arrays(arrays: &UserArrays) -> Self {
        let rows = arrays
            .iter()
            .map(|(time, ids)| SheetRow::new(time, vec![Value::from(ids.to_vec())]))
            .collect();
        Self {
            columns: vec!["user_ids".into()],
            rows,
        }
    }

    /// Columns are named after the users owning each id.
    pub fn from_matrix(matrix: &ActivityMatrix, users: &IdMapper<String>) -> Self {
        let (_, cols) = matrix.shape();
        let columns = (0..cols)
            .map(|id| users.key(id).cloned().unwrap_or_else(|| format!("user_{id}")))
            .collect();
        let rows = matrix
            .iter_rows()
            .map(|(time, cells)| {
                SheetRow::new(time, cells.iter().copied().map(Value::from).collect())
            })
            .collect();
        Self { columns, rows }
    }
}

impl SheetRow {
    fn new(time: i64, values: Vec<Value>) -> Self {
        Self {
            time,
            time_utc: DateTime::from_timestamp(time, 0).map(|d| d.to_rfc3339()),
            values,
        }
    }

    // Columns can be nicks, so they live under "values" and never shadow
    // the timestamp keys.
    fn to_object(&self, columns: &[String]) -> Value {
        let values: Map<String, Value> = columns
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect();

        let mut obj = Map::new();
        obj.insert("time".into(), Value::from(self.time));
        obj.insert(
            "time_utc".into(),
            self.time_utc.clone().map_or(Value::Null, Value::from),
        );
        obj.insert("values".into(), Value::Object(values));
        Value::Object(obj)
    }
}

/// Destination for exactly one sheet.
pub enum Writer<'a> {
    Stream(&'a mut dyn Write),
    JsonFile(BufWriter<File>),
    JsonlFile(BufWriter<File>),
    CsvFile(BufWriter<File>),
    TsvFile(BufWriter<File>),
}

impl Writer<'_> {
    pub fn write_sheet(self, sheet: &Sheet) -> Result<()> {
        match self {
            Writer::Stream(writer) => {
                write_delimited(writer, sheet, '\t', escape_tsv_field)?;
                writer.flush()?;
            }
            Writer::JsonFile(mut writer) => {
                let rows: Vec<Value> = sheet
                    .rows
                    .iter()
                    .map(|row| row.to_object(&sheet.columns))
                    .collect();
                serde_json::to_writer_pretty(&mut writer, &rows)?;
                writeln!(writer)?;
                writer.flush()?;
            }
            Writer::JsonlFile(mut writer) => {
                for row in &sheet.rows {
                    let serialized = serde_json::to_string(&row.to_object(&sheet.columns))?;
                    writeln!(writer, "{}", serialized)?;
                }
                writer.flush()?;
            }
            Writer::CsvFile(mut writer) => {
                write_delimited(&mut writer, sheet, ',', escape_csv_field)?;
                writer.flush()?;
            }
            Writer::TsvFile(mut writer) => {
                write_delimited(&mut writer, sheet, '\t', escape_tsv_field)?;
                writer.flush()?;
            }
        }
        Ok(())
    }
}

fn write_delimited<W: Write + ?Sized>(
    writer: &mut W,
    sheet: &Sheet,
    sep: char,
    escape: fn(&str) -> String,
) -> Result<()> {
    let mut header = format!("time{sep}time_utc");
    for column in &sheet.columns {
        header.push(sep);
        header.push_str(&escape(column));
    }
    writeln!(writer, "{}", header)?;

    for row in &sheet.rows {
        let mut line = format!("{}{sep}{}", row.time, row.time_utc.as_deref().unwrap_or(""));
        for value in &row.values {
            line.push(sep);
            line.push_str(&escape(&cell_text(value)));
        }
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

// ragged cells (user lists) collapse into one space-separated field
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

/// Picks a writer for `output_arg`; `stdout` writes tab-separated rows to
/// `stream`.
pub fn create_writer<'a>(output_arg: &str, stream: &'a mut dyn Write) -> Result<Writer<'a>> {
    match output_arg {
        "stdout" => Ok(Writer::Stream(stream)),
        path if path.ends_with(".json") => Ok(Writer::JsonFile(open_output(path)?)),
        path if path.ends_with(".jsonl") || path.ends_with(".ndjson") => {
            Ok(Writer::JsonlFile(open_output(path)?))
        }
        path if path.ends_with(".csv") => Ok(Writer::CsvFile(open_output(path)?)),
        path if path.ends_with(".tsv") => Ok(Writer::TsvFile(open_output(path)?)),
        path => {
            // anything path-like falls back to JSON
            if path.contains('/') || path.contains('\\') || path.contains('.') {
                Ok(Writer::JsonFile(open_output(path)?))
            } else {
                Err(anyhow!(
                    "unknown output target '{}': use 'stdout' or a .json/.jsonl/.csv/.tsv path",
                    output_arg
                ))
            }
        }
    }
}

fn open_output(path: &str) -> Result<BufWriter<File>> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn escape_tsv_field(field: &str) -> String {
    field.replace(['\t', '\n', '\r'], " ")
}

/// Writes one sheet to `output_arg`, using `stream` for `stdout`.
pub fn write(output_arg: &str, stream: &mut dyn Write, sheet: &Sheet) -> Result<()> {
    create_writer(output_arg, stream)?.write_sheet(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{activity_matrix, user_arrays};
    use crate::histogram::histogram;
    use crate::ids::assign_from_sequence;
    use crate::record::Record;
    use serde_json::json;

    fn sample() -> Vec<Record> {
        vec![
            Record::new(100, "a", "hi"),
            Record::new(100, "b", "yo"),
            Record::new(101, "a", "again"),
        ]
    }

    fn to_file(name: &str, sheet: &Sheet) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name).to_str().unwrap().to_string();
        write(&path, &mut std::io::sink(), sheet).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        (dir, text)
    }

    #[test]
    fn matrix_sheet_uses_user_names() {
        let records = sample();
        let mut users = assign_from_sequence(&records);
        let m = activity_matrix(&records, Some(&mut users)).unwrap();
        let sheet = Sheet::from_matrix(&m, &users);
        assert_eq!(sheet.columns, vec!["a", "b"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].values, vec![Value::from(1.0), Value::from(0.0)]);
        assert_eq!(sheet.rows[0].time_utc.as_deref(), Some("1970-01-01T00:01:40+00:00"));
    }

    #[test]
    fn csv_output() {
        let h = histogram(&sample());
        let sheet = Sheet::from_arrays(&user_arrays(&h, 100, 102).unwrap());
        let (_dir, text) = to_file("nested/arrays.csv", &sheet);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time,time_utc,user_ids");
        assert_eq!(lines[1], "100,1970-01-01T00:01:40+00:00,0 1");
        assert_eq!(lines[3], "102,1970-01-01T00:01:42+00:00,");
    }

    #[test]
    fn tsv_output() {
        let (_dir, text) = to_file("hist.tsv", &Sheet::from_histogram(&histogram(&sample())));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "time\ttime_utc\tmessages\tusers",
                "100\t1970-01-01T00:01:40+00:00\t2\ta b",
                "101\t1970-01-01T00:01:41+00:00\t1\ta",
            ]
        );
    }

    #[test]
    fn json_output_is_an_array_of_rows() {
        let (_dir, text) = to_file("hist.json", &Sheet::from_histogram(&histogram(&sample())));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["time"], 100);
        assert_eq!(rows[0]["values"]["messages"], 2);
        assert_eq!(rows[0]["values"]["users"], json!(["a", "b"]));
    }

    #[test]
    fn jsonl_output_has_one_row_per_line() {
        let records = sample();
        let mut users = assign_from_sequence(&records);
        let m = activity_matrix(&records, Some(&mut users)).unwrap();
        let (_dir, text) = to_file("matrix.jsonl", &Sheet::from_matrix(&m, &users));

        let rows: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            json!({
                "time": 101,
                "time_utc": "1970-01-01T00:01:41+00:00",
                "values": { "a": 1.0, "b": 0.0 }
            })
        );
    }

    #[test]
    fn nick_named_like_a_fixed_key_keeps_the_timestamp() {
        let records = vec![Record::new(100, "time", "x"), Record::new(100, "time_utc", "y")];
        let mut users = assign_from_sequence(&records);
        let m = activity_matrix(&records, Some(&mut users)).unwrap();
        let (_dir, text) = to_file("clash.json", &Sheet::from_matrix(&m, &users));

        let parsed: Value = serde_json::from_str(&text).unwrap();
        let row = &parsed[0];
        assert_eq!(row["time"], 100);
        assert_eq!(row["time_utc"], "1970-01-01T00:01:40+00:00");
        assert_eq!(row["values"], json!({ "time": 1.0, "time_utc": 1.0 }));
    }

    #[test]
    fn stdout_target_writes_tab_separated_rows_to_the_stream() {
        let mut out = Vec::new();
        write("stdout", &mut out, &Sheet::from_histogram(&histogram(&sample()))).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("time\ttime_utc\tmessages\tusers\n"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn empty_json_sheet_is_still_valid() {
        let (_dir, text) = to_file("empty.json", &Sheet { columns: vec![], rows: vec![] });
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!([]));
    }

    #[test]
    fn unknown_target_is_rejected() {
        assert!(create_writer("parquet", &mut std::io::sink()).is_err());
    }

    #[test]
    fn csv_escaping() {
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_tsv_field("a\tb"), "a b");
    }
}
