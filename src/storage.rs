use crate::frame::Frame;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Text form of a cell in the CSV output. Nulls become empty fields.
fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Write a frame as CSV with a header row and no index column.
pub fn write_csv<W: Write>(frame: &Frame, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(frame.columns())?;
    for row in frame.rows() {
        wtr.write_record(row.iter().map(cell_text))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a frame as CSV at `path`, replacing any existing file.
pub fn save_csv<P: AsRef<Path>>(frame: &Frame, path: P) -> Result<()> {
    let path = path.as_ref();
    let f = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(frame, f).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn nulls_are_empty_and_header_matches_columns() {
        let records = vec![
            json!({"iso3": "BRA", "value": 1.5}),
            json!({"iso3": "MEX", "Country": "Mexico"}),
        ];
        let frame = Frame::from_records(
            records
                .into_iter()
                .map(|r| r.as_object().cloned().unwrap()),
        );
        let dir = tempdir().unwrap();
        let p = dir.path().join("x.csv");
        save_csv(&frame, &p).unwrap();
        let txt = std::fs::read_to_string(&p).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines, vec!["iso3,value,Country", "BRA,1.5,", "MEX,,Mexico"]);
    }
}
