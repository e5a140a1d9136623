use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A small column-ordered table of JSON cells.
///
/// Every row has exactly one cell per column; `Value::Null` marks an absent
/// value. Column order is first-appearance order, which is also the order of
/// the exported header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from API records; fields missing from a record become null.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let mut frame = Frame::new();
        for record in records {
            let mut row = vec![Value::Null; frame.columns.len()];
            for (k, v) in record {
                let idx = match frame.column_index(&k) {
                    Some(i) => i,
                    None => {
                        frame.push_null_column(k);
                        row.push(Value::Null);
                        frame.columns.len() - 1
                    }
                };
                row[idx] = v;
            }
            frame.rows.push(row);
        }
        frame
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (`row`, `column`); `None` for unknown columns, out-of-range rows and nulls.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows
            .get(row)
            .and_then(|r| r.get(idx))
            .filter(|v| !v.is_null())
    }

    /// All cells of one column, nulls included.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Set a column to one value per row, appending it if it does not exist yet.
    ///
    /// Panics if `values` does not have one entry per row.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
        assert_eq!(values.len(), self.rows.len(), "column length mismatch");
        let name = name.into();
        let idx = match self.column_index(&name) {
            Some(i) => i,
            None => {
                self.push_null_column(name);
                self.columns.len() - 1
            }
        };
        for (row, v) in self.rows.iter_mut().zip(values) {
            row[idx] = v;
        }
    }

    /// Set a column to the same value on every row.
    pub fn fill_column(&mut self, name: impl Into<String>, value: Value) {
        let values = vec![value; self.rows.len()];
        self.set_column(name, values);
    }

    /// Copy of this frame keeping only rows for which `keep` returns true.
    pub fn filter_rows<F>(&self, mut keep: F) -> Frame
    where
        F: FnMut(&[Value]) -> bool,
    {
        Frame {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r.as_slice())).cloned().collect(),
        }
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|r| self.columns.iter().cloned().zip(r.iter().cloned()).collect())
            .collect()
    }

    /// Outer row-wise concatenation.
    ///
    /// The result has the union of all column sets (in first-appearance order)
    /// and exactly the sum of the input row counts; cells a frame does not have
    /// are null.
    pub fn concat<'a, I>(frames: I) -> Frame
    where
        I: IntoIterator<Item = &'a Frame>,
    {
        let mut out = Frame::new();
        for f in frames {
            let mapping: Vec<usize> = f
                .columns
                .iter()
                .map(|c| match out.column_index(c) {
                    Some(i) => i,
                    None => {
                        out.push_null_column(c.clone());
                        out.columns.len() - 1
                    }
                })
                .collect();
            for r in &f.rows {
                let mut row = vec![Value::Null; out.columns.len()];
                for (src, &dst) in r.iter().zip(&mapping) {
                    row[dst] = src.clone();
                }
                out.rows.push(row);
            }
        }
        out
    }

    fn push_null_column(&mut self, name: String) {
        self.columns.push(name);
        for r in &mut self.rows {
            r.push(Value::Null);
        }
    }
}
