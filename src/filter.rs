//! Post-hoc filters over the combined table.
//!
//! Filters never modify their input; each returns a new [`Frame`].

use crate::frame::Frame;
use crate::models::ISO3_COLUMN;
use log::{info, warn};
use serde_json::{Number, Value};

/// Year columns CEPALSTAT labels its standard time dimension with (es, en).
pub const STANDARD_YEAR_COLUMNS: [&str; 2] = ["Años__ESTANDAR", "Years__ESTANDAR"];

/// Common names for a period column, tried in this order.
pub const PERIOD_COLUMNS: [&str; 8] = [
    "Year",
    "TIME",
    "Time",
    "YEAR",
    "year",
    "Period",
    "period",
    "TIME_PERIOD",
];

/// Find the column to filter years on.
///
/// Exact matches against [`STANDARD_YEAR_COLUMNS`], then [`PERIOD_COLUMNS`],
/// then the first column whose lower-cased name contains `year` or `año`.
pub fn find_year_column<S: AsRef<str>>(columns: &[S]) -> Option<&str> {
    let names: Vec<&str> = columns.iter().map(<S as AsRef<str>>::as_ref).collect();
    let exact = |candidates: &[&str]| {
        candidates
            .iter()
            .find_map(|cand| names.iter().copied().find(|c| c == cand))
    };
    exact(&STANDARD_YEAR_COLUMNS[..])
        .or_else(|| exact(&PERIOD_COLUMNS[..]))
        .or_else(|| {
            names.iter().copied().find(|c| {
                let lower = c.to_lowercase();
                lower.contains("year") || lower.contains("año")
            })
        })
}

/// Numeric reading of a cell: numbers as-is, strings parsed after trimming.
/// Anything else, and anything unparseable, is `None`.
pub fn coerce_numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| !f.is_nan()),
        _ => None,
    }
}

fn numeric_cell(f: Option<f64>) -> Value {
    match f {
        Some(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => Value::from(x as i64),
        Some(x) => Number::from_f64(x).map_or(Value::Null, Value::Number),
        None => Value::Null,
    }
}

/// Keep rows whose year lies in `[start, end]` (either bound optional).
///
/// The year column is found with [`find_year_column`] and coerced to numbers in
/// the result; rows whose year does not parse are dropped. Without a year
/// column the input is returned unchanged and a warning is logged.
pub fn filter_years(frame: &Frame, start: Option<i32>, end: Option<i32>) -> Frame {
    if start.is_none() && end.is_none() {
        return frame.clone();
    }
    let Some(column) = find_year_column(frame.columns()).map(str::to_string) else {
        warn!("Warning: Could not identify a year column for filtering");
        return frame.clone();
    };
    let Some(idx) = frame.column_index(&column) else {
        return frame.clone();
    };

    let mut years = Vec::new();
    let mut out = frame.filter_rows(|row| {
        let year = coerce_numeric(&row[idx]);
        let keep = year.is_some_and(|y| {
            start.is_none_or(|s| y >= f64::from(s)) && end.is_none_or(|e| y <= f64::from(e))
        });
        if keep {
            years.push(numeric_cell(year));
        }
        keep
    });
    out.set_column(column.as_str(), years);

    info!(
        "Filtered data to years: {} to {} using column '{}'",
        start.map_or_else(|| "earliest".to_string(), |s| s.to_string()),
        end.map_or_else(|| "latest".to_string(), |e| e.to_string()),
        column
    );
    out
}

/// Result of [`filter_countries`].
#[derive(Debug, Clone, PartialEq)]
pub struct CountryMatch {
    pub frame: Frame,
    /// Requested codes (upper-cased) that matched no row.
    pub unmatched: Vec<String>,
}

/// Keep rows whose `iso3` code is one of `countries`, case-insensitively.
///
/// String codes are upper-cased in the result. Without an `iso3` column the
/// input is returned unchanged and every requested code is reported unmatched.
pub fn filter_countries(frame: &Frame, countries: &[String]) -> CountryMatch {
    let wanted: Vec<String> = countries.iter().map(|c| c.trim().to_uppercase()).collect();
    let Some(idx) = frame.column_index(ISO3_COLUMN) else {
        warn!("Warning: Could not find '{ISO3_COLUMN}' column for country filtering");
        return CountryMatch {
            frame: frame.clone(),
            unmatched: wanted,
        };
    };

    let mut codes = Vec::new();
    let mut out = frame.filter_rows(|row| match &row[idx] {
        Value::String(s) => {
            let upper = s.to_uppercase();
            let keep = wanted.contains(&upper);
            if keep {
                codes.push(Value::String(upper));
            }
            keep
        }
        _ => false,
    });
    out.set_column(ISO3_COLUMN, codes);

    info!(
        "Filtered data to {} countries: {}",
        countries.len(),
        countries.join(", ")
    );
    info!(
        "Rows before country filtering: {}, after: {}",
        frame.len(),
        out.len()
    );

    let mut unmatched = Vec::new();
    for code in &wanted {
        let found = out
            .rows()
            .iter()
            .any(|r| r[idx].as_str() == Some(code.as_str()));
        if !found && !unmatched.contains(code) {
            unmatched.push(code.clone());
        }
    }
    if !unmatched.is_empty() {
        warn!(
            "Warning: No data found for these countries: {}",
            unmatched.join(", ")
        );
    }
    CountryMatch {
        frame: out,
        unmatched,
    }
}

/// Optional year bounds and country codes applied after combination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub countries: Vec<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.start_year.is_none() && self.end_year.is_none() && self.countries.is_empty()
    }

    /// Year filter first, then country filter.
    pub fn apply(&self, frame: &Frame) -> Frame {
        let out = filter_years(frame, self.start_year, self.end_year);
        if self.countries.is_empty() {
            out
        } else {
            filter_countries(&out, &self.countries).frame
        }
    }
}
