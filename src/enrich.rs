use crate::frame::Frame;
use crate::models::{DimensionTable, code_key};
use ahash::AHashMap;
use serde_json::Value;

/// Add one label column per dimension the frame carries.
///
/// For every `dim_<id>` column present both in `frame` and in `dims`, a
/// column named after the dimension (see [`crate::models::Dimension::label_column`])
/// receives the member name of each row's code. Codes are compared in their
/// canonical string form, so `85163` and `"85163"` match. Rows whose code is
/// unknown get null. Code columns themselves are left untouched.
pub fn enrich(frame: &mut Frame, dims: &DimensionTable) {
    for dim in &dims.dimensions {
        let Some(codes) = frame.column(&dim.column) else {
            continue;
        };
        let names: AHashMap<String, &str> = dim
            .members
            .iter()
            .filter_map(|m| Some((code_key(&m.code)?, m.name.as_deref()?)))
            .collect();
        let labels: Vec<Value> = codes
            .into_iter()
            .map(|code| {
                code_key(code)
                    .and_then(|k| names.get(&k).copied())
                    .map_or(Value::Null, |n| Value::String(n.to_string()))
            })
            .collect();
        frame.set_column(dim.label_column(), labels);
    }
}
