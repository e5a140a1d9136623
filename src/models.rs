use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Prefix the API uses for coded dimension columns in data rows (`dim_<id>`).
pub const DIM_PREFIX: &str = "dim_";

/// Column stamped on every row with the indicator identifier.
pub const INDICATOR_ID_COLUMN: &str = "indicator_id";

/// Column holding the resolved indicator display name.
pub const INDICATOR_NAME_COLUMN: &str = "indicator_name";

/// Column name of the data rows for the requested value.
pub const VALUE_COLUMN: &str = "value";

/// Name of the column carrying three-letter country codes.
pub const ISO3_COLUMN: &str = "iso3";

/// Canonical string form of a code cell.
///
/// Codes arrive either as JSON numbers (`85163`) or strings (`"85163"`), and
/// dimension tables are not consistent about which one they use. Both sides of
/// a join go through this function so the representations meet. Integral
/// floats print without a fractional part.
pub fn code_key(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some((f as i64).to_string())
                } else {
                    Some(f.to_string())
                }
            }
        }
        other => Some(other.to_string()),
    }
}

/// Serde helper: read an optional label that may be a string or a number.
///
/// Anything else (objects, arrays, booleans, null) counts as absent, so a
/// drifting upstream schema degrades to `None` instead of failing the whole body.
fn de_opt_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Serde helper: decode an optional field, treating a value of the wrong
/// shape as absent instead of failing the enclosing record.
fn de_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.and_then(|v| serde_json::from_value(v).ok()))
}

/// `GET /indicator/{id}/data` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope {
    pub body: DataBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataBody {
    /// One object per observation; field sets vary between indicators.
    #[serde(default)]
    pub data: Option<Vec<Map<String, Value>>>,
}

impl DataEnvelope {
    pub fn into_records(self) -> Vec<Map<String, Value>> {
        self.body.data.unwrap_or_default()
    }
}

/// `GET /indicator/{id}/dimensions` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionsEnvelope {
    pub body: DimensionsBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionsBody {
    #[serde(default)]
    pub dimensions: Vec<RawDimension>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDimension {
    pub id: Value,
    #[serde(default, deserialize_with = "de_opt_label")]
    pub name: Option<String>,
    #[serde(default)]
    pub members: Vec<RawMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMember {
    pub id: Value,
    #[serde(default, deserialize_with = "de_opt_label")]
    pub name: Option<String>,
}

/// `GET /indicator/{id}/metadata` response.
///
/// Every field is optional: the name has moved around between API revisions
/// and `metadata::resolve_name` walks these in a fixed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataEnvelope {
    #[serde(default, deserialize_with = "de_lenient")]
    pub body: Option<MetadataBody>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataBody {
    #[serde(default, deserialize_with = "de_lenient")]
    pub metadata: Option<MetadataSection>,
    #[serde(default, deserialize_with = "de_opt_label")]
    pub indicator_name: Option<String>,
    #[serde(default, deserialize_with = "de_lenient")]
    pub indicators: Option<Vec<NamedEntry>>,
    #[serde(default, deserialize_with = "de_opt_label")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_label")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataSection {
    #[serde(default, deserialize_with = "de_opt_label")]
    pub indicator_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedEntry {
    #[serde(default, deserialize_with = "de_opt_label")]
    pub name: Option<String>,
}

/// One member of a dimension: a raw code and its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Code exactly as the API sent it.
    pub code: Value,
    pub name: Option<String>,
}

/// One categorical axis of an indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Data column carrying this dimension's codes, e.g. `dim_29117`.
    pub column: String,
    /// Display name, e.g. `Years__ESTANDAR` or `Country`.
    pub name: Option<String>,
    pub members: Vec<Member>,
}

impl Dimension {
    /// Name of the label column produced for this dimension.
    ///
    /// Without a display name the label goes next to the code column, never
    /// over it.
    pub fn label_column(&self) -> String {
        match self.name.as_deref() {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => format!("{}_label", self.column),
        }
    }
}

/// All dimensions of one indicator, in API order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionTable {
    pub indicator_id: u32,
    pub dimensions: Vec<Dimension>,
}

impl DimensionTable {
    /// Build a table from a decoded dimensions response.
    ///
    /// Dimensions without a usable id are dropped since no data column can
    /// refer to them.
    pub fn from_response(indicator_id: u32, envelope: DimensionsEnvelope) -> Self {
        let dimensions = envelope
            .body
            .dimensions
            .into_iter()
            .filter_map(|d| {
                let id = code_key(&d.id)?;
                Some(Dimension {
                    column: format!("{DIM_PREFIX}{id}"),
                    name: d.name,
                    members: d
                        .members
                        .into_iter()
                        .map(|m| Member {
                            code: m.id,
                            name: m.name,
                        })
                        .collect(),
                })
            })
            .collect();
        Self {
            indicator_id,
            dimensions,
        }
    }

    pub fn get(&self, column: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.column == column)
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}
