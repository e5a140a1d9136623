//! Fetch, label and combine several indicators into one table.

use crate::api::{Client, Endpoint, IndicatorSource, fetch_as};
use crate::dimensions::{DimensionCache, resolve_dimensions};
use crate::enrich::enrich;
use crate::filter::FilterCriteria;
use crate::frame::Frame;
use crate::metadata::resolve_name;
use crate::models::{DataEnvelope, INDICATOR_ID_COLUMN, INDICATOR_NAME_COLUMN};
use crate::storage;
use anyhow::Result;
use log::{error, info};
use serde_json::Value;
use std::path::PathBuf;

/// Default export file name used by the CLI.
pub const DEFAULT_CSV_FILENAME: &str = "cepalstat_indicators.csv";

/// What to fetch and how to shape the result.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub indicator_ids: Vec<u32>,
    /// Language code for labels and names (`en`, `es`).
    pub lang: String,
    pub filter: FilterCriteria,
    /// Reuse and persist dimension tables here. `None` always refetches.
    pub dimension_cache: Option<DimensionCache>,
    /// Write the final table as CSV to this path.
    pub export: Option<PathBuf>,
}

impl Request {
    pub fn new(indicator_ids: impl Into<Vec<u32>>) -> Self {
        Self {
            indicator_ids: indicator_ids.into(),
            lang: "en".into(),
            filter: FilterCriteria::default(),
            dimension_cache: None,
            export: None,
        }
    }
}

/// Fetch the raw rows of one indicator, stamped with its id.
///
/// Returns `None` (and logs why) when the request fails or the indicator has no data.
pub fn fetch_indicator<S>(source: &S, indicator_id: u32, lang: &str) -> Option<Frame>
where
    S: IndicatorSource + ?Sized,
{
    let envelope: DataEnvelope = match fetch_as(source, Endpoint::Data, indicator_id, lang) {
        Ok(env) => env,
        Err(e) => {
            error!("Error fetching data for indicator {indicator_id}: {e}");
            return None;
        }
    };
    let records = envelope.into_records();
    if records.is_empty() {
        info!("No data available for indicator {indicator_id}");
        return None;
    }
    let mut frame = Frame::from_records(records);
    frame.fill_column(INDICATOR_ID_COLUMN, Value::from(indicator_id));
    Some(frame)
}

/// Fetch and label a single indicator.
///
/// When its dimensions cannot be resolved the raw rows are returned as they
/// are, without labels or an `indicator_name` column.
pub fn process_indicator<S>(
    source: &S,
    indicator_id: u32,
    lang: &str,
    cache: Option<&DimensionCache>,
) -> Option<Frame>
where
    S: IndicatorSource + ?Sized,
{
    info!("Fetching data for indicator {indicator_id}...");
    let mut frame = fetch_indicator(source, indicator_id, lang)?;

    let Some(dims) = resolve_dimensions(source, indicator_id, lang, cache) else {
        return Some(frame);
    };

    let name = resolve_name(source, indicator_id, lang);
    frame.fill_column(INDICATOR_NAME_COLUMN, Value::String(name));

    enrich(&mut frame, &dims);
    info!(
        "Successfully processed indicator {indicator_id}, {} rows",
        frame.len()
    );
    Some(frame)
}

/// Run the whole pipeline: every indicator in order, then concatenation,
/// filtering and the optional export.
///
/// `Ok(None)` means no indicator produced any rows. This is distinct from
/// `Ok(Some(frame))` with an empty frame, which means filters removed
/// everything. Errors only come from a requested export failing.
pub fn fetch_indicators<S>(source: &S, request: &Request) -> Result<Option<Frame>>
where
    S: IndicatorSource + ?Sized,
{
    let frames: Vec<Frame> = request
        .indicator_ids
        .iter()
        .filter_map(|&id| {
            process_indicator(source, id, &request.lang, request.dimension_cache.as_ref())
        })
        .collect();

    if frames.is_empty() {
        info!("No data was retrieved for any of the indicators");
        return Ok(None);
    }

    let combined = Frame::concat(&frames);
    let combined = if request.filter.is_empty() {
        combined
    } else {
        request.filter.apply(&combined)
    };
    info!("Final combined table has {} rows", combined.len());

    if let Some(path) = &request.export {
        storage::save_csv(&combined, path)?;
        info!("Data saved to '{}'", path.display());
    }
    Ok(Some(combined))
}

impl Client {
    /// Run the pipeline against this client. See [`fetch_indicators`].
    pub fn fetch(&self, request: &Request) -> Result<Option<Frame>> {
        fetch_indicators(self, request)
    }
}
