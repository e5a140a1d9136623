//! Dimension tables: which `dim_<id>` columns an indicator has, what they are
//! called, and the display name of every member code.

use crate::api::{Endpoint, IndicatorSource, fetch_as};
use crate::models::{DimensionTable, DimensionsEnvelope};
use anyhow::{Context, Result};
use log::{error, info, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// On-disk store of dimension tables, one JSON artifact per indicator.
///
/// Presence of an artifact is the only freshness signal: it is reused until
/// someone deletes it (or calls [`DimensionCache::invalidate`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionCache {
    dir: PathBuf,
}

impl DimensionCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<platform cache dir>/cepalstat`, or `./cache` when the platform has none.
    pub fn default_location() -> Self {
        let dir = dirs::cache_dir()
            .map(|d| d.join("cepalstat"))
            .unwrap_or_else(|| PathBuf::from("cache"));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, indicator_id: u32) -> PathBuf {
        self.dir.join(format!("cache_dim_{indicator_id}.json"))
    }

    /// Read the cached table for an indicator; `Ok(None)` when nothing is cached.
    pub fn load(&self, indicator_id: u32) -> Result<Option<DimensionTable>> {
        let path = self.path_for(indicator_id);
        if !path.exists() {
            return Ok(None);
        }
        let f = File::open(&path).with_context(|| format!("open {}", path.display()))?;
        let table = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(Some(table))
    }

    /// Write a table, replacing any previous artifact for the same indicator.
    ///
    /// The file is written next to its destination and renamed into place, so
    /// readers see either the old or the new table.
    pub fn store(&self, table: &DimensionTable) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create cache dir {}", self.dir.display()))?;
        let path = self.path_for(table.indicator_id);
        let tmp = NamedTempFile::new_in(&self.dir).context("create temp cache file")?;
        let mut w = BufWriter::new(tmp);
        serde_json::to_writer(&mut w, table).context("serialize dimension table")?;
        w.flush()?;
        let tmp = w.into_inner().context("flush temp cache file")?;
        tmp.persist(&path)
            .with_context(|| format!("replace {}", path.display()))?;
        Ok(path)
    }

    /// Delete the artifact for an indicator. Returns whether one existed.
    pub fn invalidate(&self, indicator_id: u32) -> Result<bool> {
        let path = self.path_for(indicator_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }
}

/// Resolve the dimension table of one indicator.
///
/// With a cache, an existing artifact is returned without touching the
/// network, and a freshly fetched table is written back. Without one, the
/// table is always fetched.
///
/// Returns `None` when the table cannot be fetched or parsed; the failure is
/// logged and the caller proceeds without labels for this indicator.
pub fn resolve_dimensions<S>(
    source: &S,
    indicator_id: u32,
    lang: &str,
    cache: Option<&DimensionCache>,
) -> Option<DimensionTable>
where
    S: IndicatorSource + ?Sized,
{
    if let Some(cache) = cache {
        match cache.load(indicator_id) {
            Ok(Some(table)) => {
                info!("Loaded cached dimension data for indicator {indicator_id}.");
                return Some(table);
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable dimension cache for indicator {indicator_id}: {e:#}"),
        }
    }

    let envelope: DimensionsEnvelope =
        match fetch_as(source, Endpoint::Dimensions, indicator_id, lang) {
            Ok(env) => env,
            Err(e) => {
                error!("Error fetching dimensions for indicator {indicator_id}: {e}");
                return None;
            }
        };
    let table = DimensionTable::from_response(indicator_id, envelope);
    info!(
        "Loaded {} dimensions for indicator {indicator_id} from CEPALSTAT API.",
        table.dimensions.len()
    );

    if let Some(cache) = cache {
        if let Err(e) = cache.store(&table) {
            warn!("Could not cache dimensions for indicator {indicator_id}: {e:#}");
        }
    }
    Some(table)
}
