mod common;

use cepalstat_rs::dimensions::resolve_dimensions;
use cepalstat_rs::models::{Dimension, Member};
use cepalstat_rs::{DimensionCache, DimensionTable, Endpoint, Request, fetch_indicators};
use common::{FakeSource, population_source};
use serde_json::json;
use tempfile::tempdir;

fn cached_table() -> DimensionTable {
    DimensionTable {
        indicator_id: 2206,
        dimensions: vec![Dimension {
            column: "dim_208".into(),
            name: Some("País".into()),
            members: vec![Member {
                code: json!(221),
                name: Some("Brasil".into()),
            }],
        }],
    }
}

#[test]
fn cache_hit_makes_no_network_calls() {
    let dir = tempdir().unwrap();
    let cache = DimensionCache::new(dir.path());
    cache.store(&cached_table()).unwrap();

    let src = FakeSource::new();
    let table = resolve_dimensions(&src, 2206, "en", Some(&cache));
    assert_eq!(table, Some(cached_table()));
    assert_eq!(src.calls(), 0);
}

#[test]
fn cache_miss_fetches_once_and_persists() {
    let dir = tempdir().unwrap();
    let cache = DimensionCache::new(dir.path().join("dims"));
    let src = population_source();

    let first = resolve_dimensions(&src, 2206, "en", Some(&cache)).unwrap();
    assert!(cache.path_for(2206).exists());
    let second = resolve_dimensions(&src, 2206, "en", Some(&cache)).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.dimensions.len(), 2);
    assert_eq!(first.get("dim_208").unwrap().name.as_deref(), Some("Country"));
    assert_eq!(src.calls_to(Endpoint::Dimensions), 1);
}

#[test]
fn disabled_cache_always_refetches_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let cache = DimensionCache::new(dir.path());
    let src = population_source();

    resolve_dimensions(&src, 2206, "en", None).unwrap();
    resolve_dimensions(&src, 2206, "en", None).unwrap();
    assert_eq!(src.calls_to(Endpoint::Dimensions), 2);
    assert!(!cache.path_for(2206).exists());
}

#[test]
fn failed_fetch_is_absent_and_not_cached() {
    let dir = tempdir().unwrap();
    let cache = DimensionCache::new(dir.path());
    let src = FakeSource::new();
    assert!(resolve_dimensions(&src, 5, "en", Some(&cache)).is_none());
    assert!(!cache.path_for(5).exists());
}

#[test]
fn corrupt_artifact_is_refetched_and_replaced() {
    let dir = tempdir().unwrap();
    let cache = DimensionCache::new(dir.path());
    std::fs::write(cache.path_for(2206), b"not json").unwrap();
    let src = population_source();

    let table = resolve_dimensions(&src, 2206, "en", Some(&cache)).unwrap();
    assert_eq!(src.calls_to(Endpoint::Dimensions), 1);
    assert_eq!(cache.load(2206).unwrap(), Some(table));
}

#[test]
fn pipeline_labels_from_cached_table() {
    let dir = tempdir().unwrap();
    let cache = DimensionCache::new(dir.path());
    cache.store(&cached_table()).unwrap();

    let src = population_source();
    let mut req = Request::new(vec![2206]);
    req.dimension_cache = Some(cache);
    let out = fetch_indicators(&src, &req).unwrap().unwrap();

    assert_eq!(src.calls_to(Endpoint::Dimensions), 0);
    assert_eq!(out.get(0, "País"), Some(&json!("Brasil")));
    assert_eq!(out.get(2, "País"), None);
    assert!(!out.has_column("Years__ESTANDAR"));
}
