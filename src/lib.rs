//! cepalstat_rs
//!
//! A lightweight Rust library for retrieving CEPALSTAT indicator data and
//! turning it into one labelled table. Pairs with the `cepalstat` CLI.
//!
//! ### Features
//! - Fetch one or more indicators and stamp every row with its indicator
//! - Resolve `dim_<id>` codes to member names, keeping the codes
//! - Resolve indicator display names, tolerating metadata schema drift
//! - Filter the combined table by year range and ISO3 country codes
//! - Optional on-disk cache of dimension tables and CSV export
//!
//! ### Example
//! ```no_run
//! use cepalstat_rs::{Client, Request};
//!
//! let client = Client::new()?;
//! let mut req = Request::new(vec![2206, 4470]);
//! req.filter.start_year = Some(2015);
//! req.filter.end_year = Some(2020);
//! req.filter.countries = vec!["BRA".into(), "MEX".into()];
//! match client.fetch(&req)? {
//!     Some(table) => cepalstat_rs::storage::save_csv(&table, "indicators.csv")?,
//!     None => eprintln!("nothing retrieved"),
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod dimensions;
pub mod enrich;
pub mod filter;
pub mod frame;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod storage;

pub use api::{Client, Endpoint, FetchError, IndicatorSource};
pub use dimensions::DimensionCache;
pub use filter::FilterCriteria;
pub use frame::Frame;
pub use models::DimensionTable;
pub use pipeline::{Request, fetch_indicators};
