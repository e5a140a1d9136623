#![allow(dead_code)]

use cepalstat_rs::{Endpoint, FetchError, IndicatorSource};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory stand-in for the CEPALSTAT API. Unknown routes answer HTTP 404.
#[derive(Default)]
pub struct FakeSource {
    responses: HashMap<(Endpoint, u32), Value>,
    calls: RefCell<Vec<(Endpoint, u32, String)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, endpoint: Endpoint, indicator_id: u32, body: Value) -> Self {
        self.responses.insert((endpoint, indicator_id), body);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn langs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(_, _, l)| l.clone()).collect()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(e, _, _)| *e == endpoint)
            .count()
    }
}

impl IndicatorSource for FakeSource {
    fn get_json(
        &self,
        endpoint: Endpoint,
        indicator_id: u32,
        lang: &str,
    ) -> Result<Value, FetchError> {
        self.calls
            .borrow_mut()
            .push((endpoint, indicator_id, lang.to_string()));
        self.responses
            .get(&(endpoint, indicator_id))
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: format!("fake://indicator/{}/{}", indicator_id, endpoint.path()),
                status: 404,
            })
    }
}

pub fn data_body(rows: Value) -> Value {
    json!({ "header": { "success": true }, "body": { "data": rows } })
}

pub fn dimensions_body(dims: Value) -> Value {
    json!({ "header": { "success": true }, "body": { "dimensions": dims } })
}

pub fn metadata_body(name: &str) -> Value {
    json!({ "body": { "metadata": { "indicator_name": name } } })
}

/// Indicator 2206: yearly values for a few countries, year and country coded.
pub fn population_source() -> FakeSource {
    FakeSource::new()
        .with(
            Endpoint::Data,
            2206,
            data_body(json!([
                { "value": 10.0, "iso3": "bra", "dim_208": 221, "dim_29117": 29170 },
                { "value": 11.0, "iso3": "BRA", "dim_208": 221, "dim_29117": 29171 },
                { "value": 12.0, "iso3": "MEX", "dim_208": 222, "dim_29117": 29172 },
                { "value": 13.0, "iso3": "CHL", "dim_208": 223, "dim_29117": 99999 }
            ])),
        )
        .with(
            Endpoint::Dimensions,
            2206,
            dimensions_body(json!([
                {
                    "id": 208,
                    "name": "Country",
                    "members": [
                        { "id": 221, "name": "Brazil" },
                        { "id": 222, "name": "Mexico" },
                        { "id": 223, "name": "Chile" }
                    ]
                },
                {
                    "id": 29117,
                    "name": "Years__ESTANDAR",
                    "members": [
                        { "id": "29170", "name": "2014" },
                        { "id": "29171", "name": "2015" },
                        { "id": "29172", "name": "2020" }
                    ]
                }
            ])),
        )
        .with(Endpoint::Metadata, 2206, metadata_body("Total population"))
}
