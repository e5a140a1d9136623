use crate::api::{Endpoint, IndicatorSource, fetch_as};
use crate::models::{MetadataBody, MetadataEnvelope};
use log::warn;

/// Name used when the metadata endpoint gives us nothing better.
pub fn synthetic_name(indicator_id: u32) -> String {
    format!("Indicator {indicator_id}")
}

/// Pick the indicator name out of a metadata body.
///
/// Lookup order:
/// 1. `body.metadata.indicator_name`
/// 2. `body.indicator_name`
/// 3. `body.indicators[0].name` (if the list is non-empty, this branch decides)
/// 4. `body.name`
/// 5. `body.title`
pub fn name_from_body(body: &MetadataBody) -> Option<String> {
    if let Some(name) = body.metadata.as_ref().and_then(|m| m.indicator_name.clone()) {
        return Some(name);
    }
    if let Some(name) = &body.indicator_name {
        return Some(name.clone());
    }
    if let Some(first) = body.indicators.as_ref().and_then(|list| list.first()) {
        return first.name.clone();
    }
    if let Some(name) = &body.name {
        return Some(name.clone());
    }
    body.title.clone()
}

/// Best-effort display name of an indicator. Never fails.
pub fn resolve_name<S>(source: &S, indicator_id: u32, lang: &str) -> String
where
    S: IndicatorSource + ?Sized,
{
    let envelope: MetadataEnvelope =
        match fetch_as(source, Endpoint::Metadata, indicator_id, lang) {
            Ok(env) => env,
            Err(e) => {
                warn!("Metadata unavailable for indicator {indicator_id}: {e}");
                return synthetic_name(indicator_id);
            }
        };
    envelope
        .body
        .as_ref()
        .and_then(name_from_body)
        .unwrap_or_else(|| synthetic_name(indicator_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMetadata(serde_json::Value);

    impl IndicatorSource for FixedMetadata {
        fn get_json(
            &self,
            _endpoint: Endpoint,
            _indicator_id: u32,
            _lang: &str,
        ) -> Result<serde_json::Value, crate::api::FetchError> {
            Ok(self.0.clone())
        }
    }

    fn body(json: &str) -> MetadataBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn nested_name_wins() {
        let b = body(
            r#"{"metadata":{"indicator_name":"Nested"},"indicator_name":"Top","title":"T"}"#,
        );
        assert_eq!(name_from_body(&b).as_deref(), Some("Nested"));
    }

    #[test]
    fn falls_through_in_order() {
        assert_eq!(
            name_from_body(&body(r#"{"metadata":{},"indicator_name":"Top"}"#)).as_deref(),
            Some("Top")
        );
        assert_eq!(
            name_from_body(&body(r#"{"indicators":[{"name":"First"},{"name":"Second"}],"name":"N"}"#))
                .as_deref(),
            Some("First")
        );
        assert_eq!(
            name_from_body(&body(r#"{"indicators":[],"name":"N"}"#)).as_deref(),
            Some("N")
        );
        assert_eq!(
            name_from_body(&body(r#"{"title":"Only title"}"#)).as_deref(),
            Some("Only title")
        );
        assert_eq!(name_from_body(&body("{}")), None);
    }

    #[test]
    fn first_indicator_without_name_stops_the_chain() {
        let b = body(r#"{"indicators":[{"id":1}],"name":"N"}"#);
        assert_eq!(name_from_body(&b), None);
    }

    #[test]
    fn mistyped_metadata_section_falls_through_to_title() {
        let b = body(r#"{"metadata":"n/a","title":"Title fallback"}"#);
        assert_eq!(name_from_body(&b).as_deref(), Some("Title fallback"));
    }

    #[test]
    fn mistyped_indicator_list_falls_through_to_name() {
        let b = body(r#"{"indicators":{},"name":"Name fallback"}"#);
        assert_eq!(name_from_body(&b).as_deref(), Some("Name fallback"));
    }

    #[test]
    fn mistyped_fields_still_resolve_through_source() {
        let src = FixedMetadata(serde_json::json!({
            "body": {"metadata": ["x"], "indicators": "none", "name": "Name fallback"}
        }));
        assert_eq!(resolve_name(&src, 5, "en"), "Name fallback");
        let src = FixedMetadata(serde_json::json!({"body": "gone"}));
        assert_eq!(resolve_name(&src, 5, "en"), "Indicator 5");
    }

    #[test]
    fn non_string_fields_count_as_missing() {
        let b = body(r#"{"indicator_name":{"es":"x"},"name":42}"#);
        assert_eq!(name_from_body(&b).as_deref(), Some("42"));
    }
}
