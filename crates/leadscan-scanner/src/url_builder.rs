use crate::error::{Result, ScanError};
use leadscan_core::SearchUnit;
use url::Url;

/// Fill `{category}` and `{zone}` in `template` from `unit`.
pub fn build_query(template: &str, unit: &SearchUnit) -> String {
    template
        .replace("{category}", &unit.category)
        .replace("{zone}", unit.zone.as_str())
}

/// Append the filled query to `base_url` as a single percent-encoded path segment.
pub fn build_search_url(base_url: &str, template: &str, unit: &SearchUnit) -> Result<String> {
    let invalid = |reason: String| ScanError::InvalidSearchUrl {
        base: base_url.to_string(),
        reason,
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot have path segments".to_string()))?
        .pop_if_empty()
        .push(&build_query(template, unit));

    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadscan_core::Zone;

    fn unit(category: &str) -> SearchUnit {
        SearchUnit::new(Zone::new("576101").expect("valid zone"), category)
    }

    #[test]
    fn test_build_query_from_template() {
        assert_eq!(
            build_query("{category} in {zone}", &unit("Bakery")),
            "Bakery in 576101"
        );
        assert_eq!(
            build_query("{category} {zone}", &unit("Rice Mill")),
            "Rice Mill 576101"
        );
    }

    #[test]
    fn test_build_url_encodes_query() {
        let url = build_search_url(
            "https://www.google.com/maps/search/",
            "{category} in {zone}",
            &unit("Bakery"),
        )
        .expect("should build URL from template");

        assert_eq!(url, "https://www.google.com/maps/search/Bakery%20in%20576101");
    }

    #[test]
    fn test_build_url_without_trailing_slash() {
        let url = build_search_url(
            "https://www.google.com/maps/search",
            "{category} in {zone}",
            &unit("Tiles/Ceramics"),
        )
        .expect("should build URL");

        assert_eq!(
            url,
            "https://www.google.com/maps/search/Tiles%2FCeramics%20in%20576101"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = build_search_url("not a url", "{category}", &unit("Bakery"))
            .expect_err("relative base is rejected");
        assert!(matches!(err, ScanError::InvalidSearchUrl { .. }));

        let err = build_search_url("mailto:someone@example.com", "{category}", &unit("Bakery"))
            .expect_err("cannot-be-a-base URL is rejected");
        assert!(matches!(err, ScanError::InvalidSearchUrl { .. }));
    }
}
