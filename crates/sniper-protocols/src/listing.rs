//! Listing URL classification.

use url::Url;

/// The retail listing a capture targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTarget {
    /// Host suffix the listing must be served from.
    pub domain_suffix: String,
    /// Path prefix of every listing page.
    pub path_prefix: String,
    /// Canonical first page of the listing.
    pub entry_url: String,
    /// Query parameter carrying the page number.
    pub page_param: String,
}

impl Default for ListingTarget {
    fn default() -> Self {
        Self {
            domain_suffix: "mercadolivre.com.br".to_string(),
            path_prefix: "/cupons".to_string(),
            entry_url: "https://www.mercadolivre.com.br/cupons/filter?all=true&source_page=int_view_all"
                .to_string(),
            page_param: "page".to_string(),
        }
    }
}

impl ListingTarget {
    /// True iff `url` is served from the target domain under the listing path.
    pub fn is_listing_url(&self, url: &str) -> bool {
        Url::parse(url).is_ok_and(|parsed| self.is_listing(&parsed))
    }

    /// [`Self::is_listing_url`] for an already parsed URL.
    pub fn is_listing(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| host.ends_with(&self.domain_suffix))
            && url.path().starts_with(&self.path_prefix)
    }

    /// Page number carried by `url`, if the page parameter is present.
    pub fn page_number(&self, url: &Url) -> Option<u32> {
        url.query_pairs()
            .find(|(k, _)| k == self.page_param.as_str())
            .map(|(_, v)| v.trim().parse().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_matches_subdomains() {
        let target = ListingTarget::default();
        assert!(target.is_listing_url("https://www.mercadolivre.com.br/cupons"));
        assert!(target.is_listing_url("https://mercadolivre.com.br/cupons/filter?page=2"));
        assert!(target.is_listing_url(&target.entry_url));
    }

    #[test]
    fn test_listing_url_rejects_other_paths_and_hosts() {
        let target = ListingTarget::default();
        assert!(!target.is_listing_url("https://www.mercadolivre.com.br/ofertas"));
        assert!(!target.is_listing_url("https://example.com/cupons"));
        assert!(!target.is_listing_url("not a url"));
        assert!(!target.is_listing_url(""));
    }

    #[test]
    fn test_parsed_listing_requires_target_host() {
        let target = ListingTarget::default();
        let url = Url::parse("https://www.mercadolivre.com.br/cupons?page=2").unwrap();
        assert!(target.is_listing(&url));
        let url = Url::parse("https://evil.example/cupons?page=2").unwrap();
        assert!(!target.is_listing(&url));
    }

    #[test]
    fn test_page_number() {
        let target = ListingTarget::default();
        let url = Url::parse("https://x.com/cupons?page=3").unwrap();
        assert_eq!(target.page_number(&url), Some(3));

        let url = Url::parse("https://x.com/cupons?page=abc").unwrap();
        assert_eq!(target.page_number(&url), Some(0));

        let url = Url::parse("https://x.com/cupons").unwrap();
        assert_eq!(target.page_number(&url), None);
    }
}
