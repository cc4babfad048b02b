//! Next listing page detection.

use url::Url;

use sniper_protocols::{DriverError, ListingTarget, PageDriver};

/// Choose the next listing page among `links`.
///
/// Prefers the link to exactly the following page number, else the lowest
/// page number greater than the current one. Relative links resolve against
/// `current_url`; links off the listing's domain are ignored.
pub fn choose_next_page(
    current_url: &str,
    links: &[String],
    listing: &ListingTarget,
) -> Option<String> {
    let current = Url::parse(current_url).ok()?;
    let current_page = listing.page_number(&current).unwrap_or(1);

    let pages: Vec<(Url, u32)> = links
        .iter()
        .filter_map(|href| current.join(href).ok())
        .filter(|url| listing.is_listing(url))
        .filter_map(|url| listing.page_number(&url).map(|page| (url, page)))
        .collect();

    let explicit = pages
        .iter()
        .find(|(_, page)| *page == current_page.saturating_add(1));
    let chosen = explicit.or_else(|| {
        pages
            .iter()
            .filter(|(_, page)| *page > current_page)
            .min_by_key(|(_, page)| *page)
    });

    chosen.map(|(url, _)| url.to_string())
}

/// Read the page's URL and links and choose the next listing page.
pub async fn detect_next_page(
    driver: &dyn PageDriver,
    listing: &ListingTarget,
) -> Result<Option<String>, DriverError> {
    let current = driver.current_url().await?;
    let links = driver.links().await?;
    Ok(choose_next_page(&current, &links, listing))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.mercadolivre.com.br/cupons/filter?all=true";

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prefers_exact_successor() {
        let next = choose_next_page(
            "https://www.mercadolivre.com.br/cupons?page=2",
            &links(&[
                "/cupons?page=1",
                "/cupons?page=5",
                "/cupons?page=3",
                "/ofertas?page=3",
            ]),
            &ListingTarget::default(),
        );
        assert_eq!(
            next.as_deref(),
            Some("https://www.mercadolivre.com.br/cupons?page=3")
        );
    }

    #[test]
    fn test_missing_page_param_means_first_page() {
        let next = choose_next_page(
            BASE,
            &links(&["https://www.mercadolivre.com.br/cupons/filter?all=true&page=2"]),
            &ListingTarget::default(),
        );
        assert_eq!(
            next.as_deref(),
            Some("https://www.mercadolivre.com.br/cupons/filter?all=true&page=2")
        );
    }

    #[test]
    fn test_falls_back_to_lowest_higher_page() {
        let next = choose_next_page(
            "https://www.mercadolivre.com.br/cupons?page=2",
            &links(&["/cupons?page=9", "/cupons?page=4", "/cupons?page=7"]),
            &ListingTarget::default(),
        );
        assert_eq!(
            next.as_deref(),
            Some("https://www.mercadolivre.com.br/cupons?page=4")
        );
    }

    #[test]
    fn test_ignores_off_domain_listing_links() {
        let next = choose_next_page(
            "https://www.mercadolivre.com.br/cupons?page=2",
            &links(&[
                "https://evil.example/cupons?page=3",
                "https://mercadolivre.com.br.evil.example/cupons?page=3",
                "/cupons?page=4",
            ]),
            &ListingTarget::default(),
        );
        assert_eq!(
            next.as_deref(),
            Some("https://www.mercadolivre.com.br/cupons?page=4")
        );

        assert!(choose_next_page(
            "https://www.mercadolivre.com.br/cupons?page=2",
            &links(&["https://evil.example/cupons?page=3"]),
            &ListingTarget::default(),
        )
        .is_none());
    }

    #[test]
    fn test_no_higher_page_is_none() {
        let target = ListingTarget::default();
        assert!(choose_next_page(
            "https://www.mercadolivre.com.br/cupons?page=3",
            &links(&["/cupons?page=1", "/cupons?page=3", "/cupons"]),
            &target,
        )
        .is_none());
        assert!(choose_next_page(BASE, &[], &target).is_none());
        assert!(choose_next_page("not a url", &links(&["/cupons?page=2"]), &target).is_none());
    }
}
