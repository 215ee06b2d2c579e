use crate::url::LinkCandidate;

/// Checks whether a link contains a keyword
///
/// The keyword is compared case-insensitively against the link's decoded
/// form, so `über` matches `/%C3%BCber-uns`.
pub fn matches_keyword(link: &LinkCandidate, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    !keyword.is_empty() && link.comparison_form().contains(&keyword)
}

/// Picks the best link for a prioritized keyword list
///
/// Keywords are tried in order. For each keyword the internal links are
/// searched first, then the external links, both in discovery order; the
/// first hit wins.
///
/// # Examples
///
/// ```
/// use imprint_scout::url::{find_by_keywords, LinkCandidate};
/// use url::Url;
///
/// let base = Url::parse("https://verein.de/").unwrap();
/// let internal = vec![LinkCandidate::from_href("/kontakt", &base).unwrap()];
/// let external = vec![LinkCandidate::from_href("https://host.de/impressum", &base).unwrap()];
///
/// let keywords = vec!["impressum".to_string(), "kontakt".to_string()];
/// let found = find_by_keywords(&keywords, &internal, &external).unwrap();
/// assert_eq!(found.as_str(), "https://host.de/impressum");
/// ```
pub fn find_by_keywords<'a, S: AsRef<str>>(
    keywords: &[S],
    internal: &'a [LinkCandidate],
    external: &'a [LinkCandidate],
) -> Option<&'a LinkCandidate> {
    for keyword in keywords {
        let keyword = keyword.as_ref();

        if let Some(found) = internal.iter().find(|l| matches_keyword(l, keyword)) {
            return Some(found);
        }

        if let Some(found) = external.iter().find(|l| matches_keyword(l, keyword)) {
            return Some(found);
        }
    }

    None
}
