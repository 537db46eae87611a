use crate::url::normalize::{canonical_host, normalize_url};
use crate::UrlError;
use url::Url;

/// Schemes that never lead to a crawlable document
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves an `href` found on `base` into a canonical, crawlable URL
///
/// Resolution fails (and the candidate should be discarded) when:
/// - the href is empty, fragment-only, or uses a non-navigable scheme
/// - the joined URL cannot be parsed or normalized
/// - the resolved URL has no host
/// - `same_host` is set and the resolved host differs from the base host
///
/// # Examples
///
/// ```
/// use linkwade::url::{normalize_url, resolve_reference};
///
/// let base = normalize_url("http://a.test/dir/page").unwrap();
/// let link = resolve_reference(&base, "../other/", true).unwrap();
/// assert_eq!(link.as_str(), "http://a.test/other");
/// assert!(resolve_reference(&base, "http://b.test/", true).is_err());
/// ```
pub fn resolve_reference(base: &Url, href: &str, same_host: bool) -> Result<Url, UrlError> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::Malformed(format!("not a link target: '{}'", href)));
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return Err(UrlError::InvalidScheme(href.to_string()));
    }

    let joined = base.join(href).map_err(|e| UrlError::Parse(e.to_string()))?;

    if joined.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(joined.to_string()));
    }

    let resolved = normalize_url(joined.as_str())?;

    if same_host {
        let base_host = base.host_str().map(canonical_host).unwrap_or_default();
        let resolved_host = resolved.host_str().unwrap_or_default();
        if resolved_host != base_host {
            return Err(UrlError::ExternalHost(resolved_host.to_string()));
        }
    }

    Ok(resolved)
}
