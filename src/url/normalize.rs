use crate::UrlError;
use url::Url;

/// Final path segments treated as a directory index and dropped
const INDEX_STEMS: &[&str] = &["index", "default"];

/// Normalizes a URL into the canonical form used for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https` schemes (the scheme itself is kept)
/// 3. Lowercase the host, remove a `www.` prefix and any trailing dot
/// 4. Normalize path:
///    - Remove dot segments (. and ..) and duplicate slashes
///    - Drop a directory index (`index.html`, `default.asp`, ...)
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 5. Remove fragment (everything after #)
/// 6. Sort query parameters by key; drop an empty query string
///
/// Default ports are removed by the parser itself.
///
/// # Examples
///
/// ```
/// use linkwade::url::normalize_url;
///
/// let url = normalize_url("http://WWW.EXAMPLE.COM/a/../page/index.html#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {
            let normalized_host = canonical_host(host);
            url.set_host(Some(&normalized_host))
                .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;
        }
        _ => return Err(UrlError::MissingHost(url_str.to_string())),
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = sorted_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Returns the host in canonical form: lowercase, no `www.` prefix, no trailing dot
pub fn canonical_host(host: &str) -> String {
    let lowered = host.to_lowercase();
    let trimmed = lowered.trim_end_matches('.');
    trimmed.strip_prefix("www.").unwrap_or(trimmed).to_string()
}

/// Normalizes a URL path by removing dot segments, index files and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.last().is_some_and(|last| is_directory_index(last)) {
        segments.pop();
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Matches `index.<ext>` or `default.<ext>` with a 1-4 character extension
fn is_directory_index(segment: &str) -> bool {
    let Some((stem, ext)) = segment.rsplit_once('.') else {
        return false;
    };

    INDEX_STEMS.contains(&stem)
        && (1..=4).contains(&ext.len())
        && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Collects query parameters sorted by key (stable for equal keys)
fn sorted_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, value)| !(key.is_empty() && value.is_empty()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}
