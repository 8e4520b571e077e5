//! URL helpers for consistent endpoint construction.

/// Normalize a base URL by removing trailing slashes.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path without producing double slashes.
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        endpoint.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        assert_eq!(
            normalize_base_url("https://example.com/v1beta///"),
            "https://example.com/v1beta"
        );
    }

    #[test]
    fn join_never_doubles_slashes() {
        assert_eq!(
            construct_api_url("https://example.com/v1beta/", "/models/x:generateContent"),
            "https://example.com/v1beta/models/x:generateContent"
        );
    }
}
