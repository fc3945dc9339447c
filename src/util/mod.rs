/// Resolve a backend media reference against the configured asset base.
///
/// The backend returns relative paths for uploaded images/videos; absolute
/// URLs (and locally generated blob/data previews) pass through unchanged.
pub(crate) fn resolve_media_url(base: &str, path: &str) -> String {
    let p = path.trim();
    if p.is_empty() {
        return String::new();
    }

    if p.starts_with("http://")
        || p.starts_with("https://")
        || p.starts_with("blob:")
        || p.starts_with("data:")
    {
        return p.to_string();
    }

    let base = base.trim_end_matches('/');
    let p = p.trim_start_matches('/');
    format!("{}/{}", base, p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_joins_with_single_slash() {
        assert_eq!(
            resolve_media_url("http://localhost:5050", "uploads/hero.jpg"),
            "http://localhost:5050/uploads/hero.jpg"
        );
        assert_eq!(
            resolve_media_url("http://localhost:5050/", "/uploads/hero.jpg"),
            "http://localhost:5050/uploads/hero.jpg"
        );
    }

    #[test]
    fn test_absolute_urls_pass_through() {
        assert_eq!(
            resolve_media_url("http://localhost:5050", "https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(
            resolve_media_url("http://localhost:5050", "blob:abc-123"),
            "blob:abc-123"
        );
        assert_eq!(
            resolve_media_url("http://localhost:5050", "data:image/png;base64,AAAA"),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn test_empty_path_stays_empty() {
        assert_eq!(resolve_media_url("http://localhost:5050", ""), "");
        assert_eq!(resolve_media_url("http://localhost:5050", "   "), "");
    }
}
