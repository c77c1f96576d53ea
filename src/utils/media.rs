//! Product image URL resolution

/// Placeholder shown when a product has no image
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/400x400";

/// Remove a trailing `/graphql/` (or `/graphql`) from an API endpoint
#[must_use]
pub fn strip_graphql_suffix(api_url: &str) -> String {
    let trimmed = api_url.trim_end_matches('/');
    trimmed
        .strip_suffix("/graphql")
        .unwrap_or(trimmed)
        .to_string()
}

/// Resolve a stored image path against the media base URL
#[must_use]
pub fn image_url(media_base_url: &str, image: Option<&str>) -> String {
    match image.map(str::trim) {
        Some(path) if !path.is_empty() => format!(
            "{}/media/{}",
            media_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
        _ => PLACEHOLDER_IMAGE_URL.to_string(),
    }
}
