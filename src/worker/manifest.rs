use url::Url;

/// Cache name used when config does not set one. Bump the suffix to retire
/// every older cache on the next activation.
pub const DEFAULT_CACHE_NAME: &str = "retroflix-v1";

/// App-shell resources pre-cached on install. Relative entries resolve
/// against the base URL; the two stylesheets are pinned third-party URLs.
pub const APP_SHELL: [&str; 9] = [
    "/",
    "index.html",
    "style.css",
    "script.js",
    "manifest.json",
    "icons/icon-192x192.png",
    "icons/icon-512x512.png",
    "https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap",
    "https://unpkg.com/boxicons@2.1.4/css/boxicons.min.css",
];

/// Resolve every manifest entry to an absolute URL.
///
/// `"/"` names the site root the app is served from, which is the base URL
/// itself rather than the host root.
pub fn resolve_manifest(base: &Url, entries: &[&str]) -> Result<Vec<Url>, url::ParseError> {
    entries
        .iter()
        .map(|entry| match *entry {
            "/" => Ok(base.clone()),
            other => base.join(other),
        })
        .collect()
}
