//! Payloads embedded at compile time.

pub const INDEX_HTML: &str = include_str!("../assets/index.html");
pub const OFFLINE_HTML: &str = include_str!("../assets/offline.html");
pub const WORKER_JS: &str = include_str!("../assets/sw.js");

pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
pub const CONTENT_TYPE_JS: &str = "application/javascript";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

pub const NO_CACHE: &str = "no-cache";
/// One year.
pub const IMMUTABLE: &str = "public, max-age=31536000";
