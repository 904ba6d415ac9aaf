//! Well-known header name and media-type string constants.
//!
//! Pure data, no behavior. Exposed for middleware and handler authors so the
//! IANA media-type strings are spelled once; [`crate::middleware::content_type`]
//! and [`Response::json`](crate::Response::json) are built on these.

/// The `Content-Type` header name.
pub const CONTENT_TYPE: &str = "Content-Type";

pub const APPLICATION_JAVASCRIPT: &str = "application/javascript";
pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_PDF: &str = "application/pdf";
pub const APPLICATION_URL_ENCODED: &str = "application/x-www-form-urlencoded";
pub const APPLICATION_XML: &str = "application/xml";
pub const APPLICATION_ZIP: &str = "application/zip";
pub const AUDIO_MPEG: &str = "audio/mpeg";
pub const IMAGE_GIF: &str = "image/gif";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const TEXT_CSS: &str = "text/css";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";
pub const VIDEO_MP4: &str = "video/mp4";
