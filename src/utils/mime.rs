//! MIME type detection by file extension.
//!
//! Unknown extensions have no type: the response then carries no
//! `Content-Type` at all instead of a guessed `application/octet-stream`.

use std::path::Path;

/// Common MIME type constants.
pub mod types {
    // Text
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";
    pub const MARKDOWN: &str = "text/markdown; charset=utf-8";
    pub const YAML: &str = "text/yaml; charset=utf-8";
    pub const TOML: &str = "text/toml; charset=utf-8";
    pub const CSV: &str = "text/csv; charset=utf-8";

    // Web feeds
    pub const RSS: &str = "application/rss+xml";
    pub const ATOM: &str = "application/atom+xml";

    // Documents
    pub const PDF: &str = "application/pdf";

    // Binary
    pub const WASM: &str = "application/wasm";
    pub const ZIP: &str = "application/zip";
    pub const GZIP: &str = "application/gzip";

    // Images
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const BMP: &str = "image/bmp";
    pub const TIFF: &str = "image/tiff";

    // Audio
    pub const MP3: &str = "audio/mpeg";
    pub const WAV: &str = "audio/wav";
    pub const OGG_AUDIO: &str = "audio/ogg";
    pub const FLAC: &str = "audio/flac";
    pub const AAC: &str = "audio/aac";
    pub const WEBM_AUDIO: &str = "audio/webm";

    // Video
    pub const MP4: &str = "video/mp4";
    pub const WEBM: &str = "video/webm";
    pub const OGG_VIDEO: &str = "video/ogg";
    pub const AVI: &str = "video/x-msvideo";
    pub const MOV: &str = "video/quicktime";

    // Fonts
    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OTF: &str = "font/otf";
    pub const EOT: &str = "application/vnd.ms-fontobject";
}

/// MIME type for a path, if its extension is known.
///
/// Extensions are compared case-insensitively.
pub fn lookup(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    from_extension(ext).or_else(|| from_extension(&ext.to_ascii_lowercase()))
}

/// MIME type for an extension (without the dot).
pub fn from_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        // Web / Text
        "html" | "htm" => types::HTML,
        "css" => types::CSS,
        "js" | "mjs" | "cjs" => types::JAVASCRIPT,
        "json" => types::JSON,
        "xml" => types::XML,
        "yaml" | "yml" => types::YAML,
        "toml" => types::TOML,
        "csv" => types::CSV,

        // Web feeds
        "rss" => types::RSS,
        "atom" => types::ATOM,

        // Images
        "svg" => types::SVG,
        "png" => types::PNG,
        "jpg" | "jpeg" => types::JPEG,
        "gif" => types::GIF,
        "webp" => types::WEBP,
        "avif" => types::AVIF,
        "ico" => types::ICO,
        "bmp" => types::BMP,
        "tif" | "tiff" => types::TIFF,

        // Audio
        "mp3" => types::MP3,
        "wav" => types::WAV,
        "ogg" | "oga" => types::OGG_AUDIO,
        "flac" => types::FLAC,
        "aac" | "m4a" => types::AAC,

        // Video
        "mp4" | "m4v" => types::MP4,
        "webm" => types::WEBM,
        "ogv" => types::OGG_VIDEO,
        "avi" => types::AVI,
        "mov" => types::MOV,

        // Fonts
        "woff" => types::WOFF,
        "woff2" => types::WOFF2,
        "ttf" => types::TTF,
        "otf" => types::OTF,
        "eot" => types::EOT,

        // Documents / Binary
        "pdf" => types::PDF,
        "txt" => types::PLAIN,
        "md" => types::MARKDOWN,
        "wasm" => types::WASM,
        "zip" => types::ZIP,
        "gz" | "gzip" => types::GZIP,

        _ => return None,
    };
    Some(mime)
}
