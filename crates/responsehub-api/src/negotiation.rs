//! Accept-header content negotiation.

use responsehub_core::types::ResponseFormat;

/// Pick the output serialization format from an `Accept` header.
///
/// Candidates are scanned left to right. Only `application/json`,
/// `application/xml`, and `text/xml` are recognized; wildcards and every
/// other MIME type are ignored. The recognized candidate with the highest
/// quality wins, and a later candidate needs a strictly greater quality to
/// displace an earlier one. Malformed headers and headers with no
/// recognized candidate fall back to JSON.
pub fn negotiate(accept_header: &str) -> ResponseFormat {
    let mut best: Option<(ResponseFormat, f32)> = None;

    for candidate in accept_header.split(',') {
        let mut parts = candidate.split(';');
        let mime = parts.next().unwrap_or("").trim().to_ascii_lowercase();

        let format = match mime.as_str() {
            "application/json" => ResponseFormat::Json,
            "application/xml" | "text/xml" => ResponseFormat::Xml,
            _ => continue,
        };

        let mut quality = 1.0_f32;
        for param in parts {
            if let Some(value) = param.trim().strip_prefix("q=") {
                quality = value.trim().parse().unwrap_or(1.0);
            }
        }

        match best {
            Some((_, current)) if quality <= current => {}
            _ => best = Some((format, quality)),
        }
    }

    best.map(|(format, _)| format).unwrap_or(ResponseFormat::Json)
}
