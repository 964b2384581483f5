//! Gzip encoding for response bodies.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Gzip-encode `body` at maximum compression.
///
/// Returns `None` when the encoder fails; callers keep the uncompressed
/// body in that case.
pub fn gzip(body: &[u8]) -> Option<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    if encoder.write_all(body).is_err() {
        return None;
    }
    encoder.finish().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn round_trips_through_gzip() {
        let body = "abcdefgh".repeat(200);
        let compressed = gzip(body.as_bytes()).unwrap();
        assert!(compressed.len() < body.len());

        let mut decoder = flate2::read::GzDecoder::new(&compressed[..]);
        let mut decompressed = String::new();
        decoder.read_to_string(&mut decompressed).unwrap();
        assert_eq!(decompressed, body);
    }

    #[test]
    fn tiny_bodies_may_grow() {
        let compressed = gzip(b"x").unwrap();
        assert!(compressed.len() > 1);
    }
}
