//! Line-delimited JSON streaming bodies.
//!
//! The protocol emits one JSON document per line: a header line first, then
//! one line per generator item, each flushed as its own chunk.

use axum::body::Body;
use bytes::Bytes;
use serde_json::{Map, Value};

use responsehub_core::types::StreamItem;

/// Build a streaming body from the serialized header line and the
/// generator's items.
///
/// Items are rendered lazily as the body is polled:
/// - a [`StreamItem::Pair`] with a string value becomes a one-entry object
///   line `{key: value}`;
/// - array- or object-shaped values are emitted directly as one line;
/// - everything else (scalar-valued pairs, bare scalars) is skipped.
pub fn build<I>(header_line: String, items: I) -> Body
where
    I: IntoIterator<Item = StreamItem>,
    I::IntoIter: Send + 'static,
{
    let lines = std::iter::once(header_line)
        .chain(items.into_iter().filter_map(render_item))
        .map(|line| Ok::<_, std::convert::Infallible>(Bytes::from(line + "\n")));

    Body::from_stream(futures::stream::iter(lines))
}

fn render_item(item: StreamItem) -> Option<String> {
    match item {
        StreamItem::Pair(key, Value::String(value)) => {
            let mut line = Map::new();
            line.insert(key, Value::String(value));
            serde_json::to_string(&line).ok()
        }
        StreamItem::Pair(_, value) | StreamItem::Value(value) => match value {
            Value::Array(_) | Value::Object(_) => serde_json::to_string(&value).ok(),
            _ => None,
        },
    }
}
