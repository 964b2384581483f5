//! Items yielded by stream response generators.

use serde_json::Value;

/// One item produced by a stream data generator.
///
/// Mirrors key/value iteration over heterogeneous data: named entries come
/// through as [`StreamItem::Pair`], positional entries as
/// [`StreamItem::Value`]. How each variant is emitted (or skipped) is
/// decided by the streaming protocol, not here.
#[derive(Debug, Clone)]
pub enum StreamItem {
    /// A named entry, e.g. one field of a record.
    Pair(String, Value),
    /// A positional entry, e.g. one element of a list.
    Value(Value),
}
