//! XML rendering for negotiated XML responses.
//!
//! Mirrors the JSON envelope as an element tree under a `<root>` element.
//! Keys that are not valid XML names (numeric array indices, keys with
//! punctuation) are rewritten as `item_<key>`.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::{Map, Value};

use responsehub_core::error::AppError;
use responsehub_core::result::AppResult;

/// Render envelope content as an XML document.
pub fn to_xml(content: &Map<String, Value>) -> AppResult<String> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("root")))
        .map_err(xml_error)?;

    for (key, value) in content {
        write_value(&mut writer, key, value)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("root")))
        .map_err(xml_error)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| AppError::serialization(format!("XML output was not valid UTF-8: {e}")))
}

fn write_value(writer: &mut Writer<Vec<u8>>, key: &str, value: &Value) -> AppResult<()> {
    let name = element_name(key);

    match value {
        Value::Object(map) => {
            writer
                .write_event(Event::Start(BytesStart::new(name.as_str())))
                .map_err(xml_error)?;
            for (child_key, child) in map {
                write_value(writer, child_key, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name.as_str())))
                .map_err(xml_error)?;
        }
        Value::Array(items) => {
            writer
                .write_event(Event::Start(BytesStart::new(name.as_str())))
                .map_err(xml_error)?;
            for (index, item) in items.iter().enumerate() {
                write_value(writer, &index.to_string(), item)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name.as_str())))
                .map_err(xml_error)?;
        }
        Value::Null => {
            writer
                .write_event(Event::Empty(BytesStart::new(name.as_str())))
                .map_err(xml_error)?;
        }
        scalar => {
            writer
                .write_event(Event::Start(BytesStart::new(name.as_str())))
                .map_err(xml_error)?;
            writer
                .write_event(Event::Text(BytesText::new(&scalar_text(scalar))))
                .map_err(xml_error)?;
            writer
                .write_event(Event::End(BytesEnd::new(name.as_str())))
                .map_err(xml_error)?;
        }
    }

    Ok(())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Rewrite keys that are not valid XML element names as `item_<key>`.
fn element_name(key: &str) -> String {
    let valid_start = key
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    let valid = valid_start
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        key.to_string()
    } else {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("item_{sanitized}")
    }
}

fn xml_error(err: impl std::fmt::Display) -> AppError {
    AppError::serialization(format!("Failed to render XML response: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: Value) -> String {
        let Value::Object(map) = value else {
            unreachable!()
        };
        to_xml(&map).unwrap()
    }

    #[test]
    fn renders_scalar_envelope() {
        let xml = render(json!({"success": true, "message": "OK", "data": null}));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <root><success>true</success><message>OK</message><data/></root>"
        );
    }

    #[test]
    fn nests_objects_and_rewrites_array_indices() {
        let xml = render(json!({"data": {"items": [1, 2]}}));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <root><data><items><item_0>1</item_0><item_1>2</item_1></items></data></root>"
        );
    }

    #[test]
    fn escapes_text_content() {
        let xml = render(json!({"message": "a < b & c"}));
        assert!(xml.contains("<message>a &lt; b &amp; c</message>"));
    }

    #[test]
    fn rewrites_non_identifier_keys() {
        let xml = render(json!({"_links": {"self link": "x"}}));
        assert!(xml.contains("<_links><item_self_link>x</item_self_link></_links>"));
    }
}
