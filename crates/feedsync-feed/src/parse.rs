use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::FeedError;
use crate::price::parse_price;
use crate::types::FeedItem;

/// Parses a Google Shopping RSS document into a flat list of [`FeedItem`]s.
///
/// Walks `rss > channel > item` and collects the `g:`-namespaced fields of
/// each item. A well-formed document with no `<item>` elements (or no
/// channel at all) parses to an empty vec — empty feeds are tolerated.
///
/// # Errors
///
/// Returns [`FeedError::Xml`] if the document is not well-formed XML.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "item" {
                    current = Some(FeedItem::default());
                    current_tag.clear();
                } else {
                    current_tag = name;
                }
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                if let Some(item) = current.as_mut() {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    assign_field(item, &current_tag, text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(item) = current.as_mut() {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    assign_field(item, &current_tag, text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FeedError::Xml(e)),
            _ => {}
        }
    }

    tracing::debug!(items = items.len(), "feed parsed");
    Ok(items)
}

/// Routes one element's text into the matching [`FeedItem`] field.
///
/// Tags are matched on their local name so both `g:title` and a bare
/// `title` land in the same field.
fn assign_field(item: &mut FeedItem, tag: &str, text: String) {
    let local = tag.strip_prefix("g:").unwrap_or(tag);
    match local {
        "id" => item.sku = text,
        "item_group_id" => item.group_id_hint = non_empty(text),
        "title" => item.raw_title = text,
        "brand" => item.brand = text,
        "description" => item.description = text,
        "price" => item.price = parse_price(&text),
        "gtin" => item.gtin = non_empty(text),
        "image_link" => item.image_url = non_empty(text),
        "color" => item.raw_color = text,
        "availability" => item.raw_availability = text,
        "condition" => item.raw_condition = text,
        "product_type" => item.category = text,
        _ => {}
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
