//! Feed document parser for gator.
//!
//! Parses raw RSS XML into a [`ParsedFeed`]. The parser walks the
//! document events directly so a channel with zero, one, or many
//! `<item>` elements flows through a single accumulation path.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::rss::types::{ParsedFeed, ParsedItem};
use crate::{GatorError, Result};

/// Parse a feed document into a ParsedFeed.
///
/// A document without a `<channel>` element fails with a fetch error;
/// a channel missing any of title, link, or description fails with a
/// format error. Missing items are not an error.
pub fn parse_feed(xml: &str) -> Result<ParsedFeed> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut saw_channel = false;
    let mut title: Option<String> = None;
    let mut link: Option<String> = None;
    let mut description: Option<String> = None;
    let mut items: Vec<ParsedItem> = Vec::new();
    let mut current_item: Option<ParsedItem> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "channel" && stack.len() == 1 {
                    saw_channel = true;
                }
                if name == "item" && in_channel(&stack) {
                    current_item = Some(ParsedItem::default());
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" && in_channel(&stack) {
                    items.push(ParsedItem::default());
                }
            }
            Ok(Event::End(_)) => {
                if let Some(name) = stack.pop() {
                    if name == "item" && in_channel(&stack) {
                        if let Some(item) = current_item.take() {
                            items.push(item);
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                collect_text(
                    &stack,
                    &mut current_item,
                    &mut title,
                    &mut link,
                    &mut description,
                    &text,
                );
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                collect_text(
                    &stack,
                    &mut current_item,
                    &mut title,
                    &mut link,
                    &mut description,
                    &text,
                );
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(GatorError::Fetch(format!("failed to parse feed XML: {}", e)));
            }
            _ => {}
        }
    }

    if !saw_channel {
        return Err(GatorError::Fetch("feed has no channel element".to_string()));
    }

    let title =
        title.ok_or_else(|| GatorError::Format("missing field title in channel".to_string()))?;
    let link =
        link.ok_or_else(|| GatorError::Format("missing field link in channel".to_string()))?;
    let description = description
        .ok_or_else(|| GatorError::Format("missing field description in channel".to_string()))?;

    Ok(ParsedFeed {
        title,
        link,
        description,
        items,
    })
}

/// Check whether the cursor sits directly inside `<channel>`.
fn in_channel(stack: &[String]) -> bool {
    stack.len() == 2 && stack[1] == "channel"
}

/// Route a text node to the channel or item field it belongs to.
///
/// Depth-checked against the element stack so nested structures (for
/// example `<image><title>`) don't bleed into channel fields.
fn collect_text(
    stack: &[String],
    current_item: &mut Option<ParsedItem>,
    title: &mut Option<String>,
    link: &mut Option<String>,
    description: &mut Option<String>,
    text: &str,
) {
    match stack {
        [_, channel, field] if channel == "channel" => {
            let slot = match field.as_str() {
                "title" => title,
                "link" => link,
                "description" => description,
                _ => return,
            };
            append(slot, text);
        }
        [_, channel, item, field] if channel == "channel" && item == "item" => {
            let Some(item) = current_item.as_mut() else {
                return;
            };
            let slot = match field.as_str() {
                "title" => &mut item.title,
                "link" => &mut item.link,
                "description" => &mut item.description,
                "pubDate" => &mut item.pub_date,
                _ => return,
            };
            append(slot, text);
        }
        _ => {}
    }
}

/// Set or extend an optional text field.
fn append(slot: &mut Option<String>, text: &str) {
    match slot {
        Some(existing) => existing.push_str(text),
        None => *slot = Some(text.to_string()),
    }
}
