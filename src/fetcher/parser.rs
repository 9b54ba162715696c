use std::borrow::Cow;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::domain::{ParsedChannel, ParsedDocument, ParsedItem};
use crate::fetcher::traits::FetchError;

/// Where a piece of character data inside an RSS document belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    ChannelTitle,
    ChannelLink,
    ChannelDescription,
    ItemTitle,
    ItemLink,
    ItemDescription,
    ItemPubDate,
}

/// Parse a syndication document.
///
/// RSS 2.0 is read directly so the item publish date stays the raw string
/// from the document. Anything else (Atom, RSS 1.0, JSON Feed) goes through
/// `feed-rs`. HTML entities in titles and descriptions are decoded last.
pub fn parse_document(bytes: &[u8]) -> Result<ParsedDocument, FetchError> {
    let mut document = match root_element(bytes) {
        Some(root) if root == b"rss" => parse_rss(bytes)?,
        _ => parse_with_feed_rs(bytes)?,
    };

    unescape_html(&mut document);
    Ok(document)
}

fn root_element(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => return Some(e.name().as_ref().to_vec()),
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

fn slot(path: &[Vec<u8>]) -> Option<Slot> {
    match path {
        [_, channel, field] if channel.as_slice() == b"channel" => match field.as_slice() {
            b"title" => Some(Slot::ChannelTitle),
            b"link" => Some(Slot::ChannelLink),
            b"description" => Some(Slot::ChannelDescription),
            _ => None,
        },
        [_, channel, item, field]
            if channel.as_slice() == b"channel" && item.as_slice() == b"item" =>
        {
            match field.as_slice() {
                b"title" => Some(Slot::ItemTitle),
                b"link" => Some(Slot::ItemLink),
                b"description" => Some(Slot::ItemDescription),
                b"pubDate" => Some(Slot::ItemPubDate),
                _ => None,
            }
        }
        _ => None,
    }
}

fn append(
    slot: Slot,
    channel: &mut ParsedChannel,
    item: Option<&mut ParsedItem>,
    text: &str,
) {
    let target = match (slot, item) {
        (Slot::ChannelTitle, _) => &mut channel.title,
        (Slot::ChannelLink, _) => &mut channel.link,
        (Slot::ChannelDescription, _) => &mut channel.description,
        (Slot::ItemTitle, Some(item)) => &mut item.title,
        (Slot::ItemLink, Some(item)) => &mut item.link,
        (Slot::ItemDescription, Some(item)) => &mut item.description,
        (Slot::ItemPubDate, Some(item)) => &mut item.pub_date,
        (_, None) => return,
    };
    target.push_str(text);
}

/// Fields are assembled from several text and CDATA nodes, so whitespace
/// is only trimmed once the whole value is known.
fn trim_in_place(field: &mut String) {
    let trimmed = field.trim();
    if trimmed.len() != field.len() {
        *field = trimmed.to_string();
    }
}

fn trim_item(item: &mut ParsedItem) {
    for field in [
        &mut item.title,
        &mut item.link,
        &mut item.description,
        &mut item.pub_date,
    ] {
        trim_in_place(field);
    }
}

fn parse_rss(bytes: &[u8]) -> Result<ParsedDocument, FetchError> {
    let mut reader = Reader::from_reader(bytes);

    let mut buf = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut document = ParsedDocument::default();
    let mut item: Option<ParsedItem> = None;
    let mut saw_channel = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                match path.len() {
                    1 if name == b"channel" => saw_channel = true,
                    2 if name == b"item" && path[1] == b"channel" => {
                        item = Some(ParsedItem::default())
                    }
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::End(_)) => {
                let closed = path.pop();
                if path.len() == 2 && closed.as_deref() == Some(b"item".as_slice()) {
                    if let Some(mut done) = item.take() {
                        trim_item(&mut done);
                        document.items.push(done);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(slot) = slot(&path) {
                    // Undeclared entities such as &nbsp; are left for the HTML pass.
                    let text = t
                        .unescape()
                        .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&t).into_owned()));
                    append(slot, &mut document.channel, item.as_mut(), &text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(slot) = slot(&path) {
                    let text = String::from_utf8_lossy(&c);
                    append(slot, &mut document.channel, item.as_mut(), &text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FetchError::Parse(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_channel {
        return Err(FetchError::Parse("RSS document has no <channel>".to_string()));
    }
    if !path.is_empty() {
        return Err(FetchError::Parse("RSS document ended unexpectedly".to_string()));
    }

    let channel = &mut document.channel;
    for field in [&mut channel.title, &mut channel.link, &mut channel.description] {
        trim_in_place(field);
    }

    Ok(document)
}

fn parse_with_feed_rs(bytes: &[u8]) -> Result<ParsedDocument, FetchError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

    let channel = ParsedChannel {
        title: feed.title.map(|t| t.content).unwrap_or_default(),
        link: feed.links.first().map(|l| l.href.clone()).unwrap_or_default(),
        description: feed.description.map(|d| d.content).unwrap_or_default(),
    };

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry.links.first().map(|l| l.href.clone()).unwrap_or_default();
            // Rendered back to RFC 2822 so every format reaches the ingestor alike.
            let pub_date = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.to_rfc2822())
                .unwrap_or_default();

            ParsedItem {
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                link,
                description: entry
                    .summary
                    .map(|s| s.content)
                    .or_else(|| entry.content.and_then(|c| c.body))
                    .unwrap_or_default(),
                pub_date,
            }
        })
        .collect();

    Ok(ParsedDocument { channel, items })
}

fn unescape_html(document: &mut ParsedDocument) {
    let channel = &mut document.channel;
    decode_in_place(&mut channel.title);
    decode_in_place(&mut channel.description);

    for item in &mut document.items {
        decode_in_place(&mut item.title);
        decode_in_place(&mut item.description);
    }
}

/// Longest entity reference tried, `&CounterClockwiseContourIntegral;` included.
const MAX_ENTITY_LEN: usize = 40;

/// Decode HTML entity references one at a time. An `&` that does not start
/// a known reference is kept as published.
fn decode_in_place(field: &mut String) {
    if !field.contains('&') {
        return;
    }

    let mut decoded = String::with_capacity(field.len());
    let mut rest = field.as_str();

    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        rest = &rest[amp..];

        match entity_at(rest).and_then(|len| {
            htmlescape::decode_html(&rest[..len])
                .ok()
                .map(|text| (len, text))
        }) {
            Some((len, text)) => {
                decoded.push_str(&text);
                rest = &rest[len..];
            }
            None => {
                decoded.push('&');
                rest = &rest[1..];
            }
        }
    }
    decoded.push_str(rest);

    *field = decoded;
}

/// Length of the `&name;` / `&#123;` / `&#x7b;` run at the start of `text`.
fn entity_at(text: &str) -> Option<usize> {
    let body = text.strip_prefix('&')?;
    let name_len = body
        .bytes()
        .take(MAX_ENTITY_LEN)
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'#')
        .count();

    if name_len == 0 || body.as_bytes().get(name_len) != Some(&b';') {
        return None;
    }
    Some(name_len + 2)
}
