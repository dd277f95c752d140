//! Atom feed parsing.
//!
//! The standard Atom model (titles, dates, authors, links, categories) comes from `feed-rs`.
//! `feed-rs` drops foreign-namespace elements, so a second pass over the document with
//! `quick-xml` picks up the OpenSearch paging counters and the per-entry arXiv fields.
//! The same pass keeps the raw text of `<updated>` and `<published>`, so timestamps are
//! reported exactly as the feed wrote them. Both passes see entries in document order, which
//! is how the two are joined.

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::models::{Author, Entry, Feed, FeedMetadata, Link, REL_ALTERNATE};
use crate::sources::SourceError;

const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";
const OPENSEARCH_NS: &[u8] = b"http://a9.com/-/spec/opensearch/1.1/";
const ARXIV_NS: &[u8] = b"http://arxiv.org/schemas/atom";

/// Parse a feed document.
///
/// Never fails: a document that cannot be parsed yields an empty feed and a warning.
pub fn parse_feed(bytes: &[u8]) -> Feed {
    let parsed = match feed_rs::parser::parse(bytes) {
        Ok(feed) => feed,
        Err(e) => {
            tracing::warn!("Failed to parse Atom feed: {}", e);
            return Feed::default();
        }
    };

    let extensions = scan_extensions(bytes).unwrap_or_else(|e| {
        tracing::warn!("Failed to read feed extension elements: {}", e);
        Extensions::default()
    });

    let metadata = FeedMetadata {
        title: parsed.title.map(|t| t.content),
        updated: extensions
            .updated
            .or_else(|| parsed.updated.map(format_timestamp)),
        total_results: extensions.total_results,
        items_per_page: extensions.items_per_page,
        start_index: extensions.start_index,
    };

    let mut entry_extensions = extensions.entries.into_iter();
    let entries = parsed
        .entries
        .into_iter()
        .map(|entry| convert_entry(entry, entry_extensions.next().unwrap_or_default()))
        .collect();

    Feed::new(metadata, entries)
}

/// Fallback rendering when the document carries no raw timestamp text
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn convert_entry(entry: feed_rs::model::Entry, ext: EntryExtensions) -> Entry {
    let authors = entry
        .authors
        .into_iter()
        .map(|person| Author {
            name: Some(person.name).filter(|name| !name.is_empty()),
        })
        .collect();

    let links = entry
        .links
        .into_iter()
        .map(|link| Link {
            rel: link.rel.unwrap_or_else(|| REL_ALTERNATE.to_string()),
            title: link.title,
            href: Some(link.href).filter(|href| !href.is_empty()),
        })
        .collect();

    Entry {
        id: entry.id,
        published: ext
            .published
            .or_else(|| entry.published.map(format_timestamp)),
        updated: ext.updated.or_else(|| entry.updated.map(format_timestamp)),
        title: entry.title.map(|t| t.content),
        authors,
        links,
        journal_ref: ext.journal_ref,
        comment: ext.comment,
        doi: ext.doi,
        primary_category: ext.primary_category,
        categories: entry.categories.into_iter().map(|c| c.term).collect(),
        summary: entry.summary.map(|s| s.content),
    }
}

/// Foreign-namespace values found in a feed document
#[derive(Debug, Default)]
struct Extensions {
    total_results: Option<String>,
    items_per_page: Option<String>,
    start_index: Option<String>,
    updated: Option<String>,
    entries: Vec<EntryExtensions>,
}

#[derive(Debug, Default)]
struct EntryExtensions {
    journal_ref: Option<String>,
    comment: Option<String>,
    doi: Option<String>,
    primary_category: Option<String>,
    published: Option<String>,
    updated: Option<String>,
}

/// Text-bearing extension element currently open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    TotalResults,
    ItemsPerPage,
    StartIndex,
    FeedUpdated,
    EntryPublished,
    EntryUpdated,
    JournalRef,
    Comment,
    Doi,
}

fn parse_err(e: impl std::fmt::Display) -> SourceError {
    SourceError::Parse(format!("XML: {}", e))
}

fn namespace<'a>(resolved: &'a ResolveResult<'_>) -> Option<&'a [u8]> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => Some(*ns),
        _ => None,
    }
}

fn classify(ns: Option<&[u8]>, local: &[u8], in_entry: bool) -> Option<Field> {
    match (ns?, local, in_entry) {
        (OPENSEARCH_NS, b"totalResults", false) => Some(Field::TotalResults),
        (OPENSEARCH_NS, b"itemsPerPage", false) => Some(Field::ItemsPerPage),
        (OPENSEARCH_NS, b"startIndex", false) => Some(Field::StartIndex),
        (ATOM_NS, b"updated", false) => Some(Field::FeedUpdated),
        (ATOM_NS, b"updated", true) => Some(Field::EntryUpdated),
        (ATOM_NS, b"published", true) => Some(Field::EntryPublished),
        (ARXIV_NS, b"journal_ref", true) => Some(Field::JournalRef),
        (ARXIV_NS, b"comment", true) => Some(Field::Comment),
        (ARXIV_NS, b"doi", true) => Some(Field::Doi),
        _ => None,
    }
}

fn is_entry(ns: Option<&[u8]>, local: &[u8]) -> bool {
    ns == Some(ATOM_NS) && local == b"entry"
}

fn term_attr(element: &BytesStart<'_>) -> Result<Option<String>, SourceError> {
    match element.try_get_attribute("term").map_err(parse_err)? {
        Some(attr) => Ok(Some(
            attr.unescape_value().map_err(parse_err)?.into_owned(),
        )),
        None => Ok(None),
    }
}

fn scan_extensions(bytes: &[u8]) -> Result<Extensions, SourceError> {
    let mut reader = NsReader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut extensions = Extensions::default();
    let mut current: Option<EntryExtensions> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf).map_err(parse_err)?;
        let ns = namespace(&resolved);

        match event {
            Event::Start(e) => {
                let local = e.local_name();
                if is_entry(ns, local.as_ref()) {
                    current = Some(EntryExtensions::default());
                } else if let Some(f) = classify(ns, local.as_ref(), current.is_some()) {
                    field = Some(f);
                    text.clear();
                } else if ns == Some(ARXIV_NS) && local.as_ref() == b"primary_category" {
                    if let Some(entry) = current.as_mut() {
                        entry.primary_category = term_attr(&e)?;
                    }
                }
            }
            Event::Empty(e) => {
                if ns == Some(ARXIV_NS) && e.local_name().as_ref() == b"primary_category" {
                    if let Some(entry) = current.as_mut() {
                        entry.primary_category = term_attr(&e)?;
                    }
                }
            }
            Event::Text(t) if field.is_some() => {
                text.push_str(&t.unescape().map_err(parse_err)?);
            }
            Event::CData(c) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Event::End(e) => {
                let local = e.local_name();
                if is_entry(ns, local.as_ref()) {
                    if let Some(entry) = current.take() {
                        extensions.entries.push(entry);
                    }
                } else if let Some(f) = field {
                    if classify(ns, local.as_ref(), current.is_some()) == Some(f) {
                        let value = Some(text.trim().to_string());
                        match f {
                            Field::TotalResults => extensions.total_results = value,
                            Field::ItemsPerPage => extensions.items_per_page = value,
                            Field::StartIndex => extensions.start_index = value,
                            Field::FeedUpdated => extensions.updated = non_empty(value),
                            Field::EntryPublished => {
                                set_entry(&mut current, |e| e.published = non_empty(value))
                            }
                            Field::EntryUpdated => {
                                set_entry(&mut current, |e| e.updated = non_empty(value))
                            }
                            Field::JournalRef => set_entry(&mut current, |e| e.journal_ref = value),
                            Field::Comment => set_entry(&mut current, |e| e.comment = value),
                            Field::Doi => set_entry(&mut current, |e| e.doi = value),
                        }
                        field = None;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(extensions)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn set_entry(current: &mut Option<EntryExtensions>, apply: impl FnOnce(&mut EntryExtensions)) {
    if let Some(entry) = current.as_mut() {
        apply(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <link href="http://arxiv.org/api/query?search_query%3Dall%3Aelectron" rel="self" type="application/atom+xml"/>
  <title>ArXiv Query: search_query=all:electron&amp;id_list=&amp;start=0&amp;max_results=2</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <updated>2024-05-01T00:00:00-04:00</updated>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">187433</opensearch:totalResults>
  <opensearch:startIndex xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">0</opensearch:startIndex>
  <opensearch:itemsPerPage xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">2</opensearch:itemsPerPage>
  <entry>
    <id>http://arxiv.org/abs/2405.00001v2</id>
    <updated>2024-04-30T17:59:59Z</updated>
    <published>2024-04-29T10:00:00Z</published>
    <title>Electron Transport in
  Graphene</title>
    <summary>We study electrons.</summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
    <arxiv:doi xmlns:arxiv="http://arxiv.org/schemas/atom">10.1234/abc</arxiv:doi>
    <link title="doi" href="http://dx.doi.org/10.1234/abc" rel="related"/>
    <arxiv:comment xmlns:arxiv="http://arxiv.org/schemas/atom">12 pages, 3 figures</arxiv:comment>
    <arxiv:journal_ref xmlns:arxiv="http://arxiv.org/schemas/atom">Phys. Rev. B 1 (2024)</arxiv:journal_ref>
    <link href="http://arxiv.org/abs/2405.00001v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2405.00001v2" rel="related" type="application/pdf"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cond-mat.mes-hall" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cond-mat.mes-hall" scheme="http://arxiv.org/schemas/atom"/>
    <category term="quant-ph" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2405.00002v1</id>
    <updated>2024-04-30T09:00:00Z</updated>
    <published>2024-04-30T09:00:00Z</published>
    <title>Second Paper</title>
    <summary>Nothing extra.</summary>
    <link href="http://arxiv.org/abs/2405.00002v1"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_metadata() {
        let feed = parse_feed(ARXIV_FEED.as_bytes());
        let meta = &feed.metadata;

        assert_eq!(
            meta.title.as_deref(),
            Some("ArXiv Query: search_query=all:electron&id_list=&start=0&max_results=2")
        );
        // offset kept as written
        assert_eq!(meta.updated.as_deref(), Some("2024-05-01T00:00:00-04:00"));
        assert_eq!(meta.total_results.as_deref(), Some("187433"));
        assert_eq!(meta.start_index.as_deref(), Some("0"));
        assert_eq!(meta.items_per_page.as_deref(), Some("2"));
    }

    #[test]
    fn test_parse_feed_entries() {
        let feed = parse_feed(ARXIV_FEED.as_bytes());
        assert_eq!(feed.entries.len(), 2);

        let first = &feed.entries[0];
        assert_eq!(first.id, "http://arxiv.org/abs/2405.00001v2");
        assert_eq!(first.short_id(), "2405.00001v2");
        assert_eq!(first.published.as_deref(), Some("2024-04-29T10:00:00Z"));
        assert_eq!(first.updated.as_deref(), Some("2024-04-30T17:59:59Z"));
        assert!(first.title.as_deref().unwrap().starts_with("Electron Transport in"));
        assert_eq!(
            first.authors,
            vec![Author::new("Ada Lovelace"), Author::new("Alan Turing")]
        );
        assert_eq!(first.journal_ref.as_deref(), Some("Phys. Rev. B 1 (2024)"));
        assert_eq!(first.comment.as_deref(), Some("12 pages, 3 figures"));
        assert_eq!(first.doi.as_deref(), Some("10.1234/abc"));
        assert_eq!(first.primary_category.as_deref(), Some("cond-mat.mes-hall"));
        assert_eq!(first.categories, vec!["cond-mat.mes-hall", "quant-ph"]);
        assert_eq!(first.pdf_url(), Some("http://arxiv.org/pdf/2405.00001v2"));
        assert_eq!(first.summary.as_deref(), Some("We study electrons."));
    }

    #[test]
    fn test_parse_feed_missing_extensions() {
        let feed = parse_feed(ARXIV_FEED.as_bytes());
        let second = &feed.entries[1];

        assert!(second.authors.is_empty());
        assert!(second.categories.is_empty());
        assert_eq!(second.journal_ref, None);
        assert_eq!(second.comment, None);
        assert_eq!(second.primary_category, None);
        // a link without rel is an alternate link
        assert_eq!(second.links.len(), 1);
        assert!(second.links[0].is_alternate());
        assert_eq!(second.pdf_url(), None);
    }

    #[test]
    fn test_parse_feed_without_entries() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query: nothing</title>
  <id>http://arxiv.org/api/empty</id>
  <updated>2024-05-01T00:00:00Z</updated>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">0</opensearch:totalResults>
</feed>"#;
        let feed = parse_feed(xml.as_bytes());
        assert!(feed.entries.is_empty());
        assert_eq!(feed.metadata.total_results.as_deref(), Some("0"));
        assert_eq!(feed.metadata.items_per_page, None);
    }

    #[test]
    fn test_parse_feed_keeps_timestamp_text() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query: dates</title>
  <id>http://arxiv.org/api/dates</id>
  <updated>2024-05-01T00:00:00-04:00</updated>
  <entry>
    <id>http://arxiv.org/abs/2405.00003v1</id>
    <updated>2024-04-30T12:00:00.123Z</updated>
    <published>not a date</published>
    <title>Odd dates</title>
    <summary>Dates as written.</summary>
  </entry>
</feed>"#;
        let feed = parse_feed(xml.as_bytes());
        assert_eq!(
            feed.metadata.updated.as_deref(),
            Some("2024-05-01T00:00:00-04:00")
        );

        let entry = &feed.entries[0];
        assert_eq!(entry.updated.as_deref(), Some("2024-04-30T12:00:00.123Z"));
        assert_eq!(entry.published.as_deref(), Some("not a date"));
    }

    #[test]
    fn test_parse_feed_garbage() {
        let feed = parse_feed(b"this is not xml");
        assert_eq!(feed, Feed::default());
    }
}
