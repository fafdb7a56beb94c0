//! The durable feed document: an XML file accumulating one entry per
//! opportunity, plus a last-modified marker.

use std::path::Path;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};
use crate::store;

/// Section tag names in the order they appear inside an `<entry>`.
pub const SECTION_TAGS: [&str; 6] = [
    "description",
    "aside",
    "details",
    "availability",
    "availability_table",
    "location",
];

const ROOT_TAG: &str = "feed";
const LAST_UPDATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z%z";

/// The six formatted text blocks extracted from one opportunity page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub description: String,
    pub aside: String,
    pub details: String,
    pub availability: String,
    pub availability_table: String,
    pub location: String,
}

impl Entry {
    /// Sections paired with their tag names, in document order.
    pub fn sections(&self) -> [(&'static str, &str); 6] {
        [
            ("description", &self.description),
            ("aside", &self.aside),
            ("details", &self.details),
            ("availability", &self.availability),
            ("availability_table", &self.availability_table),
            ("location", &self.location),
        ]
    }

    fn set_section(&mut self, tag: &str, text: String) {
        match tag {
            "description" => self.description = text,
            "aside" => self.aside = text,
            "details" => self.details = text,
            "availability" => self.availability = text,
            "availability_table" => self.availability_table = text,
            "location" => self.location = text,
            _ => {}
        }
    }
}

/// The whole feed document. `last_update` is empty only in a freshly
/// bootstrapped document that has never been merged into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub last_update: String,
    pub entries: Vec<Entry>,
}

impl Feed {
    pub fn load(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&xml)
    }

    /// Parse the feed document. Fails with `MalformedDocument` when the
    /// root, the `lastUpdate` field, or the `entries` container is missing.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut feed = Feed::default();

        let mut saw_root = false;
        let mut saw_last_update = false;
        let mut saw_entries = false;
        let mut in_last_update = false;
        let mut entry: Option<Entry> = None;
        let mut section: Option<String> = None;
        let mut text = String::new();

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(e) => {
                    saw_root = true;
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match name.as_str() {
                        "lastUpdate" if entry.is_none() => {
                            saw_last_update = true;
                            in_last_update = true;
                            text.clear();
                        }
                        "entries" => saw_entries = true,
                        "entry" => entry = Some(Entry::default()),
                        tag if entry.is_some() && SECTION_TAGS.contains(&tag) => {
                            section = Some(tag.to_string());
                            text.clear();
                        }
                        _ => {}
                    }
                }
                Event::Empty(e) => {
                    saw_root = true;
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match name.as_str() {
                        "lastUpdate" if entry.is_none() => saw_last_update = true,
                        "entries" => saw_entries = true,
                        "entry" => feed.entries.push(Entry::default()),
                        tag if SECTION_TAGS.contains(&tag) => {
                            if let Some(current) = entry.as_mut() {
                                current.set_section(tag, String::new());
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    if in_last_update || section.is_some() {
                        text.push_str(&e.unescape().map_err(malformed)?);
                    }
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if in_last_update && name == "lastUpdate" {
                        feed.last_update = std::mem::take(&mut text);
                        in_last_update = false;
                    } else if section.as_deref() == Some(name.as_str()) {
                        if let Some(current) = entry.as_mut() {
                            current.set_section(&name, std::mem::take(&mut text));
                        }
                        section = None;
                    } else if name == "entry" {
                        if let Some(done) = entry.take() {
                            feed.entries.push(done);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(Error::MalformedDocument("missing root element".to_string()));
        }
        if !saw_last_update {
            return Err(Error::MalformedDocument(
                "missing <lastUpdate> field".to_string(),
            ));
        }
        if !saw_entries {
            return Err(Error::MalformedDocument(
                "missing <entries> container".to_string(),
            ));
        }
        Ok(feed)
    }

    /// Append entries in input order and stamp the merge time. Existing
    /// entries are never touched.
    pub fn merge(&mut self, new_entries: Vec<Entry>, now: DateTime<Utc>) {
        self.entries.extend(new_entries);
        self.last_update = now.format(LAST_UPDATE_FORMAT).to_string();
    }

    /// Serialize the whole document, declaration-tagged, UTF-8.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(malformed)?;
        writer
            .write_event(Event::Start(BytesStart::new(ROOT_TAG)))
            .map_err(malformed)?;

        writer
            .write_event(Event::Start(BytesStart::new("lastUpdate")))
            .map_err(malformed)?;
        writer
            .write_event(Event::Text(BytesText::new(&self.last_update)))
            .map_err(malformed)?;
        writer
            .write_event(Event::End(BytesEnd::new("lastUpdate")))
            .map_err(malformed)?;

        writer
            .write_event(Event::Start(BytesStart::new("entries")))
            .map_err(malformed)?;
        for entry in &self.entries {
            writer
                .write_event(Event::Start(BytesStart::new("entry")))
                .map_err(malformed)?;
            for (tag, body) in entry.sections() {
                writer
                    .write_event(Event::Start(BytesStart::new(tag)))
                    .map_err(malformed)?;
                writer
                    .write_event(Event::Text(BytesText::new(body)))
                    .map_err(malformed)?;
                writer
                    .write_event(Event::End(BytesEnd::new(tag)))
                    .map_err(malformed)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("entry")))
                .map_err(malformed)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("entries")))
            .map_err(malformed)?;
        writer
            .write_event(Event::End(BytesEnd::new(ROOT_TAG)))
            .map_err(malformed)?;

        String::from_utf8(writer.into_inner()).map_err(malformed)
    }

    /// Rewrite the whole document atomically.
    pub fn store(&self, path: &Path) -> Result<()> {
        let xml = self.to_xml()?;
        store::write_atomic(path, xml.as_bytes())
    }
}

fn malformed(e: impl std::fmt::Display) -> Error {
    Error::MalformedDocument(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(description: &str) -> Entry {
        Entry {
            description: description.to_string(),
            ..Entry::default()
        }
    }

    #[test]
    fn skeleton_round_trips() {
        let feed = Feed::default();
        let xml = feed.to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert_eq!(Feed::parse(&xml).unwrap(), feed);
    }

    #[test]
    fn entries_round_trip_byte_identical_text() {
        let mut feed = Feed::default();
        feed.entries.push(Entry {
            description: "\nGardening & more\n\n\nHelp <outdoors>.\n".to_string(),
            aside: "\nAt a glance\n\n".to_string(),
            details: "● Planting\n".to_string(),
            availability: "\nMornings\n".to_string(),
            availability_table: "Day     AM \nMonday  Yes".to_string(),
            location: "\n1 Garden Lane\nNewcastle\n".to_string(),
        });
        let xml = feed.to_xml().unwrap();
        assert_eq!(Feed::parse(&xml).unwrap(), feed);
    }

    #[test]
    fn merge_appends_and_stamps_timestamp() {
        let mut feed = Feed::default();
        feed.entries.push(entry("existing"));
        let before = feed.entries.clone();

        let now = Utc.with_ymd_and_hms(2025, 3, 9, 14, 30, 5).unwrap();
        feed.merge(vec![entry("new one"), entry("new two")], now);

        assert_eq!(feed.entries.len(), 3);
        assert_eq!(&feed.entries[..1], &before[..]);
        assert_eq!(feed.entries[1], entry("new one"));
        assert_eq!(feed.entries[2], entry("new two"));
        assert_eq!(feed.last_update, "2025-03-09 14:30:05 UTC+0000");
    }

    #[test]
    fn merge_with_no_entries_still_stamps() {
        let mut feed = Feed::default();
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 14, 30, 5).unwrap();
        feed.merge(Vec::new(), now);
        assert!(feed.entries.is_empty());
        assert_eq!(feed.last_update, "2025-03-09 14:30:05 UTC+0000");
    }

    #[test]
    fn existing_document_survives_a_merge_unchanged() {
        let mut feed = Feed::default();
        feed.entries.push(entry("pre-existing"));
        let serialized_before = feed.to_xml().unwrap();

        feed.merge(vec![entry("appended")], Utc::now());
        let serialized_after = feed.to_xml().unwrap();

        let reparsed = Feed::parse(&serialized_after).unwrap();
        let original = Feed::parse(&serialized_before).unwrap();
        assert_eq!(&reparsed.entries[..1], &original.entries[..]);
    }

    #[test]
    fn missing_entries_container_is_malformed() {
        let xml = "<?xml version=\"1.0\"?><feed><lastUpdate></lastUpdate></feed>";
        let err = Feed::parse(xml).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument(msg) if msg.contains("entries")));
    }

    #[test]
    fn missing_last_update_is_malformed() {
        let xml = "<?xml version=\"1.0\"?><feed><entries></entries></feed>";
        let err = Feed::parse(xml).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument(msg) if msg.contains("lastUpdate")));
    }

    #[test]
    fn empty_document_is_malformed() {
        assert!(matches!(
            Feed::parse("").unwrap_err(),
            Error::MalformedDocument(_)
        ));
    }

    #[test]
    fn self_closing_containers_parse() {
        let xml = "<?xml version=\"1.0\"?><feed><lastUpdate/><entries/></feed>";
        let feed = Feed::parse(xml).unwrap();
        assert!(feed.entries.is_empty());
        assert!(feed.last_update.is_empty());
    }

    #[test]
    fn foreign_root_name_is_accepted() {
        let xml = "<?xml version=\"1.0\"?><opportunities><lastUpdate>x</lastUpdate>\
                   <entries></entries></opportunities>";
        let feed = Feed::parse(xml).unwrap();
        assert_eq!(feed.last_update, "x");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Feed::load(&dir.path().join("absent.xml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn store_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        let mut feed = Feed::default();
        feed.merge(vec![entry("\nsome text\n")], Utc::now());
        feed.store(&path).unwrap();
        assert_eq!(Feed::load(&path).unwrap(), feed);
    }
}
