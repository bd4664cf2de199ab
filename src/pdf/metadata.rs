//! Document information dictionary (`/Info`).

use lopdf::{Dictionary, Object, StringFormat};
use serde::Serialize;

use crate::error::{Error, Result};

/// Metadata keys accepted by [`Metadata::get`] and [`Metadata::set`],
/// paired with the `/Info` dictionary key each maps to.
pub const METADATA_KEYS: [(&str, &[u8]); 8] = [
    ("title", b"Title"),
    ("author", b"Author"),
    ("subject", b"Subject"),
    ("keywords", b"Keywords"),
    ("creator", b"Creator"),
    ("producer", b"Producer"),
    ("creationDate", b"CreationDate"),
    ("modDate", b"ModDate"),
];

/// Descriptive fields stored in a PDF's `/Info` dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date, raw PDF date string (`D:YYYYMMDDHHmmSS...`)
    pub creation_date: Option<String>,

    /// Last modification date, raw PDF date string
    pub mod_date: Option<String>,
}

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read metadata from an `/Info` dictionary.
    pub fn from_info(info: &Dictionary) -> Self {
        let mut metadata = Self::new();
        for (key, pdf_key) in METADATA_KEYS {
            if let Some(value) = info.get(pdf_key).ok().and_then(decode_text) {
                // Keys come from METADATA_KEYS, so this cannot fail.
                let _ = metadata.set(key, value);
            }
        }
        metadata
    }

    /// Write every field that is set into `info`, leaving other entries untouched.
    pub fn apply_to(&self, info: &mut Dictionary) {
        for (key, pdf_key) in METADATA_KEYS {
            if let Some(value) = self.get(key) {
                info.set(pdf_key.to_vec(), encode_text(value));
            }
        }
    }

    /// Look up a field by its lowercase key (`"author"`, `"modDate"`, ...).
    pub fn get(&self, key: &str) -> Option<&str> {
        let field = match key {
            "title" => &self.title,
            "author" => &self.author,
            "subject" => &self.subject,
            "keywords" => &self.keywords,
            "creator" => &self.creator,
            "producer" => &self.producer,
            "creationDate" => &self.creation_date,
            "modDate" => &self.mod_date,
            _ => return None,
        };
        field.as_deref()
    }

    /// Set a field by its lowercase key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let field = match key {
            "title" => &mut self.title,
            "author" => &mut self.author,
            "subject" => &mut self.subject,
            "keywords" => &mut self.keywords,
            "creator" => &mut self.creator,
            "producer" => &mut self.producer,
            "creationDate" => &mut self.creation_date,
            "modDate" => &mut self.mod_date,
            _ => return Err(Error::InvalidOption(format!("unknown metadata key: {key}"))),
        };
        *field = Some(value.into());
        Ok(())
    }

    /// Overlay every field set in `other` onto `self`.
    pub fn merge(&mut self, other: &Metadata) {
        for (key, _) in METADATA_KEYS {
            if let Some(value) = other.get(key) {
                let _ = self.set(key, value);
            }
        }
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8, or PDFDocEncoding).
pub(crate) fn decode_text(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => {
            if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
                let utf16: Vec<u16> = rest
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&utf16).ok()
            } else if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
                String::from_utf8(rest.to_vec()).ok()
            } else {
                Some(
                    String::from_utf8(bytes.clone())
                        .unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect()),
                )
            }
        }
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Encode a text string: literal for ASCII, UTF-16BE with BOM otherwise.
pub(crate) fn encode_text(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
