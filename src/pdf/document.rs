//! Editable PDF document backed by lopdf.

use std::fs;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::error::{Error, Result};

use super::metadata::Metadata;
use super::options::SaveOptions;
use super::outline::{self, TocEntry};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// An opened PDF whose outline and metadata can be changed and saved.
pub struct PdfDocument {
    doc: LopdfDocument,
}

impl PdfDocument {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !data.starts_with(PDF_MAGIC) {
            return Err(Error::UnknownFormat);
        }

        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        log::debug!(
            "Loaded PDF {} with {} pages",
            doc.version,
            doc.get_pages().len()
        );
        Ok(Self { doc })
    }

    /// Wrap an already loaded lopdf document.
    pub fn from_lopdf(doc: LopdfDocument) -> Self {
        Self { doc }
    }

    /// Get the underlying lopdf document.
    pub fn inner(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Extract the text of a page (1-based).
    pub fn page_text(&self, page_num: u32) -> Result<String> {
        let count = self.page_count();
        if page_num == 0 || page_num > count {
            return Err(Error::PageOutOfRange(page_num, count));
        }
        self.doc
            .extract_text(&[page_num])
            .map_err(|e| Error::PdfParse(format!("Page {}: {}", page_num, e)))
    }

    /// Get the table of contents as a flat list, one entry per outline item.
    pub fn toc(&self) -> Vec<TocEntry> {
        outline::read_toc(&self.doc)
    }

    /// Replace the table of contents.
    pub fn set_toc(&mut self, entries: &[TocEntry]) -> Result<()> {
        outline::write_toc(&mut self.doc, entries)
    }

    /// Read the `/Info` metadata.
    pub fn metadata(&self) -> Metadata {
        let info = match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => self.doc.get_dictionary(*id).ok(),
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        };
        info.map(Metadata::from_info).unwrap_or_default()
    }

    /// Write every field set in `metadata` into `/Info`, creating it if needed.
    pub fn set_metadata(&mut self, metadata: &Metadata) -> Result<()> {
        let info_id = match self.doc.trailer.get(b"Info").ok().cloned() {
            Some(Object::Reference(id)) => id,
            existing => {
                let dict = match existing {
                    Some(Object::Dictionary(dict)) => dict,
                    _ => Dictionary::new(),
                };
                let id = self.doc.add_object(Object::Dictionary(dict));
                self.doc.trailer.set("Info", Object::Reference(id));
                id
            }
        };

        let info = self.doc.get_object_mut(info_id)?.as_dict_mut()?;
        metadata.apply_to(info);
        Ok(())
    }

    /// Serialize the document with the given options.
    pub fn save_to_bytes(&mut self, options: &SaveOptions) -> Result<Vec<u8>> {
        options.validate()?;

        if options.clean {
            self.clean_contents();
        }
        if options.garbage >= 2 {
            let removed = self.doc.delete_zero_length_streams();
            log::debug!("Removed {} zero-length streams", removed.len());
        }
        if options.garbage >= 1 {
            let removed = self.doc.prune_objects();
            log::debug!("Pruned {} unreferenced objects", removed.len());
        }
        if options.garbage >= 3 {
            self.doc.renumber_objects();
        }
        if options.deflate {
            self.doc.compress();
        }

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Save the document to `path`, returning the number of bytes written.
    ///
    /// The file is only touched once the whole document has been serialized.
    pub fn save<P: AsRef<Path>>(&mut self, path: P, options: &SaveOptions) -> Result<u64> {
        let bytes = self.save_to_bytes(options)?;
        fs::write(path, &bytes)?;
        Ok(bytes.len() as u64)
    }

    /// Re-encode every page content stream through the content parser.
    fn clean_contents(&mut self) {
        for (page_num, page_id) in self.doc.get_pages() {
            let cleaned = self
                .doc
                .get_page_content(page_id)
                .and_then(|data| Content::decode(&data))
                .and_then(|content| content.encode());

            let result = match cleaned {
                Ok(data) => self.doc.change_page_content(page_id, data),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                log::warn!("Failed to clean content of page {}: {}", page_num, e);
            }
        }
    }
}
