//! Postprocessing and save options.

use crate::error::{Error, Result};

use super::metadata::Metadata;

/// Default input file name of the postprocessor.
pub const DEFAULT_PDF_NAME: &str = "PyMuPDF.pdf";

/// Highest accepted garbage collection level.
pub const MAX_GARBAGE_LEVEL: u8 = 4;

/// Options controlling how a document is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Garbage collection level (0-4)
    ///
    /// - 1: remove unreferenced objects
    /// - 2: also remove zero-length streams
    /// - 3, 4: also renumber objects densely
    pub garbage: u8,

    /// Compress streams with Flate
    pub deflate: bool,

    /// Re-encode page content streams
    pub clean: bool,
}

impl SaveOptions {
    /// Create save options that write the document as-is.
    pub fn new() -> Self {
        Self {
            garbage: 0,
            deflate: false,
            clean: false,
        }
    }

    /// Set the garbage collection level.
    pub fn with_garbage(mut self, level: u8) -> Self {
        self.garbage = level;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_deflate(mut self, deflate: bool) -> Self {
        self.deflate = deflate;
        self
    }

    /// Enable or disable content stream cleanup.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Full cleanup: garbage 4, deflate and clean.
    pub fn maximum() -> Self {
        Self::new()
            .with_garbage(MAX_GARBAGE_LEVEL)
            .with_deflate(true)
            .with_clean(true)
    }

    /// Check that the options are within range.
    pub fn validate(&self) -> Result<()> {
        if self.garbage > MAX_GARBAGE_LEVEL {
            return Err(Error::InvalidOption(format!(
                "garbage level {} exceeds {}",
                self.garbage, MAX_GARBAGE_LEVEL
            )));
        }
        Ok(())
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self::maximum()
    }
}

/// Options for [`postprocess_bytes`](super::postprocess_bytes).
#[derive(Debug, Clone)]
pub struct PostprocessOptions {
    /// Title of the entry inserted at the top of the table of contents
    pub title_entry: String,

    /// Page the title entry points to (1-based)
    pub title_page: u32,

    /// Heading that marks the index page; matched as `"<heading>\n"` at the
    /// start of the page text and reused as the entry title
    pub index_heading: String,

    /// Metadata merged into the document's existing metadata
    pub metadata: Metadata,

    /// How the document is saved
    pub save: SaveOptions,
}

impl PostprocessOptions {
    /// Create options with the PyMuPDF documentation defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title entry inserted at the top of the table of contents.
    pub fn with_title_entry(mut self, title: impl Into<String>) -> Self {
        self.title_entry = title.into();
        self
    }

    /// Set the heading that identifies the index page.
    pub fn with_index_heading(mut self, heading: impl Into<String>) -> Self {
        self.index_heading = heading.into();
        self
    }

    /// Set the document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.metadata.author = Some(author.into());
        self
    }

    /// Set the document keywords.
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.metadata.keywords = Some(keywords.into());
        self
    }

    /// Set the document subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.metadata.subject = Some(subject.into());
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Set save options.
    pub fn with_save_options(mut self, save: SaveOptions) -> Self {
        self.save = save;
        self
    }
}

impl Default for PostprocessOptions {
    fn default() -> Self {
        Self {
            title_entry: "PyMuPDF Documentation".to_string(),
            title_page: 1,
            index_heading: "INDEX".to_string(),
            metadata: Metadata {
                author: Some("Jorj X. McKie".to_string()),
                keywords: Some("PDF, XPS, EPUB, CBZ, fitz".to_string()),
                subject: Some("Version 1.11".to_string()),
                title: Some("PyMuPDF Documentation".to_string()),
                ..Default::default()
            },
            save: SaveOptions::maximum(),
        }
    }
}
