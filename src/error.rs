//! Error types for doctools.

use std::io;
use thiserror::Error;

/// Result type alias for doctools operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reformatting indexes or postprocessing PDFs.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input does not start with a PDF header.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// Error parsing or serializing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// A required PDF object is missing.
    #[error("Missing required object: {0}")]
    MissingObject(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The table of contents violates the outline hierarchy rules.
    #[error("Invalid table of contents: {0}")]
    InvalidToc(String),

    /// An index entry has a reference without a member component.
    #[error("Malformed index entry on line {line}: {content:?}")]
    MalformedEntry {
        /// 1-based line number in the input file
        line: usize,
        /// The offending line
        content: String,
    },

    /// An option value is outside its accepted range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::MalformedEntry {
            line: 3,
            content: "pair: a; b".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed index entry on line 3: \"pair: a; b\""
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
