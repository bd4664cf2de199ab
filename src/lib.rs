//! # doctools
//!
//! Maintenance tools for the generated PyMuPDF documentation.
//!
//! Two independent operations are provided:
//!
//! - **Index reformatting** ([`index`]): rewrites `pair:` index entries
//!   such as `pair: open; Document.open` into `pair: open; open (Document)`.
//! - **PDF postprocessing** ([`pdf`]): adds title and index entries to the
//!   table of contents, stamps the document metadata and rewrites the file
//!   with garbage collection and stream compression.
//!
//! ## Quick Start
//!
//! ```no_run
//! use doctools::{postprocess_file, reformat_file, PostprocessOptions};
//!
//! fn main() -> doctools::Result<()> {
//!     let (output, stats) = reformat_file("genindex.txt")?;
//!     println!("{} lines rewritten into {}", stats.rewritten, output.display());
//!
//!     let result = postprocess_file("PyMuPDF.pdf", &PostprocessOptions::default())?;
//!     println!("{}", result.sizes);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod index;
pub mod pdf;

// Re-export commonly used types
pub use error::{Error, Result};
pub use index::{reformat_file, reformat_file_to, reformat_line, reformat_text, ReformatStats};
pub use pdf::{
    postprocess_bytes, postprocess_file, Metadata, PdfDocument, PostprocessOptions,
    PostprocessResult, SaveOptions, SizeReport, TocEntry, DEFAULT_PDF_NAME,
};
