//! PDF postprocessing: table of contents, metadata and compaction.

mod document;
mod metadata;
mod options;
mod outline;
mod postprocess;

pub use document::PdfDocument;
pub use metadata::{Metadata, METADATA_KEYS};
pub use options::{PostprocessOptions, SaveOptions, DEFAULT_PDF_NAME, MAX_GARBAGE_LEVEL};
pub use outline::{validate_toc, TocEntry};
pub use postprocess::{
    amend_toc, find_index_page, postprocess_bytes, postprocess_file, starts_with_heading,
    PostprocessResult, SizeReport,
};
