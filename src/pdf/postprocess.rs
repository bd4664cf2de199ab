//! Postprocessing of the generated documentation PDF.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

use super::document::PdfDocument;
use super::metadata::Metadata;
use super::options::PostprocessOptions;
use super::outline::TocEntry;

/// File sizes before and after postprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeReport {
    /// Size of the input in bytes
    pub old_bytes: u64,
    /// Size of the output in bytes
    pub new_bytes: u64,
}

impl SizeReport {
    /// Create a report from byte counts.
    pub fn new(old_bytes: u64, new_bytes: u64) -> Self {
        Self {
            old_bytes,
            new_bytes,
        }
    }

    /// Input size in KB.
    pub fn old_kb(&self) -> f64 {
        self.old_bytes as f64 / 1024.0
    }

    /// Output size in KB.
    pub fn new_kb(&self) -> f64 {
        self.new_bytes as f64 / 1024.0
    }

    /// Saved KB (negative if the file grew).
    pub fn change_kb(&self) -> f64 {
        self.old_kb() - self.new_kb()
    }
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sizes (KB), old: {} new: {} change: {}",
            format_kb(self.old_kb()),
            format_kb(self.new_kb()),
            format_kb(self.change_kb())
        )
    }
}

/// Round to 2 decimals and print without trailing zeros, keeping one
/// fractional digit for whole numbers (`12.5`, `3.0`, `-0.25`).
///
/// Exact ties round to even (`2.125` -> `2.12`). KB values are multiples of
/// 1/1024, so scaling by 100 is exact and the tie check is reliable.
fn format_kb(value: f64) -> String {
    let rounded = (value * 100.0).round_ties_even() / 100.0;
    // Avoid printing "-0.0" for tiny negative changes.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    if rounded.fract() == 0.0 {
        format!("{:.1}", rounded)
    } else {
        format!("{}", rounded)
    }
}

/// Everything produced by a postprocessing run.
#[derive(Debug, Clone, Serialize)]
pub struct PostprocessResult {
    /// The written PDF
    #[serde(skip)]
    pub bytes: Vec<u8>,

    /// Table of contents written to the document
    pub toc: Vec<TocEntry>,

    /// Metadata after the update
    pub metadata: Metadata,

    /// Page carrying the index heading, if one was found (1-based)
    pub index_page: Option<u32>,

    /// Input and output sizes
    pub sizes: SizeReport,
}

/// Check whether extracted page text opens with `heading` on its own line.
pub fn starts_with_heading(text: &str, heading: &str) -> bool {
    text.strip_prefix(heading)
        .is_some_and(|rest| rest.starts_with('\n'))
}

/// Find the last page whose text starts with `heading`, scanning backwards.
///
/// Pages whose text cannot be extracted are skipped.
pub fn find_index_page(doc: &PdfDocument, heading: &str) -> Option<u32> {
    for page_num in (1..=doc.page_count()).rev() {
        match doc.page_text(page_num) {
            Ok(text) if starts_with_heading(&text, heading) => return Some(page_num),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping page {}: {}", page_num, e),
        }
    }
    None
}

/// Append the index entry (if any) and put the title entry first.
pub fn amend_toc(toc: &mut Vec<TocEntry>, options: &PostprocessOptions, index_page: Option<u32>) {
    if let Some(page) = index_page {
        toc.push(TocEntry::new(1, options.index_heading.clone(), page));
    }
    toc.insert(
        0,
        TocEntry::new(1, options.title_entry.clone(), options.title_page),
    );
}

/// Apply the documentation fixups to a PDF held in memory.
///
/// 1. read the raw table of contents
/// 2. append an entry for the index page, if one is found
/// 3. insert the title entry at the top
/// 4. merge the configured metadata
/// 5. serialize with the configured save options
pub fn postprocess_bytes(data: &[u8], options: &PostprocessOptions) -> Result<PostprocessResult> {
    let mut doc = PdfDocument::from_bytes(data)?;

    let mut toc = doc.toc();
    log::debug!("Existing table of contents has {} entries", toc.len());

    let index_page = find_index_page(&doc, &options.index_heading);
    match index_page {
        Some(page) => log::info!("Found {} on page {}", options.index_heading, page),
        None => log::info!("No {} page found", options.index_heading),
    }

    amend_toc(&mut toc, options, index_page);
    doc.set_toc(&toc)?;

    let mut metadata = doc.metadata();
    metadata.merge(&options.metadata);
    doc.set_metadata(&metadata)?;

    let bytes = doc.save_to_bytes(&options.save)?;
    let sizes = SizeReport::new(data.len() as u64, bytes.len() as u64);

    Ok(PostprocessResult {
        bytes,
        toc,
        metadata,
        index_page,
        sizes,
    })
}

/// Postprocess a PDF file in place.
///
/// The file is rewritten only after the new document has been produced;
/// any failure leaves it untouched.
pub fn postprocess_file<P: AsRef<Path>>(
    path: P,
    options: &PostprocessOptions,
) -> Result<PostprocessResult> {
    let path = path.as_ref();
    let data = fs::read(path)?;

    let result = postprocess_bytes(&data, options)?;
    fs::write(path, &result.bytes)?;

    let written = fs::metadata(path)?.len();
    Ok(PostprocessResult {
        sizes: SizeReport::new(data.len() as u64, written),
        ..result
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_report_display() {
        let report = SizeReport::new(2048, 1536);
        assert_eq!(
            report.to_string(),
            "Sizes (KB), old: 2.0 new: 1.5 change: 0.5"
        );
    }

    #[test]
    fn test_size_report_rounding() {
        // 1234567 / 1024 = 1205.6318..., 1000000 / 1024 = 976.5625
        let report = SizeReport::new(1_234_567, 1_000_000);
        assert_eq!(
            report.to_string(),
            "Sizes (KB), old: 1205.63 new: 976.56 change: 229.07"
        );
    }

    #[test]
    fn test_size_report_growth_is_negative() {
        let report = SizeReport::new(1024, 3072);
        assert_eq!(
            report.to_string(),
            "Sizes (KB), old: 1.0 new: 3.0 change: -2.0"
        );
        assert!(report.change_kb() < 0.0);
    }

    #[test]
    fn test_size_report_ties_round_to_even() {
        // 2176 / 1024 = 2.125, 1152 / 1024 = 1.125
        let report = SizeReport::new(2176, 1024);
        assert_eq!(
            report.to_string(),
            "Sizes (KB), old: 2.12 new: 1.0 change: 1.12"
        );
        // 2688 / 1024 = 2.625
        assert_eq!(format_kb(SizeReport::new(2688, 0).old_kb()), "2.62");
        // 2 + 3/1024 = 2.0029..., not a tie
        assert_eq!(format_kb(SizeReport::new(2051, 0).old_kb()), "2.0");
    }

    #[test]
    fn test_format_kb() {
        assert_eq!(format_kb(0.0), "0.0");
        assert_eq!(format_kb(-0.001), "0.0");
        assert_eq!(format_kb(12.345678), "12.35");
        assert_eq!(format_kb(7.1), "7.1");
    }

    #[test]
    fn test_amend_toc_with_index() {
        let mut toc = vec![TocEntry::new(2, "Chapter 1", 5)];
        amend_toc(&mut toc, &PostprocessOptions::default(), Some(10));
        assert_eq!(
            toc,
            vec![
                TocEntry::new(1, "PyMuPDF Documentation", 1),
                TocEntry::new(2, "Chapter 1", 5),
                TocEntry::new(1, "INDEX", 10),
            ]
        );
    }

    #[test]
    fn test_amend_toc_without_index() {
        let mut toc = Vec::new();
        amend_toc(&mut toc, &PostprocessOptions::default(), None);
        assert_eq!(toc, vec![TocEntry::new(1, "PyMuPDF Documentation", 1)]);
    }

    #[test]
    fn test_starts_with_heading() {
        assert!(starts_with_heading("INDEX\nA\nabs()", "INDEX"));
        assert!(!starts_with_heading("INDEX", "INDEX"));
        assert!(!starts_with_heading("INDEXES\n", "INDEX"));
        assert!(!starts_with_heading("Chapter 1\nINDEX\n", "INDEX"));
    }
}
