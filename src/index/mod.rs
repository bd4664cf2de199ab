//! Index entry reformatting.
//!
//! Rewrites `pair:` index entries of the form `pair: text; ...; Class.member`
//! into `pair: text; member (Class)`.

mod reformat;

pub use reformat::{
    output_path_for, reformat_file, reformat_file_to, reformat_line, reformat_text,
    ReformatStats, OUTPUT_PREFIX,
};
