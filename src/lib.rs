//! Read AGS3/AGS4 geotechnical exchange files, merge same-named groups
//! across files, and derive triaxial s–t stress paths.

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod state;
pub mod triaxial;

pub use data::loader::{load_file, parse_bytes, Encoding, ParseOptions};
pub use data::merge::merge_files;
pub use data::model::{Dialect, FormatReport, GroupFailure, GroupTable, ParsedFile, Row};
pub use error::AgsError;
pub use state::{FileReport, Session};
pub use triaxial::{compute_s_t, generate_triaxial_table, StressMode, StressPoint};
