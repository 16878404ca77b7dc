//! Per-file errors. Anything below file granularity (a faulty group, a
//! ragged row) is reported as data on the parse result instead.

use std::path::PathBuf;

/// Failures that stop one file from being parsed. Sibling files in a batch
/// are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum AgsError {
    /// No `GROUP` / `**GROUP` line was found.
    #[error("{source_name}: not an AGS3 or AGS4 file (no group declaration found)")]
    UnknownFormat { source_name: String },

    #[error("unsupported file extension: .{ext}")]
    UnsupportedExtension { ext: String },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
