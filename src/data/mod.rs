/// Data layer: tokenizing, dialect parsing, table building and merging.
///
/// Architecture:
/// ```text
///  .ags bytes (AGS3 / AGS4)
///        │
///        ▼
///   ┌──────────┐
///   │  detect   │  first group line → dialect
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ tokenizer  │  one physical line → ordered fields
///   └───────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ ags3 / ags4  │  line-type state machine → RawGroup
///   └─────────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ table / normalize │  dedup headings, rectangular check, renames
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  merge    │  union per group name across files, SOURCE_FILE tag
///   └──────────┘
/// ```

pub mod ags3;
pub mod ags4;
pub mod detect;
pub mod filter;
pub mod loader;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod table;
pub mod tokenizer;
pub mod writer;
