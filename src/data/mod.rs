/// Data layer: core types, loading, export and similarity lookup.
///
/// Architecture:
/// ```text
///  50_Startups.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset   (missing file → empty Dataset)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, bounds, overview
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ neighbors  │  query point → k nearest records
///   └───────────┘
/// ```

pub mod loader;
pub mod model;
pub mod neighbors;
