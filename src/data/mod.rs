/// Data layer: core types, loading, and the query engine.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  load once, keep Arc<Dataset> or the error
///   └──────────┘
///        │
///        ▼
///   ┌────────────────────────────┐
///   │ query / stats / classify    │  pure functions over &Dataset
///   └────────────────────────────┘
/// ```

pub mod cache;
pub mod classify;
pub mod error;
pub mod loader;
pub mod model;
pub mod query;
pub mod stats;
