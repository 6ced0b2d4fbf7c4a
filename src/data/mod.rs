/// Data layer: core types, loading, introspection, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (cached per source)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  immutable named columns of scalar cells
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  column names, distinct values per column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  categorical membership → FilteredSubset
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
