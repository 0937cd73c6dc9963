/// Data layer: tables, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .data
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │    Table      │  Vec<Row>, ordered columns; tag + concat
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  fixed parameter values → subset of rows, same order
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
