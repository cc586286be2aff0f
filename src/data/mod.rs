/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────────────────────┐
///   │ InputStacks | ReflectivityVolume │  ndarray stacks / volumes
///   └─────────────────────────────────┘
/// ```

pub mod loader;
pub mod model;
