// Data models for the statistical pipeline
// These modules contain plain data; the algorithms live in `analysis`

pub mod composite;
pub mod external;
pub mod features;
pub mod region_series;
pub mod summary;

// Re-export key types for convenience
pub use composite::CompositeResult;
pub use external::{ExternalSeries, ExternalSeriesKind, ExternalSeriesSet};
pub use features::{DerivedFeatureSet, Metric};
pub use region_series::{RegionSeries, SeriesPoint, SeriesScope};
pub use summary::MonthlySummary;
