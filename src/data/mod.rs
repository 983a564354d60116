// Collaborators around the statistical core: sources, caching and output files
pub mod cache_file;
pub mod external;
pub mod output;
pub mod source;
pub mod summaries;
pub mod weights;

// Re-export commonly used types
pub use cache_file::SummaryCache;
pub use external::{load_external_series, load_psychology, load_search_volume};
pub use output::{RunReport, write_region_outputs};
pub use source::{CsvTransactionSource, InMemorySource, TransactionSource};
pub use summaries::{CachePolicy, load_region_summaries};
pub use weights::load_weights;
