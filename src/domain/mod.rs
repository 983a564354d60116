// Domain types and value objects
pub mod month_key;
pub mod region;
pub mod size_band;
pub mod transaction;

// Re-export commonly used types
pub use month_key::{MonthKey, MonthRange, ParseMonthKeyError};
pub use region::Region;
pub use size_band::SizeBand;
pub use transaction::TransactionRecord;
