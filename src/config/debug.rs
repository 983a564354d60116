//! Debugging feature flags.
//!
//! Toggle individual diagnostics here. Every flag is further gated by
//! `cfg(debug_assertions)`, so release builds stay quiet.

pub struct DebugFlags {
    /// Emit the derived feature set for every scored month.
    pub print_month_features: bool,
    /// Emit the normalization bounds computed for each region.
    pub print_bounds: bool,
    /// Emit summary cache hit/miss diagnostics (reasons, timings).
    pub print_cache_events: bool,
    /// Emit one line per skipped month (missing month or external value).
    pub print_skipped_months: bool,
    /// Emit detailed CSV loading logs.
    pub print_csv_io: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_month_features: false,
    print_bounds: false,
    print_cache_events: false,
    print_skipped_months: true,
    print_csv_io: false,
};
