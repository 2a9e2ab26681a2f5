//! SignalLab Runner — session config, data loading, the analysis pipeline, metrics, export.
//!
//! This crate builds on `signallab-core` to provide:
//! - TOML session configuration with threshold validation
//! - A symbol catalog of Indian indices and large caps
//! - Data loading with provider/synthetic fallback
//! - Concurrent fetch of the three external readings
//! - One-shot analysis runs and a value-type session cache
//! - Performance metrics and CSV/JSON/Markdown artifacts

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod external;
pub mod metrics;
pub mod quote;

pub use analysis::{
    run_analysis, run_analysis_at, AnalysisContext, AnalysisError, AnalysisResult, SessionCache,
    SCHEMA_VERSION,
};
pub use catalog::{Catalog, Instrument};
pub use config::{ConfigError, SessionConfig};
pub use data_loader::{generate_synthetic_bars, load_series, LoadError, LoadOptions, LoadedData};
pub use export::{save_artifacts, ResultManifest};
pub use external::{fetch_readings, Disabled, ReadingOverrides, SourceSet};
pub use metrics::PerformanceMetrics;
pub use quote::QuoteSnapshot;
