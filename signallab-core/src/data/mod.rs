//! Price-history providers and ingest.

pub mod circuit_breaker;
pub mod csv_import;
pub mod ingest;
pub mod provider;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::{read_csv_bars, CsvProvider};
pub use ingest::{ingest, IngestResult};
pub use provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
pub use yahoo::YahooProvider;
