//! SignalLab Core — indicators, signal rule, backtest, price data, external signal adapters.
//!
//! This crate holds everything that is a pure function of its inputs, plus the
//! I/O edges that feed it:
//! - Domain types (bars, validated price series, signals)
//! - Indicator engine (EMA, RSI, ADX) with neutral fill for undefined bars
//! - Signal engine fusing indicators with per-run external readings
//! - Vectorised backtest with a one-bar execution lag
//! - Price providers (Yahoo chart API, CSV import) and ingest
//! - External signal adapters (generative text, option chain, fixed values)
//! - Input fingerprinting

pub mod adapters;
pub mod backtest;
pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod signals;
