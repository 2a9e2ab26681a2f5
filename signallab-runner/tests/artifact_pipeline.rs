//! CSV import → analysis → artifacts on disk, plus config file round-trip.

use chrono::NaiveDate;
use proptest::prelude::*;
use signallab_core::adapters::FixedSource;
use signallab_core::data::{CsvProvider, DataSource};
use signallab_runner::export::{load_manifest, save_artifacts};
use signallab_runner::metrics::{exposure, max_drawdown};
use signallab_runner::{
    run_analysis_at, AnalysisContext, Catalog, ReadingOverrides, SessionConfig, SourceSet,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_fixture(dir: &std::path::Path, symbol: &str, rows: usize) {
    let mut body = String::from("date,open,high,low,close,volume\n");
    let base = date(2024, 1, 1);
    for i in 0..rows {
        let d = base + chrono::Duration::days(i as i64);
        let close = 45_000.0 + (i as f64 * 0.25).sin() * 300.0 + i as f64 * 12.0;
        body.push_str(&format!(
            "{d},{:.2},{:.2},{:.2},{:.2},{}\n",
            close - 20.0,
            close + 80.0,
            close - 80.0,
            close,
            250_000 + i
        ));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), body).unwrap();
}

#[test]
fn csv_run_writes_all_artifacts() {
    let data_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_fixture(data_dir.path(), "^NSEBANK", 120);

    let catalog = Catalog::default_india();
    let instrument = catalog.resolve("bank nifty");
    assert_eq!(instrument.ticker, "^NSEBANK");

    let ctx = AnalysisContext::new(&instrument, date(2024, 1, 1), date(2024, 12, 31));
    let provider = CsvProvider::new(data_dir.path());
    let sources = SourceSet::offline().with_overrides(ReadingOverrides {
        ai_sentiment: Some(75),
        volatility_estimate: Some(13.5),
        put_call_ratio: Some(1.25),
    });
    let now = date(2024, 5, 1).and_hms_opt(10, 0, 0).unwrap();
    let result = run_analysis_at(&ctx, Some(&provider), sources.sources(), now).unwrap();
    assert_eq!(result.source, DataSource::CsvImport);
    assert_eq!(result.bar_count(), 120);
    assert!(result.unavailable.is_empty());

    let run_dir = save_artifacts(&result, out_dir.path()).unwrap();
    let csv = std::fs::read_to_string(run_dir.join("signals.csv")).unwrap();
    assert_eq!(csv.lines().count(), 121);

    let manifest = load_manifest(&run_dir).unwrap();
    assert_eq!(manifest.context.subject, "BANK NIFTY");
    assert_eq!(manifest.readings.put_call_ratio, Some(1.25));
    assert_eq!(manifest.fingerprint, result.fingerprint.as_str());

    let report = std::fs::read_to_string(run_dir.join("report.md")).unwrap();
    assert!(report.contains("Analysis generated for BANK NIFTY at 10:00:00"));
}

#[test]
fn config_file_drives_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signallab.toml");
    std::fs::write(
        &path,
        "[thresholds]\nai_threshold = 60.0\nvix_threshold = 20.0\n\n[indicators]\nema_span = 10\n",
    )
    .unwrap();

    let config = SessionConfig::from_file(&path).unwrap();
    let instrument = Catalog::default_india().resolve("^NSEI");
    let ctx = AnalysisContext::new(&instrument, date(2024, 1, 1), date(2024, 3, 1))
        .with_config(&config);
    assert_eq!(ctx.thresholds.ai_threshold, 60.0);
    assert_eq!(ctx.thresholds.pcr_threshold, 1.0);
    assert_eq!(ctx.indicators.ema_span, 10);
    assert_eq!(ctx.indicators.rsi_period, 14);
}

#[test]
fn unknown_ticker_passes_through() {
    let data_dir = tempfile::tempdir().unwrap();
    write_fixture(data_dir.path(), "TATAMOTORS.NS", 30);

    let instrument = Catalog::default_india().resolve("TATAMOTORS.NS");
    assert_eq!(instrument.name, "TATAMOTORS.NS");

    let ctx = AnalysisContext::new(&instrument, date(2024, 1, 1), date(2024, 12, 31));
    let provider = CsvProvider::new(data_dir.path());
    let source = FixedSource::offline();
    let sources = signallab_core::adapters::SignalSources {
        sentiment: &source,
        volatility: &source,
        put_call: &source,
    };
    let now = date(2024, 2, 1).and_hms_opt(0, 0, 0).unwrap();
    let result = run_analysis_at(&ctx, Some(&provider), sources, now).unwrap();
    assert_eq!(result.bar_count(), 30);
}

proptest! {
    #[test]
    fn drawdown_is_non_positive(growth in prop::collection::vec(0.01f64..10.0, 1..200)) {
        let dd = max_drawdown(&growth);
        prop_assert!(dd <= 0.0);
        prop_assert!(dd > -1.0);
    }

    #[test]
    fn exposure_is_a_fraction(position in prop::collection::vec(-1i8..=1, 0..200)) {
        let e = exposure(&position);
        prop_assert!((0.0..=1.0).contains(&e));
    }
}
