//! Symbol catalog — display names and tickers grouped by category.
//!
//! Lookup accepts a display name (case-insensitive) or a ticker. Tickers not in
//! the catalog pass through unchanged with the ticker doubling as the subject.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Human-readable subject used for sentiment prompts and option-chain selection.
    pub name: String,
    pub ticker: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: BTreeMap<String, Vec<Instrument>>,
}

fn entries(pairs: &[(&str, &str)]) -> Vec<Instrument> {
    pairs
        .iter()
        .map(|(name, ticker)| Instrument::new(*name, *ticker))
        .collect()
}

impl Catalog {
    /// NSE/BSE indices and large caps.
    pub fn default_india() -> Self {
        let mut categories = BTreeMap::new();

        categories.insert(
            "Indices".into(),
            entries(&[
                ("NIFTY 50", "^NSEI"),
                ("BANK NIFTY", "^NSEBANK"),
                ("SENSEX", "^BSESN"),
                ("NIFTY IT", "^CNXIT"),
                ("NIFTY FMCG", "^CNXFMCG"),
                ("NIFTY PHARMA", "^CNXPHARMA"),
                ("NIFTY AUTO", "^CNXAUTO"),
                ("NIFTY METAL", "^CNXMETAL"),
            ]),
        );

        categories.insert(
            "Large Caps".into(),
            entries(&[
                ("Reliance Industries", "RELIANCE.NS"),
                ("HDFC Bank", "HDFCBANK.NS"),
                ("ICICI Bank", "ICICIBANK.NS"),
                ("Infosys", "INFY.NS"),
                ("Tata Consultancy Services", "TCS.NS"),
                ("State Bank of India", "SBIN.NS"),
            ]),
        );

        Self { categories }
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(|s| s.as_str()).collect()
    }

    pub fn instruments(&self) -> impl Iterator<Item = &Instrument> {
        self.categories.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find a catalog entry by display name or ticker.
    pub fn find(&self, query: &str) -> Option<&Instrument> {
        let query = query.trim();
        self.instruments().find(|i| {
            i.name.eq_ignore_ascii_case(query) || i.ticker.eq_ignore_ascii_case(query)
        })
    }

    /// Resolve any user input to an instrument; unknown input is taken as a ticker.
    pub fn resolve(&self, query: &str) -> Instrument {
        self.find(query).cloned().unwrap_or_else(|| {
            let ticker = query.trim();
            Instrument::new(ticker, ticker)
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::default_india()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_both_categories() {
        let c = Catalog::default_india();
        assert_eq!(c.category_names(), vec!["Indices", "Large Caps"]);
        assert_eq!(c.len(), 14);
    }

    #[test]
    fn lookup_by_name_is_case_insensitive() {
        let c = Catalog::default_india();
        assert_eq!(c.find("bank nifty").unwrap().ticker, "^NSEBANK");
        assert_eq!(c.find("  Infosys ").unwrap().ticker, "INFY.NS");
    }

    #[test]
    fn lookup_by_ticker() {
        let c = Catalog::default_india();
        assert_eq!(c.find("^BSESN").unwrap().name, "SENSEX");
        assert_eq!(c.find("tcs.ns").unwrap().name, "Tata Consultancy Services");
    }

    #[test]
    fn unknown_passes_through() {
        let c = Catalog::default_india();
        let i = c.resolve("WIPRO.NS");
        assert_eq!(i.ticker, "WIPRO.NS");
        assert_eq!(i.name, "WIPRO.NS");
    }
}
