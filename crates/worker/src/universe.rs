use std::collections::BTreeSet;

use finpulse_core::domain::stock::canonical_ticker;
use finpulse_core::storage::Store;

/// Working set of tickers for one cycle: the configured defaults plus every ticker already
/// stored. Iteration order is the set's sort order, so it is stable within a cycle.
#[derive(Debug, Clone)]
pub struct TickerUniverse {
    defaults: BTreeSet<String>,
}

impl TickerUniverse {
    pub fn new<I, S>(defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            defaults: defaults
                .into_iter()
                .filter_map(|t| canonical_ticker(t.as_ref()))
                .collect(),
        }
    }

    pub fn defaults(&self) -> &BTreeSet<String> {
        &self.defaults
    }

    /// Never fails: an unreachable store degrades to the defaults alone.
    pub async fn resolve(&self, store: &dyn Store) -> BTreeSet<String> {
        let mut out = self.defaults.clone();
        match store.distinct_tickers().await {
            Ok(stored) => {
                out.extend(stored.iter().filter_map(|t| canonical_ticker(t)));
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    defaults = self.defaults().len(),
                    "ticker lookup failed; using default universe"
                );
            }
        }
        out
    }
}
