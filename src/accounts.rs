use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only lookup tables keyed by GL account code: account descriptions and
/// the liability account each expense account accrues against. Built by the
/// caller before a batch is processed, never mutated by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceTables {
    account_names: BTreeMap<String, String>,
    liabilities: BTreeMap<String, String>,
}

impl ReferenceTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<N, L>(names: N, liabilities: L) -> Self
    where
        N: IntoIterator<Item = (String, String)>,
        L: IntoIterator<Item = (String, String)>,
    {
        Self {
            account_names: names.into_iter().collect(),
            liabilities: liabilities.into_iter().collect(),
        }
    }

    pub fn insert_account_name(&mut self, account: impl Into<String>, name: impl Into<String>) {
        self.account_names.insert(account.into(), name.into());
    }

    pub fn insert_liability(&mut self, account: impl Into<String>, liability: impl Into<String>) {
        self.liabilities.insert(account.into(), liability.into());
    }

    /// Left-lookup: a missing key is `None`, not an error.
    pub fn account_name(&self, account: &str) -> Option<&str> {
        self.account_names.get(account).map(String::as_str)
    }

    pub fn liability(&self, account: &str) -> Option<&str> {
        self.liabilities.get(account).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.account_names.is_empty() && self.liabilities.is_empty()
    }
}
