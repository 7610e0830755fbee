//! Shared access-key allow-list.

use std::fmt;
use subtle::ConstantTimeEq;

/// Normalized allow-list of access keys.
///
/// Keys are compared after trimming and lower-casing, so `" Alpha "` matches `alpha`.
#[derive(Clone, Default)]
pub struct AccessList {
    keys: Vec<String>,
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

impl AccessList {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = keys
            .into_iter()
            .map(|k| normalize(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();
        Self { keys }
    }

    /// Check a candidate key against the list.
    pub fn is_allowed(&self, candidate: &str) -> bool {
        let candidate = normalize(candidate);
        if candidate.is_empty() {
            return false;
        }
        // Scan every entry so the time taken does not depend on which key matched.
        self.keys
            .iter()
            .fold(false, |found, key| secure_compare(key, &candidate) | found)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for AccessList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessList")
            .field("keys", &format_args!("<{} redacted>", self.keys.len()))
            .finish()
    }
}
