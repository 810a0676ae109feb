//! Set-overlap similarity shared by news clustering and event evolution.

use std::collections::HashSet;
use std::hash::Hash;

/// Jaccard similarity index between two sets.
///
/// Returns 0.0 when either set is empty, so two empty sets are not "identical".
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}
