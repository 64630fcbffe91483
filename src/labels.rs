//! Positional key/value pairing for log and metric labels
//!
//! Values are paired as `(k1, v1), (k2, v2), ...`. A trailing unpaired key
//! maps to an empty value. Later keys overwrite earlier ones, so a trailing
//! key that repeats an earlier key resets it to `""`. Existing callers rely
//! on this exact behavior.

use std::collections::BTreeMap;

/// Label set attached to a backend entry
pub type Labels = BTreeMap<String, String>;

/// Pair a flat sequence of strings into labels
pub fn pair_labels(values: &[&str]) -> Labels {
    let mut labels = Labels::new();
    let n = values.len();

    for pair in values.chunks_exact(2) {
        labels.insert(pair[0].to_string(), pair[1].to_string());
    }
    if n % 2 == 1 {
        labels.insert(values[n - 1].to_string(), String::new());
    }

    labels
}
