use crate::error::InsufficientData;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Similarity index: brute-force Euclidean scan over the spend columns
// ---------------------------------------------------------------------------

/// One similar historical record and its distance to the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<'a> {
    /// Position of the record in the dataset.
    pub index: usize,
    pub record: &'a Record,
    pub distance: f64,
}

/// Euclidean distance in (R&D Spend, Administration, Marketing Spend) space.
pub fn euclidean(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Return the `k` records closest to `query`, nearest first.
///
/// State and Profit do not take part in the distance. Equal distances keep
/// dataset order. `k = 0` always yields an empty result; a dataset with
/// fewer than `k` rows yields [`InsufficientData`].
///
/// The index is a linear scan rebuilt on every call. A spatial tree could
/// replace it behind this signature for much larger datasets.
pub fn nearest(dataset: &Dataset, query: [f64; 3], k: usize) -> Result<Vec<Neighbor<'_>>, InsufficientData> {
    if k == 0 {
        return Ok(Vec::new());
    }
    if dataset.len() < k {
        return Err(InsufficientData {
            requested: k,
            available: dataset.len(),
        });
    }

    let mut scored: Vec<Neighbor<'_>> = dataset
        .records()
        .iter()
        .enumerate()
        .map(|(index, record)| Neighbor {
            index,
            record,
            distance: euclidean(record.point(), query),
        })
        .collect();

    // stable: ties stay in row order
    scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    scored.truncate(k);
    Ok(scored)
}
