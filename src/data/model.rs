use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names – header of the startup dataset file
// ---------------------------------------------------------------------------

pub const RD_SPEND: &str = "R&D Spend";
pub const ADMINISTRATION: &str = "Administration";
pub const MARKETING_SPEND: &str = "Marketing Spend";
pub const STATE: &str = "State";
pub const PROFIT: &str = "Profit";

/// Header row in file order. Export writes exactly these names.
pub const COLUMNS: [&str; 5] = [RD_SPEND, ADMINISTRATION, MARKETING_SPEND, STATE, PROFIT];

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// One historical startup (one row of the source file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "R&D Spend")]
    pub rd_spend: f64,
    #[serde(rename = "Administration")]
    pub administration: f64,
    #[serde(rename = "Marketing Spend")]
    pub marketing_spend: f64,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Profit")]
    pub profit: f64,
}

impl Record {
    /// The three spend figures used for distance computation.
    pub fn point(&self) -> [f64; 3] {
        [self.rd_spend, self.administration, self.marketing_spend]
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>12.2} {:>14.2} {:>15.2}  {:<12} {:>12.2}",
            self.rd_spend, self.administration, self.marketing_spend, self.state, self.profit
        )
    }
}

// ---------------------------------------------------------------------------
// Query – a record without a profit, as entered by the user
// ---------------------------------------------------------------------------

/// Input for a prediction: the three spend figures and a State label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub rd_spend: f64,
    pub administration: f64,
    pub marketing_spend: f64,
    pub state: String,
}

impl Query {
    pub fn new(
        rd_spend: f64,
        administration: f64,
        marketing_spend: f64,
        state: impl Into<String>,
    ) -> Self {
        Query {
            rd_spend,
            administration,
            marketing_spend,
            state: state.into(),
        }
    }

    pub fn point(&self) -> [f64; 3] {
        [self.rd_spend, self.administration, self.marketing_spend]
    }
}

// ---------------------------------------------------------------------------
// Summaries used by the overview and the prediction form
// ---------------------------------------------------------------------------

/// Min / median / max of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnBounds {
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl ColumnBounds {
    fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        Some(ColumnBounds {
            min: values[0],
            median: median_of_sorted(&values),
            max: values[values.len() - 1],
        })
    }
}

/// Suggested input ranges for the three spend columns.
///
/// These are UI defaults only. Prediction never checks a query against them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputBounds {
    pub rd_spend: ColumnBounds,
    pub administration: ColumnBounds,
    pub marketing_spend: ColumnBounds,
}

/// Headline profit figures for the overview page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfitSummary {
    pub samples: usize,
    pub mean_profit: f64,
    pub median_profit: f64,
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// All records in file order. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Dataset { records }
    }

    /// The "unavailable" dataset returned when the backing file is missing.
    pub fn empty() -> Self {
        Dataset::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` records.
    pub fn head(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }

    /// Up to `n` distinct records picked at random.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&Record> {
        self.records.choose_multiple(rng, n).collect()
    }

    /// Distinct State labels in order of first appearance.
    pub fn states(&self) -> Vec<&str> {
        self.state_counts().into_iter().map(|(s, _)| s).collect()
    }

    /// Row count per State label, in order of first appearance.
    pub fn state_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for rec in &self.records {
            match counts.iter_mut().find(|(s, _)| *s == rec.state) {
                Some((_, n)) => *n += 1,
                None => counts.push((rec.state.as_str(), 1)),
            }
        }
        counts
    }

    /// Min / median / max of each spend column, `None` when empty.
    pub fn bounds(&self) -> Option<InputBounds> {
        let column = |f: fn(&Record) -> f64| {
            ColumnBounds::from_values(self.records.iter().map(f).collect())
        };
        Some(InputBounds {
            rd_spend: column(|r| r.rd_spend)?,
            administration: column(|r| r.administration)?,
            marketing_spend: column(|r| r.marketing_spend)?,
        })
    }

    /// Sample count, mean and median profit, `None` when empty.
    pub fn profit_summary(&self) -> Option<ProfitSummary> {
        let mut profits: Vec<f64> = self.records.iter().map(|r| r.profit).collect();
        if profits.is_empty() {
            return None;
        }
        let mean_profit = profits.iter().sum::<f64>() / profits.len() as f64;
        profits.sort_by(f64::total_cmp);
        Some(ProfitSummary {
            samples: profits.len(),
            mean_profit,
            median_profit: median_of_sorted(&profits),
        })
    }
}
