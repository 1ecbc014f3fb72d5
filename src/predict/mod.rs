/// Prediction service: a trained model behind a one-method trait, the
/// on-disk artifact it is decoded from, and the atomic upload path.
///
/// ```text
///  model/pipe.json ──store::load_model──▶ ModelArtifact ──▶ Arc<dyn ProfitModel>
///        ▲                                                        │
///        └──── store::replace_model (temp file + rename)          ▼
///                                                      predict(model, query)
/// ```
pub mod artifact;
pub mod store;

use crate::data::model::Query;
use crate::error::PredictionError;

/// Anything that maps a query to an estimated profit.
pub trait ProfitModel: Send + Sync {
    fn predict(&self, query: &Query) -> Result<f64, PredictionError>;
}

/// Check the query's field types, run the model, and check its output.
///
/// Only the semantic type of each field is checked: the three amounts must be
/// finite and non-negative and the State label non-empty. There is no range
/// check against the dataset; values outside the observed ranges go to the
/// model as-is, and whatever the model does with them is reported as a
/// [`PredictionError`].
pub fn predict(model: &dyn ProfitModel, query: &Query) -> Result<f64, PredictionError> {
    let amounts = [
        ("R&D Spend", query.rd_spend),
        ("Administration", query.administration),
        ("Marketing Spend", query.marketing_spend),
    ];
    for (field, value) in amounts {
        if !value.is_finite() || value < 0.0 {
            return Err(PredictionError::InvalidAmount { field, value });
        }
    }
    if query.state.trim().is_empty() {
        return Err(PredictionError::MissingState);
    }

    let estimate = model.predict(query)?;
    if !estimate.is_finite() {
        return Err(PredictionError::NonFinite(estimate));
    }
    Ok(estimate)
}
