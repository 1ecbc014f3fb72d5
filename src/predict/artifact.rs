use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ProfitModel;
use crate::data::model::Query;
use crate::error::{ModelLoadError, PredictionError};

// ---------------------------------------------------------------------------
// ModelArtifact – the serialized form, tagged by backend
// ---------------------------------------------------------------------------

/// Decoded contents of a model file. New backends are new variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearPipeline),
}

impl ModelArtifact {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_vec_pretty(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Check the artifact and hand it out behind the model trait.
    pub fn into_model(self) -> Result<Arc<dyn ProfitModel>, ModelLoadError> {
        match self {
            ModelArtifact::Linear(pipeline) => {
                pipeline.check()?;
                Ok(Arc::new(pipeline))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// LinearPipeline – one-hot State + ordinary linear regression
// ---------------------------------------------------------------------------

/// A fitted linear regression over the three spends and a one-hot State.
///
/// `states` holds one coefficient per State label seen during training; a
/// dropped reference category is simply present with coefficient `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPipeline {
    pub intercept: f64,
    pub rd_spend: f64,
    pub administration: f64,
    pub marketing_spend: f64,
    pub states: BTreeMap<String, f64>,
}

impl LinearPipeline {
    fn check(&self) -> Result<(), ModelLoadError> {
        let weights = [
            self.intercept,
            self.rd_spend,
            self.administration,
            self.marketing_spend,
        ];
        if weights.iter().chain(self.states.values()).any(|w| !w.is_finite()) {
            return Err(ModelLoadError::Invalid("non-finite coefficient".into()));
        }
        if self.states.is_empty() {
            return Err(ModelLoadError::Invalid("no State categories".into()));
        }
        Ok(())
    }
}

impl ProfitModel for LinearPipeline {
    fn predict(&self, query: &Query) -> Result<f64, PredictionError> {
        let state = self
            .states
            .get(&query.state)
            .ok_or_else(|| PredictionError::UnknownCategory(query.state.clone()))?;
        Ok(self.intercept
            + self.rd_spend * query.rd_spend
            + self.administration * query.administration
            + self.marketing_spend * query.marketing_spend
            + state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPE: &str = r#"{
        "kind": "linear",
        "intercept": 50000.0,
        "rd_spend": 0.8,
        "administration": -0.03,
        "marketing_spend": 0.03,
        "states": { "California": 0.0, "Florida": 200.0, "New York": -50.0 }
    }"#;

    #[test]
    fn decodes_tagged_linear_pipeline() {
        let artifact = ModelArtifact::from_slice(PIPE.as_bytes()).unwrap();
        let ModelArtifact::Linear(p) = &artifact;
        assert_eq!(p.states.len(), 3);
        assert_eq!(p.intercept, 50000.0);
    }

    #[test]
    fn linear_prediction() {
        let model = ModelArtifact::from_slice(PIPE.as_bytes())
            .unwrap()
            .into_model()
            .unwrap();
        let q = Query::new(100000.0, 100000.0, 100000.0, "Florida");
        let expected = 50000.0 + 80000.0 - 3000.0 + 3000.0 + 200.0;
        assert!((model.predict(&q).unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn unseen_state_is_rejected() {
        let model = ModelArtifact::from_slice(PIPE.as_bytes())
            .unwrap()
            .into_model()
            .unwrap();
        let q = Query::new(1.0, 1.0, 1.0, "Texas");
        assert_eq!(
            model.predict(&q),
            Err(PredictionError::UnknownCategory("Texas".into()))
        );
    }

    #[test]
    fn garbage_and_unknown_kind_fail_to_decode() {
        assert!(matches!(
            ModelArtifact::from_slice(b"\x80\x04\x95pickle"),
            Err(ModelLoadError::Decode(_))
        ));
        assert!(matches!(
            ModelArtifact::from_slice(br#"{"kind":"forest"}"#),
            Err(ModelLoadError::Decode(_))
        ));
    }

    #[test]
    fn empty_state_table_is_invalid() {
        let p = LinearPipeline {
            intercept: 0.0,
            rd_spend: 1.0,
            administration: 0.0,
            marketing_spend: 0.0,
            states: BTreeMap::new(),
        };
        assert!(matches!(
            ModelArtifact::Linear(p).into_model(),
            Err(ModelLoadError::Invalid(_))
        ));
    }

    #[test]
    fn pretty_output_decodes_back() {
        let artifact = ModelArtifact::from_slice(PIPE.as_bytes()).unwrap();
        let bytes = artifact.to_vec_pretty().unwrap();
        assert_eq!(ModelArtifact::from_slice(&bytes).unwrap(), artifact);
    }
}
