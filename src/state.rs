use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ServiceConfig;
use crate::data::loader;
use crate::data::model::{Dataset, InputBounds, Query, Record};
use crate::data::neighbors::{self, Neighbor};
use crate::error::ServiceError;
use crate::predict::{self, store, ProfitModel};

// ---------------------------------------------------------------------------
// Evaluation – result of one run of the prediction page
// ---------------------------------------------------------------------------

/// Records shown next to a prediction.
#[derive(Debug, Clone, PartialEq)]
pub enum Similar<'a> {
    /// Nearest historical records, closest first.
    Nearest(Vec<Neighbor<'a>>),
    /// Random rows, shown when a neighbor lookup was not possible.
    Sample(Vec<&'a Record>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation<'a> {
    pub prediction: f64,
    pub similar: Similar<'a>,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// One user's state: the dataset read at start-up and the model loaded on
/// first use. Sessions share nothing but the files on disk.
pub struct Session {
    config: ServiceConfig,

    /// Loaded once in [`Session::open`]; empty when the file is missing.
    dataset: Dataset,

    /// Cached model (None until the first prediction, or after an upload).
    model: Option<Arc<dyn ProfitModel>>,

    /// Drives the fallback sample.
    rng: StdRng,
}

impl Session {
    /// Start a session. Only malformed dataset content is an error here.
    pub fn open(config: ServiceConfig) -> Result<Self> {
        let dataset = loader::load_dataset(&config.data_path)?;
        let rng = match config.fallback_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        log::debug!(
            "Session opened with {} records (data: {}, model: {})",
            dataset.len(),
            config.data_path.display(),
            config.model_path.display()
        );
        Ok(Session {
            config,
            dataset,
            model: None,
            rng,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The session's dataset, possibly empty.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The dataset, or [`ServiceError::DataUnavailable`] when it is empty.
    pub fn require_dataset(&self) -> Result<&Dataset, ServiceError> {
        if self.dataset.is_empty() {
            return Err(ServiceError::DataUnavailable {
                path: self.config.data_path.clone(),
            });
        }
        Ok(&self.dataset)
    }

    /// Defaults and ranges for the prediction form.
    pub fn input_bounds(&self) -> Result<InputBounds, ServiceError> {
        let dataset = self.require_dataset()?;
        dataset.bounds().ok_or_else(|| ServiceError::DataUnavailable {
            path: self.config.data_path.clone(),
        })
    }

    /// The cached model, loading it from disk on first use.
    pub fn model(&mut self) -> Result<Arc<dyn ProfitModel>, ServiceError> {
        if let Some(model) = &self.model {
            return Ok(Arc::clone(model));
        }
        let model = store::load_model(&self.config.model_path)?;
        self.model = Some(Arc::clone(&model));
        Ok(model)
    }

    /// Estimate the profit for `query`.
    ///
    /// Without a model artifact this returns [`ServiceError::ModelUnavailable`]
    /// and never reaches the prediction path.
    pub fn predict(&mut self, query: &Query) -> Result<f64, ServiceError> {
        let model = self.model()?;
        predict::predict(model.as_ref(), query).map_err(|e| {
            log::warn!("Prediction rejected for {query:?}: {e}");
            ServiceError::from(e)
        })
    }

    /// The configured number of records closest to `query`.
    pub fn similar(&self, query: &Query) -> Result<Vec<Neighbor<'_>>, ServiceError> {
        let dataset = self.require_dataset()?;
        Ok(neighbors::nearest(dataset, query.point(), self.config.neighbors)?)
    }

    /// Predict, then look up similar records.
    ///
    /// When the dataset has too few rows for the neighbor lookup, a random
    /// sample of up to `neighbors` rows is returned instead.
    pub fn evaluate(&mut self, query: &Query) -> Result<Evaluation<'_>, ServiceError> {
        self.require_dataset()?;
        let prediction = self.predict(query)?;

        let k = self.config.neighbors;
        let similar = match neighbors::nearest(&self.dataset, query.point(), k) {
            Ok(found) => Similar::Nearest(found),
            Err(e) => {
                log::info!("{e}; falling back to a random sample");
                Similar::Sample(self.dataset.sample(k, &mut self.rng))
            }
        };
        Ok(Evaluation {
            prediction,
            similar,
        })
    }

    /// Store an uploaded artifact and drop the cached model so the next
    /// prediction reads the new one.
    pub fn upload_model(&mut self, bytes: &[u8]) -> Result<(), ServiceError> {
        store::replace_model(bytes, &self.config.model_path)?;
        self.model = None;
        Ok(())
    }

    /// The dataset as a BOM-prefixed CSV download.
    pub fn export(&self) -> Result<Vec<u8>> {
        loader::export_csv(&self.dataset)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        log::debug!("Session closed");
    }
}
