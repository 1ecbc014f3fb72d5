//! Startup profit prediction service.
//!
//! Loads the startup spending dataset, serves profit estimates from a
//! pre-trained model artifact and finds the historical startups most similar
//! to a query. Rendering is left to the caller; see `main.rs` for a
//! command-line front end.

pub mod config;
pub mod data;
pub mod error;
pub mod predict;
pub mod state;

pub use config::ServiceConfig;
pub use data::model::{Dataset, Query, Record};
pub use error::ServiceError;
pub use state::{Evaluation, Session, Similar};
