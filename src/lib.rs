//! Library root for the `cardioguard` crate.
//!
//! Serves a fixed set of pre-trained heart-disease classifiers over HTTP:
//! single-record prediction against one designated model, a full-panel
//! prediction with a majority-style consensus verdict, and bulk CSV scoring.

// Core error handling
pub mod errors;

// Feature encoding & record contracts
pub mod features;

// Classifier artifacts & registry
pub mod model;
pub mod registry;

// Prediction
pub mod bulk;
pub mod consensus;
pub mod predictor;

// Static display data
pub mod reference;

// Configuration & CLI
pub mod cli;
pub mod config;

// Web server interface
pub mod web;

pub use consensus::{ConsensusPolicy, RiskVerdict};
pub use errors::{CardioError, CardioResult};
pub use features::{EncodedPatient, FeatureVector, PatientRecord, FEATURE_COLUMNS};
pub use model::ModelArtifact;
pub use predictor::{PanelPrediction, Prediction};
pub use registry::ModelRegistry;
