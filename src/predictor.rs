//! Single-record prediction: one model (API path) or the full panel (UI path).

use serde::Serialize;

use crate::consensus::{ConsensusPolicy, RiskVerdict};
use crate::errors::CardioResult;
use crate::features::FeatureVector;
use crate::model::ModelArtifact;
use crate::registry::ModelRegistry;

/// One model's answer for one record
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub prediction: u8,
    /// Probability of class 1 as a percentage, rounded to 2 decimals
    pub risk_score: f64,
}

/// One panel member's labelled vote
#[derive(Debug, Clone, Serialize)]
pub struct ModelVote {
    pub model: String,
    pub prediction: u8,
    pub risk_score: f64,
}

/// Full-panel result with the aggregate verdict
#[derive(Debug, Clone, Serialize)]
pub struct PanelPrediction {
    pub votes: Vec<ModelVote>,
    pub verdict: RiskVerdict,
}

/// Convert a class-1 probability into the wire risk score:
/// `round(probability * 100, 2)`
pub fn risk_score(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}

/// Score one record against one model
pub fn predict_one(model: &ModelArtifact, x: &FeatureVector) -> CardioResult<Prediction> {
    let label = model.predict(x)?;
    let proba = model.predict_proba(x)?;
    Ok(Prediction {
        prediction: label,
        risk_score: risk_score(proba),
    })
}

/// Score one record against every loaded model and derive the consensus
/// verdict. Votes come back in fixed registry order. A failure in any single
/// model fails the whole panel; there is no partial result.
pub fn predict_panel(
    registry: &ModelRegistry,
    policy: &ConsensusPolicy,
    x: &FeatureVector,
) -> CardioResult<PanelPrediction> {
    let mut votes = Vec::with_capacity(registry.len());
    let mut labels = Vec::with_capacity(registry.len());

    for (name, model) in registry.all() {
        let prediction = predict_one(model, x)?;
        labels.push(prediction.prediction);
        votes.push(ModelVote {
            model: name.to_string(),
            prediction: prediction.prediction,
            risk_score: prediction.risk_score,
        });
    }

    Ok(PanelPrediction {
        verdict: policy.verdict(&labels),
        votes,
    })
}
