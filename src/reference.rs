//! Static reference tables for the model-information surface.
//!
//! These are display data carried over from the dashboard: held-out accuracy
//! per model and the outcome distribution of the training dataset. They are
//! hardcoded, not computed, and not part of the prediction contract.

/// Held-out accuracy per model, as published with the trained artifacts
pub const MODEL_ACCURACY: [(&str, f64); 4] = [
    ("Decision Tree", 0.86),
    ("Random Forest", 0.91),
    ("Logistic Regression", 0.88),
    ("Support Vector Machine", 0.90),
];

/// Outcome distribution of the training dataset
pub const OUTCOME_DISTRIBUTION: [(&str, u32); 2] =
    [("No Heart Disease", 580), ("Heart Disease", 420)];

/// Accuracy for one model by logical name
pub fn accuracy_of(name: &str) -> Option<f64> {
    MODEL_ACCURACY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, a)| *a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;

    #[test]
    fn every_registry_model_has_a_published_accuracy() {
        for name in ModelRegistry::names() {
            assert!(accuracy_of(name).is_some(), "no accuracy for {name}");
        }
    }
}
