// tests/web.rs
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use cardioguard::consensus::ConsensusPolicy;
use cardioguard::features::FEATURE_COUNT;
use cardioguard::model::{ModelArtifact, ModelParams, TreeNode};
use cardioguard::registry::{ModelRegistry, MODEL_SET};
use cardioguard::web::{build_router, AppState};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt; // for .oneshot()

/// Write a deterministic artifact set: tree/forest always vote 1, logistic
/// and SVM always vote 0, so the default threshold of 2 trips.
fn write_artifacts(dir: &Path) {
    for (name, file) in MODEL_SET {
        let params = match name {
            "Decision Tree" => ModelParams::DecisionTree {
                nodes: vec![TreeNode::Leaf { probability: 0.9 }],
            },
            "Random Forest" => ModelParams::RandomForest {
                trees: vec![vec![TreeNode::Leaf { probability: 0.8 }]],
                feature_importances: Some([1.0 / FEATURE_COUNT as f64; FEATURE_COUNT]),
            },
            "Logistic Regression" => ModelParams::Logistic {
                weights: [0.0; FEATURE_COUNT],
                bias: -1.0,
                scaler: None,
            },
            _ => ModelParams::LinearSvm {
                weights: [0.0; FEATURE_COUNT],
                bias: -1.0,
                platt_a: 1.0,
                platt_b: 0.0,
                scaler: None,
            },
        };
        let artifact = ModelArtifact {
            name: name.to_string(),
            version: "test".to_string(),
            trained_at: chrono::Utc::now(),
            params,
        };
        std::fs::write(dir.join(file), serde_json::to_vec(&artifact).unwrap()).unwrap();
    }
}

fn test_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    write_artifacts(dir.path());
    let registry = ModelRegistry::load(dir.path()).expect("registry should load");
    let state = Arc::new(AppState {
        registry: Arc::new(registry),
        policy: ConsensusPolicy::default(),
        designated_model: "Logistic Regression".to_string(),
    });
    (build_router(state), dir)
}

fn encoded_patient() -> serde_json::Value {
    json!({
        "Age": 63,
        "Sex": 1,
        "ChestPainType": 3,
        "RestingBP": 145,
        "Cholesterol": 233,
        "FastingBS": 1,
        "RestingECG": 0,
        "MaxHR": 150,
        "ExerciseAngina": 0,
        "Oldpeak": 2.3,
        "ST_Slope": 1
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn predict_returns_prediction_and_risk_score() {
    let (app, _dir) = test_app();

    let req = Request::builder()
        .uri("/predict")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(encoded_patient().to_string()))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    // Logistic with zero weights and bias -1: sigmoid(-1) = 0.26894 -> 26.89
    assert_eq!(body["prediction"], 0);
    assert_eq!(body["risk_score"], 26.89);
}

#[tokio::test]
async fn predict_rejects_out_of_range_category_code() {
    let (app, _dir) = test_app();

    let mut payload = encoded_patient();
    payload["ST_Slope"] = json!(9);
    let req = Request::builder()
        .uri("/predict")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn panel_returns_votes_in_registry_order_with_verdict() {
    let (app, _dir) = test_app();

    let payload = json!({
        "Age": 63,
        "Sex": "Male",
        "ChestPainType": "Asymptomatic",
        "RestingBP": 145,
        "Cholesterol": 233,
        "FastingBS": ">120 mg/dl",
        "RestingECG": "Normal",
        "MaxHR": 150,
        "ExerciseAngina": "No",
        "Oldpeak": 2.3,
        "ST_Slope": "Flat"
    });
    let req = Request::builder()
        .uri("/predict/panel")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let votes = body["votes"].as_array().unwrap();
    assert_eq!(votes.len(), 4);
    assert_eq!(votes[0]["model"], "Decision Tree");
    assert_eq!(votes[0]["prediction"], 1);
    assert_eq!(votes[1]["model"], "Random Forest");
    assert_eq!(votes[1]["prediction"], 1);
    // Two positive votes hit the default threshold.
    assert_eq!(body["verdict"], "elevated risk");
}

#[tokio::test]
async fn panel_rejects_unknown_categorical_string() {
    let (app, _dir) = test_app();

    let payload = json!({
        "Age": 63,
        "Sex": "Unknown",
        "ChestPainType": "Asymptomatic",
        "RestingBP": 145,
        "Cholesterol": 233,
        "FastingBS": ">120 mg/dl",
        "RestingECG": "Normal",
        "MaxHR": 150,
        "ExerciseAngina": "No",
        "Oldpeak": 2.3,
        "ST_Slope": "Flat"
    });
    let req = Request::builder()
        .uri("/predict/panel")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Sex"));
}

#[tokio::test]
async fn bulk_returns_a_csv_attachment() {
    let (app, _dir) = test_app();

    let csv = "\
Age,Sex,ChestPainType,RestingBP,Cholesterol,FastingBS,RestingECG,MaxHR,ExerciseAngina,Oldpeak,ST_Slope
63,1,3,145,233,1,0,150,0,2.3,1
";
    let req = Request::builder()
        .uri("/predict/bulk")
        .method("POST")
        .header("Content-Type", "text/csv")
        .body(Body::from(csv))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/csv"
    );
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("heart_predictions.csv"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().ends_with("Prediction,Risk Score (%)"));
    assert!(lines.next().unwrap().ends_with(",0,26.89"));
}

#[tokio::test]
async fn bulk_rejects_schema_mismatch() {
    let (app, _dir) = test_app();

    let csv = "Age,Sex\n63,1\n";
    let req = Request::builder()
        .uri("/predict/bulk")
        .method("POST")
        .header("Content-Type", "text/csv")
        .body(Body::from(csv))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("missing columns"));
}

#[tokio::test]
async fn models_endpoint_lists_the_fixed_set_with_accuracy() {
    let (app, _dir) = test_app();

    let req = Request::builder()
        .uri("/models")
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 4);
    let rf = models
        .iter()
        .find(|m| m["name"] == "Random Forest")
        .unwrap();
    assert_eq!(rf["accuracy"], 0.91);
}

#[tokio::test]
async fn feature_importance_comes_from_the_forest_artifact() {
    let (app, _dir) = test_app();

    let req = Request::builder()
        .uri("/models/feature-importance")
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["model"], "Random Forest");
    assert_eq!(body["importances"].as_array().unwrap().len(), 11);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let (app, _dir) = test_app();

    let req = Request::builder()
        .uri("/healthz")
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = Request::builder()
        .uri("/readyz")
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn outcome_stats_returns_the_static_table() {
    let (app, _dir) = test_app();

    let req = Request::builder()
        .uri("/stats/outcomes")
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let outcomes = body["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["outcome"], "No Heart Disease");
    assert_eq!(outcomes[0]["count"], 580);
}
