//! Router tests against deterministic stages

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use failwatch_core::logic::model::{
    FailureDetector, FixedClassifier, FixedDetector, InferenceError, ScriptedDetector,
};
use failwatch_core::{
    BatchRunner, EngineConfig, FailureCode, FailurePredictor, FeatureVector, ThresholdConfig,
    ThresholdStore,
};

use crate::{config::Config, create_router, AppState};

const THRESHOLDS: &str = r#"{
    "stage1_threshold": 0.5,
    "failure_thresholds": {"HDF": 0.6, "PWF": 0.65, "OSF": 0.7, "TWF": 0.55},
    "failure_codes": ["HDF", "PWF", "OSF", "TWF"]
}"#;

/// Stage-1 probability is tool_wear / 250; a tool_wear of 240 fails inference
fn scripted_detector() -> Arc<dyn FailureDetector> {
    Arc::new(ScriptedDetector::new(|fv: &FeatureVector| {
        if fv.tool_wear == 240.0 {
            Err(InferenceError::detector("output tensor missing"))
        } else {
            Ok(fv.tool_wear / 250.0)
        }
    }))
}

fn state(detector: Arc<dyn FailureDetector>, thresholds_path: &Path) -> AppState {
    let thresholds = ThresholdConfig::from_json_str(THRESHOLDS).unwrap();
    let classifier = Arc::new(FixedClassifier::new(&[
        (FailureCode::HDF, 0.892),
        (FailureCode::PWF, 0.1),
        (FailureCode::OSF, 0.1),
        (FailureCode::TWF, 0.1),
    ]));
    let predictor = FailurePredictor::new(
        detector,
        classifier,
        Arc::new(ThresholdStore::new(thresholds)),
    );

    let config = Config {
        port: 0,
        environment: "test".to_string(),
        engine: EngineConfig {
            stage1_model_path: "unused/stage1.onnx".into(),
            stage2_model_path: "unused/stage2.onnx".into(),
            thresholds_path: thresholds_path.to_path_buf(),
            stage1_sha256: None,
            stage2_sha256: None,
            batch_workers: 2,
            max_batch_items: 5,
        },
    };

    AppState {
        predictor: Arc::new(predictor),
        runner: Arc::new(BatchRunner::new(2)),
        config,
    }
}

fn thresholds_file() -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), THRESHOLDS).unwrap();
    file
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn machine(tool_wear: f64) -> Value {
    json!({
        "air_temperature": 25.0,
        "process_temperature": 36.0,
        "rotational_speed": 1500.0,
        "torque": 40.0,
        "tool_wear": tool_wear,
        "type_low": false,
        "type_medium": true
    })
}

#[tokio::test]
async fn test_health() {
    let file = thresholds_file();
    let (status, body) = send(state(scripted_detector(), file.path()), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["message"], "Welcome to Machine Failure Prediction API");
}

#[tokio::test]
async fn test_predict_failure() {
    let file = thresholds_file();
    let (status, body) = send(state(scripted_detector(), file.path()), post("/predict", machine(200.0))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["failure"], 1);
    assert_eq!(body["failure_probability"], 0.8);
    assert_eq!(body["failure_types"], json!({"HDF": 0.892}));
    assert_eq!(body["maintenance_report"]["status"], "CRITICAL - Failure Detected");
    assert_eq!(body["maintenance_report"]["vehicle_info"]["name"], "Unknown");
}

#[tokio::test]
async fn test_predict_healthy() {
    let file = thresholds_file();
    let (status, body) = send(state(scripted_detector(), file.path()), post("/predict", machine(50.0))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["failure"], 0);
    assert_eq!(body["failure_probability"], 0.2);
    assert!(body["failure_types"].is_null());
    assert_eq!(body["maintenance_report"]["status"], "Operational");
}

#[tokio::test]
async fn test_predict_accepts_dashboard_keys() {
    let file = thresholds_file();
    let payload = json!({
        "Air_temperature": 25.0,
        "Process_temperature": 36.0,
        "Rotational_speed": 1500.0,
        "Torque": 40.0,
        "Tool_wear": 200.0,
        "Type_L": true,
        "vehicle_name": "Press 4",
        "machine_age": 3.0
    });
    let (status, body) = send(state(scripted_detector(), file.path()), post("/predict", payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["failure"], 1);
    assert_eq!(body["maintenance_report"]["vehicle_info"]["name"], "Press 4");
    assert_eq!(body["maintenance_report"]["vehicle_info"]["type"], "L");
}

#[tokio::test]
async fn test_predict_rejects_both_machine_types() {
    let file = thresholds_file();
    let mut payload = machine(50.0);
    payload["type_low"] = json!(true);

    let (status, body) = send(state(scripted_detector(), file.path()), post("/predict", payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_predict_rejects_negative_speed() {
    let file = thresholds_file();
    let mut payload = machine(50.0);
    payload["rotational_speed"] = json!(-1.0);

    let (status, _) = send(state(scripted_detector(), file.path()), post("/predict", payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_inference_error() {
    let file = thresholds_file();
    let detector: Arc<dyn FailureDetector> = Arc::new(FixedDetector::failing("session closed"));
    let (status, body) = send(state(detector, file.path()), post("/predict", machine(50.0))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("session closed"));
}

#[tokio::test(flavor = "current_thread")]
async fn test_predict_does_not_block_runtime_thread() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};

    // Stage-1 waits until a request served on the same runtime flips the flag
    let released = Arc::new(AtomicBool::new(false));
    let flag = released.clone();
    let detector: Arc<dyn FailureDetector> = Arc::new(ScriptedDetector::new(move |_: &FeatureVector| {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !flag.load(Ordering::SeqCst) {
            if Instant::now() > deadline {
                return Err(InferenceError::detector("runtime thread was blocked"));
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        Ok(0.2)
    }));

    let file = thresholds_file();
    let app_state = state(detector, file.path());

    let (predicted, health) = tokio::join!(
        send(app_state.clone(), post("/predict", machine(50.0))),
        async {
            let health = send(app_state.clone(), get("/health")).await;
            released.store(true, Ordering::SeqCst);
            health
        }
    );

    assert_eq!(health.0, StatusCode::OK);
    assert_eq!(predicted.0, StatusCode::OK);
    assert_eq!(predicted.1["failure_probability"], 0.2);
}

#[tokio::test]
async fn test_batch_degrades_failed_item_in_place() {
    let file = thresholds_file();
    let payload = json!({
        "items": [
            {"id": "a", "features": machine(200.0)},
            {"id": "b", "features": machine(240.0)},
            {"id": "c", "features": machine(50.0)}
        ]
    });

    let (status, body) = send(state(scripted_detector(), file.path()), post("/api/v1/predict/batch", payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["degraded"], 1);

    let results = body["results"].as_array().unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    assert_eq!(results[0]["failure"], 1);
    assert_eq!(results[0]["status"], "scored");
    assert_eq!(results[1]["status"], "degraded");
    assert_eq!(results[1]["failure"], 0);
    assert_eq!(results[1]["failure_probability"], 0.0);
    assert!(results[1]["failure_types"].is_null());
    assert_eq!(results[2]["failure"], 0);
}

#[tokio::test]
async fn test_batch_over_limit_rejected() {
    let file = thresholds_file();
    let items: Vec<Value> = (0..6)
        .map(|i| json!({"id": format!("m{}", i), "features": machine(50.0)}))
        .collect();

    let (status, _) = send(
        state(scripted_detector(), file.path()),
        post("/api/v1/predict/batch", json!({ "items": items })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_empty_rejected() {
    let file = thresholds_file();
    let (status, _) = send(
        state(scripted_detector(), file.path()),
        post("/api/v1/predict/batch", json!({ "items": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_thresholds() {
    let file = thresholds_file();
    let (status, body) = send(state(scripted_detector(), file.path()), get("/api/v1/thresholds")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage1_threshold"], 0.5);
    assert_eq!(body["failure_thresholds"]["TWF"], 0.55);
    assert_eq!(body["failure_codes"], json!(["HDF", "PWF", "OSF", "TWF"]));
}

#[tokio::test]
async fn test_reload_thresholds() {
    let file = thresholds_file();
    let app_state = state(scripted_detector(), file.path());

    std::fs::write(file.path(), THRESHOLDS.replace("\"stage1_threshold\": 0.5", "\"stage1_threshold\": 0.9")).unwrap();
    let (status, body) = send(app_state.clone(), post("/api/v1/thresholds/reload", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage1_threshold"], 0.9);

    // 0.8 no longer clears the gate
    let (_, body) = send(app_state, post("/predict", machine(200.0))).await;
    assert_eq!(body["failure"], 0);
    assert_eq!(body["failure_probability"], 0.8);
}

#[tokio::test]
async fn test_reload_rejects_bad_file_and_keeps_config() {
    let file = thresholds_file();
    let app_state = state(scripted_detector(), file.path());

    std::fs::write(file.path(), THRESHOLDS.replace("\"stage1_threshold\": 0.5", "\"stage1_threshold\": 1.5")).unwrap();
    let (status, body) = send(app_state.clone(), post("/api/v1/thresholds/reload", json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);

    let (_, body) = send(app_state, get("/api/v1/thresholds")).await;
    assert_eq!(body["stage1_threshold"], 0.5);
}

#[tokio::test]
async fn test_engine_status_counts_predictions() {
    let file = thresholds_file();
    let app_state = state(scripted_detector(), file.path());

    send(app_state.clone(), post("/predict", machine(200.0))).await;
    send(app_state.clone(), post("/predict", machine(50.0))).await;

    let (status, body) = send(app_state, get("/api/v1/engine/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["environment"], "test");
    assert_eq!(body["max_batch_items"], 5);
    assert_eq!(body["engine"]["stats"]["predictions"], 2);
    assert_eq!(body["engine"]["stats"]["failures"], 1);
    assert!(body["engine"]["version"].is_string());
}
