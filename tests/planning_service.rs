//! End-to-end workflow against an in-process planning service.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mission_planner::engine::{PlanningClient, PlanningService};
use mission_planner::model::{
    FeasibilityOutcome, LaunchOutcome, MissionParameters, PlannerConfig, PropulsionType,
    RoleSplit, Target, WorkflowEvent, WorkflowPhase, SERVICE_UNREACHABLE_REASON,
};
use mission_planner::orchestrator::{WorkflowController, WorkflowState};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Clone)]
enum Reply {
    Json(StatusCode, Value),
    Raw(StatusCode, &'static str),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(status, body) => (status, Json(body)).into_response(),
            Reply::Raw(status, body) => (status, body).into_response(),
        }
    }
}

#[derive(Clone)]
struct FakeService {
    feasibility: Arc<Mutex<Reply>>,
    launches: Arc<Mutex<VecDeque<Reply>>>,
    history: Arc<Mutex<Reply>>,
    feasibility_hits: Arc<Mutex<Vec<Value>>>,
    launch_hits: Arc<Mutex<Vec<Value>>>,
}

impl FakeService {
    fn new(feasibility: Reply) -> Self {
        Self {
            feasibility: Arc::new(Mutex::new(feasibility)),
            launches: Arc::new(Mutex::new(VecDeque::new())),
            history: Arc::new(Mutex::new(Reply::Json(
                StatusCode::OK,
                json!({ "missions": [] }),
            ))),
            feasibility_hits: Arc::new(Mutex::new(Vec::new())),
            launch_hits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn then_launch(self, reply: Reply) -> Self {
        self.launches.lock().unwrap().push_back(reply);
        self
    }

    fn launch_hits(&self) -> Vec<Value> {
        self.launch_hits.lock().unwrap().clone()
    }

    fn feasibility_hits(&self) -> Vec<Value> {
        self.feasibility_hits.lock().unwrap().clone()
    }
}

async fn feasibility(State(svc): State<FakeService>, Json(body): Json<Value>) -> Reply {
    svc.feasibility_hits.lock().unwrap().push(body);
    svc.feasibility.lock().unwrap().clone()
}

async fn launch(State(svc): State<FakeService>, Json(body): Json<Value>) -> Reply {
    svc.launch_hits.lock().unwrap().push(body);
    svc.launches
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or(Reply::Json(StatusCode::OK, json!({ "id": "sim-001" })))
}

async fn history(State(svc): State<FakeService>) -> Reply {
    svc.history.lock().unwrap().clone()
}

async fn serve(svc: FakeService, launch_path: &str) -> SocketAddr {
    let app = Router::new()
        .route("/api/check-feasibility", post(feasibility))
        .route(launch_path, post(launch))
        .route("/api/past-missions", get(history))
        .with_state(svc);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config(addr: SocketAddr) -> PlannerConfig {
    PlannerConfig {
        base_url: format!("http://{addr}"),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

fn workflow(
    cfg: &PlannerConfig,
) -> (
    WorkflowController<PlanningClient>,
    mpsc::UnboundedReceiver<WorkflowEvent>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let client = PlanningClient::new(cfg).unwrap();
    (
        WorkflowController::new(client, cfg.visualization_route.clone(), Some(tx)),
        rx,
    )
}

fn approved_body(success_probability: f64) -> Value {
    json!({
        "feasible": true,
        "reason": "Mission feasible. Proceed to launch. Estimated success: 82.0%",
        "success_probability": success_probability,
        "delta_v": 4.17,
        "time_of_flight": 287.3,
        "fuel_required": 1421.9
    })
}

fn mars_mission() -> MissionParameters {
    MissionParameters {
        target: Target::Mars,
        duration_days: 30,
        swarm_size: 24,
        delta_v_budget: 1.2,
        target_angle_deg: 60.0,
        role_split: RoleSplit::ScienceHeavy,
        propulsion_type: PropulsionType::Ion,
    }
}

#[tokio::test]
async fn approved_mission_launches_and_hands_off() {
    let svc = FakeService::new(Reply::Json(StatusCode::OK, approved_body(0.82))).then_launch(
        Reply::Json(
            StatusCode::OK,
            json!({
                "id": "mission-20250101-120000",
                "message": "Successfully launched 24 nanosats to Mars",
                "mission_saved": true,
                "metrics": { "intercept_time": 42 }
            }),
        ),
    );
    let addr = serve(svc.clone(), "/api/launch-mission").await;
    let (mut ctl, mut rx) = workflow(&config(addr));
    let params = mars_mission();

    let outcome = ctl.check_feasibility(&params).await;
    assert!(outcome.is_approved());
    assert_eq!(ctl.phase(), WorkflowPhase::Resolved);

    let sent = svc.feasibility_hits();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["target_name"], "Mars");
    assert_eq!(sent[0]["swarm_size"], 24);
    assert_eq!(sent[0]["role_split"], "science-heavy");
    assert_eq!(sent[0]["propulsion_type"], "ion");
    assert!(sent[0]["intercept_epoch"].as_f64().unwrap() > 2_460_000.0);

    let launched = ctl.launch(&params).await;
    match &launched {
        LaunchOutcome::Launched(ack) => {
            assert_eq!(ack.id.as_deref(), Some("mission-20250101-120000"));
            assert_eq!(ack.mission_saved, Some(true));
        }
        other => panic!("expected launch, got {other:?}"),
    }
    assert_eq!(ctl.state(), &WorkflowState::Idle);

    let body = &svc.launch_hits()[0];
    assert_eq!(body["target"], "Mars");
    assert_eq!(body["days"], 30);
    assert_eq!(body["swarm_count"], 24);
    assert_eq!(body["delta_v_budget"], 1.2);
    assert_eq!(body["target_angle_deg"], 60.0);
    assert_eq!(body["success_probability"], 0.82);
    assert_eq!(body["time_of_flight"], 287.3);

    drop(ctl);
    let mut routes = Vec::new();
    while let Some(ev) = rx.recv().await {
        if let WorkflowEvent::OpenView { route } = ev {
            routes.push(route);
        }
    }
    assert_eq!(routes, vec!["/solarsystem".to_string()]);
}

#[tokio::test]
async fn rejected_mission_is_never_launched() {
    let svc = FakeService::new(Reply::Json(
        StatusCode::OK,
        json!({
            "feasible": false,
            "reason": "Mission risk too high. Success probability (31.0%) is below the 40% operational threshold.",
            "success_probability": 0.31,
            "delta_v": 9.8,
            "time_of_flight": 612.0,
            "fuel_required": 5200.0
        }),
    ));
    let addr = serve(svc.clone(), "/api/launch-mission").await;
    let (mut ctl, _rx) = workflow(&config(addr));

    let outcome = ctl.check_feasibility(&mars_mission()).await;
    assert!(matches!(outcome, FeasibilityOutcome::Assessed(ref r) if !r.feasible));
    assert!(!ctl.is_approved());

    assert_eq!(ctl.launch(&mars_mission()).await, LaunchOutcome::NotApproved);
    assert_eq!(ctl.phase(), WorkflowPhase::Resolved);
    assert!(svc.launch_hits().is_empty());
}

#[tokio::test]
async fn unreachable_service_yields_synthetic_rejection() {
    // Bind then release a port so nothing is listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (mut ctl, _rx) = workflow(&config(addr));
    let outcome = ctl.check_feasibility(&mars_mission()).await;

    assert!(matches!(outcome, FeasibilityOutcome::Unreachable { .. }));
    let r = ctl.last_result().unwrap();
    assert!(!r.feasible);
    assert_eq!(r.reason, SERVICE_UNREACHABLE_REASON);
    assert_eq!(
        (r.success_probability, r.delta_v, r.time_of_flight, r.fuel_required),
        (0.0, 0.0, 0.0, 0.0)
    );
    assert!(!ctl.is_approved());
    assert_eq!(ctl.phase(), WorkflowPhase::Resolved);
}

#[tokio::test]
async fn error_status_counts_as_unreachable() {
    let svc = FakeService::new(Reply::Json(
        StatusCode::INTERNAL_SERVER_ERROR,
        approved_body(0.9),
    ));
    let addr = serve(svc, "/api/launch-mission").await;
    let (mut ctl, _rx) = workflow(&config(addr));

    let outcome = ctl.check_feasibility(&mars_mission()).await;
    assert!(matches!(outcome, FeasibilityOutcome::Unreachable { ref cause, .. } if cause.contains("500")));
    assert!(!ctl.is_approved());
}

#[tokio::test]
async fn malformed_body_counts_as_unreachable() {
    let svc = FakeService::new(Reply::Raw(StatusCode::OK, "<html>gateway</html>"));
    let addr = serve(svc, "/api/launch-mission").await;
    let (mut ctl, _rx) = workflow(&config(addr));

    let outcome = ctl.check_feasibility(&mars_mission()).await;
    assert!(matches!(outcome, FeasibilityOutcome::Unreachable { .. }));
    assert!(!ctl.is_approved());
}

#[tokio::test]
async fn partial_body_is_a_rejection_not_an_outage() {
    let svc = FakeService::new(Reply::Json(
        StatusCode::OK,
        json!({ "success_probability": 0.77 }),
    ));
    let addr = serve(svc, "/api/launch-mission").await;
    let (mut ctl, _rx) = workflow(&config(addr));

    let outcome = ctl.check_feasibility(&mars_mission()).await;
    match outcome {
        FeasibilityOutcome::Assessed(r) => {
            assert!(!r.feasible);
            assert_eq!(r.success_probability, 0.77);
        }
        other => panic!("expected assessment, got {other:?}"),
    }
    assert!(!ctl.is_approved());
}

#[tokio::test]
async fn failed_launch_can_be_retried_without_reanalysis() {
    let svc = FakeService::new(Reply::Json(StatusCode::OK, approved_body(0.64)))
        .then_launch(Reply::Raw(StatusCode::SERVICE_UNAVAILABLE, "busy"))
        .then_launch(Reply::Raw(StatusCode::OK, "launched"));
    let addr = serve(svc.clone(), "/api/launch-mission").await;
    let (mut ctl, _rx) = workflow(&config(addr));
    let params = mars_mission();

    ctl.check_feasibility(&params).await;

    let first = ctl.launch(&params).await;
    assert!(matches!(first, LaunchOutcome::Failed { .. }));
    assert_eq!(ctl.phase(), WorkflowPhase::Resolved);
    assert!(ctl.is_approved());

    // Non-JSON acknowledgement with a success status is still a launch.
    let second = ctl.launch(&params).await;
    assert_eq!(second, LaunchOutcome::Launched(Default::default()));
    assert_eq!(ctl.phase(), WorkflowPhase::Idle);

    assert_eq!(svc.feasibility_hits().len(), 1);
    assert_eq!(svc.launch_hits().len(), 2);
}

#[tokio::test]
async fn launch_path_is_configurable() {
    let svc = FakeService::new(Reply::Json(StatusCode::OK, approved_body(0.9)));
    let addr = serve(svc.clone(), "/trajectory/simulate").await;
    let cfg = PlannerConfig {
        launch_path: "/trajectory/simulate".into(),
        ..config(addr)
    };
    let (mut ctl, _rx) = workflow(&cfg);

    ctl.check_feasibility(&mars_mission()).await;
    assert!(matches!(
        ctl.launch(&mars_mission()).await,
        LaunchOutcome::Launched(_)
    ));
    assert_eq!(svc.launch_hits().len(), 1);
}

#[tokio::test]
async fn lists_past_missions() {
    let svc = FakeService::new(Reply::Json(StatusCode::OK, approved_body(0.9)));
    *svc.history.lock().unwrap() = Reply::Json(
        StatusCode::OK,
        json!({
            "missions": [
                {
                    "id": "mission-20250101-120000",
                    "name": "Mars Intercept",
                    "date": "2025-01-01",
                    "swarm_count": 24,
                    "delta_v": 1.25,
                    "duration": 287.3,
                    "success_probability": 0.82,
                    "status": "completed"
                },
                { "id": "mission-20250102-080000" }
            ]
        }),
    );
    let addr = serve(svc, "/api/launch-mission").await;
    let client = PlanningClient::new(&config(addr)).unwrap();

    let missions = client.past_missions().await.unwrap();
    assert_eq!(missions.len(), 2);
    assert_eq!(missions[0].name.as_deref(), Some("Mars Intercept"));
    assert_eq!(missions[0].swarm_count, Some(24));
    assert_eq!(missions[1].status, None);
}
