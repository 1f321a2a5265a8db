use super::{Endpoint, PlanningService};
use crate::model::{
    FeasibilityRequest, FeasibilityResult, LaunchAck, LaunchRequest, MissionHistory,
    MissionRecord, PlannerConfig,
};
use anyhow::{Context, Result};
use reqwest::Url;
use serde::Serialize;

/// HTTP client for the planning service.
#[derive(Debug, Clone)]
pub struct PlanningClient {
    http: reqwest::Client,
    feasibility_url: Url,
    launch_url: Url,
    history_url: Url,
}

impl PlanningClient {
    pub fn new(cfg: &PlannerConfig) -> Result<Self> {
        let base = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid planning service URL: {}", cfg.base_url))?;
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.request_timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            http,
            feasibility_url: endpoint_url(&base, &cfg.feasibility_path)?,
            launch_url: endpoint_url(&base, &cfg.launch_path)?,
            history_url: endpoint_url(&base, &cfg.history_path)?,
        })
    }

    pub fn url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Feasibility => &self.feasibility_url,
            Endpoint::Launch => &self.launch_url,
            Endpoint::History => &self.history_url,
        }
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = self.url(endpoint);
        let resp = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        resp.error_for_status()
            .with_context(|| format!("POST {url} returned an error status"))
    }
}

/// Resolve an endpoint path below the base URL, keeping any path prefix the base carries.
fn endpoint_url(base: &Url, path: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .with_context(|| format!("invalid endpoint path: {path}"))
}

impl PlanningService for PlanningClient {
    async fn check_feasibility(&self, request: &FeasibilityRequest) -> Result<FeasibilityResult> {
        let resp = self.post_json(Endpoint::Feasibility, request).await?;
        resp.json::<FeasibilityResult>()
            .await
            .context("decode feasibility result")
    }

    async fn launch(&self, request: &LaunchRequest) -> Result<LaunchAck> {
        let resp = self.post_json(Endpoint::Launch, request).await?;
        // Only the status matters; an unreadable acknowledgement is still a launch.
        let body = resp.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn past_missions(&self) -> Result<Vec<MissionRecord>> {
        let url = self.url(Endpoint::History);
        let history = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?
            .json::<MissionHistory>()
            .await
            .context("decode mission history")?;
        Ok(history.missions)
    }

    fn describe(&self, endpoint: Endpoint) -> String {
        self.url(endpoint).to_string()
    }
}
