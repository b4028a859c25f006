#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use roadwork::access::Scope;
use roadwork::{Api, GenerateOptions, JwtAuthentication, MemoryModel, RootOptions};
use serde_json::json;

pub const SECRET: &str = "integration-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub jwt: JwtAuthentication,
}

impl TestServer {
    /// Serve the given api on an unused port from the current runtime
    pub async fn spawn(api: Api) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let router = api.router();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            jwt: JwtAuthentication::new(SECRET, 1),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port)).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token(&self, id: &str, roles: &[&str]) -> Result<String> {
        let scope = Scope::from(roles.to_vec());
        Ok(self.jwt.issue(id, Some(scope))?)
    }
}

/// `tasks` owned through `user_id`, three records across two owners
pub fn tasks_model() -> Arc<MemoryModel> {
    Arc::new(MemoryModel::new("tasks").with_records(vec![
        json!({ "id": "t1", "title": "Write the release notes", "user_id": "1", "status": "open" }),
        json!({ "id": "t2", "title": "Review open pull requests", "user_id": "2", "status": "open" }),
        json!({ "id": "t3", "title": "Archive old branches", "user_id": "1", "status": "done" }),
    ]))
}

/// Api under `/api` with JWT authentication registered
pub fn api_with(options: GenerateOptions) -> Result<Api> {
    let mut api = Api::new(RootOptions::new("/api")?)?;
    api.add_authentication(Arc::new(JwtAuthentication::new(SECRET, 1)));
    api.generate(tasks_model(), options)?;
    Ok(api)
}

pub async fn ensure_server(options: GenerateOptions) -> Result<TestServer> {
    TestServer::spawn(api_with(options)?).await
}
