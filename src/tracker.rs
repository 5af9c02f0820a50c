//! Tracker
//!
//! Wires one gateway, one session and one temporary-id allocator into the
//! six per-kind controllers. This is the handle a UI holds.

use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::controller::{MutationController, TempIdAllocator};
use crate::domain::{Application, Deadline, Interview, Job, Offer, Resume};
use crate::error::{GatewayError, MutationError};
use crate::gateway::{HttpGateway, Method, Request, RequestGateway, SessionCredentials};
use crate::resource::Resource;
use crate::store::EntityStore;

pub struct Tracker {
    gateway: Arc<dyn RequestGateway>,
    session: Arc<SessionCredentials>,
    pub jobs: MutationController<Job>,
    pub applications: MutationController<Application>,
    pub interviews: MutationController<Interview>,
    pub offers: MutationController<Offer>,
    pub deadlines: MutationController<Deadline>,
    pub resumes: MutationController<Resume>,
}

fn controller<E: Resource>(
    gateway: &Arc<dyn RequestGateway>,
    ids: &Arc<TempIdAllocator>,
) -> MutationController<E> {
    MutationController::new(Arc::new(EntityStore::new()), gateway.clone(), ids.clone())
}

impl Tracker {
    pub fn new(gateway: Arc<dyn RequestGateway>, session: Arc<SessionCredentials>) -> Self {
        let ids = Arc::new(TempIdAllocator::new());
        Self {
            jobs: controller(&gateway, &ids),
            applications: controller(&gateway, &ids),
            interviews: controller(&gateway, &ids),
            offers: controller(&gateway, &ids),
            deadlines: controller(&gateway, &ids),
            resumes: controller(&gateway, &ids),
            gateway,
            session,
        }
    }

    /// HTTP-backed tracker for `config`
    pub fn connect(config: &ClientConfig) -> Result<Self, GatewayError> {
        let session = Arc::new(SessionCredentials::new());
        let gateway = HttpGateway::new(config.api_url.clone(), config.timeout(), session.clone())?;
        log::info!("tracker connected to {}", gateway.base_url());
        Ok(Self::new(Arc::new(gateway), session))
    }

    pub fn session(&self) -> &Arc<SessionCredentials> {
        &self.session
    }

    /// Exchange credentials for a bearer token and keep it for later requests
    pub async fn login(&self, email: &str, password: &str) -> Result<(), MutationError> {
        let request = Request::new(Method::Post, "/api/auth/login")
            .json(json!({ "email": email, "password": password }));
        let payload = self.gateway.send(request).await.map_err(|e| match e {
            // Wrong password is not an expired session
            GatewayError::ServerRejected { status, message } => {
                MutationError::ServerRejected { status, message }
            }
            other => other.into(),
        })?;
        let token = payload
            .get("access_token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MutationError::MalformedResponse("login response has no access_token".into()))?;
        self.session.set_token(token);
        log::info!("logged in as {}", email);
        Ok(())
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    /// Fetch every kind; the first failure is returned, the rest still load
    pub async fn load_all(&self) -> Result<(), MutationError> {
        let results = tokio::join!(
            self.jobs.load(),
            self.applications.load(),
            self.interviews.load(),
            self.offers.load(),
            self.deadlines.load(),
            self.resumes.load(),
        );
        results.0?;
        results.1?;
        results.2?;
        results.3?;
        results.4?;
        results.5?;
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.jobs.is_loading()
            || self.applications.is_loading()
            || self.interviews.is_loading()
            || self.offers.is_loading()
            || self.deadlines.is_loading()
            || self.resumes.is_loading()
    }
}

/// Start file logging when the config names a log directory.
/// Returns the live log file path.
pub fn init_logging(config: &ClientConfig) -> Result<Option<PathBuf>, rolling_logger::LoggerError> {
    let Some(dir) = &config.log_dir else {
        return Ok(None);
    };
    rolling_logger::init_logger(dir, &config.app_name)?;
    Ok(rolling_logger::log_path())
}
