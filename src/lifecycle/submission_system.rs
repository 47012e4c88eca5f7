use std::sync::Arc;

use tracing::{error, info};

use crate::clients::{AdminClient, ApiClient, ApiError, BlogClient, LeadClient, PublicBlogClient, Session};
use crate::framework::{Collaborators, SubmissionActor, SubmissionClient};
use crate::lifecycle::AppConfig;

const REQUEST_BUFFER: usize = 32;

/// REST clients sharing one connection pool.
#[derive(Clone)]
pub struct CmsClients {
    /// Admin posts, categories and uploads. Also backs submission runs.
    pub blog: BlogClient,
    /// Published posts and categories.
    pub public_blog: PublicBlogClient,
    /// Dashboard stats and lead listings.
    pub admin: AdminClient,
    /// Newsletter and contact forms.
    pub leads: LeadClient,
}

impl CmsClients {
    pub fn new(api: ApiClient) -> Self {
        Self {
            blog: BlogClient::new(api.clone()),
            public_blog: PublicBlogClient::new(api.clone()),
            admin: AdminClient::new(api.clone()),
            leads: LeadClient::new(api),
        }
    }
}

/// Owns the submission actor and the clients that talk to it.
///
/// # Example
///
/// ```ignore
/// let config = AppConfig::from_env()?;
/// let system = SubmissionSystem::new(&config, config.session())?;
///
/// let handle = system.submission_client.start_run(draft).await?;
/// let outcome = handle.finish().await?;
///
/// system.shutdown().await?;
/// ```
pub struct SubmissionSystem {
    /// Client for starting submission runs.
    pub submission_client: SubmissionClient,
    /// Present when the system was built against the HTTP backend.
    pub clients: Option<CmsClients>,
    /// Join handles of the spawned actor tasks, awaited on shutdown.
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl SubmissionSystem {
    /// Wires the actor to the REST backend described by `config`.
    ///
    /// Without a session the admin calls, and therefore every run, fail at
    /// the first step with an authentication error.
    pub fn new(config: &AppConfig, session: Option<Session>) -> Result<Self, ApiError> {
        let mut api = ApiClient::new(&config.api_url, config.request_timeout)?;
        if let Some(session) = session {
            api = api.with_session(session);
        }
        let clients = CmsClients::new(api);
        let backend = Collaborators::from_backend(Arc::new(clients.blog.clone()));

        let mut system = Self::with_backend(backend, config.run_channel_capacity);
        system.clients = Some(clients);
        info!(api_url = %config.api_url, "Submission system ready");
        Ok(system)
    }

    /// Wires the actor to arbitrary collaborators.
    ///
    /// # Lifecycle
    ///
    /// 1. Create the actor and its client
    /// 2. Spawn the actor loop with `context`
    /// 3. Keep the join handle for [`shutdown`](Self::shutdown)
    pub fn with_backend(context: Collaborators, run_channel_capacity: usize) -> Self {
        let (actor, submission_client) = SubmissionActor::new(REQUEST_BUFFER, run_channel_capacity);
        let handle = tokio::spawn(actor.run(context));
        Self {
            submission_client,
            clients: None,
            handles: vec![handle],
        }
    }

    /// Drops the clients and waits for the actor to drain.
    ///
    /// # Shutdown Sequence
    ///
    /// 1. Drop the submission client and the REST clients
    /// 2. The actor sees its channel close and exits its loop
    /// 3. Await every actor task
    ///
    /// A run in progress finishes first. Clones of the submission client
    /// held elsewhere keep the actor alive until they are dropped too.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down submission system...");
        drop(self.submission_client);
        drop(self.clients);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
