//! Chromium implementation of the session contract over the DevTools
//! protocol.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventRequestWillBeSent, ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::{BrowserMode, BrowserSettings, RemoteEndpoint};
use crate::error::BrowserError;
use crate::remote::HostedSessionClient;
use crate::session::{NetworkRequest, PageHandle, RenderSession, ResourceKind, SessionFactory};
use crate::viewport::Viewport;

/// Map a DevTools resource type onto the coarse kinds the asset inventory
/// cares about.
pub fn resource_kind(resource_type: Option<&ResourceType>) -> ResourceKind {
    match resource_type {
        Some(ResourceType::Document) => ResourceKind::Document,
        Some(ResourceType::Stylesheet) => ResourceKind::Stylesheet,
        Some(ResourceType::Image) => ResourceKind::Image,
        Some(ResourceType::Font) => ResourceKind::Font,
        Some(ResourceType::Script) => ResourceKind::Script,
        _ => ResourceKind::Other,
    }
}

/// Requests seen by a page plus the time of the most recent one.
#[derive(Debug)]
struct NetworkLog {
    requests: Vec<NetworkRequest>,
    last_activity: Instant,
}

impl NetworkLog {
    fn new() -> Self {
        Self {
            requests: Vec::new(),
            last_activity: Instant::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Opens Chromium sessions in local or remote mode.
pub struct ChromiumSessionFactory {
    settings: BrowserSettings,
    hosted: Option<HostedSessionClient>,
}

impl ChromiumSessionFactory {
    pub fn new(settings: BrowserSettings) -> Result<Self, BrowserError> {
        let hosted = match &settings.mode {
            BrowserMode::Remote(RemoteEndpoint::Hosted {
                api_url,
                api_key,
                project_id,
            }) => Some(HostedSessionClient::new(api_url, api_key, project_id)?),
            _ => None,
        };
        Ok(Self { settings, hosted })
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    async fn start_browser(&self) -> Result<(Browser, JoinHandle<()>), BrowserError> {
        let (browser, mut handler) = match &self.settings.mode {
            BrowserMode::Local {
                executable,
                headless,
            } => {
                let viewport = &self.settings.default_viewport;
                let mut builder = BrowserConfig::builder()
                    .no_sandbox()
                    .window_size(viewport.width, viewport.height);
                if let Some(path) = executable {
                    builder = builder.chrome_executable(path);
                }
                if !headless {
                    builder = builder.with_head();
                }
                let config = builder.build().map_err(BrowserError::Launch)?;
                Browser::launch(config)
                    .await
                    .map_err(|e| BrowserError::Launch(e.to_string()))?
            }
            BrowserMode::Remote(RemoteEndpoint::Direct { ws_url }) => Browser::connect(ws_url)
                .await
                .map_err(|e| BrowserError::Connection(e.to_string()))?,
            BrowserMode::Remote(RemoteEndpoint::Hosted { .. }) => {
                let client = self.hosted.as_ref().ok_or_else(|| {
                    BrowserError::Config("hosted session client not initialised".to_string())
                })?;
                let session = client.create_session().await?;
                Browser::connect(session.connect_url.as_str())
                    .await
                    .map_err(|e| BrowserError::Connection(e.to_string()))?
            }
        };

        // The handler must be polled for the browser to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "Browser handler stopped");
                    break;
                }
            }
        });

        Ok((browser, handler_task))
    }

    async fn prepare_page(
        &self,
        browser: &Browser,
        context_id: BrowserContextId,
    ) -> Result<(Page, Arc<Mutex<NetworkLog>>, JoinHandle<()>), BrowserError> {
        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id)
            .build()
            .map_err(BrowserError::Protocol)?;
        let page = browser.new_page(target).await?;

        page.execute(SetUserAgentOverrideParams::new(self.settings.user_agent.clone()))
            .await?;
        page.execute(device_metrics(&self.settings.default_viewport))
            .await?;
        page.execute(EnableParams::default()).await?;

        let log = Arc::new(Mutex::new(NetworkLog::new()));
        let mut requests = page.event_listener::<EventRequestWillBeSent>().await?;
        let sink = Arc::clone(&log);
        let listener = tokio::spawn(async move {
            while let Some(event) = requests.next().await {
                let kind = resource_kind(event.r#type.as_ref());
                if let Ok(mut log) = sink.lock() {
                    log.requests
                        .push(NetworkRequest::new(event.request.url.clone(), kind));
                    log.last_activity = Instant::now();
                }
            }
        });

        Ok((page, log, listener))
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    async fn open(&self) -> Result<Box<dyn RenderSession>, BrowserError> {
        let (browser, handler_task) = self.start_browser().await?;

        let context_id = match browser
            .execute(CreateBrowserContextParams::default())
            .await
        {
            Ok(resp) => resp.result.browser_context_id.clone(),
            Err(e) => {
                handler_task.abort();
                return Err(e.into());
            }
        };

        match self.prepare_page(&browser, context_id.clone()).await {
            Ok((page, log, listener)) => {
                tracing::debug!("Render session opened");
                Ok(Box::new(ChromiumSession {
                    browser,
                    context_id,
                    page: ChromiumPage { page, log },
                    handler_task,
                    listener,
                    navigation_timeout: self.settings.navigation_timeout,
                    network_idle: self.settings.network_idle,
                    settle_delay: self.settings.settle_delay,
                }))
            }
            Err(e) => {
                let mut browser = browser;
                let _ = browser
                    .execute(DisposeBrowserContextParams::new(context_id))
                    .await;
                let _ = browser.close().await;
                handler_task.abort();
                Err(e)
            }
        }
    }
}

fn device_metrics(viewport: &Viewport) -> SetDeviceMetricsOverrideParams {
    SetDeviceMetricsOverrideParams::new(
        i64::from(viewport.width),
        i64::from(viewport.height),
        1.0,
        false,
    )
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct ChromiumSession {
    browser: Browser,
    context_id: BrowserContextId,
    page: ChromiumPage,
    handler_task: JoinHandle<()>,
    listener: JoinHandle<()>,
    navigation_timeout: Duration,
    network_idle: Duration,
    settle_delay: Duration,
}

impl ChromiumSession {
    /// Resolve once no request has been issued for `network_idle`.
    async fn wait_for_network_idle(&self) {
        loop {
            let last = match self.page.log.lock() {
                Ok(log) => log.last_activity,
                Err(_) => return,
            };
            let quiet_at = last + self.network_idle;
            if Instant::now() >= quiet_at {
                return;
            }
            tokio::time::sleep_until(quiet_at).await;
        }
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        let load = async {
            self.page
                .page
                .goto(url)
                .await
                .map_err(|e| BrowserError::Navigation(e.to_string()))?;
            self.wait_for_network_idle().await;
            Ok::<(), BrowserError>(())
        };

        tokio::time::timeout(self.navigation_timeout, load)
            .await
            .map_err(|_| BrowserError::Timeout(self.navigation_timeout))??;

        tokio::time::sleep(self.settle_delay).await;
        tracing::debug!(url, "Page loaded and settled");
        Ok(())
    }

    fn page(&self) -> &dyn PageHandle {
        &self.page
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        let ChromiumSession {
            mut browser,
            context_id,
            page,
            handler_task,
            listener,
            ..
        } = *self;

        listener.abort();
        if let Err(e) = page.page.close().await {
            tracing::debug!(error = %e, "Page close failed");
        }
        let disposed = browser
            .execute(DisposeBrowserContextParams::new(context_id))
            .await;
        let closed = browser.close().await;
        let _ = browser.wait().await;
        handler_task.abort();

        disposed?;
        closed?;
        tracing::debug!("Render session closed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

pub struct ChromiumPage {
    page: Page,
    log: Arc<Mutex<NetworkLog>>,
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;
        result
            .into_value::<serde_json::Value>()
            .map_err(|e| BrowserError::Evaluation(e.to_string()))
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(self.page.content().await?)
    }

    async fn set_viewport(&self, viewport: &Viewport) -> Result<(), BrowserError> {
        self.page.execute(device_metrics(viewport)).await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, BrowserError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page
            .screenshot(params)
            .await
            .map_err(|e| BrowserError::Screenshot(e.to_string()))
    }

    fn network_requests(&self) -> Vec<NetworkRequest> {
        self.log
            .lock()
            .map(|log| log.requests.clone())
            .unwrap_or_default()
    }
}
