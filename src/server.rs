//! Reusable device registry server runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the full server lifecycle:
//! metrics registry, seeded device store, the devices and metrics listeners,
//! and graceful shutdown.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{AppConfig, ListenerLayout};
use crate::domain::DomainError;
use crate::interfaces::http::{devices_router, metrics_router, single_router, AppState};
use crate::support::shutdown::{ShutdownCoordinator, ShutdownSignal};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to initialize device store: {0}")]
    Init(#[from] DomainError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the device registry.
#[derive(Default)]
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running device registry.
///
/// # Examples
///
/// ```rust,no_run
/// use device_registry::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     // ... wait for shutdown signal ...
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Shared handler state (device service and metrics registry).
    pub state: AppState,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the devices listener is bound to.
    pub devices_addr: SocketAddr,
    /// Address the metrics listener is bound to; `None` in the single layout.
    pub metrics_addr: Option<SocketAddr>,

    shutdown: ShutdownCoordinator,
    tasks: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Start the device registry with the given options.
    ///
    /// Builds the metrics registry and the seeded store, binds the
    /// listener(s) required by the configured layout and spawns one serving
    /// task per listener. Fails if any listener cannot be bound.
    pub async fn start(opts: ServerOptions) -> Result<Self, ServerError> {
        let app_cfg = opts.config;

        info!("Starting device registry...");

        let state = AppState::from_config(&app_cfg).await?;
        info!(
            "📊 Metrics registry ready (version {})",
            app_cfg.app.version
        );

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let signal = shutdown.signal();
        let mut tasks = Vec::new();

        let (devices_addr, metrics_addr) = match app_cfg.server.layout {
            ListenerLayout::Single => {
                let listener = bind(&app_cfg.server.devices_address()).await?;
                let addr = local_addr(&listener, &app_cfg.server.devices_address())?;
                info!("Devices and metrics listening on http://{}", addr);

                let router = single_router(state.clone());
                tasks.push(spawn_listener("devices", listener, router, signal.clone()));
                (addr, None)
            }
            ListenerLayout::Split => {
                let devices_listener = bind(&app_cfg.server.devices_address()).await?;
                let metrics_listener = bind(&app_cfg.server.metrics_address()).await?;
                let devices_addr =
                    local_addr(&devices_listener, &app_cfg.server.devices_address())?;
                let metrics_addr =
                    local_addr(&metrics_listener, &app_cfg.server.metrics_address())?;
                info!("Devices listening on http://{}", devices_addr);
                info!("Metrics listening on http://{}", metrics_addr);

                tasks.push(spawn_listener(
                    "devices",
                    devices_listener,
                    devices_router(state.clone()),
                    signal.clone(),
                ));
                tasks.push(spawn_listener(
                    "metrics",
                    metrics_listener,
                    metrics_router(state.clone()),
                    signal.clone(),
                ));
                (devices_addr, Some(metrics_addr))
            }
        };

        info!("🚀 All listeners started.");

        Ok(Self {
            state,
            config: app_cfg,
            devices_addr,
            metrics_addr,
            shutdown,
            tasks,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    ///
    /// Call [`ServerHandle::wait`] to block until the listeners have stopped.
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for every listener to stop, bounded by the shutdown timeout.
    pub async fn wait(self) {
        info!("⏳ Waiting for listeners to stop...");

        let tasks = self.tasks;
        let drained = self
            .shutdown
            .drain(async move {
                for task in tasks {
                    if let Err(e) = task.await {
                        error!("Listener task panicked: {}", e);
                    }
                }
            })
            .await;

        if drained {
            info!("👋 Device registry shutdown complete");
        }
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down device registry...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if any listener is still running.
    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|task| !task.is_finished())
    }
}

// ── Helpers ────────────────────────────────────────────────────────

async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })
}

fn local_addr(listener: &TcpListener, addr: &str) -> Result<SocketAddr, ServerError> {
    listener.local_addr().map_err(|source| ServerError::Bind {
        addr: addr.to_string(),
        source,
    })
}

fn spawn_listener(
    name: &'static str,
    listener: TcpListener,
    router: axum::Router,
    signal: ShutdownSignal,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                signal.wait().await;
                info!("🛑 {} listener received shutdown signal", name);
            })
            .await;

        match served {
            Ok(()) => info!("{} listener stopped", name),
            Err(e) => error!("{} listener error: {}", name, e),
        }
    })
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::*;

    fn ephemeral(layout: ListenerLayout) -> ServerOptions {
        let mut config = AppConfig::default();
        config.server.devices_host = "127.0.0.1".to_string();
        config.server.metrics_host = "127.0.0.1".to_string();
        config.server.devices_port = 0;
        config.server.metrics_port = 0;
        config.server.layout = layout;
        config.server.shutdown_timeout = 5;
        ServerOptions { config }
    }

    async fn http(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    fn get(path: &str) -> String {
        format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
    }

    #[tokio::test]
    async fn split_layout_serves_each_route_on_its_own_listener() {
        let handle = ServerHandle::start(ephemeral(ListenerLayout::Split))
            .await
            .unwrap();
        let metrics_addr = handle.metrics_addr.unwrap();
        assert_ne!(handle.devices_addr, metrics_addr);

        let devices = http(handle.devices_addr, &get("/devices")).await;
        assert!(devices.starts_with("HTTP/1.1 200 OK"), "{devices}");
        assert!(devices.contains("5F-22-CC-1F-43-82"));

        let body = r#"{"id":3,"mac":"AB-CD-EF-01-23-45","firmware":"1.0.0"}"#;
        let post = format!(
            "POST /devices HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let created = http(handle.devices_addr, &post).await;
        assert!(created.starts_with("HTTP/1.1 201 Created"), "{created}");

        let metrics = http(metrics_addr, &get("/metrics")).await;
        assert!(metrics.starts_with("HTTP/1.1 200 OK"), "{metrics}");
        assert!(metrics.contains("myapp_connected_devices 3"));
        assert!(metrics.contains(r#"myapp_info{version="2.10.5"} 1"#));

        let handle_signal = handle.shutdown_signal();
        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .unwrap();
        assert!(handle_signal.is_triggered());
    }

    #[tokio::test]
    async fn single_layout_serves_everything_on_one_listener() {
        let handle = ServerHandle::start(ephemeral(ListenerLayout::Single))
            .await
            .unwrap();
        assert!(handle.metrics_addr.is_none());

        let metrics = http(handle.devices_addr, &get("/metrics")).await;
        assert!(metrics.starts_with("HTTP/1.1 200 OK"), "{metrics}");

        handle.trigger_shutdown();
        tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let mut opts = ephemeral(ListenerLayout::Single);
        opts.config.server.devices_port = port;

        let err = ServerHandle::start(opts).await.err().unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));
    }
}
