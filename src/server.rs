//! Server initialization and startup logic for coupon-sniper.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sniper_agent::{AgentSettings, Pacing, Vocabulary};
use sniper_api::{ApiConfig, ApiServer, ApiState};
use sniper_config::{Config, ConfigLoader, ConfigValidator, StoreBackend};
use sniper_driver_cdp::{AgentKit, CdpBrowser, CdpClient, ChromeLauncher, LauncherConfig, Selectors};
use sniper_orchestrator::{
    CaptureOrchestrator, OrchestratorHandle, OrchestratorSettings, SystemClock,
};
use sniper_protocols::{HistoryLimits, ListingTarget};
use sniper_store::{FileStateStore, MemoryStateStore, StateStore, WatchedStore};

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.coupon-sniper/logs/ with daily rotation.
pub(crate) fn init_tracing() -> anyhow::Result<()> {
    let log_dir = ConfigLoader::data_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("coupon-sniper")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes buffered lines on exit; must outlive the subscriber.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Run the browser connection, orchestrator and HTTP server in foreground.
pub(crate) async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("Starting coupon-sniper v{}", env!("CARGO_PKG_VERSION"));

    let warnings = ConfigValidator::validate(&config)?.into_result()?;
    for warning in &warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }

    let store = Arc::new(WatchedStore::open(open_store(&config).await?).await?);
    let (handle, rx) = OrchestratorHandle::channel();

    let launcher = ChromeLauncher::new(launcher_config(&config));
    launcher
        .ensure_running()
        .await
        .context("Chrome is not reachable")?;
    let client = Arc::new(
        CdpClient::connect(&launcher.config().endpoint())
            .await
            .context("failed to connect to Chrome")?,
    );
    info!("Connected to Chrome at {}", launcher.config().endpoint());

    let browser = Arc::new(CdpBrowser::new(
        client,
        agent_kit(&config),
        Arc::new(handle.clone()),
        Arc::new(handle.clone()),
    ));

    // Resume following the tab of a record left by a previous process.
    if let Some(state) = store.current() {
        if let Err(e) = browser.watch(&state.tab_id).await {
            warn!(tab_id = %state.tab_id, "Persisted capture tab is gone: {}", e);
        }
    }

    let shutdown = CancellationToken::new();

    let orchestrator = CaptureOrchestrator::new(
        store.clone(),
        browser.clone(),
        Arc::new(SystemClock),
        orchestrator_settings(&config),
        &handle,
    );
    let orchestrator_task = tokio::spawn(orchestrator.run(rx, shutdown.clone()));

    let state = ApiState::new(handle, store.subscribe()).with_tab_locator(browser);
    let server = ApiServer::new(
        ApiConfig::new(config.server.host.clone(), config.server.port),
        Arc::new(state),
    );

    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        signal.cancel();
    });

    let served = server.run(shutdown.clone()).await;
    shutdown.cancel();

    if tokio::time::timeout(Duration::from_secs(5), orchestrator_task)
        .await
        .is_err()
    {
        warn!("Capture orchestrator did not stop in time");
    }
    launcher.shutdown().await;

    served?;
    info!("coupon-sniper stopped");
    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn StateStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory capture store");
            Ok(Arc::new(MemoryStateStore::new()))
        }
        StoreBackend::File => {
            let path = PathBuf::from(ConfigLoader::expand_path(&config.store.path));
            info!("Using capture store at {}", path.display());
            Ok(Arc::new(FileStateStore::new(path).await?))
        }
    }
}

fn listing_target(config: &Config) -> ListingTarget {
    ListingTarget {
        domain_suffix: config.target.domain_suffix.clone(),
        path_prefix: config.target.path_prefix.clone(),
        entry_url: config.target.entry_url.clone(),
        page_param: config.target.page_param.clone(),
    }
}

fn launcher_config(config: &Config) -> LauncherConfig {
    LauncherConfig {
        debug_port: config.browser.debug_port,
        headless: config.browser.headless,
        profile_dir: config
            .browser
            .profile_dir
            .as_ref()
            .map(|p| PathBuf::from(ConfigLoader::expand_path(&p.to_string_lossy()))),
        launch: config.browser.launch,
    }
}

fn orchestrator_settings(config: &Config) -> OrchestratorSettings {
    OrchestratorSettings {
        listing: listing_target(config),
        limits: HistoryLimits {
            max_logs: config.capture.max_logs,
            max_visited_pages: config.capture.max_visited_pages,
        },
        default_pause_minutes: config.capture.default_pause_minutes,
    }
}

fn agent_kit(config: &Config) -> AgentKit {
    let pacing = &config.pacing;
    let vocabulary = &config.vocabulary;
    let selectors = &config.selectors;

    AgentKit {
        vocabulary: Arc::new(Vocabulary::new(
            &vocabulary.actions,
            &vocabulary.boilerplate,
            &vocabulary.dismiss,
        )),
        settings: AgentSettings {
            pacing: Pacing {
                pre_click: Duration::from_millis(pacing.pre_click_ms),
                post_click: Duration::from_millis(pacing.post_click_ms),
                scroll_settle: Duration::from_millis(pacing.scroll_settle_ms),
                max_scroll_rounds: pacing.max_scroll_rounds,
                stable_rounds: pacing.stable_rounds,
                modal_poll: Duration::from_millis(pacing.modal_poll_ms),
            },
            listing: listing_target(config),
            title_max_chars: config.capture.title_max_chars,
        },
        selectors: Selectors {
            controls: selectors.controls.clone(),
            card: selectors.card.clone(),
            title_card: selectors.title_card.clone(),
            title: selectors.title.clone(),
            close_marker_class: selectors.close_marker_class.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_component_defaults() {
        let config = Config::default();
        assert_eq!(listing_target(&config), ListingTarget::default());
        assert_eq!(agent_kit(&config).selectors, Selectors::default());

        let settings = orchestrator_settings(&config);
        assert_eq!(settings.default_pause_minutes, 2);
        assert_eq!(settings.limits.max_logs, HistoryLimits::default().max_logs);
        assert_eq!(
            settings.limits.max_visited_pages,
            HistoryLimits::default().max_visited_pages
        );
    }

    #[test]
    fn test_pacing_converted_to_durations() {
        let mut config = Config::default();
        config.pacing.post_click_ms = 1500;
        config.capture.title_max_chars = 40;

        let kit = agent_kit(&config);
        assert_eq!(kit.settings.pacing.post_click, Duration::from_millis(1500));
        assert_eq!(kit.settings.pacing.pre_click, Duration::from_millis(500));
        assert_eq!(kit.settings.title_max_chars, 40);
    }

    #[test]
    fn test_launcher_config_expands_profile_dir() {
        let mut config = Config::default();
        config.browser.profile_dir = Some(PathBuf::from("~/chrome-profile"));
        config.browser.debug_port = 9333;

        let launcher = launcher_config(&config);
        assert_eq!(launcher.debug_port, 9333);
        let profile = launcher.profile_dir.unwrap();
        assert!(!profile.to_string_lossy().starts_with('~'));
        assert!(profile.ends_with("chrome-profile"));
    }

    #[test]
    fn test_shipped_config_is_valid_and_default() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let config = ConfigLoader::load(&path).unwrap();
        let warnings = ConfigValidator::validate(&config).unwrap().into_result().unwrap();
        assert!(warnings.is_empty());

        let defaults = Config::default();
        assert_eq!(listing_target(&config), listing_target(&defaults));
        assert_eq!(agent_kit(&config).selectors, agent_kit(&defaults).selectors);
        assert_eq!(config.vocabulary.actions, defaults.vocabulary.actions);
        assert_eq!(config.server.base_url(), defaults.server.base_url());
    }

    #[tokio::test]
    async fn test_memory_store_backend() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Memory;
        let store = open_store(&config).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
