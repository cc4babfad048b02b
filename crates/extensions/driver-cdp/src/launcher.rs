//! Chrome discovery and launch.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cdp::CdpError;

/// How to reach (or start) the browser.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Chrome debugging port.
    pub debug_port: u16,
    pub headless: bool,
    /// Profile directory; keeps the retail site's login between runs.
    pub profile_dir: Option<PathBuf>,
    /// Launch Chrome when nothing answers on the port.
    pub launch: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            headless: false,
            profile_dir: None,
            launch: true,
        }
    }
}

impl LauncherConfig {
    /// The profile directory, defaulting under the home directory.
    pub fn profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".coupon-sniper")
                .join("browser-profile")
        })
    }

    /// The CDP HTTP endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}

/// Starts Chrome on demand and owns the process it started.
pub struct ChromeLauncher {
    config: LauncherConfig,
    process: Mutex<Option<Child>>,
}

impl ChromeLauncher {
    pub fn new(config: LauncherConfig) -> Self {
        Self {
            config,
            process: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Find a Chrome-compatible executable.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        let paths: &[&str] = &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];

        #[cfg(target_os = "linux")]
        let paths: &[&str] = &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths: &[&str] = &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let paths: &[&str] = &[];

        paths.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Whether something answers CDP on the debug port.
    pub async fn is_running(&self) -> bool {
        reqwest::get(format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    /// Make sure Chrome listens on the debug port, launching it if allowed.
    pub async fn ensure_running(&self) -> Result<(), CdpError> {
        if self.is_running().await {
            info!("Chrome already running on port {}", self.config.debug_port);
            return Ok(());
        }
        if !self.config.launch {
            return Err(CdpError::ChromeNotAvailable(self.config.endpoint()));
        }

        info!("Chrome not running on port {}, launching...", self.config.debug_port);
        let child = self.launch().await?;
        *self.process.lock().await = Some(child);

        for _ in 0..30 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            if self.is_running().await {
                return Ok(());
            }
        }
        Err(CdpError::LaunchFailed(
            "Chrome failed to start within timeout".to_string(),
        ))
    }

    async fn launch(&self) -> Result<Child, CdpError> {
        let chrome_path = Self::find_chrome().ok_or(CdpError::ChromeNotFound)?;
        let profile_dir = self.config.profile_dir();

        if let Err(e) = tokio::fs::create_dir_all(&profile_dir).await {
            warn!("Failed to create profile directory: {}", e);
        }

        info!("Launching Chrome with profile at: {}", profile_dir.display());

        let mut cmd = Command::new(&chrome_path);
        cmd.arg(format!("--remote-debugging-port={}", self.config.debug_port))
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if self.config.headless {
            cmd.arg("--headless=new");
        }

        let child = cmd
            .spawn()
            .map_err(|e| CdpError::LaunchFailed(e.to_string()))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(child)
    }

    /// Stop Chrome if this launcher started it.
    pub async fn shutdown(&self) {
        if let Some(mut child) = self.process.lock().await.take() {
            info!("Shutting down Chrome...");
            let _ = child.kill().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LauncherConfig::default();
        assert_eq!(config.debug_port, 9222);
        assert!(!config.headless);
        assert!(config.launch);
        assert_eq!(config.endpoint(), "http://localhost:9222");
    }

    #[test]
    fn test_profile_dir_default_and_override() {
        let config = LauncherConfig::default();
        assert!(config.profile_dir().ends_with(".coupon-sniper/browser-profile"));

        let config = LauncherConfig {
            profile_dir: Some(PathBuf::from("/tmp/sniper-profile")),
            ..Default::default()
        };
        assert_eq!(config.profile_dir(), PathBuf::from("/tmp/sniper-profile"));
    }

    #[tokio::test]
    async fn test_no_launch_fails_fast_when_absent() {
        let launcher = ChromeLauncher::new(LauncherConfig {
            debug_port: 9,
            launch: false,
            ..Default::default()
        });
        let err = launcher.ensure_running().await.unwrap_err();
        assert!(matches!(err, CdpError::ChromeNotAvailable(_)));
    }
}
