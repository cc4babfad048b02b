//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub pacing: PacingConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub vocabulary: VocabularyConfig,

    #[serde(default)]
    pub selectors: SelectorsConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

/// The listing site being harvested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,

    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    #[serde(default = "default_entry_url")]
    pub entry_url: String,

    #[serde(default = "default_page_param")]
    pub page_param: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            domain_suffix: default_domain_suffix(),
            path_prefix: default_path_prefix(),
            entry_url: default_entry_url(),
            page_param: default_page_param(),
        }
    }
}

fn default_domain_suffix() -> String {
    "mercadolivre.com.br".to_string()
}

fn default_path_prefix() -> String {
    "/cupons".to_string()
}

fn default_entry_url() -> String {
    "https://www.mercadolivre.com.br/cupons/filter?all=true&source_page=int_view_all".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

/// Human-like pacing of the harvesting pass, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_pre_click_ms")]
    pub pre_click_ms: u64,

    #[serde(default = "default_post_click_ms")]
    pub post_click_ms: u64,

    #[serde(default = "default_scroll_settle_ms")]
    pub scroll_settle_ms: u64,

    #[serde(default = "default_max_scroll_rounds")]
    pub max_scroll_rounds: u32,

    /// Consecutive non-growing rounds that end convergence early.
    #[serde(default = "default_stable_rounds")]
    pub stable_rounds: u32,

    #[serde(default = "default_modal_poll_ms")]
    pub modal_poll_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            pre_click_ms: default_pre_click_ms(),
            post_click_ms: default_post_click_ms(),
            scroll_settle_ms: default_scroll_settle_ms(),
            max_scroll_rounds: default_max_scroll_rounds(),
            stable_rounds: default_stable_rounds(),
            modal_poll_ms: default_modal_poll_ms(),
        }
    }
}

fn default_pre_click_ms() -> u64 {
    500
}

fn default_post_click_ms() -> u64 {
    1100
}

fn default_scroll_settle_ms() -> u64 {
    1100
}

fn default_max_scroll_rounds() -> u32 {
    5
}

fn default_stable_rounds() -> u32 {
    2
}

fn default_modal_poll_ms() -> u64 {
    250
}

/// Run bookkeeping limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_pause_minutes")]
    pub default_pause_minutes: u64,

    #[serde(default = "default_max_logs")]
    pub max_logs: usize,

    #[serde(default = "default_max_visited_pages")]
    pub max_visited_pages: usize,

    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            default_pause_minutes: default_pause_minutes(),
            max_logs: default_max_logs(),
            max_visited_pages: default_max_visited_pages(),
            title_max_chars: default_title_max_chars(),
        }
    }
}

fn default_pause_minutes() -> u64 {
    2
}

fn default_max_logs() -> usize {
    100
}

fn default_max_visited_pages() -> usize {
    40
}

fn default_title_max_chars() -> usize {
    80
}

/// Words the harvesting heuristics recognize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Claim verbs; a control qualifies when its text contains one as a word.
    #[serde(default = "default_actions")]
    pub actions: Vec<String>,

    /// Card lines that never name a coupon.
    #[serde(default = "default_boilerplate")]
    pub boilerplate: Vec<String>,

    /// Exact texts of modal acknowledge buttons.
    #[serde(default = "default_dismiss")]
    pub dismiss: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            actions: default_actions(),
            boilerplate: default_boilerplate(),
            dismiss: default_dismiss(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_actions() -> Vec<String> {
    strings(&[
        "aplicar", "ganhar", "resgatar", "usar", "ativar", "pegar", "apply", "claim", "redeem",
        "use", "activate", "get",
    ])
}

fn default_boilerplate() -> Vec<String> {
    strings(&[
        "ver mais",
        "saiba mais",
        "termos",
        "regras",
        "cupom",
        "see more",
        "learn more",
        "terms",
        "rules",
        "coupon",
    ])
}

fn default_dismiss() -> Vec<String> {
    strings(&["ok", "entendi"])
}

/// CSS selectors used by the page bootstrap script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorsConfig {
    #[serde(default = "default_controls_selector")]
    pub controls: String,

    /// Ancestor match for the card enclosing a control.
    #[serde(default = "default_card_selector")]
    pub card: String,

    /// Card type that carries a dedicated title element.
    #[serde(default = "default_title_card_selector")]
    pub title_card: String,

    #[serde(default = "default_title_selector")]
    pub title: String,

    #[serde(default = "default_close_marker_class")]
    pub close_marker_class: String,
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            controls: default_controls_selector(),
            card: default_card_selector(),
            title_card: default_title_card_selector(),
            title: default_title_selector(),
            close_marker_class: default_close_marker_class(),
        }
    }
}

fn default_controls_selector() -> String {
    "button,a,span,[role='button']".to_string()
}

fn default_card_selector() -> String {
    ".andes-card,li,article,section,[data-testid*='coupon'],[class*='coupon']".to_string()
}

fn default_title_card_selector() -> String {
    ".andes-card".to_string()
}

fn default_title_selector() -> String {
    ".title".to_string()
}

fn default_close_marker_class() -> String {
    "andes-modal__close".to_string()
}

/// Browser connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default)]
    pub headless: bool,

    #[serde(default)]
    pub profile_dir: Option<PathBuf>,

    /// Launch Chrome when nothing answers on `debug_port`.
    #[serde(default = "default_true")]
    pub launch: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: false,
            profile_dir: None,
            launch: true,
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_true() -> bool {
    true
}

/// HTTP control surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl ServerConfig {
    /// Base URL clients use to reach the server.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Persisted-record storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "~/.coupon-sniper/state.json".to_string()
}

/// Store backend kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
}
