use rand::Rng;
use storefront_core::BrowserSettings;

/// Used when the configured pool is empty.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Injected before any page script runs.
pub const STEALTH_SCRIPT: &str = r"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
window.chrome = window.chrome || { runtime: {} };
";

/// Fingerprint configuration for anti-detection
#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub stealth: bool,
}

impl FingerprintConfig {
    /// Pick a user agent at random from the configured pool.
    pub fn from_settings(settings: &BrowserSettings) -> Self {
        Self::from_settings_with(settings, &mut rand::thread_rng())
    }

    pub fn from_settings_with<R: Rng + ?Sized>(settings: &BrowserSettings, rng: &mut R) -> Self {
        let user_agent = if settings.user_agents.is_empty() {
            DEFAULT_USER_AGENT.to_string()
        } else {
            let idx = rng.gen_range(0..settings.user_agents.len());
            settings.user_agents[idx].clone()
        };

        Self {
            user_agent,
            viewport_width: settings.window_width,
            viewport_height: settings.window_height,
            stealth: settings.stealth,
        }
    }

    /// Chrome command-line switches for this fingerprint.
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec![
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-extensions".to_string(),
            "--disable-web-security".to_string(),
            "--disable-features=VizDisplayCompositor".to_string(),
        ];
        if self.stealth {
            args.push("--disable-blink-features=AutomationControlled".to_string());
        }
        args
    }
}
