use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub history: HistoryConfig,
    pub notifications: NotificationConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    /// Empty means "same origin as the page"
    #[serde(default)]
    pub base_url: String,
    pub send_report_path: String,
    pub resources_path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HistoryConfig {
    pub search_debounce_ms: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NotificationConfig {
    pub ttl_ms: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ReportConfig {
    pub cookie_name: String,
    pub cookie_ttl_days: u32,
}

/// Default configuration embedded in the bundle
const DEFAULT_CONFIG: &str = r#"
[api]
base_url = ""
send_report_path = "/api/v1/send-report"
resources_path = "/api/v1/resources"

[history]
search_debounce_ms = 300

[notifications]
ttl_ms = 6000

[report]
cookie_name = "toEmails"
cookie_ttl_days = 7
"#;

/// Parses a configuration document.
///
/// The debounce is kept at 300 ms or more so typing never floods the history.
pub fn parse_config(contents: &str) -> Result<DashboardConfig, toml::de::Error> {
    let mut config: DashboardConfig = toml::from_str(contents)?;
    if config.history.search_debounce_ms < 300 {
        log::warn!(
            "config: search_debounce_ms={} raised to 300",
            config.history.search_debounce_ms
        );
        config.history.search_debounce_ms = 300;
    }
    Ok(config)
}

/// Embedded configuration
pub fn load_config() -> DashboardConfig {
    match parse_config(DEFAULT_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            log::error!("config: embedded configuration is invalid: {}", e);
            DashboardConfig::fallback()
        }
    }
}

impl DashboardConfig {
    fn fallback() -> Self {
        Self {
            api: ApiConfig {
                base_url: String::new(),
                send_report_path: "/api/v1/send-report".to_string(),
                resources_path: "/api/v1/resources".to_string(),
            },
            history: HistoryConfig {
                search_debounce_ms: 300,
            },
            notifications: NotificationConfig { ttl_ms: 6000 },
            report: ReportConfig {
                cookie_name: "toEmails".to_string(),
                cookie_ttl_days: 7,
            },
        }
    }
}
