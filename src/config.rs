use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};

/// Optional settings file, looked up in the working directory.
const CONFIG_FILE: &str = "invoice-generator";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub print: PrintConfig,
    pub issuer: IssuerProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Workflow endpoint credentials; both are checked on every fetch.
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub url: Option<String>,
    pub key: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("url", &self.url)
            .field("key", &self.key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintConfig {
    /// Delay before the print dialog opens, so layout can settle.
    pub grace_ms: u64,
    /// Staged print jobs are released after this long without a completion signal.
    pub retention_secs: u64,
}

/// Issuer identity printed on every invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuerProfile {
    pub name: String,
    pub address: String,
    pub bank: String,
    pub logo_url: String,
    pub default_item: String,
    pub inquiry_note: String,
}

impl Default for IssuerProfile {
    fn default() -> Self {
        Self {
            name: "(주)GS".to_string(),
            address: "서울특별시 강남구 논현로 508 GS타워".to_string(),
            bank: "우리은행 982-018207-01-002 ㈜지에스".to_string(),
            logo_url: "/miso-logo.png".to_string(),
            default_item: "PLAI 패키지".to_string(),
            inquiry_note: "기타 문의사항은 (주)GS 업무지원팀 이수민 매니저에게 문의하시기 바랍니다."
                .to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            upstream: UpstreamConfig {
                url: None,
                key: None,
                timeout_secs: 60,
            },
            print: PrintConfig {
                grace_ms: 1000,
                retention_secs: 60,
            },
            issuer: IssuerProfile::default(),
        }
    }
}

impl AppConfig {
    /// Loads defaults, then `invoice-generator.toml` if present, then environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let issuer = &defaults.issuer;

        let settings = Config::builder()
            .set_default("server.host", defaults.server.host.clone())?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("upstream.timeout_secs", defaults.upstream.timeout_secs as i64)?
            .set_default("print.grace_ms", defaults.print.grace_ms as i64)?
            .set_default("print.retention_secs", defaults.print.retention_secs as i64)?
            .set_default("issuer.name", issuer.name.clone())?
            .set_default("issuer.address", issuer.address.clone())?
            .set_default("issuer.bank", issuer.bank.clone())?
            .set_default("issuer.logo_url", issuer.logo_url.clone())?
            .set_default("issuer.default_item", issuer.default_item.clone())?
            .set_default("issuer.inquiry_note", issuer.inquiry_note.clone())?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .set_override_option("server.host", env_var("SERVER_HOST"))?
            .set_override_option(
                "server.port",
                env_var("SERVER_PORT")
                    .and_then(|p| p.parse::<u16>().ok())
                    .map(i64::from),
            )?
            .set_override_option("upstream.url", env_var("MISO_URL"))?
            .set_override_option("upstream.key", env_var("MISO_KEY"))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
