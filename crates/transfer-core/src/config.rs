//! Configuration module
//!
//! Process-wide settings for the portal: listen port, outbound mail relay and
//! credentials, facility inbox, access-key allow-list and document output.
//! Loaded once at startup and shared immutably afterwards.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::access::AccessList;

const SERVER_PORT: u16 = 4000;
const SMTP_HOST: &str = "smtp.gmail.com";
const SMTP_IMPLICIT_TLS_PORT: u16 = 465;
const SMTP_STARTTLS_PORT: u16 = 587;
const MAX_UPLOAD_SIZE_MB: usize = 25;
const OUTPUT_DIR: &str = "./generated";
const SESSION_IDLE_TIMEOUT_MINS: u64 = 120;
const MAX_SESSIONS: usize = 1000;

/// How the SMTP connection is secured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmtpTlsMode {
    /// TLS from the first byte (SMTPS, usually port 465)
    Implicit,
    /// Plain connection upgraded with STARTTLS (usually port 587)
    StartTls,
}

impl SmtpTlsMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "implicit" | "ssl" | "smtps" => Some(Self::Implicit),
            "starttls" | "tls" => Some(Self::StartTls),
            _ => None,
        }
    }

    fn default_port(self) -> u16 {
        match self {
            Self::Implicit => SMTP_IMPLICIT_TLS_PORT,
            Self::StartTls => SMTP_STARTTLS_PORT,
        }
    }
}

/// Portal configuration
#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub server_port: u16,
    pub environment: String,
    // Outbound mail
    pub sender_email: String,
    pub sender_password: String,
    pub facility_email: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_tls: SmtpTlsMode,
    // Access control
    pub access_keys: AccessList,
    // Documents and uploads
    pub output_dir: PathBuf,
    pub pdf_logo_path: Option<PathBuf>,
    pub email_logo_path: Option<PathBuf>,
    pub max_upload_size_bytes: usize,
    // Session registry
    pub session_idle_timeout: Duration,
    pub max_sessions: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<PortalConfig>);

impl Config {
    fn as_portal(&self) -> &PortalConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_portal().environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = PortalConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_portal().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_portal().server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_portal().environment
    }

    pub fn sender_email(&self) -> &str {
        &self.as_portal().sender_email
    }

    pub fn sender_password(&self) -> &str {
        &self.as_portal().sender_password
    }

    pub fn facility_email(&self) -> &str {
        &self.as_portal().facility_email
    }

    pub fn smtp_host(&self) -> &str {
        &self.as_portal().smtp_host
    }

    pub fn smtp_port(&self) -> u16 {
        self.as_portal().smtp_port
    }

    pub fn smtp_tls(&self) -> SmtpTlsMode {
        self.as_portal().smtp_tls
    }

    pub fn access_keys(&self) -> &AccessList {
        &self.as_portal().access_keys
    }

    pub fn output_dir(&self) -> &Path {
        &self.as_portal().output_dir
    }

    pub fn pdf_logo_path(&self) -> Option<&Path> {
        self.as_portal().pdf_logo_path.as_deref()
    }

    pub fn email_logo_path(&self) -> Option<&Path> {
        self.as_portal().email_logo_path.as_deref()
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_portal().max_upload_size_bytes
    }

    /// Sessions untouched for this long are dropped together with their documents.
    pub fn session_idle_timeout(&self) -> Duration {
        self.as_portal().session_idle_timeout
    }

    pub fn max_sessions(&self) -> usize {
        self.as_portal().max_sessions
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` passes the process environment; tests pass a map so they do not
    /// race on global state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let smtp_tls = match var("SMTP_TLS") {
            Some(value) => SmtpTlsMode::parse(&value).ok_or_else(|| {
                anyhow::anyhow!("SMTP_TLS must be 'implicit' or 'starttls', got '{}'", value)
            })?,
            None => SmtpTlsMode::Implicit,
        };

        let access_keys = var("ACCESS_KEYS")
            .or_else(|| var("USERS"))
            .map(|s| AccessList::new(s.split(',')))
            .ok_or_else(|| anyhow::anyhow!("ACCESS_KEYS must be set to a comma-separated list"))?;

        let config = PortalConfig {
            server_port: var("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            sender_email: var("SENDER_EMAIL")
                .map(|s| s.trim().to_string())
                .ok_or_else(|| anyhow::anyhow!("SENDER_EMAIL must be set"))?,
            sender_password: var("APP_PASSWORD")
                .or_else(|| var("SMTP_PASSWORD"))
                .ok_or_else(|| anyhow::anyhow!("APP_PASSWORD must be set for SMTP login"))?,
            facility_email: var("FACILITY_EMAIL")
                .or_else(|| var("DEFAULT_EMAIL"))
                .map(|s| s.trim().to_string())
                .ok_or_else(|| anyhow::anyhow!("FACILITY_EMAIL or DEFAULT_EMAIL must be set"))?,
            smtp_host: var("SMTP_HOST").unwrap_or_else(|| SMTP_HOST.to_string()),
            smtp_port: var("SMTP_PORT")
                .and_then(|s| s.parse().ok())
                .filter(|&p| p > 0)
                .unwrap_or_else(|| smtp_tls.default_port()),
            smtp_tls,
            access_keys,
            output_dir: var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(OUTPUT_DIR)),
            pdf_logo_path: var("PDF_LOGO_PATH").map(PathBuf::from),
            email_logo_path: var("EMAIL_LOGO_PATH").map(PathBuf::from),
            max_upload_size_bytes: var("MAX_UPLOAD_SIZE_MB")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(MAX_UPLOAD_SIZE_MB)
                * 1024
                * 1024,
            session_idle_timeout: Duration::from_secs(
                var("SESSION_IDLE_TIMEOUT_MINS")
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(SESSION_IDLE_TIMEOUT_MINS)
                    * 60,
            ),
            max_sessions: var("MAX_SESSIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_SESSIONS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.sender_email.contains('@') {
            return Err(anyhow::anyhow!(
                "SENDER_EMAIL must be an e-mail address, got '{}'",
                self.sender_email
            ));
        }

        if !self.facility_email.contains('@') {
            return Err(anyhow::anyhow!(
                "FACILITY_EMAIL must be an e-mail address, got '{}'",
                self.facility_email
            ));
        }

        if self.access_keys.is_empty() {
            return Err(anyhow::anyhow!(
                "ACCESS_KEYS must contain at least one non-empty key"
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.session_idle_timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "SESSION_IDLE_TIMEOUT_MINS must be greater than 0"
            ));
        }

        if self.max_sessions == 0 {
            return Err(anyhow::anyhow!("MAX_SESSIONS must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("SENDER_EMAIL", "portal@example.org"),
        ("APP_PASSWORD", "app-password"),
        ("DEFAULT_EMAIL", "ccm@example.org"),
        ("USERS", "alpha, Beta"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = PortalConfig::from_lookup(lookup(REQUIRED)).expect("config");
        assert_eq!(config.server_port, 4000);
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 465);
        assert_eq!(config.smtp_tls, SmtpTlsMode::Implicit);
        assert_eq!(config.facility_email, "ccm@example.org");
        assert_eq!(config.output_dir, PathBuf::from("./generated"));
        assert_eq!(config.max_upload_size_bytes, 25 * 1024 * 1024);
        assert!(config.access_keys.is_allowed("beta"));
        assert!(config.pdf_logo_path.is_none());
        assert_eq!(config.session_idle_timeout, Duration::from_secs(120 * 60));
        assert_eq!(config.max_sessions, 1000);
    }

    #[test]
    fn test_session_limits_configurable() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SESSION_IDLE_TIMEOUT_MINS", "15"));
        pairs.push(("MAX_SESSIONS", "50"));
        let config = PortalConfig::from_lookup(lookup(&pairs)).expect("config");
        assert_eq!(config.session_idle_timeout, Duration::from_secs(15 * 60));
        assert_eq!(config.max_sessions, 50);

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("MAX_SESSIONS", "0"));
        assert!(PortalConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_starttls_switches_default_port() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SMTP_TLS", "starttls"));
        let config = PortalConfig::from_lookup(lookup(&pairs)).expect("config");
        assert_eq!(config.smtp_tls, SmtpTlsMode::StartTls);
        assert_eq!(config.smtp_port, 587);
    }

    #[test]
    fn test_missing_sender_rejected() {
        let pairs: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != "SENDER_EMAIL")
            .collect();
        let err = PortalConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("SENDER_EMAIL"));
    }

    #[test]
    fn test_blank_access_list_rejected() {
        let mut pairs: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != "USERS")
            .collect();
        pairs.push(("ACCESS_KEYS", " , ,"));
        let err = PortalConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("ACCESS_KEYS"));
    }

    #[test]
    fn test_invalid_tls_mode_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SMTP_TLS", "carrier-pigeon"));
        assert!(PortalConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_production_detection() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ENVIRONMENT", "Production"));
        let config = Config(Box::new(
            PortalConfig::from_lookup(lookup(&pairs)).expect("config"),
        ));
        assert!(config.is_production());
    }
}
