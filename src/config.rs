use crate::card::Theme;
use crate::cli::Cli;
use crate::error::{CardError, CardResult};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

const TRACE_LEVELS: [&'static str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const LOCAL_SETTINGS_YAML_FILE: &str = ".env.local.yaml";
const ENV_PREFIX: &str = "BADGE_CARD_";

// All settings may be configured via prefixed environment variables. Example:
// BADGE_CARD_PORT="8080" would set port to 8080.
// Command line flags take precedence over the environment.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_solvedac_url")]
    pub solvedac_api_url: String,
    // Backgrounds and badges detail pages are scraped from here
    #[serde(default = "default_solvedac_url")]
    pub solvedac_site_url: String,
    #[serde(default = "default_solvedac_static_url")]
    pub solvedac_static_url: String,
    #[serde(default = "default_http_timeout_sec")]
    pub http_timeout_sec: u64,
    #[serde(default = "default_cache_s_maxage_sec")]
    pub cache_s_maxage_sec: u64,
    #[serde(default = "default_cache_stale_while_revalidate_sec")]
    pub cache_stale_while_revalidate_sec: u64,
    #[serde(default = "default_theme")]
    default_theme: String,
}

impl Settings {
    pub fn load(cli: Cli) -> CardResult<Self> {
        let figment = match Path::new(LOCAL_SETTINGS_YAML_FILE).exists() {
            true => {
                println!(
                    "\n######################################\n\
                       ##   Found '.env.local.yaml' file,  ##\n\
                       ##   loading local configuration.   ##\n\
                       ######################################\n\
                    "
                );
                Figment::new().merge(Yaml::file(LOCAL_SETTINGS_YAML_FILE))
            }
            false => Figment::new(),
        };

        Self::from_figment(figment.merge(env()).merge(Serialized::defaults(cli)))
    }

    pub fn from_figment(figment: Figment) -> CardResult<Self> {
        Ok(figment.extract()?)
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }

    pub fn default_theme(&self) -> Theme {
        Theme::parse_or(Some(&self.default_theme), Theme::default())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_sec)
    }

    pub fn socket_addr(&self) -> CardResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| CardError::Config(format!("invalid bind address: {e}")))
    }
}

fn env() -> Env {
    Env::prefixed(ENV_PREFIX)
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str.to_uppercase() {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_solvedac_url() -> String {
    "https://solved.ac".to_string()
}

fn default_solvedac_static_url() -> String {
    "https://static.solved.ac".to_string()
}

fn default_http_timeout_sec() -> u64 {
    10
}

fn default_cache_s_maxage_sec() -> u64 {
    4 * 60 * 60
}

fn default_cache_stale_while_revalidate_sec() -> u64 {
    24 * 60 * 60
}

fn default_theme() -> String {
    Theme::default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::from_figment(Figment::new()).unwrap();
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.solvedac_static_url, "https://static.solved.ac");
        assert_eq!(settings.cache_s_maxage_sec, 14400);
        assert_eq!(settings.default_theme(), Theme::Banner);
        assert_eq!(settings.get_trace_level(), Level::INFO);
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cli = Cli {
            port: Some(8080),
            default_theme: Some("SPLIT".to_string()),
            trace_level: Some("debug".to_string()),
            ..Default::default()
        };
        let settings =
            Settings::from_figment(Figment::new().merge(Serialized::defaults(cli))).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.default_theme(), Theme::Split);
        assert_eq!(settings.get_trace_level(), Level::DEBUG);
        assert_eq!(settings.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn only_prefixed_environment_variables_apply() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("HOST", "workstation.local");
            jail.set_env("PORT", "1");
            jail.set_env("BADGE_CARD_PORT", "8181");
            jail.set_env("BADGE_CARD_CACHE_S_MAXAGE_SEC", "600");

            let settings = Settings::from_figment(Figment::new().merge(env()))
                .map_err(|e| e.to_string())?;
            assert_eq!(settings.host, "0.0.0.0");
            assert_eq!(settings.port, 8181);
            assert_eq!(settings.cache_s_maxage_sec, 600);
            assert!(settings.socket_addr().is_ok());
            Ok(())
        });
    }

    #[test]
    fn unknown_trace_level_falls_back_to_info() {
        assert_eq!(get_trace_level("chatty"), Level::INFO);
        assert_eq!(get_trace_level("WARN"), Level::WARN);
    }
}
