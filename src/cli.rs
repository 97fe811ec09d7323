use clap::Parser;
use serde::Serialize;

/// Command line overrides. Anything left unset falls back to the
/// environment, then to `.env.local.yaml`, then to built-in defaults.
#[derive(Debug, Default, Parser, Serialize)]
#[command(name = "badge-card", version, about = "solved.ac profile cards as SVG")]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Port to bind the HTTP server to
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Theme used when a request does not name a known one
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_theme: Option<String>,

    /// One of TRACE, DEBUG, INFO, WARN, ERROR
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_level: Option<String>,
}
