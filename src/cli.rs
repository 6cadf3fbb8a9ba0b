//! Command line interface

use clap::Parser;
use std::path::PathBuf;

/// Serve a directory over HTTP with permissive CORS headers and caching disabled.
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "corsserve", version)]
#[command(about = "Local static file server with CORS headers for development")]
pub struct Cli {
    /// Port to listen on [default: 8000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// Directory to serve [default: current directory]
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Configuration file (TOML); `corsserve.toml` is used when present
    #[arg(short, long)]
    pub config: Option<String>,

    /// Disable per-request access logging
    #[arg(long)]
    pub no_access_log: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags() {
        let cli = Cli::try_parse_from(["corsserve"]).unwrap();
        assert!(cli.port.is_none());
        assert!(cli.root.is_none());
        assert!(!cli.no_access_log);
    }

    #[test]
    fn test_port_and_root() {
        let cli = Cli::try_parse_from(["corsserve", "--port", "9000", "-r", "dist"]).unwrap();
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.root, Some(PathBuf::from("dist")));
    }

    #[test]
    fn test_port_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["corsserve", "--port", "70000"]).is_err());
    }
}
