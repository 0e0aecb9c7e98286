use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "rudby", about = "Rudby jewellery catalog server", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the catalog server
    Serve(ServeArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["rudby", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.config.is_none());
            assert!(args.bind.is_none());
        } else {
            panic!("wrong command");
        }
        assert_eq!(Cli::try_parse_from(["rudby", "serve"]).unwrap().log_level(), Level::INFO);
    }

    #[test]
    fn parse_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "rudby", "serve", "--config", "rudby.toml", "--bind", "0.0.0.0:8080",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("rudby.toml")));
            assert_eq!(args.bind, Some("0.0.0.0:8080".parse().unwrap()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_rejects_bad_bind() {
        assert!(Cli::try_parse_from(["rudby", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn parse_config() {
        let cli = Cli::try_parse_from(["rudby", "config", "-c", "x.toml"]).unwrap();
        assert!(matches!(cli.command, Command::Config(ref a) if a.config.is_some()));
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["rudby", "config", "--verbose"]).unwrap();
        assert_eq!(cli.log_level(), Level::DEBUG);
    }
}
