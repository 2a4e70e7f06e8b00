use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::fetcher::{DEFAULT_STOP_URL_TEMPLATE, DataSource};

/// Scrapes the stops of Taipei bus routes
#[derive(Debug, Parser)]
#[command(name = "taipei-bus-stops", version)]
pub struct Config {
    /// Directory the rolling log files are written to
    #[arg(long, env = "LOG_DIR", default_value = "./logs", global = true)]
    pub log_dir: PathBuf,

    #[arg(
        long,
        env = "USER_AGENT",
        default_value = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        global = true
    )]
    pub user_agent: String,

    /// Per request timeout in seconds
    #[arg(long, env = "TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch routes and print their stops as JSON lines
    Route {
        #[arg(long, env = "BUS_SOURCE", value_enum, default_value_t = DataSource::Ebus)]
        source: DataSource,

        /// Route url with a `{route_id}` placeholder. Defaults to the source's own
        #[arg(long, env = "ROUTE_URL_TEMPLATE")]
        route_url_template: Option<String>,

        /// How many routes are fetched at the same time
        #[arg(long, env = "CONCURRENCY", default_value_t = 4)]
        concurrency: usize,

        /// Only print the stops whose name contains this
        #[arg(long)]
        find: Option<String>,

        #[arg(required = true)]
        route_ids: Vec<String>,
    },

    /// Extract the stops of a saved route page
    Parse {
        #[arg(long, env = "BUS_SOURCE", value_enum, default_value_t = DataSource::Ebus)]
        source: DataSource,

        #[arg(long)]
        route_id: String,

        /// Only print the stops whose name contains this
        #[arg(long)]
        find: Option<String>,

        file: PathBuf,
    },

    /// Fetch the live arrival board of stops
    Stop {
        /// Stop url with a `{stop_id}` placeholder
        #[arg(long, env = "STOP_URL_TEMPLATE", default_value = DEFAULT_STOP_URL_TEMPLATE)]
        stop_url_template: String,

        #[arg(required = true)]
        stop_ids: Vec<String>,
    },

    /// List the routes of a route directory page
    Routes {
        #[arg(long, env = "BUS_SOURCE", value_enum, default_value_t = DataSource::Ebus)]
        source: DataSource,

        /// Defaults to the source's directory page
        #[arg(long, env = "ROUTE_LIST_URL")]
        url: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Command, Config};
    use crate::fetcher::{DEFAULT_STOP_URL_TEMPLATE, DataSource};

    #[test]
    fn test_cli_is_consistent() {
        Config::command().debug_assert();
    }

    #[test]
    fn test_route_command() -> Result<(), anyhow::Error> {
        let config = Config::try_parse_from([
            "taipei-bus-stops",
            "route",
            "--source",
            "pda",
            "--concurrency",
            "2",
            "10417",
            "10418",
        ])?;

        match config.command {
            Command::Route {
                source,
                route_url_template,
                concurrency,
                find,
                route_ids,
            } => {
                assert_eq!(source, DataSource::Pda);
                assert_eq!(route_url_template, None);
                assert_eq!(concurrency, 2);
                assert_eq!(find, None);
                assert_eq!(route_ids, vec!["10417", "10418"]);
            }
            other => panic!("parsed the wrong command {other:?}"),
        }

        Ok(())
    }

    #[test]
    fn test_route_command_needs_route_ids() {
        assert!(Config::try_parse_from(["taipei-bus-stops", "route"]).is_err());
    }

    #[test]
    fn test_stop_command() -> Result<(), anyhow::Error> {
        let config = Config::try_parse_from(["taipei-bus-stops", "stop", "10785", "10786"])?;

        match config.command {
            Command::Stop {
                stop_url_template,
                stop_ids,
            } => {
                assert_eq!(stop_url_template, DEFAULT_STOP_URL_TEMPLATE);
                assert_eq!(stop_ids, vec!["10785", "10786"]);
            }
            other => panic!("parsed the wrong command {other:?}"),
        }

        assert!(Config::try_parse_from(["taipei-bus-stops", "stop"]).is_err());

        Ok(())
    }

    #[test]
    fn test_parse_command_find() -> Result<(), anyhow::Error> {
        let config = Config::try_parse_from([
            "taipei-bus-stops",
            "parse",
            "--source",
            "pda",
            "--route-id",
            "10417",
            "--find",
            "松山車站",
            "route.html",
        ])?;

        match config.command {
            Command::Parse { find, file, .. } => {
                assert_eq!(find.as_deref(), Some("松山車站"));
                assert_eq!(file.to_str(), Some("route.html"));
            }
            other => panic!("parsed the wrong command {other:?}"),
        }

        Ok(())
    }
}
