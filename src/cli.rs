// Command-line flags and the wiring of the real gcloud, HTTP and terminal
// implementations into one update run.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::api::{self, SqlAdminClient, DEFAULT_API_URL};
use crate::config::{FileStore, DEFAULT_CONFIG_PATH};
use crate::prompt::TerminalPrompter;
use crate::public_ip::{IpEcho, DEFAULT_PUBLIC_IP_URL};
use crate::token::GcloudCli;
use crate::whitelist::{Outcome, Session};

/// Add this machine's public IP to a Cloud SQL instance's authorized networks.
#[derive(Parser, Debug)]
#[command(name = "sqlwhitelist", version, about)]
pub struct Cli {
    /// Config file holding the project, instance and entry name
    #[arg(long, env = "SQLWHITELIST_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Cloud SQL Admin API base URL
    #[arg(long, env = "SQLADMIN_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Service that echoes the caller's public IP as plain text
    #[arg(long, env = "PUBLIC_IP_URL", default_value = DEFAULT_PUBLIC_IP_URL)]
    pub ip_url: String,

    /// gcloud executable used to print an access token
    #[arg(long, env = "GCLOUD_BIN", default_value = "gcloud")]
    pub gcloud: String,

    /// Show debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

/// Filter directives for the log subscriber. `RUST_LOG` is used as given;
/// `--verbose` raises the default level to debug, otherwise it is warn.
pub fn log_directives(verbose: bool, rust_log: Option<&str>) -> String {
    let rust_log = rust_log.map(str::trim).filter(|s| !s.is_empty());
    match (rust_log, verbose) {
        (Some(env), false) => env.to_string(),
        (Some(env), true) => format!("{env},debug"),
        (None, true) => "debug".to_string(),
        (None, false) => "warn".to_string(),
    }
}

impl Cli {
    /// Wire the real gcloud, HTTP and terminal implementations together and
    /// run one update.
    pub fn run(&self) -> Result<Outcome> {
        let client = api::http_client()?;
        let tokens = GcloudCli::new(&self.gcloud);
        let public_ip = IpEcho::new(client.clone(), &self.ip_url);
        let mut sql_admin = SqlAdminClient::new(client, &self.api_url);
        let mut store = FileStore::new(&self.config);
        let mut prompter = TerminalPrompter;

        Session {
            tokens: &tokens,
            public_ip: &public_ip,
            api: &mut sql_admin,
            store: &mut store,
            prompter: &mut prompter,
        }
        .run()
    }
}
