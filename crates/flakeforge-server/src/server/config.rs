use std::net::SocketAddr;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use flakeforge::{BitLayout, DEFAULT_EPOCH};

use crate::server::identity::{WorkerIdentity, machine_id_from_name};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Runtime configuration for the `flakeforge-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first). The environment variable names match what a
/// Kubernetes `StatefulSet` injects through the downward API.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeforge-server",
    version,
    about = "An HTTP service handing out Snowflake IDs"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8000"))]
    pub server_addr: String,

    /// Name assigned to this worker by the orchestrator. The first run of
    /// digits in it becomes the machine ID.
    ///
    /// Environment variable: `POD_NAME`
    #[arg(long, env = "POD_NAME", default_value_t = String::from("id-generator-1023"))]
    pub pod_name: String,

    /// Explicit machine ID. Takes precedence over the one derived from
    /// `POD_NAME`.
    ///
    /// Environment variable: `MACHINE_ID`
    #[arg(long, env = "MACHINE_ID")]
    pub machine_id: Option<i64>,

    /// Node the worker is scheduled on. Reported by `/health` only.
    ///
    /// Environment variable: `NODE_NAME`
    #[arg(long, env = "NODE_NAME")]
    pub node_name: Option<String>,

    /// Unique ID of the pod. Reported by `/health` only.
    ///
    /// Environment variable: `POD_UID`
    #[arg(long, env = "POD_UID")]
    pub pod_uid: Option<String>,

    /// Fleet-wide epoch in milliseconds since the Unix epoch. Every worker
    /// must use the same value.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(long, env = "EPOCH_MS", default_value_t = DEFAULT_EPOCH)]
    pub epoch_ms: u64,

    /// Serialize IDs as decimal strings, for clients that lose precision on
    /// 64-bit JSON numbers.
    ///
    /// Environment variable: `ID_AS_STRING`
    #[arg(long, env = "ID_AS_STRING", default_value_t = false)]
    pub id_as_string: bool,

    /// Log output format.
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: SocketAddr,
    pub identity: WorkerIdentity,
    pub epoch_ms: u64,
    pub id_as_string: bool,
    pub log_format: LogFormat,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let server_addr = args
            .server_addr
            .parse()
            .with_context(|| format!("SERVER_ADDR ({}) is not a socket address", args.server_addr))?;

        let machine_id = match args.machine_id {
            Some(machine_id) => machine_id,
            None => machine_id_from_name(&args.pod_name)?,
        };

        let max_machine_id = BitLayout::TWITTER.max_machine_id();
        if u64::try_from(machine_id).map_or(true, |id| id > max_machine_id) {
            bail!(
                "machine id ({}) exceeds available Snowflake machine ID space (max = {})",
                machine_id,
                max_machine_id
            );
        }

        Ok(Self {
            server_addr,
            identity: WorkerIdentity {
                machine_id,
                pod_name: args.pod_name,
                pod_uid: args.pod_uid,
                node_name: args.node_name,
            },
            epoch_ms: args.epoch_ms,
            id_as_string: args.id_as_string,
            log_format: args.log_format,
        })
    }
}
