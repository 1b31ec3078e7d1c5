use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Result;
use clap::{Parser, Subcommand};
use telemon_catalog::Catalog;
use telemon_utils::{logger, signal};

use crate::api;
use crate::config::AppConfig;

#[derive(Parser)]
#[clap(name = "intake")]
#[clap(version = version_string())]
#[clap(subcommand_required = true, arg_required_else_help = true)]
pub struct App {
    #[clap(subcommand)]
    cmd: Cmd,
}

impl App {
    pub fn run(self) -> Result<()> {
        self.cmd.run()
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Start service.
    Run(CmdRun),

    /// Print the device-type catalog as JSON.
    DeviceTypes(CmdDeviceTypes),
}

impl Cmd {
    fn run(self) -> Result<()> {
        match self {
            Cmd::Run(cmd) => cmd.run(),
            Cmd::DeviceTypes(cmd) => cmd.run(&mut std::io::stdout().lock()),
        }
    }
}

#[derive(Parser)]
struct CmdRun {
    /// Path to the service config.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Path to the logger targets config.
    #[clap(short, long)]
    logger_config: Option<PathBuf>,
}

impl CmdRun {
    fn run(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref())?;

        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(signal::run_or_terminate(self.run_impl(config)))
    }

    async fn run_impl(self, config: AppConfig) -> Result<()> {
        logger::init_logger(&config.logger, self.logger_config.as_deref())?;
        logger::set_abort_with_tracing();

        api::http_service(config).await?;

        std::future::pending::<()>().await;

        Ok(())
    }
}

#[derive(Parser)]
struct CmdDeviceTypes {
    /// Print only this device type.
    id: Option<String>,
}

impl CmdDeviceTypes {
    fn run<W: Write>(self, out: &mut W) -> Result<()> {
        match self.id {
            None => serde_json::to_writer_pretty(&mut *out, &Catalog)?,
            Some(id) => match telemon_catalog::get_device_type(&id) {
                Some(item) => serde_json::to_writer_pretty(&mut *out, item)?,
                None => anyhow::bail!("unknown device type: {id}"),
            },
        }
        writeln!(out)?;
        Ok(())
    }
}

fn version_string() -> &'static str {
    static STRING: OnceLock<String> = OnceLock::new();
    STRING.get_or_init(|| format!("(release {INTAKE_VERSION}) (rustc {RUSTC_VERSION})"))
}

static INTAKE_VERSION: &str = env!("INTAKE_VERSION");
static RUSTC_VERSION: &str = env!("INTAKE_RUSTC_VERSION");
