use std::path::{Path, PathBuf};

mod dashboard;
mod edit;
mod export;
mod list;
mod status;
mod terminal;
mod upload;

use anyhow::Context as _;
use clap::ArgAction;
use dashboard::Dashboard;
use edit::{Create, Delete, Edit, SetStatus};
use export::Export;
use list::List;
use reqdash::HttpClient;
use status::Status;
use tracing::instrument;
use upload::Upload;

/// Configuration file used when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "reqdash.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(
        short,
        long,
        env = "REQDASH_CONFIG",
        default_value = DEFAULT_CONFIG_FILE,
        global = true
    )]
    config: PathBuf,

    /// Base URL of the requirements service, overriding the configuration
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let context = Context::load(self.config, self.base_url.as_deref())?;

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(&context)
            .await
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Settings shared by every command.
#[derive(Debug)]
pub struct Context {
    config_path: PathBuf,
    config: reqdash::Config,
}

impl Context {
    /// Load the configuration file if it exists, then apply command-line
    /// overrides.
    fn load(config_path: PathBuf, base_url: Option<&str>) -> anyhow::Result<Self> {
        let mut config = if config_path.exists() {
            reqdash::Config::load(&config_path)
                .with_context(|| format!("Failed to load {}", config_path.display()))?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            reqdash::Config::default()
        };

        if let Some(base_url) = base_url {
            config.set_base_url(base_url);
        }

        Ok(Self {
            config_path,
            config,
        })
    }

    pub const fn config(&self) -> &reqdash::Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn client(&self) -> anyhow::Result<HttpClient> {
        Ok(HttpClient::new(&self.config)?)
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show overall requirement statistics (default)
    Status(Status),

    /// List one page of requirements matching a search and filters
    List(List),

    /// Export one page of requirements as CSV
    Export(Export),

    /// Create a new requirement
    Create(Create),

    /// Edit the content of a requirement
    Edit(Edit),

    /// Change the status of a requirement
    SetStatus(SetStatus),

    /// Delete a requirement
    Delete(Delete),

    /// Upload a document for requirement extraction
    ///
    /// Accepts PDF, TXT and MD files up to 10 MB.
    Upload(Upload),

    /// Browse requirements interactively
    ///
    /// Search and filter edits are sent once typing pauses; page changes
    /// are sent immediately.
    Dashboard(Dashboard),

    /// Show or modify configuration settings
    Config(Config),
}

impl Command {
    async fn run(self, context: &Context) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(context).await?,
            Self::List(command) => command.run(context).await?,
            Self::Export(command) => command.run(context).await?,
            Self::Create(command) => command.run(context).await?,
            Self::Edit(command) => command.run(context).await?,
            Self::SetStatus(command) => command.run(context).await?,
            Self::Delete(command) => command.run(context).await?,
            Self::Upload(command) => command.run(context).await?,
            Self::Dashboard(command) => command.run(context).await?,
            Self::Config(command) => command.run(context)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Config {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },
}

impl Config {
    #[instrument(skip(context))]
    fn run(self, context: &Context) -> anyhow::Result<()> {
        use terminal::Colorize;

        let config_path = context.config_path();

        match self.command {
            ConfigCommand::Show => {
                let config = context.config();

                println!("Configuration ({}):", config_path.display().to_string().dim());
                println!("  base_url: {}", config.base_url());
                println!("  debounce_ms: {}", config.debounce().as_millis());
                println!("  timeout_secs: {}", config.timeout().as_secs());
                match config.per_page {
                    Some(per_page) => println!("  per_page: {per_page}"),
                    None => println!("  per_page: {}", "service default".dim()),
                }
            }
            ConfigCommand::Set { key, value } => {
                // write back what is on disk, not the command-line overrides
                let mut config = if config_path.exists() {
                    reqdash::Config::load(config_path)
                        .with_context(|| format!("Failed to load {}", config_path.display()))?
                } else {
                    reqdash::Config::default()
                };

                match key.as_str() {
                    "base_url" => config.set_base_url(&value),
                    "debounce_ms" => config.set_debounce(std::time::Duration::from_millis(
                        parse_number(&key, &value)?,
                    )),
                    "timeout_secs" => {
                        config.set_timeout(std::time::Duration::from_secs(parse_number(
                            &key, &value,
                        )?))?;
                    }
                    "per_page" => {
                        config.per_page = if value.eq_ignore_ascii_case("default") {
                            None
                        } else {
                            Some(parse_number(&key, &value)?)
                        };
                    }
                    _ => {
                        return Err(anyhow::anyhow!(
                            "Unknown configuration key: '{key}'\nSupported keys: base_url, \
                             debounce_ms, timeout_secs, per_page",
                        ));
                    }
                }

                config
                    .save(config_path)
                    .with_context(|| format!("Failed to save {}", config_path.display()))?;
                println!("{}", format!("Set {key} = {value}").success());
            }
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> anyhow::Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Value for '{key}' must be a whole number, got '{value}'"))
}
