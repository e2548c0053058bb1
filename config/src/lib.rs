#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod settings;

pub use app_config::get_data_dir;
pub use args::{
    Args,
    Selector,
};
use color_eyre::Result;
use eyre::Context as _;
use serde::{
    Deserialize,
    Serialize,
};
pub use settings::{
    CollectionSettings,
    LogSettings,
    MetricSet,
    UnisphereSettings,
    ZabbixSettings,
};
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub setup: UnisphereSettings,
    pub zabbix: ZabbixSettings,
    pub collection: CollectionSettings,
    pub log: LogSettings,
}

impl Config {
    /// Loads the layered configuration: built-in defaults, the Unisphere configuration
    /// file named by `--configpath`, `POWERMAX_ZABBIX__*` environment variables and
    /// finally the command line.
    ///
    /// # Errors
    /// Fails when the configuration file cannot be read or a required value is missing.
    pub fn new(args: &Args) -> Result<Self> {
        std::fs::File::open(&args.configpath)
            .wrap_err_with(|| format!("Unable to open config file {:?}", args.configpath))?;

        let builder = base_builder()?
            .add_source(config::File::new(&args.configpath.display().to_string(), file_format(&args.configpath)))
            .add_source(environment())
            .add_source(args.clone());

        let cfg: Self = builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .wrap_err_with(|| format!("Invalid configuration in {:?}", args.configpath))?;

        debug!(config = ?args.configpath, server = %cfg.setup.server_ip, "Configuration loaded");
        Ok(cfg)
    }
}

impl LogSettings {
    /// Log settings are resolved without the Unisphere configuration file so logging
    /// is available before that file has been validated.
    pub fn new(args: &Args) -> Result<Self> {
        base_builder()?
            .add_source(environment())
            .add_source(args.clone())
            .build()
            .and_then(|cfg| cfg.get::<LogSettings>("log"))
            .wrap_err("Invalid log configuration")
    }
}

fn base_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let log_file = app_config::default_log_file();
    config::Config::builder()
        .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
        .set_default("log.file", log_file.display().to_string())
        .wrap_err("Failed to apply configuration defaults")
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(&app_config::PROJECT_NAME)
        .prefix_separator("__")
        .separator("__")
}

/// `PyU4V.conf` and friends are INI, anything ending in `.yaml`/`.yml` is YAML.
fn file_format(path: &Path) -> config::FileFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => config::FileFormat::Yaml,
        _ => config::FileFormat::Ini,
    }
}
