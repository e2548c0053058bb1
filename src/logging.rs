use color_eyre::Result;
use eyre::WrapErr;
use powermax_zabbix_config::LogSettings;
use rolling_file::{
    BasicRollingFileAppender,
    RollingConditionBasic,
};
use std::sync::Mutex;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Opens the size bounded log file, creating its directory first.
pub fn rolling_writer(settings: &LogSettings) -> Result<Mutex<BasicRollingFileAppender>> {
    if let Some(directory) = settings.file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(directory)
            .wrap_err_with(|| format!("Failed to create log directory {directory:?}"))?;
    }

    let appender = BasicRollingFileAppender::new(
        &settings.file,
        RollingConditionBasic::new().max_size(settings.max_bytes),
        settings.max_files,
    )
    .wrap_err_with(|| format!("Failed to open log file {:?}", settings.file))?;
    Ok(Mutex::new(appender))
}

/// `RUST_LOG` wins over the configured level.
fn env_filter(settings: &LogSettings) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level)
            .wrap_err_with(|| format!("Invalid log level {:?}", settings.level)),
    }
}

pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let file_layer = fmt::layer()
        .with_writer(rolling_writer(settings)?)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stderr_layer = settings
        .stderr
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));

    tracing_subscriber::registry()
        .with(env_filter(settings)?)
        .with(file_layer)
        .with(stderr_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;

    debug!(file = ?settings.file, level = %settings.level, "Logging initialized");
    Ok(())
}
