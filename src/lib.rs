#[macro_use]
extern crate tracing;

mod app;
mod errors;
mod logging;

pub use app::{
    discovery_target,
    App,
};
pub use errors::{
    init_errors,
    plain_report,
};
pub use logging::init_logging;
pub use powermax_zabbix_config::{
    Args,
    LogSettings,
};
