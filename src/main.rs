use clap::Parser;
use color_eyre::Result;
use powermax_zabbix::{
    init_errors,
    init_logging,
    plain_report,
    App,
    Args,
    LogSettings,
};

fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();
    init_logging(&LogSettings::new(&args)?)?;

    App::new(args).and_then(|app| app.run()).inspect_err(|err| {
        tracing::error!("{}", plain_report(err));
    })
}
