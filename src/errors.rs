use color_eyre::{
    config::HookBuilder,
    Result,
};
use std::backtrace::Backtrace;

/// Installs the `color_eyre` report handler and a panic hook that writes the panic to
/// the log before exiting with `EXIT_FAILURE`.
pub fn init_errors() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .capture_span_trace_by_default(true)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        let report = panic_hook.panic_report(panic_info).to_string();
        error!(backtrace = %Backtrace::force_capture(), "{}", strip_ansi_escapes::strip_str(&report));

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }
        #[cfg(not(debug_assertions))]
        eprintln!("{report}");

        std::process::exit(libc::EXIT_FAILURE);
    }));

    Ok(())
}

/// A report as plain text for the log file.
pub fn plain_report(err: &eyre::Report) -> String {
    strip_ansi_escapes::strip_str(format!("{err:?}"))
}
