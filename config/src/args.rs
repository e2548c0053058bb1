use clap::Parser;
use std::path::PathBuf;

/// PowerMax discovery and performance statistics for Zabbix
#[derive(Parser, Debug, Clone)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Perform discovery operations and print the LLD JSON to stdout.
    #[clap(long, short = 'd', action)]
    pub discovery: bool,

    #[clap(flatten)]
    pub selector: Selector,

    /// Path to the Unisphere configuration file (PyU4V.conf style INI or YAML).
    #[clap(long, short = 'c', value_name = "FILE")]
    pub configpath: PathBuf,

    /// Array to discover or collect statistics for.
    #[clap(long, short = 'a', value_name = "ARRAY")]
    pub array: String,

    /// Backfill this many hours of statistics instead of the latest snapshot.
    #[clap(long, value_name = "HOURS", value_parser = clap::value_parser!(u8).range(0..=24))]
    pub hours: Option<u8>,

    /// Mirror log output to stderr.
    #[clap(long, short = 'v', action)]
    pub verbose: bool,

    /// Optional path overriding the configured log file.
    #[clap(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Topology selectors for discovery mode. At most one may be given; none means array
/// discovery.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
#[group(multiple = false)]
pub struct Selector {
    /// Discover front end directors.
    #[clap(long = "FEDirector", action)]
    pub fe_director: bool,
    /// Discover front end ports.
    #[clap(long = "FEPort", action)]
    pub fe_port: bool,
    /// Discover back end directors.
    #[clap(long = "BEDirector", action)]
    pub be_director: bool,
    /// Discover back end ports.
    #[clap(long = "BEPort", action)]
    pub be_port: bool,
    /// Discover RDF directors.
    #[clap(long = "RDFDirector", action)]
    pub rdf_director: bool,
    /// Discover RDF ports.
    #[clap(long = "RDFPort", action)]
    pub rdf_port: bool,
    /// Discover EDS directors.
    #[clap(long = "EDSDirector", action)]
    pub eds_director: bool,
    /// Discover IM directors.
    #[clap(long = "IMDirector", action)]
    pub im_director: bool,
    /// Discover storage resource pools.
    #[clap(long, action)]
    pub srp: bool,
    /// Discover boards.
    #[clap(long, action)]
    pub board: bool,
    /// Discover disk groups.
    #[clap(long, action)]
    pub diskgroup: bool,
    /// Discover storage groups.
    #[clap(long, action)]
    pub storagegroup: bool,
    /// Discover port groups.
    #[clap(long, action)]
    pub portgroup: bool,
    /// Discover hosts.
    #[clap(long, action)]
    pub host: bool,
    /// Discover initiators.
    #[clap(long, action)]
    pub initiator: bool,
    /// Discover front end emulations.
    #[clap(long, action)]
    pub emulation: bool,
    /// Discover iSCSI targets.
    #[clap(long, action)]
    pub iscsi: bool,
    /// Discover RDF groups.
    #[clap(long, action)]
    pub rdf: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(log_file) = &self.log_file {
                cache.insert("log.file".to_string(), log_file.display().to_string().into());
            }
            if self.verbose {
                cache.insert("log.stderr".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "\
{}

Authors: {author}

Data directory: {data_dir_path}",
        clap::crate_version!()
    )
}
