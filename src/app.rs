use color_eyre::Result;
use eyre::WrapErr;
use powermax_zabbix_collector::{
    lld_json,
    Discovery,
    DiscoveryTarget,
    Orchestrator,
};
use powermax_zabbix_config::{
    Args,
    Config,
    Selector,
};
use std::io::Write;
use unisphere_client::{
    ArrayApi,
    Category,
    RecencyWindow,
    UnisphereClient,
};
use zabbix_sender::ZabbixSender;

pub struct App {
    args: Args,
    config: Config,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::new(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(&self) -> Result<()> {
        let span = info_span!("powermax", array = %self.args.array);
        let _entered = span.enter();
        info!(discovery = self.args.discovery, hours = ?self.args.hours, "Starting");

        let client = UnisphereClient::new(&self.config.setup, self.config.collection.metrics)
            .wrap_err_with(|| format!("Failed to set up Unisphere client for {}", self.config.setup.server_ip))?;

        if self.args.discovery {
            self.discover(&client, &mut std::io::stdout().lock())?;
        } else {
            self.collect(&client)?;
        }

        info!("Complete");
        Ok(())
    }

    fn discover(&self, api: &dyn ArrayApi, out: &mut impl Write) -> Result<()> {
        let target = discovery_target(&self.args.selector);
        let entries = Discovery::new(api)
            .discover(target, &self.args.array)
            .wrap_err_with(|| format!("{} discovery failed", target.category))?;

        let json = lld_json(&entries)?;
        debug!(%json, "Discovery output");
        writeln!(out, "{json}")?;
        Ok(())
    }

    fn collect(&self, api: &dyn ArrayApi) -> Result<()> {
        let sender = ZabbixSender::from_settings(&self.config.zabbix).wrap_err("Invalid Zabbix sender settings")?;
        let window = RecencyWindow::new(
            self.args.hours,
            self.config.collection.recency_minutes,
            chrono::Utc::now().timestamp_millis(),
        );
        let host = self.config.zabbix.host_for(&self.args.array);
        info!(trapper = %sender.endpoint(), %host, ?window, "Collecting statistics");

        let report = Orchestrator::new(api, &sender, &self.config.collection.namespace, &host)
            .collect_all(&self.args.array, window)?;
        info!(%report, "Collection finished");
        Ok(())
    }
}

/// Maps the command line selector to what discovery should list. No selector means
/// the array itself.
pub fn discovery_target(selector: &Selector) -> DiscoveryTarget {
    let choices = [
        (selector.fe_director, DiscoveryTarget::new(Category::FEDirector)),
        (selector.fe_port, DiscoveryTarget::ports_of(Category::FEDirector)),
        (selector.be_director, DiscoveryTarget::new(Category::BEDirector)),
        (selector.be_port, DiscoveryTarget::ports_of(Category::BEDirector)),
        (selector.rdf_director, DiscoveryTarget::new(Category::RDFDirector)),
        (selector.rdf_port, DiscoveryTarget::ports_of(Category::RDFDirector)),
        (selector.eds_director, DiscoveryTarget::new(Category::EDSDirector)),
        (selector.im_director, DiscoveryTarget::new(Category::IMDirector)),
        (selector.srp, DiscoveryTarget::new(Category::SRP)),
        (selector.board, DiscoveryTarget::new(Category::Board)),
        (selector.diskgroup, DiscoveryTarget::new(Category::DiskGroup)),
        (selector.storagegroup, DiscoveryTarget::new(Category::StorageGroup)),
        (selector.portgroup, DiscoveryTarget::new(Category::PortGroup)),
        (selector.host, DiscoveryTarget::new(Category::Host)),
        (selector.initiator, DiscoveryTarget::new(Category::Initiator)),
        (selector.emulation, DiscoveryTarget::new(Category::FEEmulation)),
        (selector.iscsi, DiscoveryTarget::new(Category::ISCSITarget)),
        (selector.rdf, DiscoveryTarget::new(Category::RDFS)),
    ];

    choices
        .into_iter()
        .find_map(|(selected, target)| selected.then_some(target))
        .unwrap_or_default()
}
