//! # PowerMax Collector
//!
//! Walks the topology of a PowerMax array and turns it into Zabbix input:
//!
//! - **Discovery**: low level discovery entries per category ([`Discovery`])
//! - **Performance**: statistics per category, director and port ([`PerfCollector`])
//! - **Health**: array health scores ([`HealthCollector`])
//!
//! The [`Orchestrator`] runs a complete sweep. Collaborators are passed in as
//! [`unisphere_client::ArrayApi`] and [`zabbix_sender::MetricSink`] trait objects.

#[macro_use]
extern crate tracing;

mod discovery;
mod emit;
mod health;
mod key;
mod orchestrator;
mod output;
mod perf;
mod registry;
mod report;
#[cfg(test)]
mod testing;

pub use discovery::{
    Discovery,
    DiscoveryTarget,
    LabelMap,
};
pub use emit::{
    truncate_timestamp,
    MetricTarget,
};
pub use health::HealthCollector;
pub use key::{
    format_health_key,
    format_key,
};
pub use orchestrator::{
    Collector,
    Orchestrator,
};
pub use output::{
    deliver,
    lld_json,
};
pub use perf::{
    PerfCollector,
    RecencyPolicy,
};
pub use registry::{
    lookup,
    CategoryKind,
    CategorySpec,
    DIRECTOR_CATEGORIES,
    ITEM_CATEGORIES,
};
pub use report::CollectionReport;
