//! # Unisphere Client
//!
//! Blocking client for the parts of the Unisphere for PowerMax REST API that the
//! Zabbix integration needs:
//!
//! - **Keys**: `performance/<Category>/keys` lists directors, ports, pools and groups
//! - **Metrics**: `performance/<Category>/metrics` returns statistics snapshots
//! - **System**: the array list and the health score of an array
//!
//! Collectors talk to the API through the [`ArrayApi`] trait so they can be exercised
//! against in-memory fakes.

#[macro_use]
extern crate tracing;

mod category;
mod client;
mod error;
mod stats;

pub use category::{
    Category,
    KeyFields,
    TopologyItem,
};
pub use client::{
    parse_keys,
    ArrayApi,
    UnisphereClient,
};
pub use error::ApiError;
pub use stats::{
    is_timestamp_current,
    HealthScore,
    RecencyWindow,
    StatsRequest,
    StatsResponse,
    StatsRow,
};
