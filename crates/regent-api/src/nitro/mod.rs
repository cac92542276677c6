// NITRO REST API
//
// Configuration-API client for a single appliance. The client is bound
// to one node address; environments build one client per node.

pub mod client;
pub mod models;

pub use client::NitroClient;
pub use models::HaNode;
