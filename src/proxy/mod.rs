//! Upstream proxy support.
//!
//! A [`ProxyPool`] holds the proxies loaded for one run and hands them out
//! round-robin; [`build_client`] turns a descriptor into an HTTP client.

mod client;
mod descriptor;
mod pool;

pub use client::{build_client, clients_for_workers};
pub use descriptor::{ProxyDescriptor, ProxyScheme};
pub use pool::{ProxyPool, ProxyUsage};
