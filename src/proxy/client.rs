//! HTTP client construction, direct or through a proxy.

use super::descriptor::ProxyDescriptor;
use super::pool::ProxyPool;
use crate::config::ProbeConfig;
use reqwest::redirect::Policy;
use reqwest::{tls, Client};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Redirect hops followed when redirect following is enabled.
const MAX_REDIRECTS: usize = 10;

/// Build one HTTP client for the given proxy, or a direct client for `None`.
///
/// HTTP(S) proxies are set as the client's outbound proxy. SOCKS5 proxies
/// replace the connector so every connection is tunnelled; the client then
/// carries no HTTP proxy at all.
pub fn build_client(config: &ProbeConfig, proxy: Option<&ProxyDescriptor>) -> reqwest::Result<Client> {
    let redirect = if config.follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    let builder = Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.timeout / 2)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(30))
        .user_agent(config.user_agent.as_str())
        .min_tls_version(tls::Version::TLS_1_2)
        .danger_accept_invalid_certs(!config.verify_tls)
        .redirect(redirect);

    let builder = match proxy {
        Some(proxy) => builder.proxy(proxy.to_reqwest()?),
        None if !config.system_proxy => builder.no_proxy(),
        None => builder,
    };

    builder.build()
}

/// Build one client per worker.
///
/// The assignment is balanced but shuffled: workers draw proxies from the
/// pool's rotation, which reshuffles after every full cycle, so with `P`
/// proxies each one serves `workers / P` workers, give or take one, but
/// worker `i` is not pinned to proxy `i mod P`. Workers that share a proxy
/// share its client (and connection pool).
pub fn clients_for_workers(
    config: &ProbeConfig,
    pool: &ProxyPool,
    workers: usize,
) -> reqwest::Result<Vec<Client>> {
    if pool.is_empty() {
        let direct = build_client(config, None)?;
        return Ok(vec![direct; workers]);
    }

    let mut built: HashMap<ProxyDescriptor, Client> = HashMap::new();
    let mut clients = Vec::with_capacity(workers);
    for worker in 0..workers {
        let Some(proxy) = pool.next() else {
            clients.push(build_client(config, None)?);
            continue;
        };
        let client = match built.get(&proxy) {
            Some(client) => client.clone(),
            None => {
                debug!(worker, proxy = %proxy, "building proxied client");
                let client = build_client(config, Some(&proxy))?;
                built.insert(proxy, client.clone());
                client
            }
        };
        clients.push(client);
    }
    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_direct_client() {
        let config = ProbeConfig::default().with_follow_redirects(false);
        assert!(build_client(&config, None).is_ok());
    }

    #[test]
    fn test_build_proxied_clients() {
        let config = ProbeConfig::default().with_verify_tls(false);
        for line in ["http://127.0.0.1:3128", "socks5://u:p@127.0.0.1:1080"] {
            let proxy = ProxyDescriptor::parse(line).unwrap();
            assert!(build_client(&config, Some(&proxy)).is_ok(), "{line}");
        }
    }

    #[test]
    fn test_clients_for_workers_balances_proxies() {
        let pool = ProxyPool::new();
        pool.load([
            "http://127.0.0.1:3001",
            "http://127.0.0.1:3002",
            "http://127.0.0.1:3003",
        ]);

        let clients = clients_for_workers(&ProbeConfig::default(), &pool, 10).unwrap();
        assert_eq!(clients.len(), 10);

        let uses: Vec<u64> = pool.usage().iter().map(|u| u.uses).collect();
        assert_eq!(uses.iter().sum::<u64>(), 10);
        assert!(uses.iter().all(|&n| n == 3 || n == 4), "{uses:?}");
    }

    #[test]
    fn test_clients_for_workers_direct() {
        let clients = clients_for_workers(&ProbeConfig::default(), &ProxyPool::new(), 4).unwrap();
        assert_eq!(clients.len(), 4);
    }
}
