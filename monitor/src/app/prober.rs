//! Single reachability checks against one host.

use core::{net::IpAddr, time::Duration};

use futures::{FutureExt as _, future::BoxFuture};
use hostwatch_common::{Host, ProbeResult};
use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};
use tokio::{
    net,
    time::{Instant, timeout_at},
};
use tracing::{debug, warn};

/// Payload of the ICMP echo request.
const PAYLOAD: [u8; 56] = [0; 56];

/// Performs one reachability check.
///
/// Implementations must not fail: an unreachable host, a timeout, a DNS error or
/// a missing socket permission all yield an offline [`ProbeResult`] with a short
/// cause. The returned future must resolve within `timeout`.
pub trait Prober: Send + Sync + 'static {
    fn probe<'a>(&'a self, host: &'a Host, timeout: Duration) -> BoxFuture<'a, ProbeResult>;
}

/// ICMP echo based prober.
///
/// Socket creation happens once; if the process lacks permission to open ICMP
/// sockets every probe reports that as its offline cause.
pub struct IcmpProber {
    v4: Result<Client, String>,
    v6: Result<Client, String>,
}

impl Default for IcmpProber {
    fn default() -> Self {
        Self::new()
    }
}

impl IcmpProber {
    #[must_use]
    pub fn new() -> Self {
        let open = |kind: ICMP, family: &str| {
            Client::new(&Config::builder().kind(kind).build()).map_err(|e| {
                warn!("Cannot open {family} ICMP socket, probes will report hosts offline: {e}");
                format!("ICMP socket unavailable: {e}")
            })
        };
        Self {
            v4: open(ICMP::V4, "IPv4"),
            v6: open(ICMP::V6, "IPv6"),
        }
    }

    async fn ping(&self, host: &Host, timeout: Duration) -> ProbeResult {
        let deadline = Instant::now() + timeout;

        let ip = match timeout_at(deadline, resolve(&host.address)).await {
            Ok(Ok(ip)) => ip,
            Ok(Err(cause)) => return ProbeResult::offline(host, cause),
            Err(_) => return ProbeResult::offline(host, "DNS resolution timed out"),
        };

        let client = match ip {
            IpAddr::V4(_) => &self.v4,
            IpAddr::V6(_) => &self.v6,
        };
        let client = match *client {
            Ok(ref client) => client,
            Err(ref cause) => return ProbeResult::offline(host, cause.clone()),
        };

        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(deadline.saturating_duration_since(Instant::now()));

        match timeout_at(deadline, pinger.ping(PingSequence(0), &PAYLOAD)).await {
            Ok(Ok((_, rtt))) => ProbeResult::online(host, round_millis(rtt)),
            Ok(Err(SurgeError::Timeout { .. })) | Err(_) => {
                ProbeResult::offline(host, "Request timed out")
            }
            Ok(Err(e)) => ProbeResult::offline(host, e.to_string()),
        }
    }
}

impl Prober for IcmpProber {
    fn probe<'a>(&'a self, host: &'a Host, timeout: Duration) -> BoxFuture<'a, ProbeResult> {
        async move {
            let result = self.ping(host, timeout).await;
            debug!(
                host = %host.name,
                address = %host.address,
                online = result.online,
                latency_ms = ?result.latency_ms,
                error = ?result.error,
                "Probe finished"
            );
            result
        }
        .boxed()
    }
}

/// Resolves an IP literal or DNS name to the first address found.
async fn resolve(address: &str) -> Result<IpAddr, String> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Ok(ip);
    }
    match net::lookup_host((address, 0)).await {
        Ok(mut addrs) => addrs
            .next()
            .map(|addr| addr.ip())
            .ok_or_else(|| "No IP address found".to_string()),
        Err(e) => Err(format!("DNS resolution failed: {e}")),
    }
}

/// Round-trip time rounded to the nearest whole millisecond.
fn round_millis(rtt: Duration) -> u64 {
    u64::try_from(rtt.as_micros().saturating_add(500) / 1000).unwrap_or(u64::MAX)
}
