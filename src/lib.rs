/// Subnet Monitor: tracks IP address utilization of the subnets of a set of
/// virtual networks and keeps one threshold alarm per subnet in place.
///
/// This library provides the discovery of pools and subnets, the utilization
/// calculation, the publication of per-subnet metrics, the reconciliation of
/// alarm rules, and a read-only status API.
pub mod alarm;
pub mod api;
pub mod config;
pub mod discovery;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod network;
pub mod utilization;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, Result};

#[cfg(feature = "aws")]
use error::ResultOkLogExt;

/// Seconds since the UNIX epoch.
///
/// # Errors
///
/// Returns [`Error::Clock`] if the system clock is set before the epoch.
pub fn unix_timestamp() -> Result<u64> {
    Ok(std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs())
}

/// Returns `true` if alarms are due for reconciliation after `cycle` (1-based).
#[cfg_attr(not(feature = "aws"), allow(dead_code))]
fn reconcile_due(cycle: u64, reconcile_every: u64) -> bool {
    reconcile_every > 0 && cycle % reconcile_every == 0
}

/// Runs the Subnet Monitor against AWS.
///
/// Reconciles alarms once at startup, then publishes the utilization of every
/// discovered subnet each `config.interval`. Ticks missed by a slow cycle are
/// skipped, so cycles never overlap.
///
/// # Errors
///
/// Failures of a single cycle or reconciliation are logged and the loop
/// continues. With `config.run_once`, a single cycle is run and its discovery
/// or reconciliation error is returned instead.
#[cfg(feature = "aws")]
pub async fn run(config: Config) -> Result<()> {
    use alarm::CloudWatchAlarmBackend;
    use discovery::Ec2DiscoveryBackend;
    use metrics::CloudWatchMetricsBackend;

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_sdk_ec2::config::Region::new(config.region.clone()))
        .load()
        .await;
    log::debug!("Loaded AWS configuration for region `{}`", config.region);

    let monitor = monitor::Monitor::from_config(
        &config,
        Ec2DiscoveryBackend::from_conf(&sdk_config),
        CloudWatchMetricsBackend::from_conf(&sdk_config),
        CloudWatchAlarmBackend::from_conf(&sdk_config),
    );

    if let Some(addr) = config.api_listen_addr {
        let api = api::APIServer::new(monitor.store());
        tokio::spawn(async move {
            api.listen(addr).await.ok_log("api");
        });
    }

    if monitor.can_reconcile() {
        let reconciled = monitor.reconcile_alarms().await;
        if config.run_once {
            reconciled?;
        } else {
            reconciled.ok_log("alarm reconciler");
        }
    } else {
        log::warn!(
            target: "alarm reconciler",
            "No notification target configured, skipping alarm reconciliation"
        );
    }

    if config.run_once {
        monitor.run_cycle(unix_timestamp()?).await?;
        return Ok(());
    }

    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut cycle: u64 = 0;
    loop {
        interval.tick().await;
        cycle += 1;
        let timestamp = unix_timestamp()?;
        log::trace!("Monitoring subnets@{timestamp}");

        monitor.run_cycle(timestamp).await.ok_log("monitor");

        if monitor.can_reconcile() && reconcile_due(cycle, config.reconcile_every) {
            monitor.reconcile_alarms().await.ok_log("alarm reconciler");
        }
    }
}
