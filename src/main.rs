/// Entry point for the Subnet Monitor.
///
/// This binary reads its configuration from the environment, reconciles one
/// utilization alarm per subnet, and publishes the IP address utilization of
/// every selected subnet to CloudWatch on a fixed interval.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or, with `RUN_ONCE=true`,
/// if the single cycle fails.
///
/// # Examples
///
/// ```bash
/// SELECTED_VPC=vpc-0a1b2c3d ALARM_TOPIC_ARN=arn:aws:sns:eu-west-1:123456789012:alarms \
///     cargo run --features aws
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = subnet_monitor::Config::from_env()?;
    log::info!(
        "Monitoring {} every {}s",
        config.selector,
        config.interval.as_secs()
    );
    subnet_monitor::run(config).await?;
    Ok(())
}
