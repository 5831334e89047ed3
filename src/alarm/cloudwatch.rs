use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::types::{ComparisonOperator, Statistic};

use crate::error::BoxError;
use crate::metrics::cloudwatch::{dimensions, standard_unit};

use super::{AlarmBackend, AlarmDefinition, AlarmRule, AlarmScope, Comparison, parse_alarm_name};

/// `DeleteAlarms` accepts at most this many names per call.
const DELETE_BATCH_SIZE: usize = 100;

/// Provisions metric alarms through the CloudWatch API.
#[derive(Debug, Clone)]
pub struct CloudWatchAlarmBackend {
    client: Client,
}

impl CloudWatchAlarmBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

fn comparison_operator(comparison: Comparison) -> ComparisonOperator {
    match comparison {
        Comparison::GreaterThanOrEqualToThreshold => {
            ComparisonOperator::GreaterThanOrEqualToThreshold
        }
    }
}

impl AlarmBackend for CloudWatchAlarmBackend {
    async fn list_alarms(&self, scope: &AlarmScope) -> Result<Vec<AlarmRule>, BoxError> {
        let mut rules = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_alarms()
                .alarm_name_prefix(&scope.name_prefix)
                .set_next_token(next_token.take())
                .send()
                .await?;

            for alarm in output.metric_alarms() {
                if alarm.namespace() != Some(scope.namespace.as_str()) {
                    continue;
                }
                let Some((pool_id, subnet_id)) = alarm.alarm_name().and_then(parse_alarm_name)
                else {
                    continue;
                };
                rules.push(AlarmRule {
                    subnet_id,
                    pool_id,
                    threshold: alarm.threshold().unwrap_or_default(),
                    notification_target: alarm
                        .alarm_actions()
                        .first()
                        .cloned()
                        .unwrap_or_default(),
                });
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => break,
            }
        }

        Ok(rules)
    }

    async fn put_alarm(&self, definition: &AlarmDefinition) -> Result<(), BoxError> {
        self.client
            .put_metric_alarm()
            .alarm_name(&definition.name)
            .namespace(&definition.namespace)
            .metric_name(&definition.metric_name)
            .set_dimensions(Some(dimensions(&definition.dimensions)))
            .statistic(Statistic::Average)
            .unit(standard_unit(definition.unit))
            .comparison_operator(comparison_operator(definition.comparison))
            .threshold(definition.threshold)
            .evaluation_periods(i32::try_from(definition.evaluation_periods)?)
            .period(i32::try_from(definition.period_secs)?)
            .set_alarm_actions(Some(definition.actions.clone()))
            .send()
            .await?;

        Ok(())
    }

    async fn delete_alarms(&self, names: &[String]) -> Result<(), BoxError> {
        for batch in names.chunks(DELETE_BATCH_SIZE) {
            self.client
                .delete_alarms()
                .set_alarm_names(Some(batch.to_vec()))
                .send()
                .await?;
        }

        Ok(())
    }
}
