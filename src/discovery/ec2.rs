use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_sdk_ec2::types::Filter;

use crate::network::{Pool, PoolID, PoolState, Subnet, SubnetID};

use super::{DiscoveryBackend, Error, PoolFilter, Result};

const VPC_NOT_FOUND: &str = "InvalidVpcID.NotFound";

/// Discovers VPCs and their subnets through the EC2 API.
#[derive(Debug, Clone)]
pub struct Ec2DiscoveryBackend {
    client: Client,
}

impl Ec2DiscoveryBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

impl DiscoveryBackend for Ec2DiscoveryBackend {
    async fn describe_pools(&self, filter: &PoolFilter) -> Result<Vec<Pool>> {
        let mut pools = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let mut request = self.client.describe_vpcs().set_next_token(next_token.take());
            request = match filter {
                PoolFilter::State(state) => request.filters(
                    Filter::builder()
                        .name("state")
                        .values(state.as_str())
                        .build(),
                ),
                PoolFilter::Ids(ids) => {
                    request.set_vpc_ids(Some(ids.iter().map(|id| id.to_string()).collect()))
                }
            };

            let output = match request.send().await {
                Ok(output) => output,
                Err(err) if err.code() == Some(VPC_NOT_FOUND) => {
                    let missing = match filter {
                        PoolFilter::Ids(ids) => missing_pool(ids, err.message()),
                        PoolFilter::State(_) => None,
                    };
                    return match missing {
                        Some(pool_id) => Err(Error::PoolNotFound(pool_id)),
                        None => Err(Error::DescribePools(err.into())),
                    };
                }
                Err(err) => return Err(Error::DescribePools(err.into())),
            };

            for vpc in output.vpcs() {
                let id = PoolID::new(vpc.vpc_id().unwrap_or_default())
                    .map_err(Error::InvalidResource)?;
                let state = vpc
                    .state()
                    .map(|state| PoolState::from(state.as_str()))
                    .unwrap_or_else(|| PoolState::Other(String::new()));
                pools.push(Pool::new(id, state));
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => break,
            }
        }
        log::debug!(target: "discovery", "EC2 returned {} VPC(s)", pools.len());

        Ok(pools)
    }

    async fn describe_subnets(&self, pool_id: &PoolID) -> Result<Vec<Subnet>> {
        let mut subnets = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_subnets()
                .filters(
                    Filter::builder()
                        .name("vpc-id")
                        .values(pool_id.as_str())
                        .build(),
                )
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| Error::DescribeSubnets {
                    pool_id: pool_id.clone(),
                    source: err.into(),
                })?;

            for subnet in output.subnets() {
                let id = SubnetID::new(subnet.subnet_id().unwrap_or_default())
                    .map_err(Error::InvalidResource)?;
                subnets.extend(ipv4_subnet(
                    id,
                    pool_id,
                    subnet.cidr_block(),
                    subnet.available_ip_address_count(),
                ));
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => break,
            }
        }

        Ok(subnets)
    }
}

/// Builds the monitored view of an EC2 subnet.
///
/// The reported available count only covers IPv4 addresses, so subnets
/// without an IPv4 block are skipped, as are subnets without a usable count.
fn ipv4_subnet(
    id: SubnetID,
    pool_id: &PoolID,
    cidr_block: Option<&str>,
    available: Option<i32>,
) -> Option<Subnet> {
    let Some(cidr_block) = cidr_block.filter(|block| !block.is_empty()) else {
        log::warn!(target: "discovery", "Skipping subnet `{id}`: no IPv4 CIDR block");
        return None;
    };
    let Some(available) = available else {
        log::warn!(
            target: "discovery",
            "Skipping subnet `{id}`: no available address count reported"
        );
        return None;
    };
    let Ok(available) = u64::try_from(available) else {
        log::warn!(
            target: "discovery",
            "Skipping subnet `{id}`: negative available address count {available}"
        );
        return None;
    };

    Some(Subnet::new(id, pool_id.clone(), cidr_block, available))
}

/// Picks the requested pool named in a not-found error message.
fn missing_pool(requested: &[PoolID], message: Option<&str>) -> Option<PoolID> {
    let message = message?;
    requested
        .iter()
        .find(|id| message.contains(id.as_str()))
        .cloned()
}
