use super::{providers, ConditionFault, PolicyCondition};
use crate::config::ComponentSettings;
use crate::error::Result;
use client_policy_types::{ComponentRecord, ConditionVote, PolicyContext};
use ipnetwork::IpNetwork;

const IP_ADDRESS: &str = "ipaddr";

/// Applies when a back-channel caller's address is on the allow-list
///
/// Entries are exact addresses or CIDR blocks. Front-channel events are not
/// evaluated, since the user agent's address says nothing about the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIpAddressCondition {
    networks: Vec<IpNetwork>,
}

impl ClientIpAddressCondition {
    pub fn new(networks: Vec<IpNetwork>) -> Self {
        Self { networks }
    }

    pub(crate) fn from_component(record: &ComponentRecord) -> Result<Self> {
        let settings = ComponentSettings::new(record);
        let networks = settings
            .list(IP_ADDRESS)
            .iter()
            .map(|entry| {
                entry
                    .parse::<IpNetwork>()
                    .map_err(|e| settings.invalid(format!("invalid address {entry}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(networks))
    }
}

impl PolicyCondition for ClientIpAddressCondition {
    fn provider_id(&self) -> &'static str {
        providers::CLIENT_IP_ADDRESS
    }

    fn evaluate(&self, context: &PolicyContext) -> std::result::Result<ConditionVote, ConditionFault> {
        if !context.event().is_back_channel() {
            return Ok(ConditionVote::NotApplicable);
        }
        let Some(address) = context.origin().address else {
            return Ok(ConditionVote::Deny);
        };
        Ok(ConditionVote::from_match(
            self.networks.iter().any(|network| network.contains(address)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_policy_types::{ClientRepresentation, Realm, RequestOrigin, RequestParameters};
    use std::net::IpAddr;

    fn condition(entries: &[&str]) -> ClientIpAddressCondition {
        let record = ComponentRecord::condition("ClientIpAddressCondition", "test", providers::CLIENT_IP_ADDRESS)
            .with_config(IP_ADDRESS, entries.iter().copied());
        ClientIpAddressCondition::from_component(&record).unwrap()
    }

    fn token_request(address: Option<&str>) -> PolicyContext {
        let ctx = PolicyContext::token_request(
            Realm::new("test"),
            ClientRepresentation::new("app"),
            RequestParameters::new(),
        );
        match address {
            Some(address) => {
                let ip: IpAddr = address.parse().unwrap();
                ctx.with_origin(RequestOrigin::from_address(ip))
            }
            None => ctx,
        }
    }

    #[test]
    fn test_exact_and_cidr_entries() {
        let condition = condition(&["0.0.0.0", "127.0.0.1", "10.1.0.0/16"]);
        assert_eq!(
            condition.evaluate(&token_request(Some("127.0.0.1"))).unwrap(),
            ConditionVote::Applicable
        );
        assert_eq!(
            condition.evaluate(&token_request(Some("10.1.42.7"))).unwrap(),
            ConditionVote::Applicable
        );
        assert_eq!(
            condition.evaluate(&token_request(Some("192.168.0.1"))).unwrap(),
            ConditionVote::Deny
        );
    }

    #[test]
    fn test_unknown_address_denies() {
        let condition = condition(&["127.0.0.1"]);
        assert_eq!(condition.evaluate(&token_request(None)).unwrap(), ConditionVote::Deny);
    }

    #[test]
    fn test_front_channel_abstains() {
        let condition = condition(&["127.0.0.1"]);
        let ctx = PolicyContext::authorization_request(
            Realm::new("test"),
            ClientRepresentation::new("app"),
            RequestParameters::new(),
        );
        assert_eq!(condition.evaluate(&ctx).unwrap(), ConditionVote::NotApplicable);
    }

    #[test]
    fn test_invalid_entry_rejected_at_load() {
        let record = ComponentRecord::condition("ClientIpAddressCondition", "test", providers::CLIENT_IP_ADDRESS)
            .with_config(IP_ADDRESS, ["not-an-address"]);
        assert!(ClientIpAddressCondition::from_component(&record).is_err());
    }
}
