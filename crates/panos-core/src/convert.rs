// ── Conversions between XML API entries and domain types ──
//
// The device omits empty elements, so absent descriptions stay `None`
// and absent member lists come back empty.

use panos_api::xmlapi::models::Members;
use panos_api::{AddressEntry, SecurityRuleEntry};

use crate::error::CoreError;
use crate::model::{AddressKind, AddressObject, RuleAction, SecurityRule};

// ── Address objects ─────────────────────────────────────────────────

impl From<AddressEntry> for AddressObject {
    fn from(entry: AddressEntry) -> Self {
        let (value_kind, value) = match (entry.ip_netmask, entry.ip_range, entry.fqdn) {
            (Some(v), _, _) => (AddressKind::IpNetmask, v),
            (None, Some(v), _) => (AddressKind::IpRange, v),
            (None, None, Some(v)) => (AddressKind::Fqdn, v),
            (None, None, None) => (AddressKind::IpNetmask, String::new()),
        };
        Self {
            name: entry.name,
            value,
            value_kind,
            description: entry.description.filter(|d| !d.is_empty()),
            retained: entry.unmodelled,
        }
    }
}

impl From<&AddressObject> for AddressEntry {
    fn from(object: &AddressObject) -> Self {
        let mut entry = AddressEntry {
            name: object.name.clone(),
            description: object.description.clone(),
            unmodelled: object.retained.clone(),
            ..AddressEntry::default()
        };
        let value = Some(object.value.clone());
        match object.value_kind {
            AddressKind::IpNetmask => entry.ip_netmask = value,
            AddressKind::IpRange => entry.ip_range = value,
            AddressKind::Fqdn => entry.fqdn = value,
        }
        entry
    }
}

// ── Security rules ──────────────────────────────────────────────────

impl TryFrom<SecurityRuleEntry> for SecurityRule {
    type Error = CoreError;

    fn try_from(entry: SecurityRuleEntry) -> Result<Self, Self::Error> {
        let action = match entry.action.as_deref() {
            None => RuleAction::default(),
            Some(raw) => raw.parse().map_err(|_| {
                CoreError::Internal(format!(
                    "security rule '{}' has unrecognized action '{raw}'",
                    entry.name
                ))
            })?,
        };
        Ok(Self {
            name: entry.name,
            source_zones: entry.from.member,
            destination_zones: entry.to.member,
            source_addresses: entry.source.member,
            destination_addresses: entry.destination.member,
            applications: entry.application.member,
            services: entry.service.member,
            action,
            description: entry.description.filter(|d| !d.is_empty()),
            retained: entry.unmodelled,
        })
    }
}

impl From<&SecurityRule> for SecurityRuleEntry {
    fn from(rule: &SecurityRule) -> Self {
        let members = |values: &[String]| Members {
            member: values.to_vec(),
        };
        SecurityRuleEntry {
            name: rule.name.clone(),
            from: members(&rule.source_zones),
            to: members(&rule.destination_zones),
            source: members(&rule.source_addresses),
            destination: members(&rule.destination_addresses),
            application: members(&rule.applications),
            service: members(&rule.services),
            action: Some(rule.action.to_string()),
            description: rule.description.clone(),
            unmodelled: rule.retained.clone(),
        }
    }
}
