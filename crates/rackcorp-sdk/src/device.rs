// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Device types used by `device.get` and `device.firewall.update`.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::envelope::null_as_default;

/// Free-form key/value attribute attached to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceExtra {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// A single firewall rule on a device.
///
/// To remove an existing rule, send it back with `policy` set to `DELETED`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallPolicy {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub direction: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub policy: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub port_from: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub port_to: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl FirewallPolicy {
    pub fn new(direction: impl Into<String>, policy: impl Into<String>) -> Self {
        Self {
            direction: direction.into(),
            policy: policy.into(),
            ..Self::default()
        }
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = ip_address.into();
        self
    }

    pub fn with_ports(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.port_from = from.into();
        self.port_to = to.into();
        self
    }
}

/// A device as returned by `device.get`.
///
/// Identifiers are numeric, as the API sends them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_id: u64,
    #[serde(default, deserialize_with = "null_as_default", rename = "primaryIP")]
    pub primary_ip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extra: Vec<DeviceExtra>,
    #[serde(default, deserialize_with = "null_as_default", rename = "dcid")]
    pub data_center_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub firewall_policies: Vec<FirewallPolicy>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub std_name: String,
    /// Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_created: i64,
    /// Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_modified: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub traffic_shared: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub traffic_current: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub traffic_estimated: i64,
    #[serde(default, deserialize_with = "null_as_default", rename = "trafficMB")]
    pub traffic_mb: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dc_name: String,
}

impl Device {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.date_created)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.date_modified)
    }

    /// Value of the first extra attribute named `key`.
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.iter().find(|e| e.key == key).map(|e| &e.value)
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    if secs == 0 {
        return None;
    }
    Utc.timestamp_opt(secs, 0).single()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceGetParams {
    pub device_id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceGetPayload {
    #[serde(default)]
    pub device: Option<Device>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FirewallUpdateParams<'a> {
    pub device_id: u64,
    pub firewall_policies: &'a [FirewallPolicy],
}
