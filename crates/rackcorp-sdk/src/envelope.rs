// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request and response envelopes.
//!
//! Every call to the API is a single JSON object posted to one endpoint.
//! The outgoing object names the remote operation under [`Envelope::ACTION_KEY`]
//! and carries the operation's parameters next to it. Every reply carries a
//! `code` and `message`, plus whatever payload the operation defines.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Result, SdkError};

/// Remote operations understood by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    TransactionCreate,
    TransactionGet,
    TransactionGetAll,
    DeviceGet,
    DeviceFirewallUpdate,
}

impl Action {
    /// All known actions.
    pub const ALL: [Action; 5] = [
        Action::TransactionCreate,
        Action::TransactionGet,
        Action::TransactionGetAll,
        Action::DeviceGet,
        Action::DeviceFirewallUpdate,
    ];

    /// Wire identifier of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::TransactionCreate => "rctransaction.create",
            Action::TransactionGet => "rctransaction.get",
            Action::TransactionGetAll => "rctransaction.getall",
            Action::DeviceGet => "device.get",
            Action::DeviceFirewallUpdate => "device.firewall.update",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(SdkError::InvalidInput("action is required".to_string()));
        }
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| SdkError::InvalidInput(format!("unknown action '{}'", s)))
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outgoing request envelope.
///
/// One type serves every action: the action-specific parameters are kept as a
/// JSON object and flattened beside the action key when serialized. Session
/// fields are added by the [`Transport`](crate::Transport), not here.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    action: Action,
    fields: Map<String, Value>,
}

impl Envelope {
    /// Key the action identifier is written under.
    pub const ACTION_KEY: &'static str = "cmd";

    /// Wrap `params` into an envelope for `action`.
    ///
    /// `params` must serialize to a JSON object (or unit, for actions without
    /// parameters) and must not itself use the action key.
    pub fn encode<P: Serialize + ?Sized>(action: Action, params: &P) -> Result<Self> {
        let fields = match serde_json::to_value(params)? {
            Value::Object(fields) => fields,
            Value::Null => Map::new(),
            other => {
                return Err(SdkError::InvalidInput(format!(
                    "parameters for {} must be an object, got {}",
                    action, other
                )));
            }
        };

        if fields.contains_key(Self::ACTION_KEY) {
            return Err(SdkError::InvalidInput(format!(
                "parameters for {} must not contain '{}'",
                action,
                Self::ACTION_KEY
            )));
        }

        Ok(Self { action, fields })
    }

    /// Like [`Envelope::encode`], taking the action by its wire name.
    pub fn encode_named<P: Serialize + ?Sized>(action: &str, params: &P) -> Result<Self> {
        Self::encode(action.parse()?, params)
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Action-specific parameters.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The complete JSON object, action key first.
    pub fn to_json_object(&self) -> Map<String, Value> {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert(
            Self::ACTION_KEY.to_string(),
            Value::String(self.action.as_str().to_string()),
        );
        object.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        object
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json_object().serialize(serializer)
    }
}

/// Status part shared by every response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseStatus {
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Nested error detail, when the API supplies one.
    #[serde(default, rename = "errors")]
    pub detail: Option<Value>,
}

impl ResponseStatus {
    /// The only success sentinel.
    pub const OK: &'static str = "OK";

    pub fn is_ok(&self) -> bool {
        self.code == Self::OK
    }
}

/// Incoming response envelope with an action-specific payload `P`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope<P> {
    #[serde(flatten)]
    pub status: ResponseStatus,
    #[serde(flatten)]
    pub payload: P,
}

impl<P: DeserializeOwned> ResponseEnvelope<P> {
    /// Parse a raw reply for `action`.
    ///
    /// Only checks the shape; whether the call succeeded is decided by
    /// [`classify`](crate::classify).
    pub fn decode(action: Action, raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).map_err(|e| SdkError::MalformedResponse {
            action: action.to_string(),
            message: e.to_string(),
        })
    }
}

impl<P> ResponseEnvelope<P> {
    pub fn into_parts(self) -> (ResponseStatus, P) {
        (self.status, self.payload)
    }
}

/// Decode an explicit `null` like a missing key: as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload of responses that carry nothing beyond the status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoPayload {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct GetParams {
        device_id: u64,
    }

    #[test]
    fn test_action_wire_names() {
        assert_eq!(Action::TransactionCreate.as_str(), "rctransaction.create");
        assert_eq!(Action::TransactionGet.as_str(), "rctransaction.get");
        assert_eq!(Action::TransactionGetAll.as_str(), "rctransaction.getall");
        assert_eq!(Action::DeviceGet.as_str(), "device.get");
        assert_eq!(Action::DeviceFirewallUpdate.as_str(), "device.firewall.update");
    }

    #[test]
    fn test_action_parse() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert!(matches!(
            "".parse::<Action>(),
            Err(SdkError::InvalidInput(msg)) if msg.contains("required")
        ));
        assert!(matches!(
            "device.delete".parse::<Action>(),
            Err(SdkError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_encode_flattens_params_beside_action() {
        let envelope = Envelope::encode(Action::DeviceGet, &GetParams { device_id: 678 }).unwrap();
        assert_eq!(envelope.action(), Action::DeviceGet);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"cmd": "device.get", "deviceId": 678})
        );
    }

    #[test]
    fn test_encode_named_rejects_empty_action() {
        let err = Envelope::encode_named("", &GetParams { device_id: 1 }).unwrap_err();
        assert!(matches!(err, SdkError::InvalidInput(_)));
    }

    #[test]
    fn test_encode_rejects_non_object_params() {
        let err = Envelope::encode(Action::DeviceGet, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, SdkError::InvalidInput(_)));
    }

    #[test]
    fn test_encode_rejects_action_key_in_params() {
        let err = Envelope::encode(Action::DeviceGet, &json!({"cmd": "device.get"})).unwrap_err();
        assert!(matches!(err, SdkError::InvalidInput(_)));
    }

    #[test]
    fn test_encode_unit_params() {
        let envelope = Envelope::encode(Action::TransactionGetAll, &()).unwrap();
        assert!(envelope.fields().is_empty());
    }

    #[test]
    fn test_decode_status_only() {
        let raw = br#"{"code": "OK", "message": "good to go"}"#;
        let resp: ResponseEnvelope<NoPayload> =
            ResponseEnvelope::decode(Action::DeviceFirewallUpdate, raw).unwrap();
        assert!(resp.status.is_ok());
        assert_eq!(resp.status.message, "good to go");
        assert!(resp.status.detail.is_none());
    }

    #[test]
    fn test_decode_keeps_error_detail() {
        let raw = br#"{"code": "FAULT", "message": "bad", "errors": [{"field": "deviceId"}]}"#;
        let resp: ResponseEnvelope<NoPayload> =
            ResponseEnvelope::decode(Action::DeviceGet, raw).unwrap();
        assert!(!resp.status.is_ok());
        assert_eq!(resp.status.detail, Some(json!([{"field": "deviceId"}])));
    }

    #[test]
    fn test_decode_null_message() {
        let raw = br#"{"code": "OK", "message": null}"#;
        let resp: ResponseEnvelope<NoPayload> =
            ResponseEnvelope::decode(Action::DeviceFirewallUpdate, raw).unwrap();
        assert_eq!(resp.status.message, "");
    }

    #[test]
    fn test_decode_malformed() {
        let err = ResponseEnvelope::<NoPayload>::decode(Action::DeviceGet, b"<html>").unwrap_err();
        match err {
            SdkError::MalformedResponse { action, .. } => assert_eq!(action, "device.get"),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }

        // `code` is present on every response
        let err =
            ResponseEnvelope::<NoPayload>::decode(Action::DeviceGet, br#"{"message": "x"}"#)
                .unwrap_err();
        assert!(matches!(err, SdkError::MalformedResponse { .. }));
    }
}
