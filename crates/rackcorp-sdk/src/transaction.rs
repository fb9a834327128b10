// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Remote transactions.
//!
//! A transaction is a server-tracked asynchronous operation against an
//! object (currently only devices). The API describes a transaction in two
//! shapes: the reply to `rctransaction.create` carries a numeric id and the
//! confirmation fields, while `rctransaction.get`/`getall` carry a string id
//! and the status fields. Both are normalized into [`Transaction`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::envelope::null_as_default;
use crate::error::{Result, SdkError};

/// Kind of object a transaction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[non_exhaustive]
pub enum ObjectType {
    Device,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Device => "DEVICE",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation a transaction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Cancel,
    Startup,
    Shutdown,
    ForceShutdown,
    SafeShutdown,
    RefreshConfig,
    /// `data` carries the public IP allowed to connect.
    OpenVnc,
    CloseVnc,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Cancel => "CANCEL",
            TransactionType::Startup => "STARTUP",
            TransactionType::Shutdown => "SHUTDOWN",
            TransactionType::ForceShutdown => "FORCESHUTDOWN",
            TransactionType::SafeShutdown => "SAFESHUTDOWN",
            TransactionType::RefreshConfig => "REFRESHCONFIG",
            TransactionType::OpenVnc => "OPENVNC",
            TransactionType::CloseVnc => "CLOSEVNC",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of an existing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[non_exhaustive]
pub enum TransactionStatus {
    Pending,
    Commenced,
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Commenced => "COMMENCED",
            TransactionStatus::Completed => "COMPLETED",
        }
    }

    /// Pending or commenced: the remote side is still working on it.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Pending | TransactionStatus::Commenced
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "COMMENCED" => Ok(TransactionStatus::Commenced),
            "COMPLETED" => Ok(TransactionStatus::Completed),
            other => Err(SdkError::InvalidInput(format!(
                "unknown transaction status '{}'",
                other
            ))),
        }
    }
}

/// Transaction as returned by `rctransaction.create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedTransaction {
    #[serde(rename = "rcTransactionId")]
    pub transaction_id: u64,
    #[serde(default, deserialize_with = "null_as_default", rename = "confirmationRequired")]
    pub confirmation_required: bool,
    #[serde(default, deserialize_with = "null_as_default", rename = "confirmationText")]
    pub confirmation_text: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "objType")]
    pub object_type: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "objId")]
    pub object_id: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "type")]
    pub transaction_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
}

/// Transaction as returned by `rctransaction.get` and `rctransaction.getall`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExistingTransaction {
    #[serde(rename = "rcTransactionId")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "objType")]
    pub object_type: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "objId")]
    pub object_id: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "method")]
    pub transaction_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "statusInfo")]
    pub status_info: String,
}

/// Either wire shape of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireTransaction {
    Created(CreatedTransaction),
    Existing(ExistingTransaction),
}

impl From<WireTransaction> for Transaction {
    fn from(wire: WireTransaction) -> Self {
        match wire {
            WireTransaction::Created(t) => Transaction::from_created(&t),
            WireTransaction::Existing(t) => Transaction::from_existing(&t),
        }
    }
}

/// A remote transaction.
///
/// Fields the source shape does not carry are left empty (`""`/`false`):
/// a freshly created transaction has no status, an existing one has no
/// confirmation fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub object_type: String,
    pub object_id: String,
    pub transaction_type: String,
    pub data: String,
    pub confirmation_required: bool,
    pub confirmation_text: String,
    pub status: String,
    pub status_info: String,
}

impl Transaction {
    pub fn from_created(raw: &CreatedTransaction) -> Self {
        Self {
            transaction_id: raw.transaction_id.to_string(),
            object_type: raw.object_type.clone(),
            object_id: raw.object_id.clone(),
            transaction_type: raw.transaction_type.clone(),
            data: raw.data.clone(),
            confirmation_required: raw.confirmation_required,
            confirmation_text: raw.confirmation_text.clone(),
            ..Self::default()
        }
    }

    pub fn from_existing(raw: &ExistingTransaction) -> Self {
        Self {
            transaction_id: raw.transaction_id.clone(),
            object_type: raw.object_type.clone(),
            object_id: raw.object_id.clone(),
            transaction_type: raw.transaction_type.clone(),
            data: raw.data.clone(),
            status: raw.status.clone(),
            status_info: raw.status_info.clone(),
            ..Self::default()
        }
    }

    /// True while the status is PENDING or COMMENCED.
    pub fn is_pending(&self) -> bool {
        self.status
            .parse::<TransactionStatus>()
            .map(|s| s.is_pending())
            .unwrap_or(false)
    }
}

/// Search criteria for `rctransaction.getall`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionFilter {
    #[serde(rename = "objType")]
    pub object_type: ObjectType,
    #[serde(rename = "objId", skip_serializing_if = "Vec::is_empty")]
    pub object_ids: Vec<String>,
    #[serde(rename = "method", skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TransactionType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<TransactionStatus>,
    #[serde(rename = "customerId", skip_serializing_if = "Vec::is_empty")]
    pub customer_ids: Vec<String>,
    #[serde(rename = "resStart", skip_serializing_if = "is_zero")]
    pub result_start: u32,
    #[serde(rename = "resWindow", skip_serializing_if = "is_zero")]
    pub result_window: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl TransactionFilter {
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            object_type,
            object_ids: Vec::new(),
            types: Vec::new(),
            status: Vec::new(),
            customer_ids: Vec::new(),
            result_start: 0,
            result_window: 0,
        }
    }

    /// Filter matching any pending or commenced transaction on one object.
    ///
    /// A window of one is enough: callers only look at the match count.
    pub fn pending_for(object_type: ObjectType, object_id: impl Into<String>) -> Self {
        Self::new(object_type)
            .with_object_id(object_id)
            .with_status(TransactionStatus::Pending)
            .with_status(TransactionStatus::Commenced)
            .with_result_window(1)
    }

    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_ids.push(object_id.into());
        self
    }

    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.types.push(transaction_type);
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status.push(status);
        self
    }

    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_ids.push(customer_id.into());
        self
    }

    pub fn with_result_start(mut self, start: u32) -> Self {
        self.result_start = start;
        self
    }

    pub fn with_result_window(mut self, window: u32) -> Self {
        self.result_window = window;
        self
    }
}

/// One page of a transaction search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    /// Total number of matching transactions, independent of the window.
    pub matches: u64,
}

/// cloud-init documents handed to a device on startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudInit {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub meta_data: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_config: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_data: String,
}

impl CloudInit {
    pub fn is_empty(&self) -> bool {
        self.meta_data.is_empty() && self.network_config.is_empty() && self.user_data.is_empty()
    }
}

/// `data` document of a STARTUP transaction.
///
/// Empty fields are left out of the serialized form entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupData {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deploy_media_image_access_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deploy_media_image_access_secret: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deploy_media_image_bucket: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deploy_media_image_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deploy_media_image_path: String,
    #[serde(default, skip_serializing_if = "CloudInit::is_empty")]
    pub cloud_init: CloudInit,
}

impl StartupData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_data(mut self, user_data: impl Into<String>) -> Self {
        self.cloud_init.user_data = user_data.into();
        self
    }

    pub fn with_meta_data(mut self, meta_data: impl Into<String>) -> Self {
        self.cloud_init.meta_data = meta_data.into();
        self
    }

    pub fn with_network_config(mut self, network_config: impl Into<String>) -> Self {
        self.cloud_init.network_config = network_config.into();
        self
    }

    pub fn with_deploy_media_image(mut self, image_id: impl Into<String>) -> Self {
        self.deploy_media_image_id = image_id.into();
        self
    }

    /// Credentials for a private deploy media bucket.
    pub fn with_deploy_media_credentials(
        mut self,
        access_key: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Self {
        self.deploy_media_image_access_key = access_key.into();
        self.deploy_media_image_access_secret = access_secret.into();
        self
    }

    pub fn with_deploy_media_location(
        mut self,
        bucket: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.deploy_media_image_bucket = bucket.into();
        self.deploy_media_image_path = path.into();
        self
    }

    /// Serialize into the string carried in the transaction's `data` field.
    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateParams<'a> {
    #[serde(rename = "objType")]
    pub object_type: &'a str,
    #[serde(rename = "objId")]
    pub object_id: &'a str,
    #[serde(rename = "type")]
    pub transaction_type: &'a str,
    pub confirmation: bool,
    pub data: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePayload {
    #[serde(default, rename = "rcTransaction")]
    pub transaction: Option<CreatedTransaction>,
}

impl CreatePayload {
    pub fn into_wire(self) -> Option<WireTransaction> {
        self.transaction.map(WireTransaction::Created)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetParams {
    #[serde(rename = "rcTransactionId")]
    pub transaction_id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetPayload {
    #[serde(default, rename = "rcTransaction")]
    pub transaction: Option<ExistingTransaction>,
}

impl GetPayload {
    pub fn into_wire(self) -> Option<WireTransaction> {
        self.transaction.map(WireTransaction::Existing)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetAllPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub matches: u64,
    #[serde(default, rename = "rcTransactions")]
    pub transactions: Option<Vec<ExistingTransaction>>,
}

impl GetAllPayload {
    pub fn into_wire(self) -> Option<Vec<WireTransaction>> {
        self.transactions
            .map(|all| all.into_iter().map(WireTransaction::Existing).collect())
    }
}
