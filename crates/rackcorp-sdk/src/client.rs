// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! RackcorpClient for interacting with the RackCorp API.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::classify::{check_status, classify};
use crate::config::SdkConfig;
use crate::device::{
    Device, DeviceGetParams, DeviceGetPayload, FirewallPolicy, FirewallUpdateParams,
};
use crate::envelope::{Action, Envelope, NoPayload, ResponseEnvelope};
use crate::error::{Result, SdkError};
use crate::poller::{QuiescenceOptions, TransactionSearch, await_quiescence};
use crate::transaction::{
    CreateParams, CreatePayload, GetAllPayload, GetParams, GetPayload, ObjectType, StartupData,
    Transaction, TransactionFilter, TransactionPage, TransactionType,
};
use crate::transport::{HttpTransport, Transport};

/// Client for the RackCorp API.
///
/// Every operation follows the same path: the parameters are wrapped in an
/// [`Envelope`], handed to the [`Transport`], the reply is decoded into a
/// [`ResponseEnvelope`] and then classified. Nothing is retried here.
pub struct RackcorpClient {
    transport: Box<dyn Transport>,
    config: SdkConfig,
}

impl RackcorpClient {
    /// Create a client posting over HTTPS with the given configuration.
    pub fn new(config: SdkConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = SdkConfig::from_env()?;
        Self::new(config)
    }

    /// Create a client on top of a custom transport.
    pub fn with_transport(config: SdkConfig, transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            config,
        }
    }

    /// Get the SDK configuration.
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    /// Encode, send and decode one call. Classification is left to the caller.
    async fn call<P, R>(&self, action: Action, params: &P) -> Result<ResponseEnvelope<R>>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let envelope = Envelope::encode(action, params)?;
        let raw = self.transport.post(&envelope).await?;
        ResponseEnvelope::decode(action, &raw)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Create a transaction without a data payload.
    #[instrument(skip(self), fields(object_id = %object_id))]
    pub async fn transaction_create(
        &self,
        transaction_type: TransactionType,
        object_type: ObjectType,
        object_id: &str,
        confirm: bool,
    ) -> Result<Transaction> {
        self.create_transaction(transaction_type, object_type, object_id, confirm, "")
            .await
    }

    /// Start a device, passing cloud-init and deploy media settings.
    #[instrument(skip(self, data), fields(device_id = %device_id))]
    pub async fn transaction_device_startup(
        &self,
        device_id: &str,
        data: &StartupData,
    ) -> Result<Transaction> {
        let payload = data.to_payload()?;
        self.create_transaction(
            TransactionType::Startup,
            ObjectType::Device,
            device_id,
            true,
            &payload,
        )
        .await
    }

    async fn create_transaction(
        &self,
        transaction_type: TransactionType,
        object_type: ObjectType,
        object_id: &str,
        confirm: bool,
        data: &str,
    ) -> Result<Transaction> {
        if object_id.is_empty() {
            return Err(SdkError::InvalidInput("object id is required".to_string()));
        }

        info!(
            transaction_type = %transaction_type,
            object_type = %object_type,
            "Creating transaction"
        );

        let action = Action::TransactionCreate;
        let params = CreateParams {
            object_type: object_type.as_str(),
            object_id,
            transaction_type: transaction_type.as_str(),
            confirmation: confirm,
            data,
        };

        let (status, payload) = self.call::<_, CreatePayload>(action, &params).await?.into_parts();
        let transaction = Transaction::from(classify(action, status, payload.into_wire())?);

        debug!(transaction_id = %transaction.transaction_id, "Transaction created");
        Ok(transaction)
    }

    /// Get a transaction by id.
    ///
    /// The id must be the decimal form returned by the API.
    #[instrument(skip(self), fields(transaction_id = %transaction_id))]
    pub async fn transaction_get(&self, transaction_id: &str) -> Result<Transaction> {
        debug!("Getting transaction");

        let numeric_id: u64 = transaction_id
            .parse()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                SdkError::InvalidInput(format!("invalid transaction id '{}'", transaction_id))
            })?;

        let action = Action::TransactionGet;
        let params = GetParams {
            transaction_id: numeric_id,
        };

        let (status, payload) = self.call::<_, GetPayload>(action, &params).await?.into_parts();
        let wire = classify(action, status, payload.into_wire())?;

        Ok(Transaction::from(wire))
    }

    /// Search transactions.
    #[instrument(skip(self, filter), fields(object_type = %filter.object_type))]
    pub async fn transaction_get_all(&self, filter: &TransactionFilter) -> Result<TransactionPage> {
        debug!("Searching transactions");

        let action = Action::TransactionGetAll;
        let (status, payload) = self
            .call::<_, GetAllPayload>(action, filter)
            .await?
            .into_parts();
        let matches = payload.matches;
        let wire = classify(action, status, payload.into_wire())?;

        Ok(TransactionPage {
            transactions: wire.into_iter().map(Transaction::from).collect(),
            matches,
        })
    }

    /// Wait until no transaction on the object is pending or commenced.
    pub async fn wait_for_pending_transactions(
        &self,
        object_type: ObjectType,
        object_id: &str,
        options: &QuiescenceOptions,
    ) -> Result<()> {
        await_quiescence(self, object_type, object_id, options).await
    }

    /// Create a transaction and wait until the object has no pending work.
    pub async fn run_transaction(
        &self,
        transaction_type: TransactionType,
        object_type: ObjectType,
        object_id: &str,
        confirm: bool,
        options: &QuiescenceOptions,
    ) -> Result<Transaction> {
        let transaction = self
            .transaction_create(transaction_type, object_type, object_id, confirm)
            .await?;

        self.wait_for_pending_transactions(object_type, object_id, options)
            .await?;

        Ok(transaction)
    }

    // =========================================================================
    // Devices
    // =========================================================================

    /// Get a device by id.
    #[instrument(skip(self), fields(device_id = %device_id))]
    pub async fn device_get(&self, device_id: u64) -> Result<Device> {
        debug!("Getting device");

        if device_id == 0 {
            return Err(SdkError::InvalidInput("device id is required".to_string()));
        }

        let action = Action::DeviceGet;
        let (status, payload) = self
            .call::<_, DeviceGetPayload>(action, &DeviceGetParams { device_id })
            .await?
            .into_parts();

        classify(action, status, payload.device)
    }

    /// Replace firewall policies on a device.
    ///
    /// Existing policies are deleted by sending them with policy `DELETED`.
    #[instrument(skip(self, firewall_policies), fields(device_id = %device_id))]
    pub async fn device_update_firewall(
        &self,
        device_id: u64,
        firewall_policies: &[FirewallPolicy],
    ) -> Result<()> {
        if device_id == 0 {
            return Err(SdkError::InvalidInput("device id is required".to_string()));
        }
        if firewall_policies.is_empty() {
            return Err(SdkError::InvalidInput(
                "at least one firewall policy is required".to_string(),
            ));
        }

        info!(policies = firewall_policies.len(), "Updating device firewall");

        let action = Action::DeviceFirewallUpdate;
        let params = FirewallUpdateParams {
            device_id,
            firewall_policies,
        };
        let (status, _) = self
            .call::<_, NoPayload>(action, &params)
            .await?
            .into_parts();

        check_status(action, status)
    }
}

#[async_trait]
impl TransactionSearch for RackcorpClient {
    async fn search_transactions(&self, filter: &TransactionFilter) -> Result<TransactionPage> {
        self.transaction_get_all(filter).await
    }
}
