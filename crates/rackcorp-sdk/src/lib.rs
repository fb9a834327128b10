// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! RackCorp SDK
//!
//! Client for the RackCorp cloud API: devices and the asynchronous
//! transactions (startup, shutdown, config refresh, ...) run against them.
//!
//! # Architecture
//!
//! Every API call is one JSON envelope posted to a single endpoint:
//! - [`Envelope`] names the action and carries its parameters
//! - [`Transport`] delivers it (HTTPS by default, see [`HttpTransport`])
//! - [`ResponseEnvelope`] parses the reply's `code`, `message` and payload
//! - [`classify`] turns it into a value or an [`SdkError::Api`]
//!
//! Transactions come back in two shapes (freshly created vs. looked up) and
//! are normalized into [`Transaction`]. [`await_quiescence`] polls until an
//! object has no pending transactions left.
//!
//! # Example
//!
//! ```no_run
//! use rackcorp_sdk::{ObjectType, QuiescenceOptions, RackcorpClient, StartupData};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RackcorpClient::from_env()?;
//!
//! let data = StartupData::new()
//!     .with_user_data("#cloud-config\npackages: [nginx]\n")
//!     .with_deploy_media_image("ubuntu-24.04");
//! let tx = client.transaction_device_startup("5075", &data).await?;
//! println!("Started transaction {}", tx.transaction_id);
//!
//! // Don't touch the device until the startup has gone through
//! let options = QuiescenceOptions::from_config(client.config());
//! client
//!     .wait_for_pending_transactions(ObjectType::Device, "5075", &options)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod classify;
mod client;
mod config;
mod device;
mod envelope;
mod error;
mod poller;
mod transaction;
mod transport;

pub use classify::{check_status, classify};
pub use client::RackcorpClient;
pub use config::{DEFAULT_API_URL, SdkConfig};
pub use device::{Device, DeviceExtra, FirewallPolicy};
pub use envelope::{Action, Envelope, NoPayload, ResponseEnvelope, ResponseStatus};
pub use error::{Result, SdkError};
pub use poller::{QuiescenceOptions, TransactionSearch, await_quiescence};
pub use transaction::{
    CloudInit, CreatedTransaction, ExistingTransaction, ObjectType, StartupData, Transaction,
    TransactionFilter, TransactionPage, TransactionStatus, TransactionType, WireTransaction,
};
pub use transport::{HttpTransport, Transport};

/// Re-exported so callers can build [`QuiescenceOptions`] without a direct dependency.
pub use tokio_util::sync::CancellationToken;
