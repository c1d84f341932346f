// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Binding Composer
//!
//! Client-side workflow that turns two connected wallets into a signed
//! [`BindingRecord`]:
//!
//! 1. connect the Substrate extension and pick an account,
//! 2. let the EVM wallet connect (ambient state owned by the wallet),
//! 3. sign the canonical message with the EVM account,
//! 4. append the record locally and hand it to the relay in the background.
//!
//! Only the EVM account signs. The Substrate address is tied to the signature
//! solely by appearing verbatim in the signed text.
//!
//! ## Delivery
//!
//! Relay submission is at-most-once with no acknowledgment surfaced to the
//! user. The record is already in [`BindingComposer::bindings`] when the
//! submission starts, and a relay failure is only logged.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::models::{BindingRecord, EvmAccount, SubstrateAccount};

pub mod local_wallet;
pub mod relay_client;
pub mod wallet;

pub use local_wallet::LocalEvmWallet;
pub use relay_client::{BindingSubmitter, RelayClient, RelayClientError};
pub use wallet::{EvmWallet, SubstrateExtensions, WalletError};

/// Name shown by Substrate extensions when asking the user for access.
pub const APP_NAME: &str = "Address Binder DApp";

/// The text the EVM account signs.
pub fn canonical_message(substrate_address: &str) -> String {
    format!(
        "I am binding my Substrate address: {substrate_address} to this EVM address for loyalty program activities."
    )
}

/// True when a Substrate account is selected and the EVM wallet reports a
/// connection with an address. Derived from its inputs on every call, never
/// stored.
pub fn can_bind(selected: Option<&SubstrateAccount>, evm: &EvmAccount) -> bool {
    binding_parties(selected, evm).is_some()
}

/// The two addresses a binding joins, present exactly when [`can_bind`] holds.
fn binding_parties<'a>(
    selected: Option<&'a SubstrateAccount>,
    evm: &'a EvmAccount,
) -> Option<(&'a str, &'a str)> {
    match (selected, evm.address.as_deref()) {
        (Some(account), Some(evm_address)) if evm.is_connected => {
            Some((account.address.as_str(), evm_address))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstrateStatus {
    #[default]
    NotConnected,
    Connected,
}

/// User-facing failures. `Display` is the notice shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("No Substrate wallet extension found. Please install one and refresh the page.")]
    NoExtension,

    #[error("No accounts found in your Substrate wallet.")]
    NoAccounts,

    #[error("Error connecting to Substrate wallet: {0}")]
    Connection(#[source] WalletError),

    #[error("Account {0} is not one of the connected Substrate accounts.")]
    UnknownAccount(String),

    #[error("Please ensure both Substrate and EVM wallets are connected.")]
    NotReady,

    #[error("Failed to generate signature: {0}")]
    Signature(#[source] WalletError),
}

pub struct BindingComposer<S, E> {
    extensions: S,
    evm: E,
    submitter: Arc<dyn BindingSubmitter>,
    accounts: Vec<SubstrateAccount>,
    selected: Option<SubstrateAccount>,
    status: SubstrateStatus,
    bindings: Vec<BindingRecord>,
}

impl<S, E> BindingComposer<S, E>
where
    S: SubstrateExtensions,
    E: EvmWallet,
{
    pub fn new(extensions: S, evm: E, submitter: Arc<dyn BindingSubmitter>) -> Self {
        Self {
            extensions,
            evm,
            submitter,
            accounts: Vec::new(),
            selected: None,
            status: SubstrateStatus::NotConnected,
            bindings: Vec::new(),
        }
    }

    pub fn accounts(&self) -> &[SubstrateAccount] {
        &self.accounts
    }

    pub fn selected_account(&self) -> Option<&SubstrateAccount> {
        self.selected.as_ref()
    }

    pub fn status(&self) -> SubstrateStatus {
        self.status
    }

    pub fn evm_account(&self) -> EvmAccount {
        self.evm.account()
    }

    pub fn evm_wallet(&self) -> &E {
        &self.evm
    }

    pub fn evm_wallet_mut(&mut self) -> &mut E {
        &mut self.evm
    }

    pub fn can_bind(&self) -> bool {
        can_bind(self.selected.as_ref(), &self.evm.account())
    }

    /// Generated records, oldest first.
    pub fn bindings(&self) -> &[BindingRecord] {
        &self.bindings
    }

    /// The record list as pretty-printed JSON, as shown in the results panel.
    pub fn bindings_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.bindings)
    }

    /// Requests access from the installed Substrate extensions and selects
    /// the first account. On any failure the previous state is kept.
    pub async fn connect_substrate(&mut self) -> Result<&[SubstrateAccount], ComposerError> {
        let accounts = match self.discover_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                error!(error = %e, "Substrate connection error");
                return Err(e);
            }
        };

        info!(count = accounts.len(), "Substrate wallet connected");
        self.selected = accounts.first().cloned();
        self.accounts = accounts;
        self.status = SubstrateStatus::Connected;
        Ok(&self.accounts)
    }

    async fn discover_accounts(&self) -> Result<Vec<SubstrateAccount>, ComposerError> {
        let extensions = self
            .extensions
            .enable(APP_NAME)
            .await
            .map_err(ComposerError::Connection)?;
        if extensions.is_empty() {
            return Err(ComposerError::NoExtension);
        }

        let accounts = self
            .extensions
            .accounts()
            .await
            .map_err(ComposerError::Connection)?;
        if accounts.is_empty() {
            return Err(ComposerError::NoAccounts);
        }
        Ok(accounts)
    }

    /// Selects one of the discovered accounts by address. Unknown addresses
    /// leave the current selection untouched.
    pub fn select_account(&mut self, address: &str) -> Result<&SubstrateAccount, ComposerError> {
        let account = self
            .accounts
            .iter()
            .find(|account| account.address == address)
            .cloned()
            .ok_or_else(|| ComposerError::UnknownAccount(address.to_string()))?;
        Ok(&*self.selected.insert(account))
    }

    /// Signs the canonical message with the EVM wallet, appends the record,
    /// and hands it to the relay without waiting for the outcome.
    pub async fn generate_binding(&mut self) -> Result<BindingRecord, ComposerError> {
        let evm = self.evm.account();
        let (substrate_address, evm_address) =
            match binding_parties(self.selected.as_ref(), &evm) {
                Some((substrate, evm_address)) => (substrate.to_string(), evm_address.to_string()),
                None => {
                    warn!("Binding requested before both wallets were connected");
                    return Err(ComposerError::NotReady);
                }
            };

        let message = canonical_message(&substrate_address);
        let signature = match self.evm.sign_message(&message).await {
            Ok(signature) => signature,
            Err(e) => {
                error!(error = %e, "Binding error");
                return Err(ComposerError::Signature(e));
            }
        };

        let record = BindingRecord::new(
            substrate_address,
            evm_address,
            signature,
            message,
            Utc::now(),
        );
        self.bindings.push(record.clone());
        self.dispatch(record.clone());

        Ok(record)
    }

    /// Detached relay submission. Failures stop here.
    fn dispatch(&self, record: BindingRecord) {
        let submitter = Arc::clone(&self.submitter);
        tokio::spawn(async move {
            match submitter.submit(&record).await {
                Ok(ack) => info!(
                    substrate_address = %record.substrate_address,
                    ack = %ack,
                    "Binding saved to backend"
                ),
                Err(e) => error!(
                    substrate_address = %record.substrate_address,
                    error = %e,
                    "Error saving binding to backend"
                ),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::models::InjectedExtension;

    const ALICE: &str = "5F...9a";
    const BOB: &str = "5G...7c";
    const EVM_ADDRESS: &str = "0xAbc...123";

    #[derive(Clone)]
    enum Extensions {
        Missing,
        Empty,
        Broken,
        With(Vec<SubstrateAccount>),
    }

    #[async_trait]
    impl SubstrateExtensions for Extensions {
        async fn enable(&self, app_name: &str) -> Result<Vec<InjectedExtension>, WalletError> {
            assert_eq!(app_name, APP_NAME);
            match self {
                Extensions::Missing => Ok(Vec::new()),
                Extensions::Broken => Err(WalletError::Extension("extension crashed".into())),
                _ => Ok(vec![InjectedExtension {
                    name: "polkadot-js".into(),
                    version: "0.46.1".into(),
                }]),
            }
        }

        async fn accounts(&self) -> Result<Vec<SubstrateAccount>, WalletError> {
            match self {
                Extensions::With(accounts) => Ok(accounts.clone()),
                _ => Ok(Vec::new()),
            }
        }
    }

    struct FakeEvm {
        account: EvmAccount,
        reject: bool,
    }

    impl FakeEvm {
        fn connected() -> Self {
            Self {
                account: EvmAccount {
                    address: Some(EVM_ADDRESS.into()),
                    is_connected: true,
                },
                reject: false,
            }
        }

        fn disconnected() -> Self {
            Self {
                account: EvmAccount::default(),
                reject: false,
            }
        }
    }

    #[async_trait]
    impl EvmWallet for FakeEvm {
        fn account(&self) -> EvmAccount {
            self.account.clone()
        }

        async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
            if self.reject {
                return Err(WalletError::Rejected);
            }
            Ok(format!("0xsigned{}", message.len()))
        }
    }

    struct ChannelSubmitter(mpsc::UnboundedSender<BindingRecord>);

    #[async_trait]
    impl BindingSubmitter for ChannelSubmitter {
        async fn submit(&self, record: &BindingRecord) -> Result<String, RelayClientError> {
            let _ = self.0.send(record.clone());
            Ok("Binding saved to Airtable!".into())
        }
    }

    struct FailingSubmitter(mpsc::UnboundedSender<()>);

    #[async_trait]
    impl BindingSubmitter for FailingSubmitter {
        async fn submit(&self, _record: &BindingRecord) -> Result<String, RelayClientError> {
            let _ = self.0.send(());
            Err(RelayClientError::Request("connection refused".into()))
        }
    }

    struct HangingSubmitter;

    #[async_trait]
    impl BindingSubmitter for HangingSubmitter {
        async fn submit(&self, _record: &BindingRecord) -> Result<String, RelayClientError> {
            std::future::pending().await
        }
    }

    fn accounts() -> Vec<SubstrateAccount> {
        vec![
            SubstrateAccount::new(ALICE, "Alice"),
            SubstrateAccount::new(BOB, "Bob"),
        ]
    }

    fn composer(
        extensions: Extensions,
        evm: FakeEvm,
    ) -> (
        BindingComposer<Extensions, FakeEvm>,
        mpsc::UnboundedReceiver<BindingRecord>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let composer = BindingComposer::new(extensions, evm, Arc::new(ChannelSubmitter(tx)));
        (composer, rx)
    }

    #[test]
    fn can_bind_requires_both_sides() {
        let alice = SubstrateAccount::new(ALICE, "Alice");
        let connected = FakeEvm::connected().account;
        let disconnected = EvmAccount::default();

        assert!(!can_bind(None, &disconnected));
        assert!(!can_bind(Some(&alice), &disconnected));
        assert!(!can_bind(None, &connected));
        assert!(can_bind(Some(&alice), &connected));

        let no_address = EvmAccount {
            address: None,
            is_connected: true,
        };
        assert!(!can_bind(Some(&alice), &no_address));
    }

    #[test]
    fn canonical_message_embeds_address() {
        assert_eq!(
            canonical_message(ALICE),
            "I am binding my Substrate address: 5F...9a to this EVM address for loyalty program activities."
        );
    }

    #[tokio::test]
    async fn connect_selects_first_account() {
        let (mut composer, _rx) = composer(Extensions::With(accounts()), FakeEvm::disconnected());
        assert_eq!(composer.status(), SubstrateStatus::NotConnected);

        let discovered = composer.connect_substrate().await.unwrap();
        assert_eq!(discovered.len(), 2);

        assert_eq!(composer.status(), SubstrateStatus::Connected);
        assert_eq!(composer.selected_account().unwrap().address, ALICE);
    }

    #[tokio::test]
    async fn connect_without_extension_keeps_state() {
        let (mut composer, _rx) = composer(Extensions::Missing, FakeEvm::connected());

        let err = composer.connect_substrate().await.unwrap_err();

        assert!(matches!(err, ComposerError::NoExtension));
        assert_eq!(composer.status(), SubstrateStatus::NotConnected);
        assert!(composer.accounts().is_empty());
        assert!(composer.selected_account().is_none());
    }

    #[tokio::test]
    async fn connect_with_empty_wallet_keeps_state() {
        let (mut composer, _rx) = composer(Extensions::Empty, FakeEvm::connected());

        let err = composer.connect_substrate().await.unwrap_err();

        assert!(matches!(err, ComposerError::NoAccounts));
        assert_eq!(err.to_string(), "No accounts found in your Substrate wallet.");
        assert_eq!(composer.status(), SubstrateStatus::NotConnected);
    }

    #[tokio::test]
    async fn connect_failure_surfaces_underlying_error() {
        let (mut composer, _rx) = composer(Extensions::Broken, FakeEvm::connected());

        let err = composer.connect_substrate().await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error connecting to Substrate wallet: extension crashed"
        );
        assert!(composer.selected_account().is_none());
    }

    #[tokio::test]
    async fn failed_reconnect_keeps_previous_accounts() {
        let (mut composer, _rx) = composer(Extensions::With(accounts()), FakeEvm::connected());
        composer.connect_substrate().await.unwrap();
        composer.select_account(BOB).unwrap();

        composer.extensions = Extensions::Broken;
        assert!(composer.connect_substrate().await.is_err());

        assert_eq!(composer.accounts().len(), 2);
        assert_eq!(composer.selected_account().unwrap().address, BOB);
        assert_eq!(composer.status(), SubstrateStatus::Connected);
    }

    #[tokio::test]
    async fn select_account_switches_between_discovered_accounts() {
        let (mut composer, _rx) = composer(Extensions::With(accounts()), FakeEvm::connected());
        composer.connect_substrate().await.unwrap();

        let selected = composer.select_account(BOB).unwrap();
        assert_eq!(selected.meta.name, "Bob");
        assert_eq!(composer.selected_account().unwrap().address, BOB);
    }

    #[tokio::test]
    async fn select_unknown_account_is_rejected() {
        let (mut composer, _rx) = composer(Extensions::With(accounts()), FakeEvm::connected());
        composer.connect_substrate().await.unwrap();

        let err = composer.select_account("5Unknown").unwrap_err();

        assert!(matches!(err, ComposerError::UnknownAccount(ref a) if a == "5Unknown"));
        assert_eq!(composer.selected_account().unwrap().address, ALICE);
    }

    #[tokio::test]
    async fn can_bind_follows_both_connections() {
        let (mut composer, _rx) = composer(Extensions::With(accounts()), FakeEvm::disconnected());
        assert!(!composer.can_bind());

        composer.connect_substrate().await.unwrap();
        assert!(!composer.can_bind());

        *composer.evm_wallet_mut() = FakeEvm::connected();
        assert!(composer.can_bind());

        *composer.evm_wallet_mut() = FakeEvm::disconnected();
        assert!(!composer.can_bind());
    }

    #[tokio::test]
    async fn generate_before_connecting_is_a_no_op() {
        let (mut composer, mut rx) = composer(Extensions::With(accounts()), FakeEvm::connected());

        let err = composer.generate_binding().await.unwrap_err();

        assert!(matches!(err, ComposerError::NotReady));
        assert!(composer.bindings().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn connected_wallet_without_address_cannot_bind() {
        let evm = FakeEvm {
            account: EvmAccount {
                address: None,
                is_connected: true,
            },
            ..FakeEvm::connected()
        };
        let (mut composer, mut rx) = composer(Extensions::With(accounts()), evm);
        composer.connect_substrate().await.unwrap();

        assert!(!composer.can_bind());
        let err = composer.generate_binding().await.unwrap_err();

        assert!(matches!(err, ComposerError::NotReady));
        assert!(composer.bindings().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn generate_binding_appends_and_relays_record() {
        let (mut composer, mut rx) = composer(
            Extensions::With(vec![SubstrateAccount::new(ALICE, "Alice")]),
            FakeEvm::connected(),
        );
        composer.connect_substrate().await.unwrap();
        assert_eq!(composer.selected_account().unwrap().address, ALICE);
        assert_eq!(composer.evm_account().address.as_deref(), Some(EVM_ADDRESS));

        let record = composer.generate_binding().await.unwrap();

        assert_eq!(
            record.signed_message,
            "I am binding my Substrate address: 5F...9a to this EVM address for loyalty program activities."
        );
        assert_eq!(record.substrate_address, ALICE);
        assert_eq!(record.evm_address, EVM_ADDRESS);
        assert!(!record.signature.is_empty());
        assert!(record.timestamp.ends_with('Z'));
        assert_eq!(composer.bindings(), std::slice::from_ref(&record));

        let relayed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("relay dispatched")
            .expect("record sent");
        assert_eq!(relayed, record);
    }

    #[tokio::test]
    async fn bindings_accumulate_in_order() {
        let (mut composer, _rx) = composer(Extensions::With(accounts()), FakeEvm::connected());
        composer.connect_substrate().await.unwrap();

        let first = composer.generate_binding().await.unwrap();
        composer.select_account(BOB).unwrap();
        let second = composer.generate_binding().await.unwrap();

        assert_eq!(composer.bindings(), &[first, second.clone()]);
        assert!(second.signed_message.contains(BOB));
    }

    #[tokio::test]
    async fn rejected_signature_creates_no_record() {
        let mut evm = FakeEvm::connected();
        evm.reject = true;
        let (mut composer, mut rx) = composer(Extensions::With(accounts()), evm);
        composer.connect_substrate().await.unwrap();

        let err = composer.generate_binding().await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to generate signature: User rejected the request."
        );
        assert!(composer.bindings().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn relay_failure_keeps_displayed_record() {
        let (tx, mut attempts) = mpsc::unbounded_channel();
        let mut composer = BindingComposer::new(
            Extensions::With(accounts()),
            FakeEvm::connected(),
            Arc::new(FailingSubmitter(tx)),
        );
        composer.connect_substrate().await.unwrap();

        composer.generate_binding().await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), attempts.recv())
            .await
            .expect("relay attempted");
        tokio::task::yield_now().await;

        assert_eq!(composer.bindings().len(), 1);
    }

    #[tokio::test]
    async fn generate_does_not_wait_for_relay() {
        let mut composer = BindingComposer::new(
            Extensions::With(accounts()),
            FakeEvm::connected(),
            Arc::new(HangingSubmitter),
        );
        composer.connect_substrate().await.unwrap();

        let record = tokio::time::timeout(Duration::from_secs(1), composer.generate_binding())
            .await
            .expect("generate returned while relay hangs")
            .unwrap();

        assert_eq!(composer.bindings().len(), 1);
        assert_eq!(record.substrate_address, ALICE);
    }

    #[tokio::test]
    async fn bindings_json_renders_camel_case_list() {
        let (mut composer, _rx) = composer(Extensions::With(accounts()), FakeEvm::connected());
        assert_eq!(composer.bindings_json().unwrap(), "[]");

        composer.connect_substrate().await.unwrap();
        composer.generate_binding().await.unwrap();

        let json = composer.bindings_json().unwrap();
        assert!(json.contains("\"substrateAddress\": \"5F...9a\""));
        assert!(json.contains("\"signedMessage\""));
    }

    #[tokio::test]
    async fn local_wallet_signs_bindings() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut wallet = LocalEvmWallet::random();
        wallet.connect();
        let address = wallet.address();
        let mut composer = BindingComposer::new(
            Extensions::With(accounts()),
            wallet,
            Arc::new(ChannelSubmitter(tx)),
        );
        composer.connect_substrate().await.unwrap();

        let record = composer.generate_binding().await.unwrap();

        assert_eq!(record.evm_address, address);
        assert!(record.signature.starts_with("0x"));

        composer.evm_wallet_mut().disconnect();
        assert!(!composer.can_bind());
        assert_eq!(composer.evm_wallet().address(), address);
    }
}
