//! CardVault Ledger - Asset ledger for card custody
//!
//! Cards never hold value themselves; they instruct an asset ledger to move
//! value between holders. This crate defines that seam (`AssetLedger`) and an
//! in-memory double-entry implementation (`Ledger`).
//!
//! The in-memory ledger is:
//! - Asset-scoped (one balance per holder per asset)
//! - Double-entry (every debit has a matching credit)
//! - Append-only (entries are never rewritten)
//!
//! # Invariants
//!
//! 1. No negative balances
//! 2. Every entry has a reason
//! 3. A transfer's debit and credit commit together or not at all

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cardvault_types::{Address, Amount, AssetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors that can occur in ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Unique identifier for a ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new() -> Self {
        Self(format!("entry_{}", Uuid::new_v4()))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    /// Credit (increase) to a holder
    Credit,
    /// Debit (decrease) from a holder
    Debit,
}

/// Reason for a ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryReason {
    /// Value entering the ledger from outside (a deposit or mint)
    Deposit { reference: String },
    /// Plain holder-to-holder transfer
    Transfer { memo: String },
    /// Withdrawal out of a card, initiated by an allow-listed vendor
    CardWithdrawal { card: Address, initiator: Address },
}

/// A single ledger entry (one side of a double-entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub holder: Address,
    pub asset: AssetId,
    pub entry_type: EntryType,
    pub amount: Amount,
    pub balance_after: Amount,
    pub reason: EntryReason,
    pub correlation_id: String,
    pub created_at: DateTime<Utc>,
}

/// Holder state in the ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountState {
    pub balances: HashMap<AssetId, Amount>,
    pub entry_count: u64,
}

impl AccountState {
    pub fn balance(&self, asset: &AssetId) -> Amount {
        self.balances.get(asset).copied().unwrap_or_default()
    }
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub correlation_id: String,
    pub debit_entry: EntryId,
    pub credit_entry: EntryId,
    /// Sender balance after the debit
    pub from_balance: Amount,
    /// Receiver balance after the credit
    pub to_balance: Amount,
}

/// The asset ledger a card instructs to move value.
///
/// Contract: a transfer debits `from` iff its balance covers `amount`, and the
/// credit to `to` happens iff the debit happened.
#[async_trait]
pub trait AssetLedger: Send + Sync {
    /// Balance of `holder` in `asset`
    async fn balance_of(&self, holder: &Address, asset: &AssetId) -> Amount;

    /// Atomically move `amount` of `asset` from `from` to `to`
    async fn transfer(
        &self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: Amount,
        reason: EntryReason,
    ) -> Result<TransferReceipt>;
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Address, AccountState>,
    entries: Vec<LedgerEntry>,
}

impl LedgerState {
    fn apply(
        &mut self,
        holder: &Address,
        asset: &AssetId,
        entry_type: EntryType,
        amount: Amount,
        reason: &EntryReason,
        correlation_id: &str,
    ) -> Result<(Amount, EntryId)> {
        let current = self
            .accounts
            .get(holder)
            .map(|a| a.balance(asset))
            .unwrap_or_default();

        let new_balance = match entry_type {
            EntryType::Credit => {
                current
                    .checked_add(amount)
                    .ok_or_else(|| LedgerError::InvalidAmount {
                        message: "Balance overflow".to_string(),
                    })?
            }
            EntryType::Debit => {
                current
                    .checked_sub(amount)
                    .ok_or(LedgerError::InsufficientBalance {
                        available: current,
                        required: amount,
                    })?
            }
        };

        let entry = LedgerEntry {
            entry_id: EntryId::new(),
            holder: *holder,
            asset: *asset,
            entry_type,
            amount,
            balance_after: new_balance,
            reason: reason.clone(),
            correlation_id: correlation_id.to_string(),
            created_at: Utc::now(),
        };

        let account = self.accounts.entry(*holder).or_default();
        account.balances.insert(*asset, new_balance);
        account.entry_count += 1;

        let entry_id = entry.entry_id.clone();
        self.entries.push(entry);

        Ok((new_balance, entry_id))
    }
}

/// In-memory asset ledger
///
/// All state lives behind a single lock so a transfer's validation, debit and
/// credit are applied as one step.
#[derive(Clone, Default)]
pub struct Ledger {
    state: Arc<RwLock<LedgerState>>,
}

impl Ledger {
    /// Create a new in-memory ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit value entering the ledger from outside (deposit into a card,
    /// faucet for a test account).
    pub async fn mint(
        &self,
        to: &Address,
        asset: &AssetId,
        amount: Amount,
        reference: impl Into<String>,
    ) -> Result<(Amount, EntryId)> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount {
                message: "Amount must be greater than zero".to_string(),
            });
        }

        let reference = reference.into();
        let reason = EntryReason::Deposit {
            reference: reference.clone(),
        };

        let mut state = self.state.write().await;
        let result = state.apply(to, asset, EntryType::Credit, amount, &reason, &reference)?;
        tracing::debug!(holder = %to, asset = %asset, %amount, "minted");
        Ok(result)
    }

    /// Get all entries for a holder
    pub async fn account_entries(&self, holder: &Address) -> Vec<LedgerEntry> {
        let state = self.state.read().await;
        state
            .entries
            .iter()
            .filter(|e| &e.holder == holder)
            .cloned()
            .collect()
    }

    /// Get entries sharing a correlation id (both sides of a transfer)
    pub async fn correlated_entries(&self, correlation_id: &str) -> Vec<LedgerEntry> {
        let state = self.state.read().await;
        state
            .entries
            .iter()
            .filter(|e| e.correlation_id == correlation_id)
            .cloned()
            .collect()
    }

    /// Get the total number of entries
    pub async fn entry_count(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Get recent entries (newest first)
    pub async fn recent_entries(&self, limit: usize) -> Vec<LedgerEntry> {
        let state = self.state.read().await;
        state.entries.iter().rev().take(limit).cloned().collect()
    }

    /// Get holder state
    pub async fn account_state(&self, holder: &Address) -> Option<AccountState> {
        self.state.read().await.accounts.get(holder).cloned()
    }
}

#[async_trait]
impl AssetLedger for Ledger {
    async fn balance_of(&self, holder: &Address, asset: &AssetId) -> Amount {
        let state = self.state.read().await;
        state
            .accounts
            .get(holder)
            .map(|a| a.balance(asset))
            .unwrap_or_default()
    }

    async fn transfer(
        &self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: Amount,
        reason: EntryReason,
    ) -> Result<TransferReceipt> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount {
                message: "Amount must be greater than zero".to_string(),
            });
        }

        let mut state = self.state.write().await;

        // Validate both sides before touching anything
        let available = state
            .accounts
            .get(from)
            .map(|a| a.balance(asset))
            .unwrap_or_default();
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                required: amount,
            });
        }
        if from != to {
            let receiving = state
                .accounts
                .get(to)
                .map(|a| a.balance(asset))
                .unwrap_or_default();
            if receiving.checked_add(amount).is_none() {
                return Err(LedgerError::InvalidAmount {
                    message: "Balance overflow".to_string(),
                });
            }
        }

        let correlation_id = format!("xfer_{}", Uuid::new_v4());
        let (from_balance, debit_entry) =
            state.apply(from, asset, EntryType::Debit, amount, &reason, &correlation_id)?;
        let (to_balance, credit_entry) =
            state.apply(to, asset, EntryType::Credit, amount, &reason, &correlation_id)?;

        Ok(TransferReceipt {
            correlation_id,
            debit_entry,
            credit_entry,
            from_balance,
            to_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(byte: u8) -> Address {
        Address([byte; 20])
    }

    fn token() -> AssetId {
        AssetId(Address([0xee; 20]))
    }

    fn memo() -> EntryReason {
        EntryReason::Transfer {
            memo: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mint_and_balance() {
        let ledger = Ledger::new();
        let account = holder(1);
        let asset = token();

        // Initial balance should be zero
        assert_eq!(ledger.balance_of(&account, &asset).await, Amount::zero());

        let (balance, _) = ledger
            .mint(&account, &asset, Amount::new(1000), "deposit-1")
            .await
            .unwrap();

        assert_eq!(balance, Amount::new(1000));
        assert_eq!(ledger.balance_of(&account, &asset).await, Amount::new(1000));
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let ledger = Ledger::new();
        let result = ledger.mint(&holder(1), &token(), Amount::zero(), "x").await;
        assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));

        let result = ledger
            .transfer(&token(), &holder(1), &holder(2), Amount::zero(), memo())
            .await;
        assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));
    }

    #[tokio::test]
    async fn test_transfer() {
        let ledger = Ledger::new();
        let from = holder(1);
        let to = holder(2);
        let asset = token();

        ledger.mint(&from, &asset, Amount::new(1000), "seed").await.unwrap();

        let receipt = ledger
            .transfer(&asset, &from, &to, Amount::new(400), memo())
            .await
            .unwrap();

        assert_eq!(receipt.from_balance, Amount::new(600));
        assert_eq!(receipt.to_balance, Amount::new(400));
        assert_eq!(ledger.balance_of(&from, &asset).await, Amount::new(600));
        assert_eq!(ledger.balance_of(&to, &asset).await, Amount::new(400));

        // Both sides share the correlation id
        let entries = ledger.correlated_entries(&receipt.correlation_id).await;
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_no_negative_balance() {
        let ledger = Ledger::new();
        let from = holder(1);
        let to = holder(2);
        let asset = token();

        ledger.mint(&from, &asset, Amount::new(100), "seed").await.unwrap();
        let before = ledger.entry_count().await;

        let result = ledger
            .transfer(&asset, &from, &to, Amount::new(200), memo())
            .await;

        assert_eq!(
            result,
            Err(LedgerError::InsufficientBalance {
                available: Amount::new(100),
                required: Amount::new(200),
            })
        );
        // Nothing moved, nothing recorded
        assert_eq!(ledger.balance_of(&from, &asset).await, Amount::new(100));
        assert_eq!(ledger.balance_of(&to, &asset).await, Amount::zero());
        assert_eq!(ledger.entry_count().await, before);
    }

    #[tokio::test]
    async fn test_overflow_leaves_sender_untouched() {
        let ledger = Ledger::new();
        let from = holder(1);
        let to = holder(2);
        let asset = token();

        ledger.mint(&from, &asset, Amount::new(10), "seed").await.unwrap();
        ledger
            .mint(&to, &asset, Amount::new(u128::MAX), "seed")
            .await
            .unwrap();

        let result = ledger
            .transfer(&asset, &from, &to, Amount::new(10), memo())
            .await;
        assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));
        assert_eq!(ledger.balance_of(&from, &asset).await, Amount::new(10));
    }

    #[tokio::test]
    async fn test_assets_are_scoped() {
        let ledger = Ledger::new();
        let account = holder(1);
        let other_asset = AssetId(Address([0xdd; 20]));

        ledger.mint(&account, &token(), Amount::new(50), "seed").await.unwrap();
        assert_eq!(
            ledger.balance_of(&account, &other_asset).await,
            Amount::zero()
        );
    }

    #[tokio::test]
    async fn test_entry_tracking() {
        let ledger = Ledger::new();
        let account = holder(1);
        let asset = token();

        ledger.mint(&account, &asset, Amount::new(100), "a").await.unwrap();
        ledger.mint(&account, &asset, Amount::new(200), "b").await.unwrap();

        let entries = ledger.account_entries(&account).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(ledger.entry_count().await, 2);
        assert_eq!(ledger.account_state(&account).await.unwrap().entry_count, 2);

        let recent = ledger.recent_entries(1).await;
        assert_eq!(recent[0].balance_after, Amount::new(300));
    }
}
