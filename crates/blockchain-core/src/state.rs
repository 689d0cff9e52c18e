// blockchain-core/src/state.rs

use crate::types::{Balance, Height};
use blockchain_crypto::PublicKey;
use std::collections::HashMap;

/// Read-only view the Kernel uses to price an account's forging weight.
///
/// `effective_balance_with_confirmations` deliberately does not expose a
/// plain "current balance" — the generating balance is always a lookback
/// over confirmed history, never the tip, so a forger cannot inflate its
/// own odds by moving funds into an account it is about to forge from.
pub trait State: Send + Sync {
    /// The account's balance as of `depth` blocks before `at_height`,
    /// counting only changes that have had at least that many
    /// confirmations. Accounts never seen return 0.
    fn effective_balance_with_confirmations(
        &self,
        account: &PublicKey,
        at_height: Height,
        depth: Height,
    ) -> Balance;
}

/// One balance change, recorded at the height it took effect.
#[derive(Debug, Clone, Copy)]
struct BalanceEntry {
    height: Height,
    balance: Balance,
}

/// In-memory `State` used by the demo binary and by tests.
///
/// Keeps a full balance history per account rather than a single current
/// value, since the Kernel needs the balance as it stood some number of
/// confirmations in the past, not the latest one.
#[derive(Debug, Default)]
pub struct InMemoryState {
    history: HashMap<PublicKey, Vec<BalanceEntry>>,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self {
            history: HashMap::new(),
        }
    }

    /// Seed an account with a starting balance, effective from height 1
    /// (genesis). Intended for demo/test setup, not for chain execution.
    pub fn fund(&mut self, account: PublicKey, balance: Balance) {
        self.set_balance(account, 1, balance);
    }

    /// Record that `account`'s balance became `balance` at `height`.
    /// Entries for the same height overwrite; callers are expected to call
    /// this once per height per account, in increasing height order.
    pub fn set_balance(&mut self, account: PublicKey, height: Height, balance: Balance) {
        let entries = self.history.entry(account).or_default();
        if let Some(last) = entries.last_mut() {
            if last.height == height {
                last.balance = balance;
                return;
            }
        }
        entries.push(BalanceEntry { height, balance });
    }

    /// The account's balance at the tip, ignoring confirmation depth.
    /// Convenience for demo wiring; consensus code must go through
    /// `effective_balance_with_confirmations` instead.
    pub fn current_balance(&self, account: &PublicKey) -> Balance {
        self.history
            .get(account)
            .and_then(|entries| entries.last())
            .map(|e| e.balance)
            .unwrap_or(0)
    }
}

impl State for InMemoryState {
    fn effective_balance_with_confirmations(
        &self,
        account: &PublicKey,
        at_height: Height,
        depth: Height,
    ) -> Balance {
        let Some(entries) = self.history.get(account) else {
            return 0;
        };
        let cutoff = at_height.saturating_sub(depth);
        entries
            .iter()
            .rev()
            .find(|e| e.height <= cutoff)
            .map(|e| e.balance)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> PublicKey {
        PublicKey::new([3u8; 32])
    }

    #[test]
    fn unseen_account_has_zero_balance() {
        let state = InMemoryState::new();
        assert_eq!(state.effective_balance_with_confirmations(&account(), 100, 50), 0);
    }

    #[test]
    fn recent_change_is_not_yet_confirmed() {
        let mut state = InMemoryState::new();
        state.fund(account(), 1_000);
        state.set_balance(account(), 90, 5_000);

        // At height 100 with depth 50, cutoff is 50: only the height-1 entry qualifies.
        assert_eq!(state.effective_balance_with_confirmations(&account(), 100, 50), 1_000);
    }

    #[test]
    fn confirmed_change_is_visible() {
        let mut state = InMemoryState::new();
        state.fund(account(), 1_000);
        state.set_balance(account(), 90, 5_000);

        // At height 200 with depth 50, cutoff is 150: the height-90 entry now qualifies.
        assert_eq!(state.effective_balance_with_confirmations(&account(), 200, 50), 5_000);
    }

    #[test]
    fn current_balance_ignores_depth() {
        let mut state = InMemoryState::new();
        state.fund(account(), 1_000);
        state.set_balance(account(), 90, 5_000);
        assert_eq!(state.current_balance(&account()), 5_000);
    }
}
