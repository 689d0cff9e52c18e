// consensus/src/forger.rs

//! `try_generate_next_block`: the one operation that turns eligibility into
//! an actual block. Everything here is "try" — declining to forge is the
//! overwhelmingly common outcome and is always signalled with `None`, never
//! an error.

use blockchain_core::{Block, ConsensusData, History, Settings, State};
use blockchain_crypto::PrivateKey;

use crate::kernel;
use crate::pool::Pool;
use crate::{BlockBuilder, TransactionValidator};

/// Chain version stamped into every block this crate builds.
pub const BLOCK_VERSION: u32 = 1;

/// Attempt to forge a block on top of the current chain tip for `account`.
///
/// Returns `None` whenever forging is not currently warranted: no known
/// tip, generating balance below the configured minimum, or the hit does
/// not clear the target. None of these are errors — they are the expected
/// outcome on most calls from a polling forging loop.
#[allow(clippy::too_many_arguments)]
pub fn try_generate_next_block(
    history: &dyn History,
    state: &dyn State,
    pool: &Pool,
    validator: &dyn TransactionValidator,
    builder: &dyn BlockBuilder,
    settings: &Settings,
    account: &PrivateKey,
    now_ms: i64,
) -> Option<Block> {
    let last_block = history.last_block()?;
    let height = history.height_of(&last_block.id)?;

    let balance = kernel::generating_balance(state, settings, account.public_key(), height);
    if balance < settings.min_generating_balance {
        tracing::debug!(
            balance,
            minimum = settings.min_generating_balance,
            "declining to forge: below minimum generating balance"
        );
        return None;
    }

    let hit_value = kernel::hit(&last_block.consensus, account.public_key());
    let target_value = kernel::target(&last_block, now_ms, balance);
    if !kernel::eligible(&hit_value, &target_value) {
        return None;
    }

    let base_target = kernel::base_target(history, settings, &last_block, now_ms);
    let generation_signature = kernel::generator_signature(&last_block.consensus, account.public_key());
    let consensus = ConsensusData {
        base_target,
        generation_signature,
    };

    let transactions = pool.pack(settings, state, validator, now_ms, Some(height));
    let block = builder.build_and_sign(BLOCK_VERSION, now_ms, last_block.id, consensus, transactions, account);

    tracing::info!(
        height = height + 1,
        generator = %account.public_key(),
        "forged a new block"
    );
    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockchain_core::{Block as BlockType, InMemoryHistory, InMemoryState};

    struct AcceptAll;
    impl TransactionValidator for AcceptAll {
        fn validate(
            &self,
            _settings: &Settings,
            _state: &dyn State,
            txs: &[blockchain_core::Transaction],
            _at_height: Option<i32>,
            _now_ms: i64,
        ) -> (Vec<blockchain_core::Transaction>, Vec<blockchain_core::Transaction>) {
            (Vec::new(), txs.to_vec())
        }
    }

    struct StubBuilder;
    impl BlockBuilder for StubBuilder {
        fn build_and_sign(
            &self,
            _version: u32,
            timestamp: i64,
            parent_id: blockchain_crypto::Hash,
            consensus: ConsensusData,
            transactions: Vec<blockchain_core::Transaction>,
            signer: &PrivateKey,
        ) -> Block {
            BlockType::new(parent_id, timestamp, *signer.public_key(), consensus, transactions, 1, Vec::new())
        }
    }

    fn genesis() -> Block {
        Block::genesis(0, 153_722_867)
    }

    #[test]
    fn s1_zero_balance_never_forges() {
        let history = InMemoryHistory::new(genesis());
        let state = InMemoryState::new();
        let settings = Settings::default();
        let pool = Pool::new();
        let account = PrivateKey::generate().unwrap();

        let result = try_generate_next_block(&history, &state, &pool, &AcceptAll, &StubBuilder, &settings, &account, 60_000);
        assert!(result.is_none());
    }

    /// Extend `history` with filler blocks up to (and including) `target_height`.
    fn extend_to_height(history: &mut InMemoryHistory, target_height: i32) {
        while history.height() < target_height {
            let tip = history.last_block().unwrap();
            let child = Block::new(
                tip.id,
                tip.timestamp + 1_000,
                blockchain_crypto::PublicKey::zero(),
                tip.consensus,
                Vec::new(),
                tip.score + 1,
                Vec::new(),
            );
            history.apply_block(child);
        }
    }

    #[test]
    fn s2_funded_eligible_account_forges_with_correct_generation_signature() {
        let genesis = genesis();
        let mut history = InMemoryHistory::new(genesis.clone());
        let mut state = InMemoryState::new();
        let mut settings = Settings::default();
        settings.generating_balance_depth_bump_height = i32::MAX;
        let pool = Pool::new();
        let account = PrivateKey::generate().unwrap();
        state.fund(*account.public_key(), 10_000_000);
        extend_to_height(&mut history, 55);
        let parent = history.last_block().unwrap();

        // Scan forward for a timestamp this account is eligible to forge at.
        let hit_value = kernel::hit(&parent.consensus, account.public_key());
        let mut now = parent.timestamp + 60_000;
        loop {
            let target_value = kernel::target(&parent, now, 10_000_000);
            if kernel::eligible(&hit_value, &target_value) {
                break;
            }
            now += 60_000;
        }

        let block = try_generate_next_block(&history, &state, &pool, &AcceptAll, &StubBuilder, &settings, &account, now)
            .expect("account is eligible and should forge");

        let expected_signature = kernel::generator_signature(&parent.consensus, account.public_key());
        assert_eq!(block.consensus.generation_signature, expected_signature);
    }

    #[test]
    fn forged_block_satisfies_is_valid_against_the_same_snapshots() {
        let genesis = genesis();
        let mut history = InMemoryHistory::new(genesis.clone());
        let mut state = InMemoryState::new();
        let mut settings = Settings::default();
        settings.generating_balance_depth_bump_height = i32::MAX;
        let pool = Pool::new();
        let account = PrivateKey::generate().unwrap();
        state.fund(*account.public_key(), 10_000_000);
        extend_to_height(&mut history, 55);
        let parent = history.last_block().unwrap();

        let hit_value = kernel::hit(&parent.consensus, account.public_key());
        let mut now = parent.timestamp + 60_000;
        loop {
            let target_value = kernel::target(&parent, now, 10_000_000);
            if kernel::eligible(&hit_value, &target_value) {
                break;
            }
            now += 60_000;
        }

        let block = try_generate_next_block(&history, &state, &pool, &AcceptAll, &StubBuilder, &settings, &account, now)
            .expect("account is eligible and should forge");

        assert!(crate::validator::is_valid(&history, &state, &settings, &block, now));
    }
}
