// consensus/src/validator.rs

//! Checks an inbound block against every consensus rule before it is
//! accepted into history: time drift, transaction ordering, retargeting,
//! generation signature, and generator eligibility.

use std::cmp::Ordering;

use blockchain_core::{Block, History, Settings, State};

use crate::kernel;
use crate::pool::block_ordering_cmp;

/// `true` iff `block` satisfies every consensus rule against `history`/
/// `state` as observed at `now_ms`.
///
/// Every rejection is logged at `warn` and swallowed here — the caller
/// only ever sees the boolean, never *why*, because none of these
/// conditions are programming errors: they are the ordinary outcome of
/// checking a block built by an untrusted peer. A genuinely unexpected
/// failure from a collaborator (storage corruption, not a failed check)
/// is not something this function hides; it is expected to propagate as
/// a panic/`Err` out of that collaborator before reaching here.
pub fn is_valid(history: &dyn History, state: &dyn State, settings: &Settings, block: &Block, now_ms: i64) -> bool {
    let drift = (block.timestamp - now_ms).abs();
    if drift >= settings.max_time_drift_ms {
        tracing::warn!(drift, limit = settings.max_time_drift_ms, "rejecting block: timestamp outside allowed drift");
        return false;
    }

    if block.timestamp > settings.require_sorted_transactions_after && !is_block_ordered(&block.transactions) {
        tracing::warn!("rejecting block: transactions are not in block ordering");
        return false;
    }

    let parent = match history.block_by_id(&block.parent_id) {
        Some(parent) => parent,
        None => {
            if history.height() == 1 {
                // Bootstrapping: history holds only genesis and has nothing
                // to check this block's parent-dependent rules against yet.
                tracing::debug!("accepting block against a history holding only genesis");
                return true;
            }
            tracing::warn!(parent_id = %block.parent_id, "rejecting block: parent not found in history");
            return false;
        }
    };

    let parent_height = match history.height_of(&parent.id) {
        Some(height) => height,
        None => {
            tracing::warn!("rejecting block: parent has no recorded height");
            return false;
        }
    };

    let expected_base_target = kernel::base_target(history, settings, &parent, block.timestamp);
    if block.consensus.base_target != expected_base_target {
        tracing::warn!(
            got = block.consensus.base_target,
            expected = expected_base_target,
            "rejecting block: base_target mismatch"
        );
        return false;
    }

    let expected_generation_signature = kernel::generator_signature(&parent.consensus, &block.generator);
    if block.consensus.generation_signature != expected_generation_signature {
        tracing::warn!("rejecting block: generation_signature mismatch");
        return false;
    }

    let effective_balance = kernel::generating_balance(state, settings, &block.generator, parent_height);
    if block.timestamp >= settings.minimal_generating_balance_after_timestamp
        && effective_balance < settings.min_generating_balance
    {
        tracing::warn!(
            balance = effective_balance,
            minimum = settings.min_generating_balance,
            "rejecting block: generator below minimum generating balance"
        );
        return false;
    }

    let hit_value = kernel::hit(&parent.consensus, &block.generator);
    let target_value = kernel::target(&parent, block.timestamp, effective_balance);
    if !kernel::eligible(&hit_value, &target_value) {
        tracing::warn!("rejecting block: hit does not clear target");
        return false;
    }

    true
}

fn is_block_ordered(transactions: &[blockchain_core::Transaction]) -> bool {
    transactions.windows(2).all(|pair| block_ordering_cmp(&pair[0], &pair[1]) != Ordering::Greater)
}
