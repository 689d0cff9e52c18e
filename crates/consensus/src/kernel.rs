// consensus/src/kernel.rs

//! Pure consensus math: generation signatures, hit/target eligibility,
//! base-target retargeting and generating balance.
//!
//! Every function here is a pure function of its arguments — no locking, no
//! I/O, no mutation of `History`/`State`. They are meant to be cheap enough
//! to call on every tick of a forging loop and safe to call from many
//! threads at once.

use blockchain_core::{Block, ConsensusData, History, Settings, State};
use blockchain_crypto::{digest, Hash, PublicKey};
use num_bigint::{BigInt, BigUint, ToBigInt};

/// How many of the most recent blocks `base_target` averages over when
/// retargeting.
pub const AVG_BLOCK_TIME_DEPTH: u32 = 3;

/// `Digest(parent.generation_signature ‖ generator)`.
///
/// Every node recomputes this from public data; nothing about it is
/// secret, it just binds a block's eligibility to its parent and to the
/// specific account attempting to forge on top of it.
pub fn generator_signature(parent_consensus: &ConsensusData, generator: &PublicKey) -> Hash {
    digest(&[
        parent_consensus.generation_signature.as_bytes(),
        generator.as_bytes(),
    ])
}

/// The first 8 bytes of `generator_signature`, interpreted as an unsigned
/// little-endian integer. Range `[0, 2^64)`.
pub fn hit(parent_consensus: &ConsensusData, generator: &PublicKey) -> BigUint {
    let signature = generator_signature(parent_consensus, generator);
    let mut first8 = [0u8; 8];
    first8.copy_from_slice(&signature.as_bytes()[0..8]);
    first8.reverse();
    BigUint::from_bytes_be(&first8)
}

/// `base_target * elapsed_seconds * effective_balance`, the threshold `hit`
/// must fall under for an account to be eligible to forge on top of
/// `prev_block` at `now_ms`.
///
/// `elapsed_seconds` is signed: a block stamped in the past relative to
/// `now_ms` (clock skew, replay in tests) yields a negative target, which
/// no hit can ever clear — this is intentional, not a bug to special-case.
pub fn target(prev_block: &Block, now_ms: i64, effective_balance: u64) -> BigInt {
    let elapsed_seconds = (now_ms - prev_block.timestamp) / 1_000;
    BigInt::from(prev_block.consensus.base_target) * BigInt::from(elapsed_seconds) * BigInt::from(effective_balance)
}

/// `true` if `hit` clears `target` — i.e. the account is eligible to forge.
pub fn eligible(hit_value: &BigUint, target_value: &BigInt) -> bool {
    match hit_value.to_bigint() {
        Some(h) => h < *target_value,
        None => false,
    }
}

/// `v` scaled so that the `53`/`64`/`67`-second bounds used by base-target
/// retargeting track whatever average block delay this chain configures,
/// rather than being hardcoded to a 60-second target.
pub fn normalize(v: f64, average_block_delay_seconds: u64) -> f64 {
    v * average_block_delay_seconds as f64 / 60.0
}

/// Recompute the base target to use for a block built on top of
/// `prev_block` at `now_ms`.
///
/// Retargeting only happens when `prev_block`'s height is even; on an odd
/// height the previous base target carries over unchanged. This mirrors
/// the chain's own odd/even convention rather than retargeting on every
/// block, which would overreact to single-block timing noise.
pub fn base_target(
    history: &dyn History,
    settings: &Settings,
    prev_block: &Block,
    now_ms: i64,
) -> u64 {
    let prev_height = match history.height_of(&prev_block.id) {
        Some(h) => h,
        None => return prev_block.consensus.base_target,
    };

    if prev_height % 2 != 0 {
        return prev_block.consensus.base_target;
    }

    let avg = settings.average_block_delay_seconds as f64;
    let min_limit = normalize(53.0, settings.average_block_delay_seconds);
    let max_limit = normalize(67.0, settings.average_block_delay_seconds);
    let gamma = normalize(64.0, settings.average_block_delay_seconds);

    let blocktime_avg_seconds: f64 = match history.parent(prev_block, AVG_BLOCK_TIME_DEPTH - 1) {
        Some(older) => ((now_ms - older.timestamp) as f64 / AVG_BLOCK_TIME_DEPTH as f64) / 1_000.0,
        None => (now_ms - prev_block.timestamp) as f64 / 1_000.0,
    };

    let prev_bt = prev_block.consensus.base_target as f64;
    let candidate = if blocktime_avg_seconds > avg {
        prev_bt * blocktime_avg_seconds.min(max_limit) / avg
    } else {
        prev_bt - prev_bt * gamma * (avg - blocktime_avg_seconds.max(min_limit)) / (avg * 100.0)
    };

    let clamped = if candidate < 0.0 { 0.0 } else { candidate };
    (clamped as u64).min(settings.max_base_target())
}

/// The generating balance `hit`/`target` should be weighed against for
/// `account` at `at_height`: the account's effective balance, looked back
/// by the confirmation depth `Settings` prescribes for that height.
pub fn generating_balance(
    state: &dyn State,
    settings: &Settings,
    account: &PublicKey,
    at_height: i32,
) -> u64 {
    let depth = settings.generating_balance_depth(at_height);
    state.effective_balance_with_confirmations(account, at_height, depth)
}
