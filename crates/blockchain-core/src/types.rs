// blockchain-core/src/types.rs

/// Block height. Genesis has height 1 (matches the source chain's own numbering).
pub type Height = i32;

/// Milliseconds since a fixed epoch. Monotonic per chain, not per node's wall clock.
pub type Timestamp = i64;

/// An account balance, in the chain's smallest unit.
pub type Balance = u64;
