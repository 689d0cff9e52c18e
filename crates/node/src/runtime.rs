// node/src/runtime.rs
use std::sync::Mutex;
use std::time::Duration;

use blockchain_core::{
    Block, ConsensusData, History, InMemoryHistory, InMemoryState, Settings, State, Transaction,
};
use blockchain_crypto::{Hash, PrivateKey, PublicKey};
use consensus::{BlockBuilder, Pool, TimeSource, TransactionValidator};

use crate::config::DemoConfig;

const INITIAL_BASE_TARGET: u64 = 153_722_867;

/// Local wall clock, uncorrected: the demo has no peers to estimate drift
/// against, so `corrected_time_ms` is just the system clock.
struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn corrected_time_ms(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the unix epoch")
            .as_millis() as i64
    }
}

/// Signs every block with whatever `PrivateKey` `try_generate_next_block`
/// hands it. The demo never needs anything fancier — signature format and
/// transport are both out of scope here.
struct DemoBuilder;

impl BlockBuilder for DemoBuilder {
    fn build_and_sign(
        &self,
        _version: u32,
        timestamp: i64,
        parent_id: Hash,
        consensus: ConsensusData,
        transactions: Vec<Transaction>,
        signer: &PrivateKey,
    ) -> Block {
        let block = Block::new(parent_id, timestamp, *signer.public_key(), consensus, transactions, 1, Vec::new());
        match signer.sign(block.id.as_bytes()) {
            Ok(signature) => Block {
                signature: signature.as_bytes().to_vec(),
                ..block
            },
            Err(error) => {
                tracing::warn!(%error, "failed to sign forged block, leaving signature empty");
                block
            }
        }
    }
}

/// Accepts every transaction. The demo never puts anything in the pool, so
/// this only exists to satisfy the `TransactionValidator` seam.
struct AcceptAllValidator;

impl TransactionValidator for AcceptAllValidator {
    fn validate(
        &self,
        _settings: &Settings,
        _state: &dyn State,
        txs: &[Transaction],
        _at_height: Option<i32>,
        _now_ms: i64,
    ) -> (Vec<Transaction>, Vec<Transaction>) {
        (Vec::new(), txs.to_vec())
    }
}

/// A self-contained, in-memory chain with a handful of funded demo
/// accounts, forged against on a fixed interval. Owns nothing that
/// survives the process: no storage, no peers, no RPC surface.
pub struct Node {
    settings: Settings,
    config: DemoConfig,
    accounts: Vec<PrivateKey>,
    history: Mutex<InMemoryHistory>,
    state: InMemoryState,
    pool: Pool,
    builder: DemoBuilder,
    validator: AcceptAllValidator,
    time_source: SystemTimeSource,
}

impl Node {
    /// Build a demo chain: a genesis block, `config.account_count` funded
    /// accounts, and enough filler history for their balances to have
    /// confirmed under the configured lookback depth.
    pub fn new(mut settings: Settings, config: DemoConfig, using_default_settings: bool) -> anyhow::Result<Self> {
        if using_default_settings {
            // The demo has no interest in the long (1000-block) lookback
            // the real chain switches to eventually; stay on the short one
            // so funded accounts can forge almost immediately.
            settings.generating_balance_depth_bump_height = i32::MAX;
        }
        settings.validate().map_err(anyhow::Error::from)?;

        let genesis = Block::genesis(0, INITIAL_BASE_TARGET);
        let mut history = InMemoryHistory::new(genesis.clone());
        let mut state = InMemoryState::new();

        let mut accounts = Vec::with_capacity(config.account_count);
        for _ in 0..config.account_count {
            let key = PrivateKey::generate().map_err(anyhow::Error::from)?;
            state.fund(*key.public_key(), config.seed_balance);
            accounts.push(key);
        }

        let confirmation_depth = settings.generating_balance_depth(1);
        extend_with_filler(&mut history, confirmation_depth + 1);

        tracing::info!(
            accounts = accounts.len(),
            seed_balance = config.seed_balance,
            start_height = history.height(),
            "demo chain initialized"
        );

        Ok(Self {
            settings,
            config,
            accounts,
            history: Mutex::new(history),
            state,
            pool: Pool::new(),
            builder: DemoBuilder,
            validator: AcceptAllValidator,
            time_source: SystemTimeSource,
        })
    }

    /// Run the bounded forging loop: each tick, every demo account tries
    /// to forge on top of the current tip; the first eligible block is
    /// adopted and the rest of the tick is skipped.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));
        let mut forged = 0u64;

        while forged < self.config.max_blocks {
            ticker.tick().await;
            let now_ms = self.time_source.corrected_time_ms();

            let produced = {
                let history = self.history.lock().expect("history mutex poisoned");
                self.accounts.iter().find_map(|account| {
                    consensus::try_generate_next_block(
                        &*history,
                        &self.state,
                        &self.pool,
                        &self.validator,
                        &self.builder,
                        &self.settings,
                        account,
                        now_ms,
                    )
                })
            };

            if let Some(block) = produced {
                let mut history = self.history.lock().expect("history mutex poisoned");
                let tx_ids: Vec<Hash> = block.transactions.iter().map(|tx| tx.id).collect();
                let height = history.height() + 1;
                history.apply_block(block.clone());
                drop(history);
                consensus::clear_from_unconfirmed(&self.pool, &self.settings, &tx_ids, now_ms);
                forged += 1;
                tracing::info!(height, generator = %block.generator, forged, "adopted a new block");
            }
        }

        tracing::info!(forged, "reached the configured block limit, stopping");
        Ok(())
    }
}

fn extend_with_filler(history: &mut InMemoryHistory, target_height: i32) {
    while history.height() < target_height {
        let tip = history.last_block().expect("history always has at least genesis");
        let filler = Block::new(
            tip.id,
            tip.timestamp + 1,
            PublicKey::zero(),
            tip.consensus,
            Vec::new(),
            tip.score,
            Vec::new(),
        );
        history.apply_block(filler);
    }
}
