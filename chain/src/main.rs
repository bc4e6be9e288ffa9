// Minimal demo validator node that wires up the chain library:
//
// - RocksDB-backed storage
// - a freshly generated authority keypair (sole member of the PoA set)
// - Prometheus metrics exporter on /metrics
// - simple loop that proposes blocks at the configured block period.

use std::{sync::Arc, time::Duration};

use poa_chain::{
    ChainConfig, Clock, ConsensusEngine, Keypair, MetricsRegistry, RocksDbBlockStore, SystemClock,
    Transaction, TxPool, run_prometheus_http_server,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run_node().await {
        eprintln!("fatal error: {err}");
        std::process::exit(1);
    }
}

async fn run_node() -> Result<(), String> {
    // For now, just use defaults. Later this can come from a file/CLI/env.
    let mut cfg = ChainConfig::default();

    // ---------------------------
    // Metrics registry + exporter
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new().map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    if cfg.metrics.enabled {
        let metrics_clone = metrics.clone();
        let addr = cfg.metrics.listen_addr;
        tokio::spawn(async move {
            if let Err(e) = run_prometheus_http_server(metrics_clone, addr).await {
                eprintln!("metrics HTTP server error: {e}");
            }
        });
        eprintln!("metrics exporter listening on http://{}/metrics", addr);
    }

    // ---------------------------
    // Authority identity (demo)
    // ---------------------------

    // In a real deployment the key would be loaded from a keystore. For
    // the demo we generate a fresh pair and admit its address as the sole
    // authority.
    let keypair = Keypair::generate();
    eprintln!("authority address: {}", keypair.address());

    cfg.poa.validators.push(keypair.address().to_string());
    let poa = cfg
        .poa
        .build()
        .map_err(|e| format!("invalid PoA configuration: {e}"))?;
    let block_period = poa.block_period;

    // ---------------------------
    // Storage backend (RocksDB)
    // ---------------------------

    let store = RocksDbBlockStore::open(&cfg.storage)
        .map_err(|e| format!("failed to open RocksDB store at {}: {e}", cfg.storage.path))?;

    // ---------------------------
    // Consensus engine + genesis
    // ---------------------------

    let clock = SystemClock;
    let mut engine = ConsensusEngine::new(cfg.consensus.clone(), poa, store);

    let genesis = engine
        .init_genesis(b"poa-demo-genesis", clock.now())
        .map_err(|e| format!("failed to initialise genesis: {e}"))?;
    eprintln!(
        "chain initialised, genesis hash={}",
        genesis.header_hash()
    );

    if let Ok(Some(height)) = engine.latest_index() {
        metrics.consensus.chain_height.set(height as i64);
    }

    // ---------------------------
    // Simple transaction pool (empty)
    // ---------------------------

    struct EmptyTxPool;

    impl TxPool for EmptyTxPool {
        fn select_for_block(&mut self, _max_txs: usize, _max_bytes: usize) -> Vec<Transaction> {
            Vec::new()
        }
    }

    let mut tx_pool = EmptyTxPool;

    eprintln!("starting node with block_period={block_period}s (empty TxPool)");

    // ---------------------------
    // Main proposal loop
    // ---------------------------

    loop {
        let start = std::time::Instant::now();

        match engine.propose_block(&keypair, &mut tx_pool, &clock) {
            Ok((hash, block)) => {
                let elapsed = start.elapsed().as_secs_f64();
                metrics.consensus.block_validation_seconds.observe(elapsed);
                metrics.consensus.blocks_imported.inc();
                metrics.consensus.chain_height.set(block.index as i64);

                println!("proposed block index={} hash={}", block.index, hash);
            }
            Err(e) => {
                metrics.consensus.blocks_rejected.inc();
                eprintln!("failed to propose block: {e}");
            }
        }

        tokio::time::sleep(Duration::from_secs(block_period)).await;
    }
}
