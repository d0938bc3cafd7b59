//! seqswitch CLI: probe and watch a replicated sequencer set.
//!
//! Usage:
//! ```bash
//! # Ask one rollup node whether it is the active sequencer
//! seqswitch probe --rollup-url http://seq-0:9545
//!
//! # Follow the active sequencer across a set, failing over as it moves
//! seqswitch watch \
//!     --rollup-urls http://seq-0:9545,http://seq-1:9545 \
//!     --eth-urls    http://seq-0:8545,http://seq-1:8545
//! ```

mod config;
mod logging;

use std::env;
use std::process;
use std::time::Duration;

use anyhow::Context;
use seqswitch_core::{
    ActiveEndpointProvider, CancellationToken, EthClient, RollupClient,
};
use seqswitch_http::{HttpEthDialer, HttpRollupClient, HttpRollupDialer};

use crate::config::{has_flag, parse_flag, WatchConfig};
use crate::logging::{init_tracing, LogConfig};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "probe" => cmd_probe(&args[2..]).await,
        "watch" => cmd_watch(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("seqswitch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("seqswitch {}", env!("CARGO_PKG_VERSION"));
    println!("Follow the active sequencer of a replicated rollup sequencer set\n");
    println!("USAGE:");
    println!("    seqswitch <COMMAND>\n");
    println!("COMMANDS:");
    println!("    probe      Check whether one rollup node is the active sequencer");
    println!("    watch      Track the active sequencer, failing over as it changes");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("PROBE FLAGS:");
    println!("    --rollup-url <URL>         Rollup node RPC URL  [required]");
    println!("    --timeout-ms <MS>          Request timeout (default 10000)\n");
    println!("WATCH FLAGS:");
    println!("    --rollup-urls <A,B,..>     Rollup node RPC URLs, in priority order  [required]");
    println!("    --eth-urls <A,B,..>        Execution RPC URLs, same order  [required]");
    println!("    --check-interval-ms <MS>   Minimum time between health checks (default 120000)");
    println!("    --timeout-ms <MS>          Per dial / health check timeout (default 10000)");
    println!("    --poll-ms <MS>             How often to report the selection (default 2000)");
    println!("    --config <FILE>            JSON config file; flags override it");
    println!("    --log-level <LEVEL>        trace | debug | info | warn | error");
    println!("    --log-json                 Emit JSON logs");
}

async fn cmd_probe(args: &[String]) -> anyhow::Result<()> {
    let url = parse_flag(args, "--rollup-url").context("--rollup-url is required")?;
    let timeout = match parse_flag(args, "--timeout-ms") {
        Some(ms) => Duration::from_millis(ms.parse().context("--timeout-ms expects milliseconds")?),
        None => Duration::from_secs(10),
    };
    init_tracing(&LogConfig {
        json: has_flag(args, "--log-json"),
        ..LogConfig::default()
    })?;

    let client = HttpRollupClient::new(&url, timeout)?;
    let version = client.version().await?;
    let active = client.sequencer_active().await?;
    client.close();

    println!("  URL:      {url}");
    println!("  Version:  {version}");
    println!("  Active:   {active}");
    Ok(())
}

async fn cmd_watch(args: &[String]) -> anyhow::Result<()> {
    let config = WatchConfig::from_args(args)?;
    init_tracing(&config.log)?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down");
            shutdown.cancel();
        }
    });

    let provider = ActiveEndpointProvider::new(
        config.eth_urls.clone(),
        config.rollup_urls.clone(),
        config.provider,
        HttpEthDialer,
        HttpRollupDialer,
        &cancel,
    )
    .await
    .context("selecting initial sequencer")?;

    let mut ticker = tokio::time::interval(config.poll_interval());
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => report(&provider, &cancel).await,
        }
    }

    provider.close().await;
    Ok(())
}

async fn report(provider: &ActiveEndpointProvider, cancel: &CancellationToken) {
    let eth = match provider.eth_client(cancel).await {
        Ok(eth) => eth,
        Err(e) => {
            tracing::warn!(error = %e, "no usable sequencer");
            return;
        }
    };
    let index = provider.current_index().await;
    match eth.block_number().await {
        Ok(block) => println!(
            "sequencer {} {} block {block}",
            index.map_or_else(|| "-".to_string(), |i| i.to_string()),
            eth.url()
        ),
        Err(e) => tracing::warn!(url = %eth.url(), error = %e, "block number query failed"),
    }
}
