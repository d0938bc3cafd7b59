//! seqswitch-http: HTTP JSON-RPC clients for rollup and execution nodes.
//!
//! Provides the production [`Dialer`](seqswitch_core::Dialer) implementations
//! used by the active providers:
//!
//! - [`HttpRollupDialer`] → [`HttpRollupClient`] (`admin_sequencerActive` health probe)
//! - [`HttpEthDialer`] → [`HttpEthClient`]

mod rpc;

pub mod eth;
pub mod rollup;

pub use eth::{HttpEthClient, HttpEthDialer};
pub use rollup::{HttpRollupClient, HttpRollupDialer};
pub use rpc::parse_quantity;
