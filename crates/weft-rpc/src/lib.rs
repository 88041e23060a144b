// crates/weft-rpc/src/lib.rs
//
// weft-rpc: JSON-RPC server and handlers for the Weft federation engine.
//
// Provides a tonic-based RPC server with handlers for the search, activity,
// review, trust, settings, and partner surfaces. Uses JSON-based RPC over
// tonic rather than protobuf codegen: a single unary service accepts
// `{method, params, context?}` envelopes and dispatches on the method name.

pub mod handlers;
pub mod middleware;
pub mod server;

// Re-export the main server types for ergonomic access.
pub use server::{RpcConfig, RpcState, WeftRpcServer};
