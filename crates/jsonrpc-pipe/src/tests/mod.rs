//! Test modules for the jsonrpc-pipe crate
//!
//! End-to-end scenarios driven through [`crate::JsonRpcPipe::process`].
