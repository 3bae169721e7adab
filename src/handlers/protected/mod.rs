// handlers/protected/mod.rs - Protected handlers (bearer authentication required)
//
// Every route here sits behind `auth_gate_middleware`, which resolves the
// caller's IdentityClaim through the remote validator and injects it as an
// Extension before the handler runs.
//
// Route Prefix: /api/*

pub mod progress;

pub use progress::*;
