// handlers/mod.rs - two security tiers
//
// Public (no auth) -> Protected (bearer token validated by the remote authority)
pub mod public;
pub mod protected;

pub use protected::*;
pub use public::{health, root};
