//! Re-exports the workspace's four crates behind a single dependency,
//! mirroring how `ochra-daemon` aggregates the rest of its workspace —
//! minus a binary, a polling loop, or any persistent state file, none of
//! which this protocol needs.

pub use convos_crypto as crypto;
pub use convos_invite as invite;
pub use convos_middleware as middleware;
pub use convos_wire as wire;
