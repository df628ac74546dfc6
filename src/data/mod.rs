//! Payload ingress: configured static sources, player profiles and the live world state.

pub mod profile;
pub mod sources;
pub mod worldstate;

pub use profile::{load_profile, ProfileError, ProfilePayload};
pub use sources::{default_sources, DirectorySource, FetchError, MemorySource, PayloadSource, SourceSpec};
pub use worldstate::{load_worldstate, WorldState, WorldStateError};
