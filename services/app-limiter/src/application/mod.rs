//! 应用层

pub mod authorization;
pub mod capability;
pub mod codec;
pub mod commands;
pub mod enforcement;
pub mod handlers;
pub mod selection_slot;

pub use authorization::AuthorizationGateway;
pub use capability::CapabilityGate;
pub use codec::{CODEC_VERSION, EncodedPolicy, SyncCodec};
pub use commands::*;
pub use enforcement::{ApplyOutcome, DomainShieldOutcome, EnforcementAdapter};
pub use handlers::RestrictionHandler;
pub use selection_slot::{SelectionGuard, SelectionSlot};
