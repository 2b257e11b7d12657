//! 领域层

pub mod authorization;
pub mod enforcement_store;
pub mod platform;
pub mod policy_model;
pub mod presenter;
pub mod selection;
pub mod shield;
pub mod token;

pub use authorization::{AuthorizationCenter, AuthorizationMode, AuthorizationStatus};
pub use enforcement_store::EnforcementStore;
pub use platform::{PlatformInfo, PlatformVersion};
pub use policy_model::PolicyModel;
pub use presenter::{PickerOutcome, PresentationRequest, SelectionPresenter, SelectionPurpose};
pub use selection::Selection;
pub use shield::{AppliedPolicy, DomainScope, EnforcementState, ShieldPolicy};
pub use token::{ApplicationToken, CategoryToken, WebDomainToken};
