/// Named groups and the group → KEM registry.

pub mod registry;
pub mod types;

pub use registry::{is_kem_group, registered_groups, resolve, KEM_GROUPS};
pub use types::*;
