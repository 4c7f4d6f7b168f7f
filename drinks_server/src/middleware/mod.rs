mod acl;

pub use acl::{PermissionGuardFactory, PermissionGuardService};
