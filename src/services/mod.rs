//! Business logic services for Lookout.

mod permissions;
mod plugins;

pub use permissions::PermissionService;
pub use plugins::{LockedProjectsPlugin, PermissionPlugin, PluginRegistry, ProjectStatusPlugin};
