//! FMC device resources.
//!
//! Device records and their physical interfaces, device groups, policy
//! assignments, and the deployment workflow: find what is pending, post one
//! deployment request, then poll the returned task.

#![deny(missing_docs)]

pub mod assignment;
pub mod deployment;
pub mod device;

pub use assignment::PolicyAssignment;
pub use deployment::{
    deploy_pending, task_status, DeployOptions, DeployableDevice, DeploymentMetadata,
    DeploymentRequest, TaskReference, TaskStatus,
};
pub use device::{DeviceGroup, DeviceRecord, Ipv4Config, PhysicalInterface, StaticIpv4};

/// Convenient result alias that reuses the shared FMC error type.
pub type Result<T> = fmc_core::Result<T>;
