//! Configuration deployment and task tracking.
//!
//! Changes made through the API stay pending on the FMC until deployed.
//! [`deploy_pending`] gathers every device with pending changes and posts a
//! single deployment request; the FMC answers with a task that
//! [`task_status`] polls.

use crate::Result;
use fmc_client::{fmc_resource, FmcClient, ObjectId, Operations, Resource};
use fmc_core::types::Metadata;
use fmc_core::ObjectRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Device with changes not yet deployed (`deployment/deployabledevices`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeployableDevice {
    /// Object id (not set by the FMC for this collection).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Device name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `DeployableDevice`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Configuration version, milliseconds since the epoch as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The device itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<ObjectRef>,
    /// Whether the device can take a deployment now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_be_deployed: Option<bool>,
    /// Whether the device already runs the latest configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to_date: Option<bool>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl DeployableDevice {
    fn version_number(&self) -> u64 {
        self.version
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

fmc_resource!(DeployableDevice, "DeployableDevice", "deployment/deployabledevices", {
    const OPERATIONS: Operations = Operations::READ_ONLY;
});

/// Task the FMC started for a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskReference {
    /// Task id, usable with [`task_status`].
    pub id: ObjectId,
    /// Task type (e.g. `DEVICE_DEPLOYMENT`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

/// Metadata returned with a deployment request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeploymentMetadata {
    /// Started deployment task.
    #[serde(default)]
    pub task: Option<TaskReference>,
}

/// Request to deploy pending changes (`deployment/deploymentrequests`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRequest {
    /// Always `DeploymentRequest`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Configuration version to deploy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Deploy even when nothing changed.
    #[serde(default)]
    pub force_deploy: bool,
    /// Proceed despite warnings.
    #[serde(default)]
    pub ignore_warning: bool,
    /// Devices to deploy to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub device_list: Vec<ObjectId>,
    /// Note shown in the deployment history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_note: Option<String>,
    /// Returned task.
    #[serde(default, skip_serializing)]
    pub metadata: Option<DeploymentMetadata>,
}

impl DeploymentRequest {
    /// Task the FMC started for this request.
    #[must_use]
    pub fn task(&self) -> Option<&TaskReference> {
        self.metadata.as_ref().and_then(|m| m.task.as_ref())
    }
}

impl Resource for DeploymentRequest {
    const KIND: &'static str = "DeploymentRequest";
    const OPERATIONS: Operations = Operations::POST_ONLY;
    const REQUIRED_FOR_POST: &'static [&'static str] = &["version", "deviceList"];

    fn collection_path(&self) -> Result<String> {
        Ok("deployment/deploymentrequests".to_string())
    }

    fn id(&self) -> Option<&ObjectId> {
        None
    }

    fn name(&self) -> Option<&str> {
        None
    }
}

/// Background task (`job/taskstatuses`), fetched by id only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// Task id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Not set by the FMC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `TaskStatus`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Task type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    /// Current state (`Pending`, `Running`, `Deployed`, `Failed`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Progress or failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TaskStatus {
    /// True once the task has stopped, successfully or not.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.as_deref().is_some_and(|status| {
            ["deployed", "success", "succeeded", "failed", "deployment failed"]
                .iter()
                .any(|done| status.eq_ignore_ascii_case(done))
        })
    }

    /// True if the task ended in failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.to_ascii_lowercase().contains("fail"))
    }
}

fmc_resource!(TaskStatus, "TaskStatus", "job/taskstatuses", {
    const OPERATIONS: Operations = Operations::READ_ONLY;
    const REQUIRED_FOR_GET: &'static [&'static str] = &["id"];
});

/// Options for [`deploy_pending`].
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Deploy even when nothing changed.
    pub force_deploy: bool,
    /// Proceed despite warnings.
    pub ignore_warning: bool,
    /// Note shown in the deployment history.
    pub deployment_note: Option<String>,
    /// Only deploy to these devices; all pending devices when `None`.
    pub devices: Option<Vec<ObjectId>>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            force_deploy: false,
            ignore_warning: true,
            deployment_note: None,
            devices: None,
        }
    }
}

/// Deploy every pending device in one request.
///
/// Returns the started task, or `None` when no device has pending changes.
///
/// # Errors
///
/// Returns the FMC's error for the listing or the deployment request.
pub async fn deploy_pending(
    client: &FmcClient,
    options: &DeployOptions,
) -> Result<Option<TaskReference>> {
    let pending = client.list(&DeployableDevice::default()).await?;
    let pending: Vec<&DeployableDevice> = pending
        .iter()
        .filter(|d| d.can_be_deployed != Some(false))
        .filter(|d| match (&options.devices, &d.device) {
            (None, _) => true,
            (Some(wanted), Some(device)) => wanted.contains(&device.id),
            (Some(_), None) => false,
        })
        .collect();

    let device_list: Vec<ObjectId> = pending
        .iter()
        .filter_map(|d| d.device.as_ref().map(|device| device.id.clone()))
        .collect();
    if device_list.is_empty() {
        info!("No devices with pending changes");
        return Ok(None);
    }

    let version = pending
        .iter()
        .max_by_key(|d| d.version_number())
        .and_then(|d| d.version.clone());
    debug!(devices = device_list.len(), version = ?version, "Deploying pending changes");

    let request = DeploymentRequest {
        kind: Some("DeploymentRequest".to_string()),
        version,
        force_deploy: options.force_deploy,
        ignore_warning: options.ignore_warning,
        device_list,
        deployment_note: options.deployment_note.clone(),
        metadata: None,
    };
    let response = client.create(&request).await?;
    let task = response.task().cloned();
    info!(task = ?task.as_ref().map(|t| t.id.as_str()), "Deployment requested");
    Ok(task)
}

/// Fetch the current state of a task.
///
/// # Errors
///
/// Returns [`fmc_core::Error::NotFound`] for an unknown task id.
pub async fn task_status(client: &FmcClient, id: &ObjectId) -> Result<TaskStatus> {
    client
        .get(&TaskStatus {
            id: Some(id.clone()),
            ..TaskStatus::default()
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_states() {
        let task = |status: &str| TaskStatus {
            status: Some(status.to_string()),
            ..TaskStatus::default()
        };
        assert!(!task("Running").is_finished());
        assert!(task("Deployed").is_finished());
        assert!(!task("Deployed").is_failed());
        assert!(task("FAILED").is_finished());
        assert!(task("FAILED").is_failed());
        assert!(!TaskStatus::default().is_finished());
    }

    #[test]
    fn deployment_response_carries_task() {
        let response: DeploymentRequest = serde_json::from_value(json!({
            "type": "DeploymentRequest",
            "version": "1457566762351",
            "forceDeploy": false,
            "ignoreWarning": true,
            "deviceList": ["DEV-1"],
            "metadata": {"task": {"id": "8589939967", "taskType": "DEVICE_DEPLOYMENT"}}
        }))
        .unwrap();
        assert_eq!(response.task().map(|t| t.id.as_str()), Some("8589939967"));
        assert!(serde_json::to_value(&response).unwrap().get("metadata").is_none());
    }

    #[test]
    fn newest_version_wins() {
        let device = |version: &str| DeployableDevice {
            version: Some(version.to_string()),
            ..DeployableDevice::default()
        };
        let devices = [device("999"), device("1457566762351"), device("garbage")];
        let newest = devices.iter().max_by_key(|d| d.version_number()).unwrap();
        assert_eq!(newest.version.as_deref(), Some("1457566762351"));
    }
}
