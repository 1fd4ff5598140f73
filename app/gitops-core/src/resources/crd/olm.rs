use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "operators.coreos.com",
    version = "v1",
    kind = "OperatorGroup",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct OperatorGroupSpec {
    /// namespaces watched by the operators installed through this group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_namespaces: Vec<String>,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "operators.coreos.com",
    version = "v1alpha1",
    kind = "Subscription",
    namespaced,
    status = "SubscriptionStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSpec {
    /// catalog channel to track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// package name inside the catalog
    pub name: String,
    /// catalog source name
    pub source: String,
    /// namespace of the catalog source
    pub source_namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_plan_approval: Option<String>,
    #[serde(
        default,
        rename = "startingCSV",
        skip_serializing_if = "Option::is_none"
    )]
    pub starting_csv: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    #[serde(default, rename = "currentCSV", skip_serializing_if = "Option::is_none")]
    pub current_csv: Option<String>,
    #[serde(default, rename = "installedCSV", skip_serializing_if = "Option::is_none")]
    pub installed_csv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "operators.coreos.com",
    version = "v1alpha1",
    kind = "ClusterServiceVersion",
    namespaced,
    status = "ClusterServiceVersionStatus",
    shortname = "csv"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersionStatus {
    /// install phase reported by the operator lifecycle manager
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// machine readable cause of the current phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub const CSV_PHASE_SUCCEEDED: &str = "Succeeded";
pub const CSV_PHASE_FAILED: &str = "Failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallPhase {
    Succeeded,
    Failed(String),
    /// any non-terminal phase, `None` when no phase was reported yet
    Pending(Option<String>),
}

impl ClusterServiceVersion {
    pub fn install_phase(&self) -> InstallPhase {
        let status = match &self.status {
            Some(status) => status,
            None => return InstallPhase::Pending(None),
        };

        match status.phase.as_deref() {
            Some(CSV_PHASE_SUCCEEDED) => InstallPhase::Succeeded,
            Some(CSV_PHASE_FAILED) => InstallPhase::Failed(failure_reason(status)),
            phase => InstallPhase::Pending(phase.map(|phase| phase.to_owned())),
        }
    }
}

fn failure_reason(status: &ClusterServiceVersionStatus) -> String {
    match (status.reason.as_deref(), status.message.as_deref()) {
        (Some(reason), Some(message)) => format!("{reason} ({message})"),
        (Some(reason), None) => reason.to_owned(),
        (None, Some(message)) => message.to_owned(),
        (None, None) => "unknown reason".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ClusterServiceVersion, ClusterServiceVersionSpec, ClusterServiceVersionStatus,
        InstallPhase,
    };

    fn csv_with(status: Option<ClusterServiceVersionStatus>) -> ClusterServiceVersion {
        let mut csv = ClusterServiceVersion::new(
            "argocd-operator.v0.0.14",
            ClusterServiceVersionSpec::default(),
        );
        csv.status = status;

        csv
    }

    fn status(phase: &str, reason: Option<&str>, message: Option<&str>) -> ClusterServiceVersionStatus {
        ClusterServiceVersionStatus {
            phase: Some(phase.to_owned()),
            reason: reason.map(str::to_owned),
            message: message.map(str::to_owned),
        }
    }

    #[test]
    fn missing_status_is_pending() {
        assert_eq!(csv_with(None).install_phase(), InstallPhase::Pending(None));
    }

    #[test]
    fn other_phases_are_pending() {
        let succeeded = csv_with(Some(status("Succeeded", None, None))).install_phase();
        let installing = csv_with(Some(status("Installing", None, None))).install_phase();

        assert_eq!(succeeded, InstallPhase::Succeeded);
        assert_eq!(installing, InstallPhase::Pending(Some("Installing".to_owned())));
    }

    #[test]
    fn failed_phase_carries_the_reason() {
        let phase = csv_with(Some(status(
            "Failed",
            Some("InstallComponentFailed"),
            Some("install strategy failed"),
        )))
        .install_phase();

        assert_eq!(
            phase,
            InstallPhase::Failed("InstallComponentFailed (install strategy failed)".to_owned())
        );

        let phase = csv_with(Some(status("Failed", None, None))).install_phase();

        assert_eq!(phase, InstallPhase::Failed("unknown reason".to_owned()));
    }

    #[test]
    fn status_is_read_from_cluster_json() {
        let csv: ClusterServiceVersion = serde_json::from_value(serde_json::json!({
            "apiVersion": "operators.coreos.com/v1alpha1",
            "kind": "ClusterServiceVersion",
            "metadata": { "name": "sealed-secrets-operator-helm.v0.0.2", "namespace": "cicd" },
            "spec": { "displayName": "Sealed Secrets Operator", "install": { "strategy": "deployment" } },
            "status": { "phase": "InstallReady", "reason": "InstallSucceeded" }
        }))
        .unwrap();

        assert_eq!(
            csv.install_phase(),
            InstallPhase::Pending(Some("InstallReady".to_owned()))
        );
    }
}
