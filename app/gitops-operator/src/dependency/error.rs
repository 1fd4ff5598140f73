use std::time::Duration;

use gitops_core::kubernetes::{operations::EnsureResourceError, ResourceKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("Couldn't ensure '{key}' {kind} resource exists! Reason: {source}")]
    Resource {
        kind: String,
        key: ResourceKey,
        #[source]
        source: EnsureResourceError,
    },
    #[error("Couldn't check the status of '{key}' operator! Reason: {source}")]
    OperatorStatus {
        key: ResourceKey,
        #[source]
        source: kube::Error,
    },
    #[error("Operator installation failed: {reason} ('{key}')")]
    OperatorFailed { key: ResourceKey, reason: String },
    #[error("'{key}' operator didn't finish installing within {}s!", .timeout.as_secs())]
    OperatorTimeout { key: ResourceKey, timeout: Duration },
}
