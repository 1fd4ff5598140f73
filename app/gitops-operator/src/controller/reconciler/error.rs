use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Couldn't retrieve the ArgoCD instance! Reason: {}", .0)]
    InstanceRetrieval(kube::Error),
    #[error("Couldn't retrieve the ArgoCD server route! Reason: {}", .0)]
    RouteRetrieval(kube::Error),
    #[error("Couldn't retrieve the console link! Reason: {}", .0)]
    LinkRetrieval(kube::Error),
    #[error("Couldn't create the console link! Reason: {}", .0)]
    LinkCreation(kube::Error),
    #[error("Couldn't remove the console link! Reason: {}", .0)]
    LinkRemoval(kube::Error),
}

impl ReconcilerError {
    pub fn kube_error(&self) -> &kube::Error {
        match self {
            ReconcilerError::InstanceRetrieval(error)
            | ReconcilerError::RouteRetrieval(error)
            | ReconcilerError::LinkRetrieval(error)
            | ReconcilerError::LinkCreation(error)
            | ReconcilerError::LinkRemoval(error) => error,
        }
    }
}
