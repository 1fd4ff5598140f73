use std::{fmt::Debug, time::Duration};

use gitops_core::kubernetes::ResourceKey;
use log::{info, warn};

use crate::controller::reconciler::Outcome;

/// Logs the result of a reconciliation and returns the delay after which the
/// request should be retried, if any.
pub fn handle_reconciliation_result<E: Debug>(
    request: &ResourceKey,
    result: Result<Outcome, E>,
    error_policy: impl Fn(&E) -> Duration,
) -> Option<Duration> {
    match result {
        Ok(Outcome::Done) => {
            info!("Reconciled '{request}'");
            None
        }
        Ok(Outcome::RequeueAfter(delay)) => {
            info!("Reconciled '{request}'. Next attempt in {delay:?}");
            Some(delay)
        }
        Err(error) => {
            let delay = error_policy(&error);
            warn!("Reconciliation failed for '{request}', retrying in {delay:?}: {error:#?}");
            Some(delay)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gitops_core::kubernetes::ResourceKey;

    use crate::controller::reconciler::Outcome;

    use super::handle_reconciliation_result;

    fn request() -> ResourceKey {
        ResourceKey::namespaced("argocd", "argocd")
    }

    fn policy(_: &&str) -> Duration {
        Duration::from_secs(10)
    }

    #[test]
    fn done_is_not_retried() {
        assert_eq!(handle_reconciliation_result(&request(), Ok(Outcome::Done), policy), None);
    }

    #[test]
    fn requeue_keeps_its_delay() {
        let delay = Duration::from_secs(30);

        assert_eq!(
            handle_reconciliation_result(&request(), Ok(Outcome::RequeueAfter(delay)), policy),
            Some(delay)
        );
    }

    #[test]
    fn errors_use_the_policy_delay() {
        assert_eq!(
            handle_reconciliation_result(&request(), Err("boom"), policy),
            Some(Duration::from_secs(10))
        );
    }
}
