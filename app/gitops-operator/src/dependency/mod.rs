use std::time::Duration;

use gitops_core::{
    kubernetes::{
        client::{ClusterClient, ClusterResource},
        operations::{create_resource_if_absent, try_get_resource, CreateOutcome},
        ResourceKey,
    },
    resources::{
        crd::olm::{ClusterServiceVersion, InstallPhase},
        operator::{CatalogSource, OperatorResource},
    },
};
use log::{debug, error, info};
use tokio::time::{sleep, timeout};

use self::error::InstallerError;

pub mod error;

pub const POLL_INTERVAL_SECS: u64 = 1;
pub const POLL_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(POLL_TIMEOUT_SECS),
        }
    }
}

/// Installs operator dependencies through the operator lifecycle manager.
///
/// Operators are installed one after another, each one has to report a
/// successful install before the next one is touched. Resources that already
/// exist are left as they are, so an interrupted run can simply be repeated.
pub struct Dependencies<C> {
    client: C,
    catalog: CatalogSource,
    poll: PollSettings,
}

impl<C: ClusterClient> Dependencies<C> {
    pub fn new(client: C, catalog: CatalogSource) -> Self {
        Self {
            client,
            catalog,
            poll: PollSettings::default(),
        }
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;

        self
    }

    pub async fn install(&self, operators: &[OperatorResource]) -> Result<(), InstallerError> {
        info!("Installing GitOps dependencies...");

        // TODO: install the static resources of every operator up front and wait for all of them with a shared deadline
        for operator in operators {
            self.install_operator(operator).await?;
        }

        info!("GitOps dependencies installed!");

        Ok(())
    }

    async fn install_operator(&self, operator: &OperatorResource) -> Result<(), InstallerError> {
        self.ensure_resource(&operator.generate_namespace()).await?;
        self.ensure_resource(&operator.generate_operator_group()).await?;
        self.ensure_resource(&operator.generate_subscription(&self.catalog))
            .await?;

        info!(
            "Waiting for '{}' operator to install in '{}' namespace...",
            operator.subscription(),
            operator.namespace()
        );

        self.wait_for_operator(&operator.csv_key()).await?;

        info!(
            "'{}' operator installed successfully in '{}' namespace!",
            operator.subscription(),
            operator.namespace()
        );

        Ok(())
    }

    async fn ensure_resource<K: ClusterResource>(
        &self,
        resource: &K,
    ) -> Result<CreateOutcome, InstallerError> {
        create_resource_if_absent(&self.client, resource)
            .await
            .map_err(|source| {
                let meta = resource.meta();
                let kind = K::kind(&()).into_owned();
                let key = ResourceKey {
                    name: meta.name.to_owned().unwrap_or_default(),
                    namespace: meta.namespace.to_owned(),
                };

                error!("Unable to ensure '{key}' {kind} resource! {source}");

                InstallerError::Resource { kind, key, source }
            })
    }

    async fn wait_for_operator(&self, key: &ResourceKey) -> Result<(), InstallerError> {
        timeout(self.poll.timeout, self.poll_operator(key))
            .await
            .map_err(|_| InstallerError::OperatorTimeout {
                key: key.to_owned(),
                timeout: self.poll.timeout,
            })?
    }

    async fn poll_operator(&self, key: &ResourceKey) -> Result<(), InstallerError> {
        loop {
            if self.is_operator_ready(key).await? {
                return Ok(());
            }

            sleep(self.poll.interval).await;
        }
    }

    async fn is_operator_ready(&self, key: &ResourceKey) -> Result<bool, InstallerError> {
        let csv = try_get_resource::<ClusterServiceVersion, C>(&self.client, key)
            .await
            .map_err(|source| InstallerError::OperatorStatus {
                key: key.to_owned(),
                source,
            })?;

        let csv = match csv {
            Some(csv) => csv,
            None => {
                debug!("'{key}' ClusterServiceVersion doesn't exist yet...");
                return Ok(false);
            }
        };

        match csv.install_phase() {
            InstallPhase::Succeeded => Ok(true),
            InstallPhase::Failed(reason) => Err(InstallerError::OperatorFailed {
                key: key.to_owned(),
                reason,
            }),
            InstallPhase::Pending(phase) => {
                debug!(
                    "'{key}' operator is still installing (phase: {})...",
                    phase.as_deref().unwrap_or("---")
                );
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gitops_core::{
        kubernetes::{
            testing::{FakeCluster, Scripted, Write},
            ResourceKey,
        },
        resources::{
            crd::olm::{
                ClusterServiceVersion, ClusterServiceVersionSpec, ClusterServiceVersionStatus,
                OperatorGroup, Subscription,
            },
            operator::{gitops_operators, CatalogSource, OperatorResource},
        },
    };
    use k8s_openapi::api::core::v1::Namespace;
    use kube::core::ObjectMeta;

    use super::{error::InstallerError, Dependencies, PollSettings};

    fn csv(operator: &OperatorResource, phase: &str, reason: Option<&str>) -> ClusterServiceVersion {
        ClusterServiceVersion {
            metadata: ObjectMeta {
                name: Some(operator.csv().to_owned()),
                namespace: Some(operator.namespace().to_owned()),
                ..Default::default()
            },
            spec: ClusterServiceVersionSpec::default(),
            status: Some(ClusterServiceVersionStatus {
                phase: Some(phase.to_owned()),
                reason: reason.map(str::to_owned),
                message: None,
            }),
        }
    }

    fn static_writes(operator: &OperatorResource) -> Vec<Write> {
        vec![
            Write::Create(
                "Namespace".to_owned(),
                ResourceKey::cluster(operator.namespace()),
            ),
            Write::Create(
                "OperatorGroup".to_owned(),
                ResourceKey::namespaced(operator.operator_group(), operator.namespace()),
            ),
            Write::Create(
                "Subscription".to_owned(),
                ResourceKey::namespaced(operator.subscription(), operator.namespace()),
            ),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn installs_operators_in_order() {
        let cluster = FakeCluster::default();
        let operators = gitops_operators(None);
        for operator in &operators {
            cluster.insert(&csv(operator, "Succeeded", None));
        }

        Dependencies::new(&cluster, CatalogSource::default())
            .install(&operators)
            .await
            .unwrap();

        let expected = operators
            .iter()
            .flat_map(static_writes)
            .collect::<Vec<_>>();
        assert_eq!(cluster.writes(), expected);

        let subscription = cluster
            .object::<Subscription>(&ResourceKey::namespaced("argocd-operator", "argocd"))
            .unwrap();
        assert_eq!(subscription.spec.name, "argocd-operator");
        assert_eq!(subscription.spec.source, "community-operators");

        let group = cluster
            .object::<OperatorGroup>(&ResourceKey::namespaced("sealed-secrets-operator-group", "cicd"))
            .unwrap();
        assert_eq!(group.spec.target_namespaces, vec!["cicd".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn second_install_changes_nothing() {
        let cluster = FakeCluster::default();
        let operators = gitops_operators(Some("dev"));
        for operator in &operators {
            cluster.insert(&csv(operator, "Succeeded", None));
        }
        let dependencies = Dependencies::new(&cluster, CatalogSource::default());

        dependencies.install(&operators).await.unwrap();
        let writes = cluster.writes();
        dependencies.install(&operators).await.unwrap();

        assert_eq!(cluster.writes(), writes);
        assert_eq!(cluster.count::<Namespace>(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_until_the_operator_succeeds() {
        let cluster = FakeCluster::default();
        let operator = OperatorResource::argocd_operator(None);
        cluster.script_get::<ClusterServiceVersion>(
            &operator.csv_key(),
            vec![
                Scripted::Missing,
                Scripted::Missing,
                Scripted::present(&csv(&operator, "Pending", None)),
                Scripted::present(&csv(&operator, "Installing", None)),
                Scripted::present(&csv(&operator, "Succeeded", None)),
            ],
        );

        Dependencies::new(&cluster, CatalogSource::default())
            .install(&[operator.clone()])
            .await
            .unwrap();

        assert_eq!(cluster.reads::<ClusterServiceVersion>(&operator.csv_key()), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_operator_reports_the_reason() {
        let cluster = FakeCluster::default();
        let operator = OperatorResource::sealed_secrets_operator(None);
        cluster.script_get::<ClusterServiceVersion>(
            &operator.csv_key(),
            vec![
                Scripted::Missing,
                Scripted::present(&csv(&operator, "Failed", Some("InstallComponentFailed"))),
            ],
        );

        let error = Dependencies::new(&cluster, CatalogSource::default())
            .install(&[operator.clone()])
            .await
            .unwrap_err();

        match &error {
            InstallerError::OperatorFailed { key, reason } => {
                assert_eq!(key, &operator.csv_key());
                assert_eq!(reason, "InstallComponentFailed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error.to_string().contains("InstallComponentFailed"));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_operator_times_out() {
        let cluster = FakeCluster::default();
        let operator = OperatorResource::argocd_operator(None);
        cluster.insert(&csv(&operator, "Installing", None));
        let started = tokio::time::Instant::now();

        let error = Dependencies::new(&cluster, CatalogSource::default())
            .install(&[operator.clone()])
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            InstallerError::OperatorTimeout { timeout, .. } if timeout == Duration::from_secs(60)
        ));
        assert_eq!(started.elapsed(), Duration::from_secs(60));

        let reads = cluster.reads::<ClusterServiceVersion>(&operator.csv_key());
        assert!((60..=61).contains(&reads), "polled {reads} times");
    }

    #[tokio::test(start_paused = true)]
    async fn poll_settings_shorten_the_wait() {
        let cluster = FakeCluster::default();
        let operator = OperatorResource::argocd_operator(None);
        let started = tokio::time::Instant::now();

        let error = Dependencies::new(&cluster, CatalogSource::default())
            .with_poll_settings(PollSettings {
                interval: Duration::from_secs(2),
                timeout: Duration::from_secs(10),
            })
            .install(&[operator.clone()])
            .await
            .unwrap_err();

        assert!(matches!(error, InstallerError::OperatorTimeout { .. }));
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        let reads = cluster.reads::<ClusterServiceVersion>(&operator.csv_key());
        assert!((5..=6).contains(&reads), "polled {reads} times");
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_operator_blocks_the_following_ones() {
        let cluster = FakeCluster::default();
        let operators = gitops_operators(None);
        cluster.insert(&csv(&operators[1], "Succeeded", None));

        let error = Dependencies::new(&cluster, CatalogSource::default())
            .install(&operators)
            .await
            .unwrap_err();

        assert!(matches!(error, InstallerError::OperatorTimeout { .. }));
        assert_eq!(cluster.writes(), static_writes(&operators[0]));
        assert_eq!(cluster.reads::<ClusterServiceVersion>(&operators[1].csv_key()), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn status_read_errors_abort_immediately() {
        let cluster = FakeCluster::default();
        let operator = OperatorResource::argocd_operator(None);
        cluster.script_get::<ClusterServiceVersion>(
            &operator.csv_key(),
            vec![Scripted::Missing, Scripted::Error(500, "InternalError".to_owned())],
        );

        let error = Dependencies::new(&cluster, CatalogSource::default())
            .install(&[operator.clone()])
            .await
            .unwrap_err();

        assert!(matches!(error, InstallerError::OperatorStatus { .. }));
        assert_eq!(cluster.reads::<ClusterServiceVersion>(&operator.csv_key()), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn creation_errors_abort_the_install() {
        let cluster = FakeCluster::default();
        let operators = gitops_operators(None);
        cluster.fail_create::<OperatorGroup>(403, "Forbidden");

        let error = Dependencies::new(&cluster, CatalogSource::default())
            .install(&operators)
            .await
            .unwrap_err();

        match error {
            InstallerError::Resource { kind, key, .. } => {
                assert_eq!(kind, "OperatorGroup");
                assert_eq!(
                    key,
                    ResourceKey::namespaced("sealed-secrets-operator-group", "cicd")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(cluster.writes(), static_writes(&operators[0])[..1].to_vec());
        assert_eq!(cluster.count::<Subscription>(), 0);
    }
}
