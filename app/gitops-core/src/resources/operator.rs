use k8s_openapi::api::core::v1::Namespace;
use kube::core::ObjectMeta;

use crate::kubernetes::ResourceKey;

use super::{
    crd::olm::{OperatorGroup, OperatorGroupSpec, Subscription, SubscriptionSpec},
    labels::get_dependency_labels,
};

pub const ARGOCD_NAMESPACE: &str = "argocd";
pub const ARGOCD_SUBSCRIPTION: &str = "argocd-operator";
pub const ARGOCD_OPERATOR_GROUP: &str = "argocd-operator-group";
pub const ARGOCD_CSV: &str = "argocd-operator.v0.0.14";

pub const SEALED_SECRETS_NAMESPACE: &str = "cicd";
pub const SEALED_SECRETS_SUBSCRIPTION: &str = "sealed-secrets-operator-helm";
pub const SEALED_SECRETS_OPERATOR_GROUP: &str = "sealed-secrets-operator-group";
pub const SEALED_SECRETS_CSV: &str = "sealed-secrets-operator-helm.v0.0.2";

pub const DEFAULT_CATALOG_CHANNEL: &str = "alpha";
pub const DEFAULT_CATALOG_SOURCE: &str = "community-operators";
pub const DEFAULT_CATALOG_SOURCE_NAMESPACE: &str = "openshift-marketplace";

/// Catalog coordinates every subscription is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSource {
    pub channel: String,
    pub source: String,
    pub source_namespace: String,
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CATALOG_CHANNEL.to_owned(),
            source: DEFAULT_CATALOG_SOURCE.to_owned(),
            source_namespace: DEFAULT_CATALOG_SOURCE_NAMESPACE.to_owned(),
        }
    }
}

/// Names of the install-time resources of a single operator dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorResource {
    namespace: String,
    subscription: String,
    operator_group: String,
    csv: String,
}

impl OperatorResource {
    pub fn new(
        namespace: impl Into<String>,
        subscription: impl Into<String>,
        operator_group: impl Into<String>,
        csv: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            subscription: subscription.into(),
            operator_group: operator_group.into(),
            csv: csv.into(),
        }
    }

    pub fn argocd_operator(prefix: Option<&str>) -> Self {
        Self::new(
            add_prefix_if_necessary(prefix, ARGOCD_NAMESPACE),
            ARGOCD_SUBSCRIPTION,
            ARGOCD_OPERATOR_GROUP,
            ARGOCD_CSV,
        )
    }

    pub fn sealed_secrets_operator(prefix: Option<&str>) -> Self {
        Self::new(
            add_prefix_if_necessary(prefix, SEALED_SECRETS_NAMESPACE),
            SEALED_SECRETS_SUBSCRIPTION,
            SEALED_SECRETS_OPERATOR_GROUP,
            SEALED_SECRETS_CSV,
        )
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn subscription(&self) -> &str {
        &self.subscription
    }

    pub fn operator_group(&self) -> &str {
        &self.operator_group
    }

    pub fn csv(&self) -> &str {
        &self.csv
    }

    pub fn csv_key(&self) -> ResourceKey {
        ResourceKey::namespaced(&self.csv, &self.namespace)
    }

    pub fn generate_namespace(&self) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(self.namespace.to_owned()),
                labels: Some(get_dependency_labels()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn generate_operator_group(&self) -> OperatorGroup {
        OperatorGroup {
            metadata: self.generate_metadata(&self.operator_group),
            spec: OperatorGroupSpec {
                target_namespaces: vec![self.namespace.to_owned()],
            },
        }
    }

    pub fn generate_subscription(&self, catalog: &CatalogSource) -> Subscription {
        Subscription {
            metadata: self.generate_metadata(&self.subscription),
            spec: SubscriptionSpec {
                channel: Some(catalog.channel.to_owned()),
                name: self.subscription.to_owned(),
                source: catalog.source.to_owned(),
                source_namespace: catalog.source_namespace.to_owned(),
                ..Default::default()
            },
            status: None,
        }
    }

    fn generate_metadata(&self, name: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(self.namespace.to_owned()),
            labels: Some(get_dependency_labels()),
            ..Default::default()
        }
    }
}

/// Operators the gitops service depends on, in installation order.
pub fn gitops_operators(prefix: Option<&str>) -> Vec<OperatorResource> {
    vec![
        OperatorResource::sealed_secrets_operator(prefix),
        OperatorResource::argocd_operator(prefix),
    ]
}

pub fn add_prefix_if_necessary(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}-{name}"),
        _ => name.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use kube::ResourceExt;

    use super::{add_prefix_if_necessary, gitops_operators, CatalogSource, OperatorResource};

    #[test]
    fn prefix_is_applied_only_when_set() {
        assert_eq!(add_prefix_if_necessary(Some("dev"), "cicd"), "dev-cicd");
        assert_eq!(add_prefix_if_necessary(Some(""), "cicd"), "cicd");
        assert_eq!(add_prefix_if_necessary(None, "cicd"), "cicd");
    }

    #[test]
    fn gitops_operators_install_sealed_secrets_first() {
        let operators = gitops_operators(Some("dev"));

        assert_eq!(
            operators,
            vec![
                OperatorResource::new(
                    "dev-cicd",
                    "sealed-secrets-operator-helm",
                    "sealed-secrets-operator-group",
                    "sealed-secrets-operator-helm.v0.0.2"
                ),
                OperatorResource::new(
                    "dev-argocd",
                    "argocd-operator",
                    "argocd-operator-group",
                    "argocd-operator.v0.0.14"
                ),
            ]
        );
    }

    #[test]
    fn generated_resources_share_the_namespace() {
        let operator = OperatorResource::argocd_operator(None);
        let namespace = operator.generate_namespace();
        let group = operator.generate_operator_group();
        let subscription = operator.generate_subscription(&CatalogSource::default());

        assert_eq!(namespace.name_any(), "argocd");
        assert_eq!(namespace.namespace(), None);
        assert_eq!(group.name_any(), "argocd-operator-group");
        assert_eq!(group.namespace().as_deref(), Some("argocd"));
        assert_eq!(group.spec.target_namespaces, vec!["argocd".to_owned()]);
        assert_eq!(subscription.name_any(), "argocd-operator");
        assert_eq!(subscription.namespace().as_deref(), Some("argocd"));
        assert_eq!(subscription.spec.name, "argocd-operator");
        assert_eq!(subscription.spec.channel.as_deref(), Some("alpha"));
        assert_eq!(subscription.spec.source, "community-operators");
        assert_eq!(subscription.spec.source_namespace, "openshift-marketplace");
        assert_eq!(operator.csv_key().to_string(), "argocd/argocd-operator.v0.0.14");
    }
}
