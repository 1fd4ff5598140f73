use std::fmt::Display;

use kube::Resource;

pub mod client;
pub mod operations;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Name (and namespace, for namespaced kinds) identifying a single cluster object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub name: String,
    pub namespace: Option<String>,
}

impl ResourceKey {
    pub fn namespaced(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    /// Returns `None` when the object has no name yet.
    pub fn of<K: Resource>(resource: &K) -> Option<Self> {
        let meta = resource.meta();

        Some(Self {
            name: meta.name.to_owned()?,
            namespace: meta.namespace.to_owned(),
        })
    }

    pub fn matches<K: Resource>(&self, resource: &K) -> bool {
        let meta = resource.meta();

        meta.name.as_deref() == Some(self.name.as_str())
            && meta.namespace.as_deref() == self.namespace.as_deref()
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{namespace}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
    use kube::core::ObjectMeta;

    use super::ResourceKey;

    #[test]
    fn resource_key_displays_namespace_only_when_present() {
        assert_eq!(
            ResourceKey::namespaced("argocd-server", "argocd").to_string(),
            "argocd/argocd-server"
        );
        assert_eq!(ResourceKey::cluster("cicd").to_string(), "cicd");
    }

    #[test]
    fn resource_key_is_read_from_metadata() {
        let configmap = ConfigMap {
            metadata: ObjectMeta {
                name: Some("settings".to_owned()),
                namespace: Some("argocd".to_owned()),
                ..Default::default()
            },
            ..Default::default()
        };

        let key = ResourceKey::of(&configmap).unwrap();

        assert_eq!(key, ResourceKey::namespaced("settings", "argocd"));
        assert!(key.matches(&configmap));
        assert!(!ResourceKey::namespaced("settings", "cicd").matches(&configmap));
        assert!(ResourceKey::of(&Namespace::default()).is_none());
    }
}
