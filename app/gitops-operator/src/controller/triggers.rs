use std::collections::HashMap;

use gitops_core::{
    kubernetes::ResourceKey,
    resources::crd::{argocd::ArgoCD, route::Route},
};
use kube::{runtime::watcher::Event, Resource, ResourceExt};

struct Observed {
    version: Option<String>,
    request: Option<ResourceKey>,
}

/// Turns watch events of a single object into reconcile requests.
///
/// Creations and deletions always pass. Updates pass only when the object's
/// resourceVersion differs from the last one seen, so status-only resyncs and
/// relists of unchanged objects don't trigger a reconciliation.
pub struct TriggerFilter<K> {
    target: ResourceKey,
    observed: HashMap<ResourceKey, Observed>,
    to_request: Box<dyn Fn(&K) -> Option<ResourceKey> + Send>,
}

impl<K: Resource> TriggerFilter<K> {
    pub fn new(
        target: ResourceKey,
        to_request: impl Fn(&K) -> Option<ResourceKey> + Send + 'static,
    ) -> Self {
        Self {
            target,
            observed: HashMap::new(),
            to_request: Box::new(to_request),
        }
    }

    pub fn target(&self) -> &ResourceKey {
        &self.target
    }

    pub fn handle(&mut self, event: Event<K>) -> Vec<ResourceKey> {
        let mut requests = Vec::new();

        match event {
            Event::Applied(resource) => {
                if let Some(request) = self.applied(&resource) {
                    requests.push(request);
                }
            }
            Event::Deleted(resource) => {
                if let Some(request) = self.deleted(&resource) {
                    requests.push(request);
                }
            }
            Event::Restarted(resources) => {
                let mut listed = Vec::with_capacity(resources.len());

                for resource in &resources {
                    if let Some(key) = self.key_of(resource) {
                        listed.push(key);
                    }
                    if let Some(request) = self.applied(resource) {
                        requests.push(request);
                    }
                }

                let vanished = self
                    .observed
                    .keys()
                    .filter(|key| !listed.contains(key))
                    .cloned()
                    .collect::<Vec<_>>();

                for key in vanished {
                    if let Some(request) = self.observed.remove(&key).and_then(|seen| seen.request) {
                        requests.push(request);
                    }
                }
            }
        }

        requests.dedup();
        requests
    }

    fn key_of(&self, resource: &K) -> Option<ResourceKey> {
        if !self.target.matches(resource) {
            return None;
        }

        Some(self.target.clone())
    }

    fn applied(&mut self, resource: &K) -> Option<ResourceKey> {
        let key = self.key_of(resource)?;
        let version = resource.meta().resource_version.clone();

        if let Some(seen) = self.observed.get(&key) {
            if version.is_some() && seen.version == version {
                return None;
            }
        }

        let request = (self.to_request)(resource);
        self.observed.insert(
            key,
            Observed {
                version,
                request: request.clone(),
            },
        );

        request
    }

    fn deleted(&mut self, resource: &K) -> Option<ResourceKey> {
        let key = self.key_of(resource)?;
        let previous = self.observed.remove(&key).and_then(|seen| seen.request);

        (self.to_request)(resource).or(previous)
    }
}

pub fn primary_request(instance: &ArgoCD) -> Option<ResourceKey> {
    ResourceKey::of(instance)
}

/// Maps a route to `primary` when that ArgoCD instance is the route's controller.
pub fn route_request(route: &Route, primary: &ResourceKey) -> Option<ResourceKey> {
    let namespace = route.namespace()?;
    let kind = ArgoCD::kind(&());
    let api_version = ArgoCD::api_version(&());

    route
        .owner_references()
        .iter()
        .find(|owner| {
            owner.controller == Some(true) && owner.kind == kind && owner.api_version == api_version
        })
        .map(|owner| ResourceKey::namespaced(&owner.name, namespace))
        .filter(|request| request == primary)
}
