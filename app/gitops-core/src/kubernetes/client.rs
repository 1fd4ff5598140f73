use std::{fmt::Debug, future::Future};

use k8s_openapi::{
    serde::{de::DeserializeOwned, Serialize},
    ClusterResourceScope, NamespaceResourceScope,
};
use kube::{
    api::{DeleteParams, PostParams},
    Api, Client, Resource,
};

use super::ResourceKey;

/// Resolves an [`Api`] for a kind based on its scope.
pub trait ApiScope {
    fn api<K>(client: Client, namespace: Option<&str>) -> Api<K>
    where
        K: Resource<DynamicType = (), Scope = Self>;
}

impl ApiScope for NamespaceResourceScope {
    fn api<K>(client: Client, namespace: Option<&str>) -> Api<K>
    where
        K: Resource<DynamicType = (), Scope = Self>,
    {
        match namespace {
            Some(namespace) => Api::namespaced(client, namespace),
            None => Api::default_namespaced(client),
        }
    }
}

impl ApiScope for ClusterResourceScope {
    fn api<K>(client: Client, _namespace: Option<&str>) -> Api<K>
    where
        K: Resource<DynamicType = (), Scope = Self>,
    {
        Api::all(client)
    }
}

pub trait ClusterResource:
    Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn scoped_api(client: Client, namespace: Option<&str>) -> Api<Self>;
}

impl<K> ClusterResource for K
where
    K: Resource<DynamicType = ()>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
    K::Scope: ApiScope,
{
    fn scoped_api(client: Client, namespace: Option<&str>) -> Api<Self> {
        <K::Scope as ApiScope>::api(client, namespace)
    }
}

/// The subset of the cluster API the operator relies on.
///
/// Errors are passed through untouched so callers can tell a missing object
/// (404) or a lost creation race (409) from any other failure.
pub trait ClusterClient: Send + Sync {
    fn get<K: ClusterResource>(
        &self,
        key: &ResourceKey,
    ) -> impl Future<Output = kube::Result<K>> + Send;

    fn create<K: ClusterResource>(
        &self,
        resource: &K,
    ) -> impl Future<Output = kube::Result<K>> + Send;

    fn delete<K: ClusterResource>(
        &self,
        key: &ResourceKey,
    ) -> impl Future<Output = kube::Result<()>> + Send;
}

impl<T: ClusterClient> ClusterClient for &T {
    fn get<K: ClusterResource>(
        &self,
        key: &ResourceKey,
    ) -> impl Future<Output = kube::Result<K>> + Send {
        (**self).get(key)
    }

    fn create<K: ClusterResource>(
        &self,
        resource: &K,
    ) -> impl Future<Output = kube::Result<K>> + Send {
        (**self).create(resource)
    }

    fn delete<K: ClusterResource>(
        &self,
        key: &ResourceKey,
    ) -> impl Future<Output = kube::Result<()>> + Send {
        (**self).delete::<K>(key)
    }
}

impl ClusterClient for Client {
    async fn get<K: ClusterResource>(&self, key: &ResourceKey) -> kube::Result<K> {
        K::scoped_api(self.clone(), key.namespace.as_deref())
            .get(&key.name)
            .await
    }

    async fn create<K: ClusterResource>(&self, resource: &K) -> kube::Result<K> {
        let api = K::scoped_api(self.clone(), resource.meta().namespace.as_deref());

        api.create(&PostParams::default(), resource).await
    }

    async fn delete<K: ClusterResource>(&self, key: &ResourceKey) -> kube::Result<()> {
        K::scoped_api(self.clone(), key.namespace.as_deref())
            .delete(&key.name, &DeleteParams::default())
            .await
            .map(|_| ())
    }
}
