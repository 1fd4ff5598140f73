use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use log::{debug, info};
use thiserror::Error;

use super::{
    client::{ClusterClient, ClusterResource},
    ResourceKey,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Absent,
}

#[derive(Debug, Error)]
pub enum EnsureResourceError {
    #[error("Resource is missing a name!")]
    MissingName,
    #[error("Couldn't retrieve the resource! Reason: {}", .0)]
    Retrieval(kube::Error),
    #[error("Couldn't create the resource! Reason: {}", .0)]
    Creation(kube::Error),
}

pub async fn create_local_client(
    config_path: &Option<String>,
    context_name: &Option<String>,
) -> anyhow::Result<Client> {
    if config_path.is_none() && context_name.is_none() {
        return Ok(Client::try_default().await?);
    }

    let config_options = KubeConfigOptions {
        context: context_name.to_owned(),
        ..Default::default()
    };

    let config = match config_path {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)?;
            Config::from_custom_kubeconfig(kubeconfig, &config_options).await?
        }
        None => Config::from_kubeconfig(&config_options).await?,
    };

    Ok(Client::try_from(config)?)
}

pub fn is_not_found(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(response) if response.code == 404)
}

pub fn is_already_exists(error: &kube::Error) -> bool {
    matches!(
        error,
        kube::Error::Api(response) if response.code == 409 && response.reason == "AlreadyExists"
    )
}

pub async fn try_get_resource<K, C>(client: &C, key: &ResourceKey) -> kube::Result<Option<K>>
where
    K: ClusterResource,
    C: ClusterClient,
{
    match client.get::<K>(key).await {
        Ok(resource) => Ok(Some(resource)),
        Err(error) if is_not_found(&error) => Ok(None),
        Err(error) => Err(error),
    }
}

/// Creates the resource unless an object with the same name is already there.
///
/// Existing objects are never updated, losing a creation race counts as success.
pub async fn create_resource_if_absent<K, C>(
    client: &C,
    resource: &K,
) -> Result<CreateOutcome, EnsureResourceError>
where
    K: ClusterResource,
    C: ClusterClient,
{
    let key = ResourceKey::of(resource).ok_or(EnsureResourceError::MissingName)?;
    let kind = K::kind(&());

    let existing = try_get_resource::<K, C>(client, &key)
        .await
        .map_err(EnsureResourceError::Retrieval)?;

    if existing.is_some() {
        info!("'{key}' {kind} resource already exists, skipping...");
        return Ok(CreateOutcome::AlreadyPresent);
    }

    info!("Creating '{key}' {kind} resource on the cluster...");

    match client.create(resource).await {
        Ok(_) => Ok(CreateOutcome::Created),
        Err(error) if is_already_exists(&error) => {
            debug!("'{key}' {kind} resource was created concurrently!");
            Ok(CreateOutcome::AlreadyPresent)
        }
        Err(error) => Err(EnsureResourceError::Creation(error)),
    }
}

pub async fn try_remove_resource<K, C>(client: &C, key: &ResourceKey) -> kube::Result<RemoveOutcome>
where
    K: ClusterResource,
    C: ClusterClient,
{
    if try_get_resource::<K, C>(client, key).await?.is_none() {
        return Ok(RemoveOutcome::Absent);
    }

    info!("Removing '{key}' {} resource from the cluster...", K::kind(&()));

    match client.delete::<K>(key).await {
        Ok(()) => Ok(RemoveOutcome::Removed),
        Err(error) if is_not_found(&error) => Ok(RemoveOutcome::Absent),
        Err(error) => Err(error),
    }
}
