use std::time::Duration;

use gitops_core::{
    kubernetes::{
        client::ClusterClient,
        operations::{is_already_exists, try_get_resource, try_remove_resource, RemoveOutcome},
        ResourceKey,
    },
    resources::crd::{argocd::ArgoCD, console::ConsoleLink, route::Route},
};
use log::{debug, info};

use super::{context::ReconcilerContext, error::ReconcilerError, Outcome};

const MISSING_HOST_REQUEUE_SECS: u64 = 30;

const DEFAULT_ERROR_REQUEUE_SECS: u64 = 10;
const PERMISSION_ERROR_REQUEUE_SECS: u64 = 60 * 5;

/// Keeps the console link in line with the ArgoCD instance and its server route.
///
/// The desired state is computed from scratch on every call: the link exists
/// only while both the configured instance and a route with a host exist. An
/// existing link is never updated. Requests for any other instance are ignored.
pub async fn reconcile_console_link<C: ClusterClient>(
    request: &ResourceKey,
    context: &ReconcilerContext<C>,
) -> Result<Outcome, ReconcilerError> {
    let primary_key = context.release.primary_key();

    if *request != primary_key {
        debug!("Ignoring request for '{request}', only '{primary_key}' is watched");

        return Ok(Outcome::Done);
    }

    let instance = try_get_resource::<ArgoCD, C>(&context.client, &primary_key)
        .await
        .map_err(ReconcilerError::InstanceRetrieval)?;

    if instance.is_none() {
        info!("ArgoCD instance '{primary_key}' not found!");
        remove_console_link(context).await?;

        return Ok(Outcome::Done);
    }

    let route_key = context.release.route_key();
    let route = try_get_resource::<Route, C>(&context.client, &route_key)
        .await
        .map_err(ReconcilerError::RouteRetrieval)?;

    let route = match route {
        Some(route) => route,
        None => {
            info!("ArgoCD server route '{route_key}' not found!");
            remove_console_link(context).await?;

            return Ok(Outcome::Done);
        }
    };

    let host = match route.host() {
        Some(host) => host,
        None => {
            info!("ArgoCD server route '{route_key}' has no host assigned yet!");
            remove_console_link(context).await?;

            return Ok(Outcome::RequeueAfter(Duration::from_secs(
                MISSING_HOST_REQUEUE_SECS,
            )));
        }
    };

    let link_key = context.release.link_key();
    let link = try_get_resource::<ConsoleLink, C>(&context.client, &link_key)
        .await
        .map_err(ReconcilerError::LinkRetrieval)?;

    if link.is_some() {
        info!("Console link '{link_key}' already exists, skipping...");

        return Ok(Outcome::Done);
    }

    info!("Creating console link '{link_key}' pointing at '{host}'...");

    match context
        .client
        .create(&context.release.generate_console_link(host))
        .await
    {
        Ok(_) => Ok(Outcome::Done),
        Err(error) if is_already_exists(&error) => Ok(Outcome::Done),
        Err(error) => Err(ReconcilerError::LinkCreation(error)),
    }
}

pub fn reconcile_console_link_error(error: &ReconcilerError) -> Duration {
    match error.kube_error() {
        kube::Error::Api(response) if response.code == 403 => {
            Duration::from_secs(PERMISSION_ERROR_REQUEUE_SECS)
        }
        _ => Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
    }
}

async fn remove_console_link<C: ClusterClient>(
    context: &ReconcilerContext<C>,
) -> Result<(), ReconcilerError> {
    let link_key = context.release.link_key();
    let outcome = try_remove_resource::<ConsoleLink, C>(&context.client, &link_key)
        .await
        .map_err(ReconcilerError::LinkRemoval)?;

    if outcome == RemoveOutcome::Removed {
        info!("Console link '{link_key}' removed!");
    }

    Ok(())
}
