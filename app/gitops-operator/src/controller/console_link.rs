use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use futures::{stream, Stream, StreamExt};
use gitops_core::{
    kubernetes::{client::ClusterResource, ResourceKey},
    resources::{
        console_link::ConsoleLinkRelease,
        crd::{argocd::ArgoCD, route::Route},
    },
};
use kube::{
    runtime::{watcher, WatchStreamExt},
    Client,
};
use log::{info, warn};
use tokio::pin;

use crate::helpers::handle_reconciliation_result;

use super::{
    reconciler::{
        console_link::{reconcile_console_link, reconcile_console_link_error},
        context::ReconcilerContext,
    },
    requeue::Requeue,
    triggers::{primary_request, route_request, TriggerFilter},
};

const WATCH_BACKOFF_INITIAL_MILLIS: u64 = 800;
const WATCH_BACKOFF_MAX_SECS: u64 = 30;

enum Trigger {
    Event(ResourceKey),
    Retry(ResourceKey),
}

/// Watches the ArgoCD instance and its server route and keeps the console link
/// in sync until a shutdown signal arrives.
///
/// Requests are reconciled one at a time, in arrival order.
pub async fn start_console_link_controller(client: Client, release: ConsoleLinkRelease) {
    info!("Creating console link controller...");

    let primary = release.primary_key();
    let instances = watch_requests::<ArgoCD>(
        &client,
        TriggerFilter::new(release.primary_key(), primary_request),
    );
    let routes = watch_requests::<Route>(
        &client,
        TriggerFilter::new(release.route_key(), move |route: &Route| {
            route_request(route, &primary)
        }),
    );

    let (mut requeue, retries) = Requeue::new();

    let events = stream::select(instances, routes).map(Trigger::Event);
    let triggers = stream::select(events, retries.map(Trigger::Retry))
        .take_until(tokio::signal::ctrl_c());
    pin!(triggers);

    let context = ReconcilerContext { client, release };

    info!("Console link controller created!");

    while let Some(trigger) = triggers.next().await {
        let request = match trigger {
            Trigger::Event(request) => request,
            Trigger::Retry(request) => {
                requeue.fired(&request);
                request
            }
        };

        let result = reconcile_console_link(&request, &context).await;

        if let Some(delay) =
            handle_reconciliation_result(&request, result, reconcile_console_link_error)
        {
            requeue.schedule(request, delay);
        }
    }

    info!("Console link controller stopped!");
}

fn watch_requests<K: ClusterResource>(
    client: &Client,
    mut filter: TriggerFilter<K>,
) -> impl Stream<Item = ResourceKey> {
    let target = filter.target().clone();
    let api = K::scoped_api(client.clone(), target.namespace.as_deref());
    let config = watcher::Config::default().fields(&format!("metadata.name={}", target.name));
    let kind = K::kind(&()).to_string();

    watcher(api, config)
        .backoff(watch_backoff())
        .map(move |event| match event {
            Ok(event) => filter.handle(event),
            Err(error) => {
                warn!("{kind} watcher for '{target}' failed! {error}");
                Vec::new()
            }
        })
        .flat_map(stream::iter)
}

/// Retries failed watches forever, the delay resets once the watch recovers.
fn watch_backoff() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(WATCH_BACKOFF_INITIAL_MILLIS))
        .with_max_interval(Duration::from_secs(WATCH_BACKOFF_MAX_SECS))
        .with_max_elapsed_time(None)
        .build()
}
