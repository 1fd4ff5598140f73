use std::{collections::HashSet, time::Duration};

use futures::Stream;
use gitops_core::kubernetes::ResourceKey;
use log::debug;
use tokio::{
    sync::mpsc::{unbounded_channel, UnboundedSender},
    time::sleep,
};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Delayed retries of reconcile requests, at most one pending per request.
pub struct Requeue {
    sender: UnboundedSender<ResourceKey>,
    pending: HashSet<ResourceKey>,
}

impl Requeue {
    /// Returns the queue together with the stream the retries come out of.
    pub fn new() -> (Self, impl Stream<Item = ResourceKey>) {
        let (sender, receiver) = unbounded_channel();
        let requeue = Self {
            sender,
            pending: HashSet::new(),
        };

        (requeue, UnboundedReceiverStream::new(receiver))
    }

    /// Schedules a retry after `delay`, returns `false` when one is already pending.
    pub fn schedule(&mut self, request: ResourceKey, delay: Duration) -> bool {
        if !self.pending.insert(request.clone()) {
            debug!("Retry of '{request}' already scheduled");
            return false;
        }

        let sender = self.sender.clone();

        tokio::spawn(async move {
            sleep(delay).await;

            if sender.send(request).is_err() {
                debug!("Controller is gone, dropping requeue");
            }
        });

        true
    }

    /// Marks the retry of `request` as delivered.
    pub fn fired(&mut self, request: &ResourceKey) {
        self.pending.remove(request);
    }
}
