use gitops_core::resources::console_link::ConsoleLinkRelease;
use kube::Client;

use self::console_link::start_console_link_controller;

pub mod console_link;
pub mod reconciler;
pub mod requeue;
pub mod triggers;

pub async fn main_controller(client: Client, release: ConsoleLinkRelease) {
    start_console_link_controller(client, release).await
}
