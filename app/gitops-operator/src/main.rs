use std::process::exit;

use clap::Parser;
use config::{GlobalArgs, LogLevel, OperatorConfig};
use dependency::Dependencies;
use env_logger::Target;
use gitops_core::{
    kubernetes::operations::create_local_client,
    resources::{console_link::ConsoleLinkRelease, operator::gitops_operators},
};
use kube::Client;
use log::{error, info, LevelFilter};

mod config;
mod controller;
mod dependency;
mod helpers;

#[tokio::main()]
async fn main() {
    let config = OperatorConfig::parse();

    configure_logger(&config.global_args);

    let client = create_client(&config.global_args).await;

    if config.dependencies.skip_dependencies {
        info!("Skipping operator dependencies installation...");
    } else {
        install_dependencies(&client, &config).await;
    }

    let release = get_release(&config);

    controller::main_controller(client, release).await;
}

async fn create_client(global_args: &GlobalArgs) -> Client {
    match create_local_client(&global_args.kube_config, &global_args.kube_context).await {
        Ok(client) => client,
        Err(error) => {
            error!("Couldn't create client! {error:?}");
            exit(6)
        }
    }
}

async fn install_dependencies(client: &Client, config: &OperatorConfig) {
    let operators = gitops_operators(config.dependencies.namespace_prefix());
    let dependencies = Dependencies::new(client, config.dependencies.to_catalog_source());

    match dependencies.install(&operators).await {
        Ok(()) => info!("Operator dependencies installed!"),
        Err(error) => {
            error!("Couldn't install operator dependencies! {error}");
            exit(5)
        }
    }
}

fn get_release(config: &OperatorConfig) -> ConsoleLinkRelease {
    match config.console_link.to_release() {
        Ok(release) => release,
        Err(error) => {
            error!("Couldn't retrieve release info! {error}");
            exit(7)
        }
    }
}

fn configure_logger(global_args: &GlobalArgs) {
    let log_level = global_args.get_log_level();
    let mut logger = env_logger::builder();

    logger
        .default_format()
        .format_module_path(matches!(log_level, LogLevel::Trace))
        .target(Target::Stderr);

    match log_level {
        LogLevel::Normal => logger.filter(None, LevelFilter::Info),
        LogLevel::Verbose => logger.filter(None, LevelFilter::Debug),
        LogLevel::Trace => logger.filter(None, LevelFilter::Trace),
    };

    logger.init();
}
