use clap::{Args, Parser};
use gitops_core::resources::{
    console_link::{
        ConsoleLinkRelease, ConsoleLinkReleaseBuilder, ARGOCD_INSTANCE_NAME, ARGOCD_ROUTE_NAME,
    },
    operator::{
        CatalogSource, ARGOCD_NAMESPACE, DEFAULT_CATALOG_CHANNEL, DEFAULT_CATALOG_SOURCE,
        DEFAULT_CATALOG_SOURCE_NAMESPACE,
    },
    ResourceGenerationError,
};

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct OperatorConfig {
    #[command(flatten)]
    pub dependencies: DependencyArgs,
    #[command(flatten)]
    pub console_link: ConsoleLinkArgs,
    #[command(flatten)]
    pub global_args: GlobalArgs,
}

#[derive(Debug, Args)]
pub struct DependencyArgs {
    /// prefix prepended to the namespaces and names of the installed operators
    #[arg(long, env = "GITOPS_NAMESPACE_PREFIX")]
    pub namespace_prefix: Option<String>,
    /// don't install the operator dependencies on startup
    #[arg(long, env = "GITOPS_SKIP_DEPENDENCIES")]
    pub skip_dependencies: bool,
    /// catalog channel the operator subscriptions follow
    #[arg(long, default_value = DEFAULT_CATALOG_CHANNEL)]
    pub catalog_channel: String,
    /// catalog source providing the operators
    #[arg(long, default_value = DEFAULT_CATALOG_SOURCE)]
    pub catalog_source: String,
    /// namespace of the catalog source
    #[arg(long, default_value = DEFAULT_CATALOG_SOURCE_NAMESPACE)]
    pub catalog_source_namespace: String,
}

impl DependencyArgs {
    pub fn namespace_prefix(&self) -> Option<&str> {
        self.namespace_prefix.as_deref()
    }

    pub fn to_catalog_source(&self) -> CatalogSource {
        CatalogSource {
            channel: self.catalog_channel.to_owned(),
            source: self.catalog_source.to_owned(),
            source_namespace: self.catalog_source_namespace.to_owned(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ConsoleLinkArgs {
    /// namespace of the watched ArgoCD instance
    #[arg(long, default_value = ARGOCD_NAMESPACE)]
    pub argocd_namespace: String,
    /// name of the watched ArgoCD instance
    #[arg(long, default_value = ARGOCD_INSTANCE_NAME)]
    pub argocd_name: String,
    /// name of the route exposing the ArgoCD server
    #[arg(long, default_value = ARGOCD_ROUTE_NAME)]
    pub argocd_route: String,
}

impl ConsoleLinkArgs {
    pub fn to_release(&self) -> Result<ConsoleLinkRelease, ResourceGenerationError> {
        ConsoleLinkReleaseBuilder::default()
            .namespace(&self.argocd_namespace)
            .instance_name(&self.argocd_name)
            .route_name(&self.argocd_route)
            .build()
            .map_err(|error| ResourceGenerationError::MissingData(error.to_string().into()))?
            .validated()
    }
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// override default kubeconfig
    #[arg(long)]
    pub kube_config: Option<String>,
    /// override default kubeconfig context
    #[arg(long)]
    pub kube_context: Option<String>,
    /// enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose_logging: bool,
    /// enable trace output (more detailed than verbose, overrides it if present)
    #[arg(long = "trace")]
    pub trace_logging: bool,
}

impl GlobalArgs {
    pub fn get_log_level(&self) -> LogLevel {
        if self.trace_logging {
            return LogLevel::Trace;
        }

        if self.verbose_logging {
            return LogLevel::Verbose;
        }

        LogLevel::Normal
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum LogLevel {
    Normal,
    Verbose,
    Trace,
}
