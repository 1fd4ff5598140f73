use data_encoding::BASE64;
use derive_builder::Builder;
use kube::core::ObjectMeta;

use crate::kubernetes::ResourceKey;

use super::{
    crd::console::{ApplicationMenuSpec, ConsoleLink, ConsoleLinkLocation, ConsoleLinkSpec, Link},
    labels::get_console_link_labels,
    operator::ARGOCD_NAMESPACE,
    ResourceGenerationError,
};

pub const ARGOCD_INSTANCE_NAME: &str = "argocd";
pub const ARGOCD_ROUTE_NAME: &str = "argocd-server";
pub const CONSOLE_LINK_NAME: &str = "argocd";
pub const CONSOLE_LINK_TEXT: &str = "ArgoCD";
pub const CONSOLE_LINK_SECTION: &str = "Application Stages";

static ARGOCD_ICON: &[u8] = include_bytes!("../../assets/argocd.png");

/// Everything needed to derive the console link from the Argo CD server route.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ConsoleLinkRelease {
    /// namespace of both the Argo CD instance and its server route
    #[builder(default = "ARGOCD_NAMESPACE.to_owned()")]
    pub namespace: String,
    #[builder(default = "ARGOCD_INSTANCE_NAME.to_owned()")]
    pub instance_name: String,
    #[builder(default = "ARGOCD_ROUTE_NAME.to_owned()")]
    pub route_name: String,
    #[builder(default = "CONSOLE_LINK_NAME.to_owned()")]
    pub link_name: String,
    #[builder(default = "CONSOLE_LINK_TEXT.to_owned()")]
    pub text: String,
    #[builder(default = "CONSOLE_LINK_SECTION.to_owned()")]
    pub section: String,
    #[builder(default = "image_data_url(ARGOCD_ICON)")]
    pub image_url: String,
}

impl ConsoleLinkRelease {
    pub fn validated(self) -> Result<Self, ResourceGenerationError> {
        let required = [
            ("namespace", &self.namespace),
            ("instance name", &self.instance_name),
            ("route name", &self.route_name),
            ("link name", &self.link_name),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ResourceGenerationError::MissingData(field.into()));
            }
        }

        Ok(self)
    }

    pub fn primary_key(&self) -> ResourceKey {
        ResourceKey::namespaced(&self.instance_name, &self.namespace)
    }

    pub fn route_key(&self) -> ResourceKey {
        ResourceKey::namespaced(&self.route_name, &self.namespace)
    }

    pub fn link_key(&self) -> ResourceKey {
        ResourceKey::cluster(&self.link_name)
    }

    pub fn generate_console_link(&self, host: &str) -> ConsoleLink {
        ConsoleLink {
            metadata: ObjectMeta {
                name: Some(self.link_name.to_owned()),
                labels: Some(get_console_link_labels()),
                ..Default::default()
            },
            spec: ConsoleLinkSpec {
                link: Link {
                    text: self.text.to_owned(),
                    href: format!("https://{host}"),
                },
                location: ConsoleLinkLocation::ApplicationMenu,
                application_menu: Some(ApplicationMenuSpec {
                    section: self.section.to_owned(),
                    image_url: Some(self.image_url.to_owned()),
                }),
            },
        }
    }
}

pub fn image_data_url(data: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(data))
}
