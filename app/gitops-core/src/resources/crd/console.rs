use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "console.openshift.io",
    version = "v1",
    kind = "ConsoleLink"
)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleLinkSpec {
    #[serde(flatten)]
    pub link: Link,
    pub location: ConsoleLinkLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_menu: Option<ApplicationMenuSpec>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct Link {
    /// label displayed by the console
    pub text: String,
    /// absolute URL the link points to
    pub href: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConsoleLinkLocation {
    ApplicationMenu,
    HelpMenu,
    UserMenu,
    NamespaceDashboard,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct ApplicationMenuSpec {
    /// menu section the link is grouped under
    pub section: String,
    /// icon, usually an inline data URL
    #[serde(
        default,
        rename = "imageURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
}
