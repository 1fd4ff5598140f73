pub mod kubernetes;
pub mod resources;

pub const OPERATOR_NAME: &str = "gitops-operator";
