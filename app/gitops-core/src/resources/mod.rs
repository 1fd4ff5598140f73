use std::borrow::Cow;

use thiserror::Error;

pub mod console_link;
pub mod crd;
pub mod labels;
pub mod operator;

#[derive(Debug, Error)]
pub enum ResourceGenerationError {
    #[error("Resource is missing required data ({})!", .0)]
    MissingData(Cow<'static, str>),
}
