pub mod binder;
pub mod color;
pub mod color_scale;
pub mod engine;
pub mod finance_index;
pub mod loader;
pub mod pipeline;
pub mod topology;

pub use crate::domain::model::{MapInputs, RenderResult, RenderedYear};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
