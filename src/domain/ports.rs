use crate::core::color_scale::Palette;
use crate::domain::model::{MapInputs, RenderResult, Year};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn geo_source(&self) -> &str;
    fn finance_source(&self) -> &str;
    fn year(&self) -> Year;
    fn all_years(&self) -> bool;
    fn region_key(&self) -> &str;
    fn object_name(&self) -> &str;
    fn palette(&self) -> Result<Palette>;
    fn output_path(&self) -> &str;
    fn archive_name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<MapInputs>;
    async fn transform(&self, inputs: MapInputs) -> Result<RenderResult>;
    async fn load(&self, result: RenderResult) -> Result<String>;
}
