use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Url};
use tracing::{debug, warn};

use super::adapter::normalize;
use super::decode::decode_list;
use super::error::CatalogError;
use super::traits::{CatalogItem, CatalogLevel, VehicleCatalog};
use crate::config::CatalogConfig;

pub struct HttpCatalog {
    client: Client,
    base_url: String,
    brands_path: String,
    models_path: String,
    engines_path: String,
    headers: Arc<RwLock<HashMap<String, String>>>,
}

impl HttpCatalog {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            brands_path: config.brands_path.clone(),
            models_path: config.models_path.clone(),
            engines_path: config.engines_path.clone(),
            headers: Arc::new(RwLock::new(config.headers.clone())),
        }
    }

    /// Replace request headers (e.g. after token refresh). Empty maps are ignored.
    pub fn update_auth(&self, new_headers: HashMap<String, String>) {
        if !new_headers.is_empty() {
            *self.headers.write() = new_headers;
        }
    }

    fn endpoint(&self, template: &str, parent: Option<(&'static str, &str)>) -> Result<Url> {
        let path = match parent {
            Some((what, id)) => {
                let id = id.trim();
                if id.is_empty() {
                    return Err(CatalogError::EmptyId(what).into());
                }
                if id.contains(['/', '?', '#', '%']) || id.contains(char::is_whitespace) {
                    return Err(CatalogError::InvalidId(id.to_string()).into());
                }
                template.replace("{id}", id)
            }
            None => template.to_string(),
        };
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    fn build_request(&self, url: Url) -> RequestBuilder {
        let headers = self.headers.read().clone();
        let mut req = self.client.get(url).header("Accept", "application/json");
        for (k, v) in &headers {
            req = req.header(k.as_str(), v.as_str());
        }
        req
    }

    async fn fetch_list(&self, level: CatalogLevel, url: Url) -> Result<Vec<CatalogItem>> {
        let resp = self.build_request(url.clone()).send().await?;

        let status = resp.status().as_u16();
        if status == 401 || status == 403 {
            warn!("catalog auth rejected status={} url={}", status, url);
            return Err(CatalogError::AuthRejected(status).into());
        }
        if !resp.status().is_success() {
            warn!("catalog request failed status={} url={}", status, url);
            return Err(CatalogError::Status(status).into());
        }

        let body: Bytes = resp.bytes().await?;
        let raw = decode_list(&body)?;
        let items = normalize(level, &raw);
        debug!(
            "catalog {} list loaded url={} count={}",
            level.as_str(),
            url,
            items.len()
        );
        Ok(items)
    }
}

#[async_trait]
impl VehicleCatalog for HttpCatalog {
    async fn list_brands(&self) -> Result<Vec<CatalogItem>> {
        let url = self.endpoint(&self.brands_path, None)?;
        self.fetch_list(CatalogLevel::Brand, url).await
    }

    async fn list_models(&self, brand_id: &str) -> Result<Vec<CatalogItem>> {
        let url = self.endpoint(&self.models_path, Some(("model", brand_id)))?;
        self.fetch_list(CatalogLevel::Model, url).await
    }

    async fn list_engines(&self, model_id: &str) -> Result<Vec<CatalogItem>> {
        let url = self.endpoint(&self.engines_path, Some(("engine", model_id)))?;
        self.fetch_list(CatalogLevel::Engine, url).await
    }
}
