//! Listing custom resources through the cluster API.

use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::Client;

/// Lists every object of one resource type across all namespaces.
#[async_trait]
pub trait ResourceLister: Send + Sync {
    async fn list(&self, resource: &ApiResource) -> Result<Vec<DynamicObject>, kube::Error>;
}

/// [`ResourceLister`] backed by a live `kube::Client`.
#[derive(Clone)]
pub struct KubeLister {
    client: Client,
}

impl KubeLister {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the in-cluster service account, falling back to
    /// the local kubeconfig.
    pub async fn try_default() -> Result<Self, kube::Error> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ResourceLister for KubeLister {
    async fn list(&self, resource: &ApiResource) -> Result<Vec<DynamicObject>, kube::Error> {
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), resource);
        let list = api.list(&ListParams::default()).await?;

        tracing::trace!(
            resource = %resource.plural,
            count = list.items.len(),
            "Listed custom resources"
        );
        Ok(list.items)
    }
}
