//! Dataset endpoints

use crate::ActorClient;
use crate::error::Result;
use serde_json::Value;

impl ActorClient {
    /// Read all items of a run's result dataset, in order
    ///
    /// Items are returned untyped; interpreting them (including the
    /// "not found" marker record) is up to the caller.
    ///
    /// # Arguments
    /// * `dataset_id` - The dataset identifier returned by `start_run`
    pub async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>> {
        let url = format!("{}/v2/datasets/{}/items", self.base_url, dataset_id);
        let response = self
            .client
            .get(&url)
            .query(&[("token", &self.token)])
            .send()
            .await?;

        self.handle_response(response).await
    }
}
