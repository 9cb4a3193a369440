//! Batch request models

use serde::{Deserialize, Serialize};
use validator::Validate;

use failwatch_core::BatchItem;
use super::prediction::MachineFeatures;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BatchItemRequest {
    #[validate(length(min = 1, max = 128))]
    pub id: String,

    #[validate(nested)]
    pub features: MachineFeatures,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BatchRequest {
    #[validate(length(min = 1), nested)]
    pub items: Vec<BatchItemRequest>,
}

impl BatchRequest {
    pub fn into_items(self) -> Vec<BatchItem> {
        self.items
            .into_iter()
            .map(|item| BatchItem::new(item.id, item.features.to_feature_vector()))
            .collect()
    }
}
