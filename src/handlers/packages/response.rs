//! Package response DTOs

use serde::Serialize;
use uuid::Uuid;

use crate::{db::repositories::package_repo::LabelRow, models::EntriesPackage};

#[derive(Debug, Serialize)]
pub struct PackageResponse {
    #[serde(flatten)]
    pub package: EntriesPackage,
    pub entry_ids: Vec<Uuid>,
}

/// Labels to print and stick on the bottles
#[derive(Debug, Serialize)]
pub struct LabelsResponse {
    pub package_id: Uuid,
    pub labels: Vec<LabelRow>,
}
