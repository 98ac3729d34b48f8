use common::storage::ImageStore;
use sea_orm::TransactionSession;
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::info;

use super::comuna::save_comunas;
use super::region::{insert_region, region_name_taken};
use crate::error::AppError;
use crate::models::import::{ImportSummary, RegionBatch};
use crate::models::upload::{ImageList, image_at};
use crate::utils::naming::title_case;

/// Bulk import of regions and their comunas.
///
/// Names that already exist are reported as repeated instead of failing the
/// import. Images are matched to entities purely by position:
/// `region_images[i]` belongs to the i-th region of the batch, and
/// `comuna_images[k]` to the k-th comuna name of the batch counted across all
/// regions, repeated ones included.
pub struct ImportService<'a, C> {
    conn: &'a C,
    images: &'a dyn ImageStore,
}

impl<'a, C> ImportService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C, images: &'a dyn ImageStore) -> Self {
        Self { conn, images }
    }

    /// Reconcile a batch against the store inside a single transaction.
    pub async fn reconcile(
        &self,
        batch: &[RegionBatch],
        region_images: &ImageList,
        comuna_images: &ImageList,
    ) -> Result<ImportSummary, AppError> {
        let txn = self.conn.begin().await?;

        let mut repeated_regions = Vec::new();
        let mut repeated_comunas = Vec::new();
        let mut cursor = 0;

        for (position, entry) in batch.iter().enumerate() {
            let region_name = title_case(entry.region.trim());

            if region_name_taken(&txn, &region_name, None).await? {
                // The comunas are not checked individually, but each one
                // still owns a slot in the comuna image list.
                repeated_regions.push(region_name);
                repeated_comunas.extend(entry.comunas.iter().map(|c| title_case(c.trim())));
                cursor += entry.comunas.len();
                continue;
            }

            let region = insert_region(
                &txn,
                self.images,
                None,
                &region_name,
                None,
                image_at(region_images, position),
            )
            .await?;

            cursor = save_comunas(
                &txn,
                self.images,
                region.id,
                &entry.comunas,
                comuna_images,
                cursor,
                &mut repeated_comunas,
            )
            .await?;
        }

        txn.commit().await?;

        let summary = ImportSummary {
            total_regions: batch.len(),
            total_comunas: cursor,
            repeated_regions,
            repeated_comunas,
        };
        info!(
            saved_regions = summary.saved_regions(),
            saved_comunas = summary.saved_comunas(),
            repeated_regions = summary.repeated_regions.len(),
            repeated_comunas = summary.repeated_comunas.len(),
            "Import reconciled"
        );
        Ok(summary)
    }
}
