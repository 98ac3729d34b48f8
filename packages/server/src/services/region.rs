use std::collections::HashMap;

use common::storage::{EntityKind, ImageExtension, ImageStore};
use sea_orm::TransactionSession;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};

use super::DeleteError;
use super::comuna::save_comunas;
use super::image::{ImageFile, default_image, open_entity_image, remove_entity_image, store_upload};
use crate::entity::{comuna, region};
use crate::error::AppError;
use crate::models::import::ImportSummary;
use crate::models::region::{REGION_NOT_FOUND, REGION_REGISTERED, RegionFields};
use crate::models::upload::{ImageList, UploadedFile};
use crate::utils::naming::normalize_name;

/// Region CRUD on top of a connection and the image store.
///
/// Every mutating operation runs in its own transaction and commits once.
pub struct RegionService<'a, C> {
    conn: &'a C,
    images: &'a dyn ImageStore,
}

impl<'a, C> RegionService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C, images: &'a dyn ImageStore) -> Self {
        Self { conn, images }
    }

    pub async fn get(&self, id: i32) -> Result<region::Model, AppError> {
        find_region(self.conn, id).await
    }

    /// A region, one page of its comunas, and its total comuna count.
    pub async fn get_with_comunas(
        &self,
        id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<(region::Model, Vec<comuna::Model>, u64), AppError> {
        let region = find_region(self.conn, id).await?;

        let select = comuna::Entity::find().filter(comuna::Column::RegionId.eq(id));
        let total = select.clone().count(self.conn).await?;
        let comunas = select
            .order_by_asc(comuna::Column::Id)
            .offset(Some(offset))
            .limit(Some(limit))
            .all(self.conn)
            .await?;

        Ok((region, comunas, total))
    }

    /// One page of regions, each with the names of all its comunas, plus the
    /// total region count.
    pub async fn list_with_comunas(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<(region::Model, Vec<String>)>, u64), AppError> {
        let total = region::Entity::find().count(self.conn).await?;
        let regions = region::Entity::find()
            .order_by_asc(region::Column::Id)
            .offset(Some(offset))
            .limit(Some(limit))
            .all(self.conn)
            .await?;

        if regions.is_empty() {
            return Ok((Vec::new(), total));
        }

        let ids: Vec<i32> = regions.iter().map(|r| r.id).collect();
        let rows: Vec<(i32, String)> = comuna::Entity::find()
            .filter(comuna::Column::RegionId.is_in(ids))
            .order_by_asc(comuna::Column::Id)
            .select_only()
            .column(comuna::Column::RegionId)
            .column(comuna::Column::Name)
            .into_tuple::<(i32, String)>()
            .all(self.conn)
            .await?;

        let mut names: HashMap<i32, Vec<String>> = HashMap::new();
        for (region_id, name) in rows {
            names.entry(region_id).or_default().push(name);
        }

        let page = regions
            .into_iter()
            .map(|r| {
                let comunas = names.remove(&r.id).unwrap_or_default();
                (r, comunas)
            })
            .collect();

        Ok((page, total))
    }

    /// The region's image, or the default image.
    ///
    /// A record that claims an image whose file is gone gets its extension
    /// cleared before the default image is returned.
    pub async fn image(&self, id: i32) -> Result<ImageFile, AppError> {
        if let Some(region) = region::Entity::find_by_id(id).one(self.conn).await? {
            let stored = region.image_extension.clone();
            if let Some(file) =
                open_entity_image(self.images, EntityKind::Region, id, stored.as_deref()).await?
            {
                return Ok(file);
            }
            if stored.is_some() {
                let mut active: region::ActiveModel = region.into();
                active.image_extension = Set(None);
                active.update(self.conn).await?;
            }
        }
        Ok(default_image(self.images).await?)
    }

    pub async fn create(
        &self,
        fields: RegionFields,
        image: Option<&UploadedFile>,
    ) -> Result<region::Model, AppError> {
        let name = fields
            .name
            .as_deref()
            .ok_or_else(|| AppError::Validation("Missing 'nombre' field".into()))?;
        let name = normalize_name(name, "región")?;

        let txn = self.conn.begin().await?;

        if region_name_taken(&txn, &name, None).await? {
            return Err(AppError::AlreadyRegistered(REGION_REGISTERED.into()));
        }
        if let Some(id) = fields.id
            && region::Entity::find_by_id(id).one(&txn).await?.is_some()
        {
            return Err(AppError::AlreadyRegistered(REGION_REGISTERED.into()));
        }

        let model = insert_region(&txn, self.images, fields.id, &name, fields.active, image).await?;
        txn.commit().await?;

        info!(id = model.id, name = %model.name, "Region created");
        Ok(model)
    }

    /// Partial update: only the fields present are assigned.
    pub async fn update(
        &self,
        id: i32,
        fields: RegionFields,
        image: Option<&UploadedFile>,
    ) -> Result<region::Model, AppError> {
        let name = fields
            .name
            .as_deref()
            .map(|n| normalize_name(n, "región"))
            .transpose()?;

        let txn = self.conn.begin().await?;
        let existing = find_region(&txn, id).await?;

        if let Some(ref name) = name
            && region_name_taken(&txn, name, Some(id)).await?
        {
            return Err(AppError::AlreadyRegistered(REGION_REGISTERED.into()));
        }

        let mut active: region::ActiveModel = existing.clone().into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(flag) = fields.active {
            active.active = Set(flag);
        }
        let mut model = if active.is_changed() {
            active.update(&txn).await?
        } else {
            existing
        };

        if let Some(new_id) = fields.id
            && new_id != model.id
        {
            model = rekey_region(&txn, self.images, model, new_id).await?;
        }

        let model = attach_region_image(&txn, self.images, model, image).await?;
        txn.commit().await?;
        Ok(model)
    }

    /// Delete a region and, once the deletion is committed, its image file.
    pub async fn remove(&self, id: i32) -> Result<(), DeleteError> {
        let txn = self.conn.begin().await?;
        let region = region::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DeleteError::NotFound)?;

        region::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        remove_entity_image(
            self.images,
            EntityKind::Region,
            id,
            region.image_extension.as_deref(),
        )
        .await;
        Ok(())
    }

    /// Delete every comuna and region, then every stored image.
    pub async fn remove_all(&self) -> Result<(), DeleteError> {
        let txn = self.conn.begin().await?;
        let comunas = comuna::Entity::delete_many().exec(&txn).await?;
        let regions = region::Entity::delete_many().exec(&txn).await?;
        txn.commit().await?;

        let mut files = 0;
        for kind in EntityKind::ALL {
            match self.images.clear(kind).await {
                Ok(removed) => files += removed,
                Err(e) => warn!(%kind, error = %e, "Failed to clear images"),
            }
        }

        info!(
            regions = regions.rows_affected,
            comunas = comunas.rows_affected,
            files,
            "Catalog wiped"
        );
        Ok(())
    }

    /// Create the given comunas under an existing region.
    ///
    /// `images` is aligned by position with `names`; repeated names still
    /// consume their image slot.
    pub async fn save_comunas(
        &self,
        region_id: i32,
        names: &[String],
        images: &ImageList,
    ) -> Result<ImportSummary, AppError> {
        let txn = self.conn.begin().await?;
        find_region(&txn, region_id).await?;

        let mut repeated = Vec::new();
        let total = save_comunas(&txn, self.images, region_id, names, images, 0, &mut repeated).await?;
        txn.commit().await?;

        Ok(ImportSummary {
            total_comunas: total,
            repeated_comunas: repeated,
            ..Default::default()
        })
    }
}

pub(crate) async fn find_region<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<region::Model, AppError> {
    region::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(REGION_NOT_FOUND.into()))
}

/// Whether a (title-cased) region name is already stored, optionally
/// ignoring one region id.
pub(crate) async fn region_name_taken<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    except: Option<i32>,
) -> Result<bool, AppError> {
    let mut select = region::Entity::find().filter(region::Column::Name.eq(name));
    if let Some(id) = except {
        select = select.filter(region::Column::Id.ne(id));
    }
    Ok(select.count(conn).await? > 0)
}

/// Insert a region with an already normalized name and attach its image.
pub(crate) async fn insert_region<C: ConnectionTrait>(
    conn: &C,
    images: &dyn ImageStore,
    id: Option<i32>,
    name: &str,
    active: Option<i16>,
    image: Option<&UploadedFile>,
) -> Result<region::Model, AppError> {
    let mut new_region = region::ActiveModel {
        name: Set(name.to_string()),
        active: Set(active.unwrap_or(1)),
        image_extension: Set(None),
        ..Default::default()
    };
    if let Some(id) = id {
        new_region.id = Set(id);
    }

    let model = new_region.insert(conn).await?;
    attach_region_image(conn, images, model, image).await
}

async fn attach_region_image<C: ConnectionTrait>(
    conn: &C,
    images: &dyn ImageStore,
    model: region::Model,
    upload: Option<&UploadedFile>,
) -> Result<region::Model, AppError> {
    let Some(ext) = store_upload(images, EntityKind::Region, model.id, upload).await? else {
        return Ok(model);
    };

    let previous = model.image_extension.clone();
    let mut active: region::ActiveModel = model.into();
    active.image_extension = Set(Some(ext.to_string()));
    let model = active.update(conn).await?;

    if let Some(prev) = previous.as_deref().and_then(ImageExtension::parse)
        && prev != ext
    {
        images.delete(EntityKind::Region, model.id, prev).await?;
    }
    Ok(model)
}

/// Move a region to a new primary key, carrying its image file along.
async fn rekey_region<C: ConnectionTrait>(
    conn: &C,
    images: &dyn ImageStore,
    model: region::Model,
    new_id: i32,
) -> Result<region::Model, AppError> {
    if region::Entity::find_by_id(new_id).one(conn).await?.is_some() {
        return Err(AppError::AlreadyRegistered(REGION_REGISTERED.into()));
    }

    region::Entity::update_many()
        .col_expr(region::Column::Id, Expr::value(new_id))
        .filter(region::Column::Id.eq(model.id))
        .exec(conn)
        .await?;

    if let Some(ext) = model.image_extension.as_deref().and_then(ImageExtension::parse) {
        images
            .relocate(EntityKind::Region, model.id, new_id, ext)
            .await?;
    }

    find_region(conn, new_id).await
}
