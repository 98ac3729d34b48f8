use common::storage::{EntityKind, ImageExtension, ImageStore};
use sea_orm::TransactionSession;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;

use super::DeleteError;
use super::image::{ImageFile, default_image, open_entity_image, remove_entity_image, store_upload};
use super::region::find_region;
use crate::entity::comuna;
use crate::error::AppError;
use crate::models::comuna::{COMUNA_NOT_FOUND, COMUNA_REGISTERED, ComunaFields};
use crate::models::upload::{ImageList, UploadedFile, image_at};
use crate::utils::naming::{normalize_name, title_case};

/// Comuna CRUD on top of a connection and the image store.
pub struct ComunaService<'a, C> {
    conn: &'a C,
    images: &'a dyn ImageStore,
}

impl<'a, C> ComunaService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C, images: &'a dyn ImageStore) -> Self {
        Self { conn, images }
    }

    /// A comuna together with the name of its region.
    pub async fn get(&self, id: i32) -> Result<(comuna::Model, String), AppError> {
        let comuna = find_comuna(self.conn, id).await?;
        let region = find_region(self.conn, comuna.region_id).await?;
        Ok((comuna, region.name))
    }

    /// The comuna's image, or the default image. Stale references are cleared.
    pub async fn image(&self, id: i32) -> Result<ImageFile, AppError> {
        if let Some(comuna) = comuna::Entity::find_by_id(id).one(self.conn).await? {
            let stored = comuna.image_extension.clone();
            if let Some(file) =
                open_entity_image(self.images, EntityKind::Comuna, id, stored.as_deref()).await?
            {
                return Ok(file);
            }
            if stored.is_some() {
                let mut active: comuna::ActiveModel = comuna.into();
                active.image_extension = Set(None);
                active.update(self.conn).await?;
            }
        }
        Ok(default_image(self.images).await?)
    }

    pub async fn create(
        &self,
        fields: ComunaFields,
        image: Option<&UploadedFile>,
    ) -> Result<comuna::Model, AppError> {
        let name = fields
            .name
            .as_deref()
            .ok_or_else(|| AppError::Validation("Missing 'nombre' field".into()))?;
        let name = normalize_name(name, "comuna")?;
        let region_id = fields
            .region_id
            .ok_or_else(|| AppError::Validation("Missing 'idregion' field".into()))?;

        let txn = self.conn.begin().await?;

        if comuna_name_taken(&txn, &name, None).await? {
            return Err(AppError::AlreadyRegistered(COMUNA_REGISTERED.into()));
        }
        if let Some(id) = fields.id
            && comuna::Entity::find_by_id(id).one(&txn).await?.is_some()
        {
            return Err(AppError::AlreadyRegistered(COMUNA_REGISTERED.into()));
        }
        find_region(&txn, region_id).await?;

        let mut new_comuna = comuna::ActiveModel {
            region_id: Set(region_id),
            name: Set(name),
            active: Set(fields.active.unwrap_or(1)),
            image_extension: Set(None),
            ..Default::default()
        };
        if let Some(id) = fields.id {
            new_comuna.id = Set(id);
        }
        let model = new_comuna.insert(&txn).await?;
        let model = attach_comuna_image(&txn, self.images, model, image).await?;
        txn.commit().await?;

        info!(id = model.id, region_id, name = %model.name, "Comuna created");
        Ok(model)
    }

    /// Partial update: only the fields present are assigned.
    pub async fn update(
        &self,
        id: i32,
        fields: ComunaFields,
        image: Option<&UploadedFile>,
    ) -> Result<comuna::Model, AppError> {
        let name = fields
            .name
            .as_deref()
            .map(|n| normalize_name(n, "comuna"))
            .transpose()?;

        let txn = self.conn.begin().await?;
        let existing = find_comuna(&txn, id).await?;

        if let Some(ref name) = name
            && comuna_name_taken(&txn, name, Some(id)).await?
        {
            return Err(AppError::AlreadyRegistered(COMUNA_REGISTERED.into()));
        }

        let mut active: comuna::ActiveModel = existing.clone().into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(region_id) = fields.region_id {
            find_region(&txn, region_id).await?;
            active.region_id = Set(region_id);
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
            model = rekey_comuna(&txn, self.images, model, new_id).await?;
        }

        let model = attach_comuna_image(&txn, self.images, model, image).await?;
        txn.commit().await?;
        Ok(model)
    }

    /// Delete a comuna and, once the deletion is committed, its image file.
    pub async fn remove(&self, id: i32) -> Result<(), DeleteError> {
        let txn = self.conn.begin().await?;
        let comuna = comuna::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DeleteError::NotFound)?;

        comuna::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        remove_entity_image(
            self.images,
            EntityKind::Comuna,
            id,
            comuna.image_extension.as_deref(),
        )
        .await;
        Ok(())
    }
}

pub(crate) async fn find_comuna<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<comuna::Model, AppError> {
    comuna::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(COMUNA_NOT_FOUND.into()))
}

/// Whether a (title-cased) comuna name is stored under any region,
/// optionally ignoring one comuna id.
pub(crate) async fn comuna_name_taken<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    except: Option<i32>,
) -> Result<bool, AppError> {
    let mut select = comuna::Entity::find().filter(comuna::Column::Name.eq(name));
    if let Some(id) = except {
        select = select.filter(comuna::Column::Id.ne(id));
    }
    Ok(select.count(conn).await? > 0)
}

/// Create comunas under `region_id`, skipping names that already exist.
///
/// `cursor` is the position in `images` of the first name. It advances once
/// per name, created or repeated, and the advanced value is returned so the
/// caller can continue the same image list with the next region.
pub(crate) async fn save_comunas<C: ConnectionTrait>(
    conn: &C,
    images: &dyn ImageStore,
    region_id: i32,
    names: &[String],
    comuna_images: &ImageList,
    mut cursor: usize,
    repeated: &mut Vec<String>,
) -> Result<usize, AppError> {
    for raw in names {
        let name = title_case(raw.trim());
        if comuna_name_taken(conn, &name, None).await? {
            repeated.push(name);
        } else {
            let new_comuna = comuna::ActiveModel {
                region_id: Set(region_id),
                name: Set(name),
                active: Set(1),
                image_extension: Set(None),
                ..Default::default()
            };
            let model = new_comuna.insert(conn).await?;
            attach_comuna_image(conn, images, model, image_at(comuna_images, cursor)).await?;
        }
        cursor += 1;
    }
    Ok(cursor)
}

async fn attach_comuna_image<C: ConnectionTrait>(
    conn: &C,
    images: &dyn ImageStore,
    model: comuna::Model,
    upload: Option<&UploadedFile>,
) -> Result<comuna::Model, AppError> {
    let Some(ext) = store_upload(images, EntityKind::Comuna, model.id, upload).await? else {
        return Ok(model);
    };

    let previous = model.image_extension.clone();
    let mut active: comuna::ActiveModel = model.into();
    active.image_extension = Set(Some(ext.to_string()));
    let model = active.update(conn).await?;

    if let Some(prev) = previous.as_deref().and_then(ImageExtension::parse)
        && prev != ext
    {
        images.delete(EntityKind::Comuna, model.id, prev).await?;
    }
    Ok(model)
}

/// Move a comuna to a new primary key, carrying its image file along.
async fn rekey_comuna<C: ConnectionTrait>(
    conn: &C,
    images: &dyn ImageStore,
    model: comuna::Model,
    new_id: i32,
) -> Result<comuna::Model, AppError> {
    if comuna::Entity::find_by_id(new_id).one(conn).await?.is_some() {
        return Err(AppError::AlreadyRegistered(COMUNA_REGISTERED.into()));
    }

    comuna::Entity::update_many()
        .col_expr(comuna::Column::Id, Expr::value(new_id))
        .filter(comuna::Column::Id.eq(model.id))
        .exec(conn)
        .await?;

    if let Some(ext) = model.image_extension.as_deref().and_then(ImageExtension::parse) {
        images
            .relocate(EntityKind::Comuna, model.id, new_id, ext)
            .await?;
    }

    find_comuna(conn, new_id).await
}
