use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entity;
use crate::error::{ShippingError, ShippingResult};
use crate::models::{CreateShippingAddress, ShippingAddress, UpdateShippingAddress};
use crate::repository::ShippingRepository;

pub struct PgShippingRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgShippingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn find_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> ShippingResult<Option<entity::Model>> {
        entity::Entity::find_by_id(id)
            .filter(entity::Column::UserId.eq(user_id))
            .one(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching shipping address: {:?}", e);
                ShippingError::Internal("Error al intentar obtener la dirección".to_string())
            })
    }
}

#[async_trait]
impl ShippingRepository for PgShippingRepository {
    async fn create(
        &self,
        user_id: Uuid,
        input: CreateShippingAddress,
    ) -> ShippingResult<ShippingAddress> {
        let active_model: entity::ActiveModel = ShippingAddress::new(user_id, input).into();

        let model = self.base.insert(active_model).await.map_err(|e| {
            tracing::error!("Database error creating shipping address: {:?}", e);
            ShippingError::Internal("Error al intentar crear la dirección".to_string())
        })?;

        tracing::info!(address_id = %model.id, user_id = %user_id, "Created shipping address");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> ShippingResult<Option<ShippingAddress>> {
        Ok(self.find_owned(id, user_id).await?.map(Into::into))
    }

    async fn list_by_user(&self, user_id: Uuid) -> ShippingResult<Vec<ShippingAddress>> {
        let models = entity::Entity::find()
            .filter(entity::Column::UserId.eq(user_id))
            .order_by_desc(entity::Column::CreatedAt)
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error listing shipping addresses: {:?}", e);
                ShippingError::Internal(
                    "Error al intentar obtener las direcciones de envío".to_string(),
                )
            })?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: UpdateShippingAddress,
    ) -> ShippingResult<ShippingAddress> {
        let model = self
            .find_owned(id, user_id)
            .await?
            .ok_or(ShippingError::NotFound)?;

        let mut address: ShippingAddress = model.into();
        address.apply_update(input);

        let active_model: entity::ActiveModel = address.into();
        let updated = self.base.update(active_model).await.map_err(|e| {
            tracing::error!("Database error updating shipping address: {:?}", e);
            ShippingError::Internal("Error al intentar actualizar la dirección".to_string())
        })?;

        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> ShippingResult<ShippingAddress> {
        let model = self
            .find_owned(id, user_id)
            .await?
            .ok_or(ShippingError::NotFound)?;

        let address: ShippingAddress = model.into();

        self.base.delete_by_id(id).await.map_err(|e| {
            tracing::error!("Database error deleting shipping address: {:?}", e);
            ShippingError::Internal("Error al intentar eliminar la dirección".to_string())
        })?;

        tracing::info!(address_id = %id, "Deleted shipping address");
        Ok(address)
    }
}
