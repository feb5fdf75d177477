use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entity::{image, product};
use crate::error::{ProductError, ProductResult};
use crate::models::{
    image_quota_error, CreateProduct, Product, ProductFilters, ProductImage, ReorderItem,
    UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::slug::slugify;

pub struct PgProductRepository {
    base: BaseRepository<product::Entity>,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn begin(&self) -> ProductResult<sea_orm::DatabaseTransaction> {
        self.base.db().begin().await.map_err(|e| {
            tracing::error!("Database error starting transaction: {:?}", e);
            ProductError::Internal("Error al intentar procesar la operación".to_string())
        })
    }

    /// Finds a free slug for `name` inside the given connection,
    /// appending -1, -2, ... while the base form is taken.
    async fn unique_slug<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        exclude: Option<Uuid>,
    ) -> ProductResult<String> {
        let base = slugify(name);
        let mut slug = base.clone();
        let mut count = 1;

        loop {
            let mut query = product::Entity::find().filter(product::Column::Slug.eq(&slug));
            if let Some(id) = exclude {
                query = query.filter(product::Column::Id.ne(id));
            }

            let taken = query.one(conn).await.map_err(|e| {
                tracing::error!("Database error checking slug: {:?}", e);
                ProductError::Internal("Error al intentar crear el producto".to_string())
            })?;

            if taken.is_none() {
                return Ok(slug);
            }

            slug = format!("{base}-{count}");
            count += 1;
        }
    }

    /// Loads the ordered image sets for the given products and attaches
    /// them to each product.
    async fn attach_images(&self, products: &mut [Product]) -> ProductResult<()> {
        if products.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let images = image::Entity::find()
            .filter(image::Column::ProductId.is_in(ids))
            .order_by_asc(image::Column::DisplayOrder)
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching product images: {:?}", e);
                ProductError::Internal("Error al intentar obtener las imágenes".to_string())
            })?;

        let mut by_product: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
        for model in images {
            by_product
                .entry(model.product_id)
                .or_default()
                .push(model.into());
        }

        for product in products.iter_mut() {
            product.images = by_product.remove(&product.id).unwrap_or_default();
        }

        Ok(())
    }

    async fn ordered_images<C: ConnectionTrait>(
        conn: &C,
        product_id: Uuid,
    ) -> ProductResult<Vec<ProductImage>> {
        let models = image::Entity::find()
            .filter(image::Column::ProductId.eq(product_id))
            .order_by_asc(image::Column::DisplayOrder)
            .all(conn)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching product images: {:?}", e);
                ProductError::Internal("Error al intentar obtener las imágenes".to_string())
            })?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    fn filter_condition(filters: &ProductFilters) -> Condition {
        // Scoped so PgExpr's `contains` doesn't leak into the tests'
        // `use super::*`, where it shadows `str::contains` on Strings.
        use sea_orm::sea_query::extension::postgres::PgExpr;

        let mut condition = Condition::all();

        if let Some(ref search) = filters.search {
            // ILIKE; LIKE is case-sensitive on Postgres
            condition = condition.add(
                Expr::col((product::Entity, product::Column::Name)).ilike(format!("%{search}%")),
            );
        }
        if let Some(ref ids) = filters.categories_ids {
            condition = condition.add(product::Column::CategoryId.is_in(ids.clone()));
        }
        if let Some(ref ids) = filters.unities_ids {
            condition = condition.add(product::Column::UnityId.is_in(ids.clone()));
        }
        if let Some((min, max)) = filters.price_range {
            condition = condition.add(
                Condition::any()
                    .add(product::Column::Price.between(min, max))
                    .add(
                        Condition::all()
                            .add(product::Column::SecondPrice.is_not_null())
                            .add(product::Column::SecondPrice.ne(0.0))
                            .add(product::Column::SecondPrice.between(min, max)),
                    ),
            );
        }
        if filters.in_stock_only {
            condition = condition.add(product::Column::Stock.gt(0));
        }

        condition
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, user_id: Uuid, input: CreateProduct) -> ProductResult<Product> {
        let txn = self.begin().await?;

        let slug = Self::unique_slug(&txn, &input.name, None).await?;

        let total = product::Entity::find().count(&txn).await.map_err(|e| {
            tracing::error!("Database error counting products: {:?}", e);
            ProductError::Internal("Error al intentar crear el producto".to_string())
        })?;

        let active_model: product::ActiveModel =
            Product::new(user_id, slug, total as i32 + 1, input).into();

        let model = active_model.insert(&txn).await.map_err(|e| {
            match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    ProductError::AlreadyExists("El producto ya existe".to_string())
                }
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => ProductError::Validation(
                    "La categoría, unidad o usuario indicado no existe".to_string(),
                ),
                _ => {
                    tracing::error!("Database error creating product: {:?}", e);
                    ProductError::Internal("Error al intentar crear el producto".to_string())
                }
            }
        })?;

        txn.commit().await.map_err(|e| {
            tracing::error!("Database error committing product create: {:?}", e);
            ProductError::Internal("Error al intentar crear el producto".to_string())
        })?;

        tracing::info!(product_id = %model.id, slug = %model.slug, "Created product");
        Ok(model.into())
    }

    async fn get_by_slug(&self, slug: &str) -> ProductResult<Option<Product>> {
        let model = product::Entity::find()
            .filter(product::Column::Slug.eq(slug))
            .one(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching product: {:?}", e);
                ProductError::Internal("Error al intentar obtener el producto".to_string())
            })?;

        match model {
            None => Ok(None),
            Some(model) => {
                let mut products = vec![Product::from(model)];
                self.attach_images(&mut products).await?;
                Ok(products.pop())
            }
        }
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let model = self.base.find_by_id(id).await.map_err(|e| {
            tracing::error!("Database error fetching product: {:?}", e);
            ProductError::Internal("Error al intentar obtener el producto".to_string())
        })?;

        match model {
            None => Ok(None),
            Some(model) => {
                let mut products = vec![Product::from(model)];
                self.attach_images(&mut products).await?;
                Ok(products.pop())
            }
        }
    }

    async fn list(&self, filters: ProductFilters) -> ProductResult<(Vec<Product>, u64)> {
        let condition = Self::filter_condition(&filters);

        let total = product::Entity::find()
            .filter(condition.clone())
            .count(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error counting products: {:?}", e);
                ProductError::Internal("Error al intentar obtener los productos".to_string())
            })?;

        let models = product::Entity::find()
            .filter(condition)
            .order_by_asc(product::Column::DisplayOrder)
            .order_by_desc(product::Column::CreatedAt)
            .offset(filters.offset)
            .limit(Ord::max(filters.limit, 1))
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error listing products: {:?}", e);
                ProductError::Internal("Error al intentar obtener los productos".to_string())
            })?;

        let mut products: Vec<Product> = models.into_iter().map(Into::into).collect();
        self.attach_images(&mut products).await?;

        Ok((products, total))
    }

    async fn list_all(&self) -> ProductResult<Vec<Product>> {
        let models = product::Entity::find()
            .order_by_asc(product::Column::DisplayOrder)
            .order_by_desc(product::Column::CreatedAt)
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error listing products: {:?}", e);
                ProductError::Internal("Error al intentar obtener los productos".to_string())
            })?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> ProductResult<Vec<Product>> {
        let models = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(self.base.db())
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching products: {:?}", e);
                ProductError::Internal(
                    "Error al validar los productos del carrito".to_string(),
                )
            })?;

        let mut products: Vec<Product> = models.into_iter().map(Into::into).collect();
        self.attach_images(&mut products).await?;

        Ok(products)
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching product: {:?}", e);
                ProductError::Internal("Error al intentar obtener el producto".to_string())
            })?
            .ok_or_else(|| ProductError::NotFound("Producto no encontrado".to_string()))?;

        let mut product: Product = model.into();
        if product.apply_update(input) {
            product.slug = Self::unique_slug(self.base.db(), &product.name, Some(id)).await?;
        }

        let images = product.images.clone();
        let active_model: product::ActiveModel = product.into();
        let updated = self.base.update(active_model).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ProductError::AlreadyExists("El producto ya existe".to_string())
            } else {
                tracing::error!("Database error updating product: {:?}", e);
                ProductError::Internal("Error al intentar actualizar el producto".to_string())
            }
        })?;

        let mut product: Product = updated.into();
        product.images = images;
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<Product> {
        let txn = self.begin().await?;

        let model = product::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching product: {:?}", e);
                ProductError::Internal("Error al intentar obtener el producto".to_string())
            })?
            .ok_or_else(|| ProductError::NotFound("Producto no encontrado".to_string()))?;

        let removed: Product = model.clone().into();

        product::Entity::delete_by_id(id).exec(&txn).await.map_err(|e| {
            tracing::error!("Database error deleting product: {:?}", e);
            ProductError::Internal("Error al intentar eliminar el producto".to_string())
        })?;

        // Close the gap so display orders stay 1..N
        product::Entity::update_many()
            .col_expr(
                product::Column::DisplayOrder,
                Expr::col(product::Column::DisplayOrder).sub(1),
            )
            .filter(product::Column::DisplayOrder.gt(removed.display_order))
            .exec(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error compacting product order: {:?}", e);
                ProductError::Internal("Error al intentar eliminar el producto".to_string())
            })?;

        txn.commit().await.map_err(|e| {
            tracing::error!("Database error committing product delete: {:?}", e);
            ProductError::Internal("Error al intentar eliminar el producto".to_string())
        })?;

        tracing::info!(product_id = %id, "Deleted product");
        Ok(removed)
    }

    async fn reorder(&self, items: Vec<ReorderItem>) -> ProductResult<()> {
        let txn = self.begin().await?;

        for item in &items {
            product::Entity::update_many()
                .col_expr(
                    product::Column::DisplayOrder,
                    Expr::value(item.display_order),
                )
                .filter(product::Column::Id.eq(item.id))
                .exec(&txn)
                .await
                .map_err(|e| {
                    tracing::error!("Database error reordering products: {:?}", e);
                    ProductError::Internal(
                        "Error al actualizar el orden de los productos".to_string(),
                    )
                })?;
        }

        txn.commit().await.map_err(|e| {
            tracing::error!("Database error committing product reorder: {:?}", e);
            ProductError::Internal("Error al actualizar el orden de los productos".to_string())
        })?;

        Ok(())
    }

    async fn move_to_position(&self, id: Uuid, display_order: i32) -> ProductResult<()> {
        let txn = self.begin().await?;

        let model = product::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching product: {:?}", e);
                ProductError::Internal("Error al intentar obtener el producto".to_string())
            })?
            .ok_or_else(|| ProductError::NotFound("Producto no encontrado".to_string()))?;

        let prev_order = model.display_order;

        let total = product::Entity::find().count(&txn).await.map_err(|e| {
            tracing::error!("Database error counting products: {:?}", e);
            ProductError::Internal("Error al actualizar el orden de los productos".to_string())
        })? as i32;

        if display_order < 1 || display_order > total {
            return Err(ProductError::Validation(format!(
                "El orden debe estar entre 1 y {total}"
            )));
        }

        if display_order != prev_order {
            let shift = if display_order < prev_order {
                product::Entity::update_many()
                    .col_expr(
                        product::Column::DisplayOrder,
                        Expr::col(product::Column::DisplayOrder).add(1),
                    )
                    .filter(product::Column::DisplayOrder.gte(display_order))
                    .filter(product::Column::DisplayOrder.lt(prev_order))
            } else {
                product::Entity::update_many()
                    .col_expr(
                        product::Column::DisplayOrder,
                        Expr::col(product::Column::DisplayOrder).sub(1),
                    )
                    .filter(product::Column::DisplayOrder.gt(prev_order))
                    .filter(product::Column::DisplayOrder.lte(display_order))
            };

            shift.exec(&txn).await.map_err(|e| {
                tracing::error!("Database error shifting product order: {:?}", e);
                ProductError::Internal(
                    "Error al actualizar el orden de los productos".to_string(),
                )
            })?;

            product::Entity::update_many()
                .col_expr(product::Column::DisplayOrder, Expr::value(display_order))
                .filter(product::Column::Id.eq(id))
                .exec(&txn)
                .await
                .map_err(|e| {
                    tracing::error!("Database error placing product order: {:?}", e);
                    ProductError::Internal(
                        "Error al actualizar el orden de los productos".to_string(),
                    )
                })?;
        }

        txn.commit().await.map_err(|e| {
            tracing::error!("Database error committing product move: {:?}", e);
            ProductError::Internal("Error al actualizar el orden de los productos".to_string())
        })?;

        Ok(())
    }

    async fn change_prices(&self, percentage: f64, increment: bool) -> ProductResult<u64> {
        let factor = if increment {
            1.0 + percentage / 100.0
        } else {
            1.0 - percentage / 100.0
        };

        let txn = self.begin().await?;

        let result = product::Entity::update_many()
            .col_expr(
                product::Column::Price,
                Expr::col(product::Column::Price).mul(factor),
            )
            .exec(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error updating prices: {:?}", e);
                ProductError::Internal("Error al intentar actualizar los precios".to_string())
            })?;

        product::Entity::update_many()
            .col_expr(
                product::Column::SecondPrice,
                Expr::col(product::Column::SecondPrice).mul(factor),
            )
            .filter(product::Column::SecondPrice.is_not_null())
            .filter(product::Column::SecondPrice.ne(0.0))
            .exec(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error updating second prices: {:?}", e);
                ProductError::Internal("Error al intentar actualizar los precios".to_string())
            })?;

        txn.commit().await.map_err(|e| {
            tracing::error!("Database error committing price change: {:?}", e);
            ProductError::Internal("Error al intentar actualizar los precios".to_string())
        })?;

        Ok(result.rows_affected)
    }

    async fn list_images(&self, product_id: Uuid) -> ProductResult<Vec<ProductImage>> {
        let exists = self.base.find_by_id(product_id).await.map_err(|e| {
            tracing::error!("Database error fetching product: {:?}", e);
            ProductError::Internal("Error al intentar obtener el producto".to_string())
        })?;
        if exists.is_none() {
            return Err(ProductError::NotFound("Producto no encontrado".to_string()));
        }

        Self::ordered_images(self.base.db(), product_id).await
    }

    async fn add_images(
        &self,
        product_id: Uuid,
        storage_keys: Vec<String>,
    ) -> ProductResult<Vec<ProductImage>> {
        let txn = self.begin().await?;

        let exists = product::Entity::find_by_id(product_id)
            .one(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching product: {:?}", e);
                ProductError::Internal("Error al intentar obtener el producto".to_string())
            })?;
        if exists.is_none() {
            return Err(ProductError::NotFound("Producto no encontrado".to_string()));
        }

        let existing = image::Entity::find()
            .filter(image::Column::ProductId.eq(product_id))
            .count(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error counting product images: {:?}", e);
                ProductError::Internal("Error al intentar registrar las imágenes".to_string())
            })? as usize;

        if let Some(message) = image_quota_error(existing, storage_keys.len()) {
            return Err(ProductError::Validation(message));
        }

        let duplicates = image::Entity::find()
            .filter(image::Column::ProductId.eq(product_id))
            .filter(image::Column::StorageKey.is_in(storage_keys.clone()))
            .count(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error checking image keys: {:?}", e);
                ProductError::Internal("Error al intentar registrar las imágenes".to_string())
            })?;
        if duplicates > 0 {
            return Err(ProductError::AlreadyExists(
                "Una o varias imágenes ya existen. Elimina las duplicadas e intenta de nuevo."
                    .to_string(),
            ));
        }

        let models: Vec<image::ActiveModel> = storage_keys
            .into_iter()
            .enumerate()
            .map(|(index, storage_key)| {
                ProductImage::new(product_id, storage_key, existing as i32 + index as i32 + 1)
                    .into()
            })
            .collect();

        image::Entity::insert_many(models)
            .exec(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error inserting product images: {:?}", e);
                ProductError::Internal("Error al intentar registrar las imágenes".to_string())
            })?;

        let images = Self::ordered_images(&txn, product_id).await?;

        txn.commit().await.map_err(|e| {
            tracing::error!("Database error committing image insert: {:?}", e);
            ProductError::Internal("Error al intentar registrar las imágenes".to_string())
        })?;

        Ok(images)
    }

    async fn reorder_images(
        &self,
        product_id: Uuid,
        items: Vec<ReorderItem>,
    ) -> ProductResult<Vec<ProductImage>> {
        let txn = self.begin().await?;

        let exists = product::Entity::find_by_id(product_id)
            .one(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching product: {:?}", e);
                ProductError::Internal("Error al intentar obtener el producto".to_string())
            })?;
        if exists.is_none() {
            return Err(ProductError::NotFound("Producto no encontrado".to_string()));
        }

        for item in &items {
            image::Entity::update_many()
                .col_expr(image::Column::DisplayOrder, Expr::value(item.display_order))
                .filter(image::Column::Id.eq(item.id))
                .filter(image::Column::ProductId.eq(product_id))
                .exec(&txn)
                .await
                .map_err(|e| {
                    tracing::error!("Database error reordering images: {:?}", e);
                    ProductError::Internal(
                        "Error al actualizar el orden de las imágenes".to_string(),
                    )
                })?;
        }

        let images = Self::ordered_images(&txn, product_id).await?;

        txn.commit().await.map_err(|e| {
            tracing::error!("Database error committing image reorder: {:?}", e);
            ProductError::Internal("Error al actualizar el orden de las imágenes".to_string())
        })?;

        Ok(images)
    }

    async fn delete_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> ProductResult<Vec<ProductImage>> {
        let txn = self.begin().await?;

        let model = image::Entity::find_by_id(image_id)
            .filter(image::Column::ProductId.eq(product_id))
            .one(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error fetching image: {:?}", e);
                ProductError::Internal("Error al intentar obtener la imagen".to_string())
            })?
            .ok_or_else(|| ProductError::NotFound("Imagen no encontrada".to_string()))?;

        image::Entity::delete_by_id(image_id)
            .exec(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error deleting image: {:?}", e);
                ProductError::Internal("Error al intentar eliminar la imagen".to_string())
            })?;

        image::Entity::update_many()
            .col_expr(
                image::Column::DisplayOrder,
                Expr::col(image::Column::DisplayOrder).sub(1),
            )
            .filter(image::Column::ProductId.eq(product_id))
            .filter(image::Column::DisplayOrder.gt(model.display_order))
            .exec(&txn)
            .await
            .map_err(|e| {
                tracing::error!("Database error compacting image order: {:?}", e);
                ProductError::Internal("Error al intentar eliminar la imagen".to_string())
            })?;

        let images = Self::ordered_images(&txn, product_id).await?;

        txn.commit().await.map_err(|e| {
            tracing::error!("Database error committing image delete: {:?}", e);
            ProductError::Internal("Error al intentar eliminar la imagen".to_string())
        })?;

        tracing::info!(product_id = %product_id, image_id = %image_id, "Deleted product image");
        Ok(images)
    }
}
