use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::export::{export_filename, products_to_xlsx};
use crate::models::{
    CartItem, ChangePrices, CreateImages, CreateProduct, Product, ProductFilters, ProductImage,
    ReorderItem, UpdateProduct, ValidatedCartItem,
};
use crate::repository::ProductRepository;

/// Service layer for Product business logic
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_product(
        &self,
        user_id: Uuid,
        input: CreateProduct,
    ) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.create(user_id, input).await
    }

    pub async fn get_product_by_slug(&self, slug: &str) -> ProductResult<Product> {
        self.repository
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| ProductError::NotFound("No existe el producto".to_string()))
    }

    pub async fn list_products(
        &self,
        filters: ProductFilters,
    ) -> ProductResult<(Vec<Product>, u64)> {
        self.repository.list(filters).await
    }

    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    pub async fn delete_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository.delete(id).await
    }

    pub async fn reorder_products(&self, items: Vec<ReorderItem>) -> ProductResult<()> {
        self.repository.reorder(items).await
    }

    pub async fn move_product(&self, id: Uuid, display_order: i32) -> ProductResult<()> {
        self.repository.move_to_position(id, display_order).await
    }

    /// Read-side stock check; reserves nothing. Each line is answered
    /// individually so the client can render per-item feedback.
    pub async fn validate_cart(
        &self,
        items: Vec<CartItem>,
    ) -> ProductResult<Vec<ValidatedCartItem>> {
        let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, Product> = self
            .repository
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let validated = items
            .into_iter()
            .map(|item| match products.get(&item.product_id) {
                None => ValidatedCartItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    valid: false,
                    reason: Some("Producto no disponible".to_string()),
                    available_stock: Some(0),
                    product: None,
                },
                Some(product) if product.stock < item.quantity => ValidatedCartItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    valid: false,
                    reason: Some(format!("{} Stock insuficiente", product.name)),
                    available_stock: Some(product.stock),
                    product: None,
                },
                Some(product) => ValidatedCartItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    valid: true,
                    reason: None,
                    available_stock: None,
                    product: Some(product.clone()),
                },
            })
            .collect();

        Ok(validated)
    }

    pub async fn change_prices(&self, input: ChangePrices) -> ProductResult<u64> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository
            .change_prices(input.percentage, input.increment)
            .await
    }

    /// Exports the whole catalog; only the xlsx format is available.
    /// Returns the file name (without extension) and the file bytes.
    pub async fn export(&self, format: &str) -> ProductResult<(String, Vec<u8>)> {
        let format = format.trim();
        if format.len() <= 1 {
            return Err(ProductError::Validation(
                "Indique un formato de exportación válido.".to_string(),
            ));
        }
        if format != "xlsx" {
            return Err(ProductError::Validation(
                "Formato de exportación no disponible".to_string(),
            ));
        }

        let products = self.repository.list_all().await?;
        let bytes = products_to_xlsx(&products)?;
        Ok((export_filename(), bytes))
    }

    pub async fn list_images(&self, product_id: Uuid) -> ProductResult<Vec<ProductImage>> {
        self.repository.list_images(product_id).await
    }

    pub async fn add_images(
        &self,
        product_id: Uuid,
        input: CreateImages,
    ) -> ProductResult<Vec<ProductImage>> {
        if input.storage_keys.is_empty() {
            return Err(ProductError::Validation(
                "Debes subir al menos una imagen.".to_string(),
            ));
        }

        self.repository
            .add_images(product_id, input.storage_keys)
            .await
    }

    pub async fn reorder_images(
        &self,
        product_id: Uuid,
        items: Vec<ReorderItem>,
    ) -> ProductResult<Vec<ProductImage>> {
        self.repository.reorder_images(product_id, items).await
    }

    pub async fn delete_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> ProductResult<Vec<ProductImage>> {
        self.repository.delete_image(product_id, image_id).await
    }
}
