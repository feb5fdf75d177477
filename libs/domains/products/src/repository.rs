use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    image_quota_error, CreateProduct, Product, ProductFilters, ProductImage, ReorderItem,
    UpdateProduct,
};
use crate::slug::{slugify, unique_slug};

/// Repository trait for Product and ProductImage persistence.
///
/// Every mutation that touches more than one row (reorder, manual move,
/// delete with compaction) must be atomic: a concurrent reader never
/// observes a partially shifted ordering.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Appends at display_order = count + 1 with a unique slug
    async fn create(&self, user_id: Uuid, input: CreateProduct) -> ProductResult<Product>;

    async fn get_by_slug(&self, slug: &str) -> ProductResult<Option<Product>>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Filtered catalog page plus the total match count
    async fn list(&self, filters: ProductFilters) -> ProductResult<(Vec<Product>, u64)>;

    /// Whole catalog in display order (exports)
    async fn list_all(&self) -> ProductResult<Vec<Product>>;

    /// Products matching the given ids, in no particular order
    async fn find_by_ids(&self, ids: Vec<Uuid>) -> ProductResult<Vec<Product>>;

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product>;

    /// Deletes and closes the ordering gap in the same atomic unit
    async fn delete(&self, id: Uuid) -> ProductResult<Product>;

    /// Bulk reorder: sets each listed product's display_order as given.
    /// The caller supplies the permutation; no gap/overlap validation.
    async fn reorder(&self, items: Vec<ReorderItem>) -> ProductResult<()>;

    /// Single-item move preserving density: shifts the products between
    /// the old and new position by one, then places the target.
    async fn move_to_position(&self, id: Uuid, display_order: i32) -> ProductResult<()>;

    /// Adjusts every price by the percentage; returns affected rows
    async fn change_prices(&self, percentage: f64, increment: bool) -> ProductResult<u64>;

    async fn list_images(&self, product_id: Uuid) -> ProductResult<Vec<ProductImage>>;

    /// Appends images after the existing ones, enforcing the cap of 5
    async fn add_images(
        &self,
        product_id: Uuid,
        storage_keys: Vec<String>,
    ) -> ProductResult<Vec<ProductImage>>;

    async fn reorder_images(
        &self,
        product_id: Uuid,
        items: Vec<ReorderItem>,
    ) -> ProductResult<Vec<ProductImage>>;

    /// Deletes one image, compacts the rest, returns the remaining set
    async fn delete_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> ProductResult<Vec<ProductImage>>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sort_catalog(mut products: Vec<Product>) -> Vec<Product> {
        products.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(b.created_at.cmp(&a.created_at))
        });
        products
    }

    fn sorted_images(product: &Product) -> Vec<ProductImage> {
        let mut images = product.images.clone();
        images.sort_by_key(|i| i.display_order);
        images
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, user_id: Uuid, input: CreateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        let base = slugify(&input.name);
        let slug = unique_slug(&base, |candidate| {
            products.values().any(|p| p.slug == candidate)
        });

        let display_order = products.len() as i32 + 1;
        let product = Product::new(user_id, slug, display_order, input);
        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, slug = %product.slug, "Created product");
        Ok(product)
    }

    async fn get_by_slug(&self, slug: &str) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.values().find(|p| p.slug == slug).map(|p| {
            let mut product = p.clone();
            product.images = Self::sorted_images(p);
            product
        }))
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).map(|p| {
            let mut product = p.clone();
            product.images = Self::sorted_images(p);
            product
        }))
    }

    async fn list(&self, filters: ProductFilters) -> ProductResult<(Vec<Product>, u64)> {
        let products = self.products.read().await;

        let matches: Vec<Product> = products
            .values()
            .filter(|p| {
                if let Some(ref search) = filters.search {
                    if !p.name.to_lowercase().contains(&search.to_lowercase()) {
                        return false;
                    }
                }
                if let Some(ref ids) = filters.categories_ids {
                    if !ids.contains(&p.category_id) {
                        return false;
                    }
                }
                if let Some(ref ids) = filters.unities_ids {
                    if !ids.contains(&p.unity_id) {
                        return false;
                    }
                }
                if let Some((min, max)) = filters.price_range {
                    let second_matches = p
                        .second_price
                        .filter(|sp| *sp != 0.0)
                        .is_some_and(|sp| sp >= min && sp <= max);
                    if !(p.price >= min && p.price <= max || second_matches) {
                        return false;
                    }
                }
                if filters.in_stock_only && p.stock <= 0 {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        let total = matches.len() as u64;
        let page: Vec<Product> = Self::sort_catalog(matches)
            .into_iter()
            .skip(filters.offset as usize)
            .take(filters.limit.max(1) as usize)
            .map(|mut p| {
                p.images = Self::sorted_images(&p);
                p
            })
            .collect();

        Ok((page, total))
    }

    async fn list_all(&self) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(Self::sort_catalog(products.values().cloned().collect()))
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| products.get(id))
            .map(|p| {
                let mut product = p.clone();
                product.images = Self::sorted_images(p);
                product
            })
            .collect())
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        let mut product = products
            .get(&id)
            .cloned()
            .ok_or_else(|| ProductError::NotFound("Producto no encontrado".to_string()))?;

        if product.apply_update(input) {
            let base = slugify(&product.name);
            product.slug = unique_slug(&base, |candidate| {
                products.values().any(|p| p.id != id && p.slug == candidate)
            });
        }

        products.insert(id, product.clone());
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        let removed = products
            .remove(&id)
            .ok_or_else(|| ProductError::NotFound("Producto no encontrado".to_string()))?;

        // Close the gap left at the removed position
        for product in products.values_mut() {
            if product.display_order > removed.display_order {
                product.display_order -= 1;
            }
        }

        tracing::info!(product_id = %id, "Deleted product");
        Ok(removed)
    }

    async fn reorder(&self, items: Vec<ReorderItem>) -> ProductResult<()> {
        let mut products = self.products.write().await;

        for item in &items {
            if let Some(product) = products.get_mut(&item.id) {
                product.display_order = item.display_order;
            }
        }

        Ok(())
    }

    async fn move_to_position(&self, id: Uuid, display_order: i32) -> ProductResult<()> {
        let mut products = self.products.write().await;

        let prev_order = products
            .get(&id)
            .map(|p| p.display_order)
            .ok_or_else(|| ProductError::NotFound("Producto no encontrado".to_string()))?;

        let total = products.len() as i32;
        if display_order < 1 || display_order > total {
            return Err(ProductError::Validation(format!(
                "El orden debe estar entre 1 y {total}"
            )));
        }

        if display_order == prev_order {
            return Ok(());
        }

        if display_order < prev_order {
            // Moving earlier: everything in [new, prev) shifts down the list
            for product in products.values_mut() {
                if product.display_order >= display_order && product.display_order < prev_order {
                    product.display_order += 1;
                }
            }
        } else {
            // Moving later: everything in (prev, new] shifts up the list
            for product in products.values_mut() {
                if product.display_order > prev_order && product.display_order <= display_order {
                    product.display_order -= 1;
                }
            }
        }

        if let Some(product) = products.get_mut(&id) {
            product.display_order = display_order;
        }

        Ok(())
    }

    async fn change_prices(&self, percentage: f64, increment: bool) -> ProductResult<u64> {
        let mut products = self.products.write().await;

        let factor = if increment {
            1.0 + percentage / 100.0
        } else {
            1.0 - percentage / 100.0
        };

        let mut affected = 0;
        for product in products.values_mut() {
            product.price = (product.price * factor * 100.0).round() / 100.0;
            if let Some(second) = product.second_price.filter(|sp| *sp != 0.0) {
                product.second_price = Some((second * factor * 100.0).round() / 100.0);
            }
            affected += 1;
        }

        Ok(affected)
    }

    async fn list_images(&self, product_id: Uuid) -> ProductResult<Vec<ProductImage>> {
        let products = self.products.read().await;
        let product = products
            .get(&product_id)
            .ok_or_else(|| ProductError::NotFound("Producto no encontrado".to_string()))?;
        Ok(Self::sorted_images(product))
    }

    async fn add_images(
        &self,
        product_id: Uuid,
        storage_keys: Vec<String>,
    ) -> ProductResult<Vec<ProductImage>> {
        let mut products = self.products.write().await;

        let product = products
            .get_mut(&product_id)
            .ok_or_else(|| ProductError::NotFound("Producto no encontrado".to_string()))?;

        if let Some(message) = image_quota_error(product.images.len(), storage_keys.len()) {
            return Err(ProductError::Validation(message));
        }

        let duplicate = storage_keys
            .iter()
            .any(|key| product.images.iter().any(|i| &i.storage_key == key));
        if duplicate {
            return Err(ProductError::AlreadyExists(
                "Una o varias imágenes ya existen. Elimina las duplicadas e intenta de nuevo."
                    .to_string(),
            ));
        }

        let existing = product.images.len() as i32;
        for (index, storage_key) in storage_keys.into_iter().enumerate() {
            product.images.push(ProductImage::new(
                product_id,
                storage_key,
                existing + index as i32 + 1,
            ));
        }

        Ok(Self::sorted_images(product))
    }

    async fn reorder_images(
        &self,
        product_id: Uuid,
        items: Vec<ReorderItem>,
    ) -> ProductResult<Vec<ProductImage>> {
        let mut products = self.products.write().await;

        let product = products
            .get_mut(&product_id)
            .ok_or_else(|| ProductError::NotFound("Producto no encontrado".to_string()))?;

        for item in &items {
            if let Some(image) = product.images.iter_mut().find(|i| i.id == item.id) {
                image.display_order = item.display_order;
            }
        }

        Ok(Self::sorted_images(product))
    }

    async fn delete_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> ProductResult<Vec<ProductImage>> {
        let mut products = self.products.write().await;

        let product = products
            .get_mut(&product_id)
            .ok_or_else(|| ProductError::NotFound("Producto no encontrado".to_string()))?;

        let position = product
            .images
            .iter()
            .position(|i| i.id == image_id)
            .ok_or_else(|| ProductError::NotFound("Imagen no encontrada".to_string()))?;

        let removed = product.images.remove(position);
        for image in product.images.iter_mut() {
            if image.display_order > removed.display_order {
                image.display_order -= 1;
            }
        }

        Ok(Self::sorted_images(product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: "Descripción de prueba".to_string(),
            price: 100.0,
            second_price: None,
            stock: 10,
            free_shipping: false,
            video_id: None,
            category_id: Uuid::now_v7(),
            unity_id: Uuid::now_v7(),
        }
    }

    async fn seed(repo: &InMemoryProductRepository, names: &[&str]) -> Vec<Product> {
        let user_id = Uuid::now_v7();
        let mut created = Vec::new();
        for name in names {
            created.push(repo.create(user_id, input(name)).await.unwrap());
        }
        created
    }

    async fn orders_by_name(repo: &InMemoryProductRepository) -> Vec<(String, i32)> {
        repo.list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.name, p.display_order))
            .collect()
    }

    fn assert_dense(orders: &[(String, i32)]) {
        let mut values: Vec<i32> = orders.iter().map(|(_, o)| *o).collect();
        values.sort_unstable();
        let expected: Vec<i32> = (1..=orders.len() as i32).collect();
        assert_eq!(values, expected, "display orders must be exactly 1..N");
    }

    #[tokio::test]
    async fn create_appends_at_end() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A", "B", "C"]).await;

        assert_eq!(created[0].display_order, 1);
        assert_eq!(created[1].display_order, 2);
        assert_eq!(created[2].display_order, 3);
    }

    #[tokio::test]
    async fn duplicate_names_get_suffixed_slugs() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["Silla Azul", "Silla Azul", "Silla Azul"]).await;

        assert_eq!(created[0].slug, "silla-azul");
        assert_eq!(created[1].slug, "silla-azul-1");
        assert_eq!(created[2].slug, "silla-azul-2");
    }

    #[tokio::test]
    async fn move_earlier_shifts_the_block_down() {
        // A=1 B=2 C=3; moving C to 1 gives C=1 A=2 B=3
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A", "B", "C"]).await;

        repo.move_to_position(created[2].id, 1).await.unwrap();

        let orders = orders_by_name(&repo).await;
        assert_eq!(
            orders,
            vec![
                ("C".to_string(), 1),
                ("A".to_string(), 2),
                ("B".to_string(), 3),
            ]
        );
    }

    #[tokio::test]
    async fn delete_closes_the_gap() {
        // Continuing the scenario: after C=1 A=2 B=3, deleting B
        // leaves C=1 A=2 with nothing at 3
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A", "B", "C"]).await;
        repo.move_to_position(created[2].id, 1).await.unwrap();

        repo.delete(created[1].id).await.unwrap();

        let orders = orders_by_name(&repo).await;
        assert_eq!(orders, vec![("C".to_string(), 1), ("A".to_string(), 2)]);
        assert_dense(&orders);
    }

    #[tokio::test]
    async fn move_later_shifts_the_block_up() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A", "B", "C", "D"]).await;

        repo.move_to_position(created[0].id, 3).await.unwrap();

        let orders = orders_by_name(&repo).await;
        assert_eq!(
            orders,
            vec![
                ("B".to_string(), 1),
                ("C".to_string(), 2),
                ("A".to_string(), 3),
                ("D".to_string(), 4),
            ]
        );
    }

    #[tokio::test]
    async fn move_there_and_back_restores_ordering() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A", "B", "C", "D", "E"]).await;
        let before = orders_by_name(&repo).await;

        repo.move_to_position(created[3].id, 2).await.unwrap();
        repo.move_to_position(created[3].id, 4).await.unwrap();

        assert_eq!(orders_by_name(&repo).await, before);
    }

    #[tokio::test]
    async fn move_out_of_bounds_is_rejected() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A", "B", "C"]).await;

        let too_high = repo.move_to_position(created[0].id, 4).await;
        assert!(matches!(
            too_high,
            Err(ProductError::Validation(ref m)) if m == "El orden debe estar entre 1 y 3"
        ));

        let too_low = repo.move_to_position(created[0].id, 0).await;
        assert!(matches!(too_low, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn move_to_same_position_is_a_noop() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A", "B", "C"]).await;
        let before = orders_by_name(&repo).await;

        repo.move_to_position(created[1].id, 2).await.unwrap();

        assert_eq!(orders_by_name(&repo).await, before);
    }

    #[tokio::test]
    async fn ordering_stays_dense_under_mixed_operations() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A", "B", "C", "D", "E", "F"]).await;

        repo.move_to_position(created[5].id, 1).await.unwrap();
        repo.delete(created[2].id).await.unwrap();
        repo.move_to_position(created[0].id, 5).await.unwrap();
        repo.delete(created[4].id).await.unwrap();
        seed(&repo, &["G"]).await;

        assert_dense(&orders_by_name(&repo).await);
    }

    #[tokio::test]
    async fn bulk_reorder_applies_the_given_permutation() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A", "B", "C"]).await;

        repo.reorder(vec![
            ReorderItem {
                id: created[0].id,
                display_order: 3,
            },
            ReorderItem {
                id: created[1].id,
                display_order: 1,
            },
            ReorderItem {
                id: created[2].id,
                display_order: 2,
            },
        ])
        .await
        .unwrap();

        let orders = orders_by_name(&repo).await;
        assert_eq!(
            orders,
            vec![
                ("B".to_string(), 1),
                ("C".to_string(), 2),
                ("A".to_string(), 3),
            ]
        );
    }

    #[tokio::test]
    async fn name_update_regenerates_slug() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["Mesa Redonda", "Mesa Ovalada"]).await;

        let updated = repo
            .update(
                created[1].id,
                UpdateProduct {
                    name: Some("Mesa Redonda".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, "mesa-redonda-1");
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let repo = InMemoryProductRepository::new();
        seed(&repo, &["Silla Alta", "Silla Baja", "Mesa Larga"]).await;

        let (page, total) = repo
            .list(ProductFilters {
                limit: 1,
                search: Some("silla".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Silla Alta");
    }

    #[tokio::test]
    async fn price_range_matches_second_price() {
        let repo = InMemoryProductRepository::new();
        let user_id = Uuid::now_v7();
        let mut cheap = input("Oferta");
        cheap.price = 500.0;
        cheap.second_price = Some(40.0);
        repo.create(user_id, cheap).await.unwrap();

        let mut zero_second = input("Normal");
        zero_second.price = 500.0;
        zero_second.second_price = Some(0.0);
        repo.create(user_id, zero_second).await.unwrap();

        let (page, total) = repo
            .list(ProductFilters {
                limit: 12,
                price_range: Some((10.0, 100.0)),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(total, 1);
        assert_eq!(page[0].name, "Oferta");
    }

    #[tokio::test]
    async fn change_prices_rounds_to_cents() {
        let repo = InMemoryProductRepository::new();
        let user_id = Uuid::now_v7();
        let mut item = input("Silla");
        item.price = 99.99;
        repo.create(user_id, item).await.unwrap();

        let affected = repo.change_prices(10.0, true).await.unwrap();
        assert_eq!(affected, 1);

        let (page, _) = repo
            .list(ProductFilters {
                limit: 12,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page[0].price, 109.99);
    }

    #[tokio::test]
    async fn images_append_and_cap_at_five() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A"]).await;
        let id = created[0].id;

        let images = repo
            .add_images(id, vec!["k1".into(), "k2".into(), "k3".into(), "k4".into()])
            .await
            .unwrap();
        assert_eq!(
            images.iter().map(|i| i.display_order).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );

        let overflow = repo.add_images(id, vec!["k5".into(), "k6".into()]).await;
        assert!(matches!(
            overflow,
            Err(ProductError::Validation(ref m))
                if m == "Solo puedes subir 1 imagen más antes de alcanzar el límite de 5"
        ));

        repo.add_images(id, vec!["k5".into()]).await.unwrap();
        let full = repo.add_images(id, vec!["k6".into()]).await;
        assert!(matches!(
            full,
            Err(ProductError::Validation(ref m))
                if m == "Alcanzaste el límite de 5 imágenes por producto"
        ));
    }

    #[tokio::test]
    async fn duplicate_storage_key_conflicts() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A"]).await;

        repo.add_images(created[0].id, vec!["k1".into()])
            .await
            .unwrap();
        let result = repo.add_images(created[0].id, vec!["k1".into()]).await;

        assert!(matches!(result, Err(ProductError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn image_delete_compacts_ordering() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A"]).await;
        let id = created[0].id;

        let images = repo
            .add_images(id, vec!["k1".into(), "k2".into(), "k3".into()])
            .await
            .unwrap();

        let remaining = repo.delete_image(id, images[1].id).await.unwrap();
        assert_eq!(
            remaining
                .iter()
                .map(|i| (i.storage_key.as_str(), i.display_order))
                .collect::<Vec<_>>(),
            vec![("k1", 1), ("k3", 2)]
        );
    }

    #[tokio::test]
    async fn missing_image_is_not_found() {
        let repo = InMemoryProductRepository::new();
        let created = seed(&repo, &["A"]).await;

        let result = repo.delete_image(created[0].id, Uuid::now_v7()).await;
        assert!(matches!(
            result,
            Err(ProductError::NotFound(ref m)) if m == "Imagen no encontrada"
        ));
    }
}
