use crate::cache::{CacheLayer, ChangeDescriptor, InvalidationPolicy, ReadThroughAccessor, views};
use crate::domain::{NewProduct, PriceSort, Product, ProductPage, ProductQuery, ProductUpdate};
use crate::ports::ProductRepository;
use crate::services::ProductLock;
use shared::{Error, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

const LATEST_PRODUCTS: usize = 5;

/// Product catalog: cached listings plus the writes that evict them.
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    cache: ReadThroughAccessor,
    invalidation: InvalidationPolicy,
    lock: ProductLock,
    per_page: usize,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        lock: ProductLock,
        cache: &CacheLayer,
        per_page: usize,
    ) -> Self {
        Self {
            products,
            cache: cache.accessor(),
            invalidation: cache.policy(),
            lock,
            per_page: per_page.max(1),
        }
    }

    async fn newest_first(&self) -> Result<Vec<Product>> {
        let mut products = self.products.list_all().await?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    pub async fn latest_products(&self) -> Result<Vec<Product>> {
        self.cache
            .get(&views::latest_products(), || async {
                let mut products = self.newest_first().await?;
                products.truncate(LATEST_PRODUCTS);
                Ok::<_, Error>(products)
            })
            .await
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        self.cache
            .get(&views::categories(), || async {
                let categories: BTreeSet<String> = self
                    .products
                    .list_all()
                    .await?
                    .into_iter()
                    .map(|p| p.category)
                    .collect();
                Ok::<_, Error>(categories.into_iter().collect())
            })
            .await
    }

    pub async fn admin_products(&self) -> Result<Vec<Product>> {
        self.cache
            .get(&views::admin_products(), || self.newest_first())
            .await
    }

    pub async fn product(&self, id: &str) -> Result<Product> {
        self.cache
            .get(&views::product(id), || async {
                self.products
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| Error::not_found("product"))
            })
            .await
    }

    /// Filtered, sorted, paginated search. Not cached: the result depends on the query.
    pub async fn search(&self, query: &ProductQuery) -> Result<ProductPage> {
        let mut matches: Vec<Product> = self
            .newest_first()
            .await?
            .into_iter()
            .filter(|p| query.matches(p))
            .collect();

        match query.sort {
            Some(PriceSort::Asc) => matches.sort_by(|a, b| a.price.total_cmp(&b.price)),
            Some(PriceSort::Desc) => matches.sort_by(|a, b| b.price.total_cmp(&a.price)),
            None => {}
        }

        let total_pages = matches.len().div_ceil(self.per_page);
        let skip = (query.page() - 1).saturating_mul(self.per_page);
        let products = matches.into_iter().skip(skip).take(self.per_page).collect();

        Ok(ProductPage {
            products,
            total_pages,
        })
    }

    pub async fn create(&self, input: NewProduct) -> Result<Product> {
        validate_new_product(&input)?;

        let product = self.products.create(Product::new(input)).await?;
        self.invalidation
            .invalidate(&ChangeDescriptor::products().with_admin())?;

        info!("CREATE_PRODUCT: {} in {}", product.id, product.category);
        Ok(product)
    }

    pub async fn update(&self, id: &str, update: ProductUpdate) -> Result<Product> {
        if update.is_empty() {
            return Err(Error::validation("no fields to update"));
        }

        let _guard = self.lock.acquire().await;
        let mut product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("product"))?;

        update.apply(&mut product);
        let product = self.products.update(product).await?;
        self.invalidation.invalidate(
            &ChangeDescriptor::new()
                .with_product(product.id.clone())
                .with_admin(),
        )?;

        info!("UPDATE_PRODUCT: {}", product.id);
        Ok(product)
    }

    pub async fn delete(&self, id: &str) -> Result<Product> {
        let _guard = self.lock.acquire().await;
        let product = self
            .products
            .delete(id)
            .await?
            .ok_or_else(|| Error::not_found("product"))?;

        self.invalidation
            .invalidate(&ChangeDescriptor::new().with_product(id).with_admin())?;

        info!("DELETE_PRODUCT: {}", id);
        Ok(product)
    }
}

fn validate_new_product(input: &NewProduct) -> Result<()> {
    if input.title.trim().is_empty() {
        return Err(Error::validation("title is required"));
    }
    if input.category.trim().is_empty() {
        return Err(Error::validation("category is required"));
    }
    if input.photo.trim().is_empty() {
        return Err(Error::validation("photo is required"));
    }
    if !(input.price.is_finite() && input.price > 0.0) {
        return Err(Error::validation("price must be greater than zero"));
    }
    if input.stock == 0 {
        return Err(Error::validation("stock must be greater than zero"));
    }
    Ok(())
}
