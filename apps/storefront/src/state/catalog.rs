//! # Catalog State
//!
//! Fetched products plus the user's current filter selection. The visible
//! list is derived on demand with [`storefront_core::catalog::derive`];
//! nothing is cached.

use storefront_api::{list_products_with_retry, ApiGateway, RetryPolicy};
use storefront_core::catalog::{self, CatalogView, FilterParams, SortOrder};
use storefront_core::Product;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Shown when the product list cannot be loaded.
pub const CATALOG_LOAD_ERROR: &str = "Ошибка загрузки продуктов";

#[derive(Debug, Clone)]
pub struct CatalogState {
    products: Vec<Product>,
    params: FilterParams,
    last_error: Option<String>,
    retry: RetryPolicy,
}

impl CatalogState {
    pub fn new(retry: RetryPolicy) -> Self {
        CatalogState {
            products: Vec::new(),
            params: FilterParams::default(),
            last_error: None,
            retry,
        }
    }

    /// All fetched products in backend order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// User-visible message from the last failed refresh.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.params.search_term = term.into();
    }

    /// `"all"` disables the category filter.
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.params.category = category.into();
    }

    /// `"all"` or `"<min>-<max>"`; anything else is ignored by [`view`](Self::view)
    /// with a warning.
    pub fn set_price_range(&mut self, range: impl Into<String>) {
        self.params.price_range = range.into();
    }

    pub fn set_sort(&mut self, sort_by: SortOrder) {
        self.params.sort_by = sort_by;
    }

    pub fn reset_filters(&mut self) {
        self.params = FilterParams::default();
    }

    pub fn view(&self) -> CatalogView {
        catalog::derive(&self.products, &self.params)
    }

    /// Distinct categories of the unfiltered catalog.
    pub fn categories(&self) -> Vec<String> {
        catalog::categories(&self.products)
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Reloads the product list, retrying transient failures.
    ///
    /// On failure the previous products stay visible and
    /// [`last_error`](Self::last_error) is set.
    pub async fn refresh(&mut self, gateway: &dyn ApiGateway) -> AppResult<usize> {
        match list_products_with_retry(gateway, self.retry).await {
            Ok(products) => {
                info!(count = products.len(), "Catalog refreshed");
                self.products = products;
                self.last_error = None;
                Ok(self.products.len())
            }
            Err(err) => {
                warn!(error = %err, "Catalog refresh failed");
                self.last_error = Some(CATALOG_LOAD_ERROR.to_string());
                Err(err.into())
            }
        }
    }

    /// Fetches one product for the detail page.
    pub async fn fetch_product(
        &self,
        gateway: &dyn ApiGateway,
        product_id: &str,
    ) -> AppResult<Product> {
        gateway.get_product(product_id).await.map_err(|err| {
            if err.is_not_found() {
                AppError::not_found("Product", product_id)
            } else {
                err.into()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::tests_support::{product, FakeGateway};
    use std::time::Duration;

    fn retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(1),
        }
    }

    fn products() -> Vec<Product> {
        let mut web = product("1", 5000);
        web.name = "Лендинг".to_string();
        let mut bot = product("2", 800);
        bot.name = "Телеграм-бот".to_string();
        bot.category = "Боты".to_string();
        vec![web, bot]
    }

    #[tokio::test]
    async fn test_refresh_and_filter() {
        let gateway = FakeGateway::default().with_products(products());
        let mut catalog = CatalogState::new(retry(0));

        assert_eq!(catalog.refresh(&gateway).await.unwrap(), 2);
        assert_eq!(catalog.categories(), vec!["Боты", "Веб-разработка"]);

        catalog.set_category("Боты");
        let ids: Vec<_> = catalog.view().products.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["2"]);

        catalog.set_category("all");
        catalog.set_price_range("500-5000");
        catalog.set_sort(SortOrder::PriceAsc);
        let ids: Vec<_> = catalog.view().products.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["2", "1"]);

        catalog.reset_filters();
        assert_eq!(catalog.params(), &FilterParams::default());
    }

    #[tokio::test]
    async fn test_malformed_range_is_a_warning() {
        let gateway = FakeGateway::default().with_products(products());
        let mut catalog = CatalogState::new(retry(0));
        catalog.refresh(&gateway).await.unwrap();

        catalog.set_price_range("abc");
        let view = catalog.view();
        assert_eq!(view.products.len(), 2);
        assert_eq!(view.warnings.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_retries_transient_failures() {
        let gateway = FakeGateway::default()
            .with_products(products())
            .with_product_failures(2);
        let mut catalog = CatalogState::new(retry(3));

        assert_eq!(catalog.refresh(&gateway).await.unwrap(), 2);
        assert_eq!(catalog.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_products() {
        let gateway = FakeGateway::default().with_products(products());
        let mut catalog = CatalogState::new(retry(1));
        catalog.refresh(&gateway).await.unwrap();

        let failing = FakeGateway::default().with_product_failures(5);
        let err = catalog.refresh(&failing).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::NetworkError);
        assert_eq!(catalog.last_error(), Some(CATALOG_LOAD_ERROR));
        assert_eq!(catalog.products().len(), 2);
    }

    #[tokio::test]
    async fn test_product_lookup() {
        let gateway = FakeGateway::default().with_products(products());
        let mut catalog = CatalogState::new(retry(0));
        catalog.refresh(&gateway).await.unwrap();

        assert_eq!(catalog.product("2").map(|p| p.price), Some(800));
        assert!(catalog.product("9").is_none());

        let fetched = catalog.fetch_product(&gateway, "1").await.unwrap();
        assert_eq!(fetched.name, "Лендинг");

        let err = catalog.fetch_product(&gateway, "9").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: 9");
    }
}
