//! Remote restaurant and menu lookups.
//!
//! Filtering and grouping of what comes back lives in
//! [`tiffin_core::catalog`]; this module only fetches.

use std::sync::Arc;

use tracing::{debug, instrument};

use tiffin_core::{MenuItem, RestaurantId, RestaurantSummary, RestaurantType};

use crate::api::{ApiError, RestaurantPage, RestaurantQuery, StorefrontApi};

/// A restaurant together with its menu.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantDetail {
    pub restaurant: RestaurantSummary,
    pub menu: Vec<MenuItem>,
}

/// Fetches restaurant listings, details and menus.
#[derive(Clone)]
pub struct CatalogService {
    api: Arc<dyn StorefrontApi>,
    page_size: u32,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: Arc<dyn StorefrontApi>, page_size: u32) -> Self {
        Self { api, page_size }
    }

    /// First page of a listing for `kind` using the configured page size.
    #[must_use]
    pub const fn query(&self, kind: Option<RestaurantType>) -> RestaurantQuery {
        RestaurantQuery::new(self.page_size).with_kind(kind)
    }

    /// One page of restaurants.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn list_restaurants(
        &self,
        query: &RestaurantQuery,
    ) -> Result<RestaurantPage, ApiError> {
        self.api.list_restaurants(query).await
    }

    /// One restaurant by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the restaurant is unknown.
    pub async fn restaurant(&self, id: &RestaurantId) -> Result<RestaurantSummary, ApiError> {
        self.api.restaurant(id).await
    }

    /// Fetch a restaurant and its menu concurrently.
    ///
    /// Both must succeed; if either fails nothing is returned.
    ///
    /// # Errors
    ///
    /// Returns the first `ApiError` either request produced.
    #[instrument(skip(self), fields(restaurant_id = %id))]
    pub async fn restaurant_with_menu(
        &self,
        id: &RestaurantId,
    ) -> Result<RestaurantDetail, ApiError> {
        let (restaurant, menu) =
            tokio::try_join!(self.api.restaurant(id), self.api.menu(id, None))?;
        debug!(items = menu.len(), "Loaded restaurant menu");
        Ok(RestaurantDetail { restaurant, menu })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{MockApi, menu_item, restaurant};
    use tiffin_core::DietaryType;
    use tiffin_core::catalog::{DietaryFilter, MenuFilter, group_menu};

    fn catalog(api: MockApi) -> (Arc<MockApi>, CatalogService) {
        let api = Arc::new(api);
        let service = CatalogService::new(Arc::clone(&api) as Arc<dyn StorefrontApi>, 12);
        (api, service)
    }

    #[tokio::test]
    async fn test_restaurant_with_menu() {
        let api = MockApi::new()
            .with_restaurants(vec![restaurant("r1", "Annapurna", &["Indian"])])
            .with_menu(vec![
                menu_item("m1", "Samosa", DietaryType::Veg, "Starters", 4_000),
                menu_item("m2", "Chicken Wings", DietaryType::NonVeg, "Starters", 22_000),
            ]);
        let (api, service) = catalog(api);

        let detail = service
            .restaurant_with_menu(&RestaurantId::new("r1"))
            .await
            .unwrap();
        assert_eq!(detail.restaurant.restaurant_name, "Annapurna");
        assert_eq!(detail.menu.len(), 2);
        assert_eq!(api.count("restaurant"), 1);
        assert_eq!(api.count("menu"), 1);

        let veg = group_menu(
            &detail.menu,
            &MenuFilter::new("", DietaryFilter::Only(DietaryType::Veg)),
        );
        assert_eq!(veg.len(), 1);
        assert_eq!(veg.get("Starters").unwrap()[0].item_name, "Samosa");
    }

    #[tokio::test]
    async fn test_restaurant_with_menu_fails_if_either_fails() {
        let api = MockApi::new().with_restaurants(vec![restaurant("r1", "Annapurna", &[])]);
        api.fail("menu");
        let (_, service) = catalog(api);
        assert!(
            service
                .restaurant_with_menu(&RestaurantId::new("r1"))
                .await
                .is_err()
        );

        let (_, service) = catalog(MockApi::new());
        let err = service
            .restaurant_with_menu(&RestaurantId::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_query_uses_page_size() {
        let (_, service) = catalog(MockApi::new());
        let query = service.query(Some(RestaurantType::Groceries));
        assert_eq!(query.limit, 12);
        assert_eq!(query.page, 1);
        assert_eq!(query.kind, Some(RestaurantType::Groceries));
    }
}
