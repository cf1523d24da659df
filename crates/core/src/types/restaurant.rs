//! Read-only projections of restaurant and menu records.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::{DietaryType, MenuItemId, Price, RestaurantId, RestaurantType};

/// Category label used for menu items the restaurant left uncategorized.
pub const DEFAULT_MENU_CATEGORY: &str = "Main Course";

// =============================================================================
// Restaurants
// =============================================================================

/// A restaurant as listed by `GET /restaurants` and `GET /restaurants/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: RestaurantId,
    #[serde(default = "unknown_name")]
    pub restaurant_name: String,
    #[serde(default)]
    pub restaurant_type: Option<RestaurantType>,
    #[serde(default)]
    pub cuisine_types: Vec<String>,
    #[serde(default)]
    pub address: Option<RestaurantAddress>,
    #[serde(default)]
    pub delivery_settings: Option<DeliverySettings>,
    #[serde(default)]
    pub handling_charges_percentage: Option<Decimal>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub accepts_dining: Option<bool>,
}

fn unknown_name() -> String {
    "Unknown".to_string()
}

/// Postal location of a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantAddress {
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

/// Delivery radii in miles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySettings {
    #[serde(default)]
    pub free_delivery_radius: Option<f64>,
    #[serde(default)]
    pub max_delivery_radius: Option<f64>,
}

impl RestaurantSummary {
    /// `"City, Area"` with placeholders for missing parts.
    #[must_use]
    pub fn location_label(&self) -> String {
        let address = self.address.as_ref();
        let city = address
            .and_then(|a| a.city.as_deref())
            .unwrap_or("Unknown City");
        let area = address.and_then(|a| a.area.as_deref()).unwrap_or("Area");
        format!("{city}, {area}")
    }

    /// Short delivery note for listings.
    #[must_use]
    pub fn delivery_label(&self) -> String {
        match self.delivery_settings.and_then(|d| d.max_delivery_radius) {
            Some(radius) => format!("Delivers up to {radius} miles"),
            None => "Delivery Available".to_string(),
        }
    }

    /// Handling fee note for listings.
    #[must_use]
    pub fn handling_fee_label(&self) -> String {
        match self.handling_charges_percentage {
            Some(pct) if pct > Decimal::ZERO => format!("{pct}% Handling Fee"),
            _ => "No Handling Fee".to_string(),
        }
    }
}

// =============================================================================
// Menu items
// =============================================================================

/// A dish as returned by `GET /menu-items/restaurant/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: MenuItemId,
    pub item_name: String,
    #[serde(default)]
    pub item_type: Option<DietaryType>,
    /// Category labels. The backend sends a single string; lists are accepted
    /// for items shown under several headings.
    #[serde(default, rename = "category", deserialize_with = "one_or_many")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub base_price: Price,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_available: Option<bool>,
}

const fn default_true() -> bool {
    true
}

impl MenuItem {
    /// Category headings this item is listed under, without duplicates.
    ///
    /// Uncategorized items fall under [`DEFAULT_MENU_CATEGORY`].
    #[must_use]
    pub fn category_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::with_capacity(self.categories.len().max(1));
        for label in self.categories.iter().map(String::as_str) {
            let label = if label.trim().is_empty() {
                DEFAULT_MENU_CATEGORY
            } else {
                label
            };
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        if labels.is_empty() {
            labels.push(DEFAULT_MENU_CATEGORY);
        }
        labels
    }

    /// Whether the item can be added to a cart right now.
    #[must_use]
    pub fn can_order(&self) -> bool {
        self.is_active && self.is_available.unwrap_or(true)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(label)) => vec![label],
        Some(OneOrMany::Many(labels)) => labels,
        None => Vec::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_restaurant_defaults_for_sparse_records() {
        let restaurant: RestaurantSummary = serde_json::from_str(r#"{"_id":"r1"}"#).unwrap();
        assert_eq!(restaurant.restaurant_name, "Unknown");
        assert!(restaurant.cuisine_types.is_empty());
        assert_eq!(restaurant.location_label(), "Unknown City, Area");
        assert_eq!(restaurant.delivery_label(), "Delivery Available");
        assert_eq!(restaurant.handling_fee_label(), "No Handling Fee");
    }

    #[test]
    fn test_restaurant_full_record() {
        let restaurant: RestaurantSummary = serde_json::from_str(
            r#"{
                "_id": "r2",
                "restaurantName": "Pizza Hut",
                "restaurantType": "food_delivery",
                "cuisineTypes": ["Pizza", "Fast Food"],
                "address": {"city": "Pune", "area": "Baner"},
                "deliverySettings": {"freeDeliveryRadius": 2, "maxDeliveryRadius": 8},
                "handlingChargesPercentage": 5
            }"#,
        )
        .unwrap();
        assert_eq!(restaurant.restaurant_type, Some(RestaurantType::FoodDelivery));
        assert_eq!(restaurant.location_label(), "Pune, Baner");
        assert_eq!(restaurant.delivery_label(), "Delivers up to 8 miles");
        assert_eq!(restaurant.handling_fee_label(), "5% Handling Fee");
    }

    #[test]
    fn test_menu_item_category_forms() {
        let single: MenuItem = serde_json::from_str(
            r#"{"_id":"m1","itemName":"Samosa","itemType":"veg","category":"Starters","basePrice":40}"#,
        )
        .unwrap();
        assert_eq!(single.category_labels(), vec!["Starters"]);

        let many: MenuItem = serde_json::from_str(
            r#"{"_id":"m2","itemName":"Paneer Roll","category":["Rolls","Starters","Rolls"]}"#,
        )
        .unwrap();
        assert_eq!(many.category_labels(), vec!["Rolls", "Starters"]);

        let none: MenuItem =
            serde_json::from_str(r#"{"_id":"m3","itemName":"Thali","category":null}"#).unwrap();
        assert_eq!(none.category_labels(), vec![DEFAULT_MENU_CATEGORY]);
    }

    #[test]
    fn test_menu_item_orderability() {
        let mut item: MenuItem =
            serde_json::from_str(r#"{"_id":"m4","itemName":"Lassi"}"#).unwrap();
        assert!(item.can_order());
        item.is_active = false;
        assert!(!item.can_order());
    }
}
