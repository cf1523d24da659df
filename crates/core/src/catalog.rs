//! Local search, filtering and grouping over fetched listings.
//!
//! Everything here is a pure function of its inputs: no I/O, no state kept
//! between calls. An empty source list or a filter that matches nothing yields
//! an empty result, which is not an error.

use std::collections::HashMap;

use crate::types::{DietaryType, MenuItem, RestaurantSummary};

/// Sentinel accepted wherever a category or dietary filter may be "all".
pub const ALL: &str = "all";

/// A quick-filter chip shown above the restaurant grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickCategory {
    /// Value matched against cuisine tags (`"all"` disables the filter).
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// The home screen's cuisine chips, in display order.
pub const QUICK_CATEGORIES: &[QuickCategory] = &[
    QuickCategory { id: ALL, label: "All" },
    QuickCategory { id: "Pizza", label: "🍕 Pizza" },
    QuickCategory { id: "Burger", label: "🍔 Burger" },
    QuickCategory { id: "Biryani", label: "🍲 Biryani" },
    QuickCategory { id: "Chinese", label: "🥢 Chinese" },
    QuickCategory { id: "Dessert", label: "🍰 Dessert" },
    QuickCategory { id: "Healthy", label: "🥗 Healthy" },
];

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

// =============================================================================
// Restaurants
// =============================================================================

/// Cuisine narrowing for restaurant listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Keep restaurants with a cuisine tag containing this text.
    Cuisine(String),
}

impl CategoryFilter {
    /// Parse a chip value; `"all"` (any case) or blank disables narrowing.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Cuisine(value.to_owned())
        }
    }
}

/// Search text plus cuisine category for restaurant listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestaurantFilter {
    search_lower: String,
    category_lower: Option<String>,
}

impl RestaurantFilter {
    /// Build a filter from raw search text and a category.
    #[must_use]
    pub fn new(search: &str, category: CategoryFilter) -> Self {
        Self {
            search_lower: search.to_lowercase(),
            category_lower: match category {
                CategoryFilter::All => None,
                CategoryFilter::Cuisine(c) => Some(c.to_lowercase()),
            },
        }
    }

    /// Same search text, category widened to "all".
    #[must_use]
    pub fn without_category(&self) -> Self {
        Self {
            search_lower: self.search_lower.clone(),
            category_lower: None,
        }
    }

    /// Whether `restaurant` passes both the name and the cuisine check.
    ///
    /// Cuisine matching is by substring, so `"Chinese"` keeps a restaurant
    /// tagged `"Chinese Fusion"`.
    #[must_use]
    pub fn matches(&self, restaurant: &RestaurantSummary) -> bool {
        let name_ok = contains_ignore_case(&restaurant.restaurant_name, &self.search_lower);
        let category_ok = self.category_lower.as_deref().is_none_or(|category| {
            restaurant
                .cuisine_types
                .iter()
                .any(|tag| contains_ignore_case(tag, category))
        });
        name_ok && category_ok
    }
}

/// Keep the restaurants matching `filter`, in source order.
#[must_use]
pub fn filter_restaurants<'a>(
    restaurants: &'a [RestaurantSummary],
    filter: &RestaurantFilter,
) -> Vec<&'a RestaurantSummary> {
    restaurants.iter().filter(|r| filter.matches(r)).collect()
}

// =============================================================================
// Menus
// =============================================================================

/// Dietary narrowing for menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DietaryFilter {
    #[default]
    All,
    Only(DietaryType),
}

impl DietaryFilter {
    /// Parse `all`, `veg`, `non-veg` or `egg`.
    ///
    /// # Errors
    ///
    /// Returns the parse error for any other value.
    pub fn parse(value: &str) -> Result<Self, crate::types::UnknownVariant> {
        if value.eq_ignore_ascii_case(ALL) {
            Ok(Self::All)
        } else {
            value.parse().map(Self::Only)
        }
    }

    /// Toggle-button semantics: selecting the active type clears the filter.
    #[must_use]
    pub fn toggle(self, kind: DietaryType) -> Self {
        if self == Self::Only(kind) {
            Self::All
        } else {
            Self::Only(kind)
        }
    }

    fn matches(self, item: &MenuItem) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => item.item_type == Some(kind),
        }
    }
}

/// Search text plus dietary type for a menu.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuFilter {
    search_lower: String,
    dietary: DietaryFilter,
}

impl MenuFilter {
    /// Build a filter from raw search text and a dietary choice.
    #[must_use]
    pub fn new(search: &str, dietary: DietaryFilter) -> Self {
        Self {
            search_lower: search.to_lowercase(),
            dietary,
        }
    }

    /// Whether `item` passes the name and dietary checks.
    #[must_use]
    pub fn matches(&self, item: &MenuItem) -> bool {
        contains_ignore_case(&item.item_name, &self.search_lower) && self.dietary.matches(item)
    }
}

/// Items listed under one category heading.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuGroup<'a> {
    pub category: &'a str,
    pub items: Vec<&'a MenuItem>,
}

/// A menu split into category headings.
///
/// Categories keep the order in which they were first seen; items keep source
/// order within each category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuGrouping<'a> {
    groups: Vec<MenuGroup<'a>>,
}

impl<'a> MenuGrouping<'a> {
    /// The groups in display order.
    #[must_use]
    pub fn groups(&self) -> &[MenuGroup<'a>] {
        &self.groups
    }

    /// Whether no category survived the filter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Items under `category`, if that heading exists.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&[&'a MenuItem]> {
        self.groups
            .iter()
            .find(|g| g.category == category)
            .map(|g| g.items.as_slice())
    }

    /// Category headings in display order.
    pub fn categories(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.iter().map(|g| g.category)
    }
}

/// Filter `items` and group the survivors by category.
#[must_use]
pub fn group_menu<'a>(items: &'a [MenuItem], filter: &MenuFilter) -> MenuGrouping<'a> {
    let mut groups: Vec<MenuGroup<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for item in items.iter().filter(|item| filter.matches(item)) {
        for category in item.category_labels() {
            let slot = *index.entry(category).or_insert_with(|| {
                groups.push(MenuGroup {
                    category,
                    items: Vec::new(),
                });
                groups.len() - 1
            });
            if let Some(group) = groups.get_mut(slot) {
                group.items.push(item);
            }
        }
    }

    MenuGrouping { groups }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{MenuItemId, Price, RestaurantId};

    fn restaurant(name: &str, cuisines: &[&str]) -> RestaurantSummary {
        RestaurantSummary {
            id: RestaurantId::new(name.to_lowercase().replace(' ', "-")),
            restaurant_name: name.to_owned(),
            restaurant_type: None,
            cuisine_types: cuisines.iter().map(|c| (*c).to_owned()).collect(),
            address: None,
            delivery_settings: None,
            handling_charges_percentage: None,
            rating: None,
            accepts_dining: None,
        }
    }

    fn dish(id: &str, name: &str, kind: DietaryType, category: &str) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(id),
            item_name: name.to_owned(),
            item_type: Some(kind),
            categories: vec![category.to_owned()],
            base_price: Price::from_paise(9_900),
            description: None,
            display_image: None,
            is_active: true,
            is_available: None,
        }
    }

    #[test]
    fn test_category_narrowing_picks_pizza_place() {
        let list = vec![
            restaurant("Pizza Hut", &["Pizza", "Fast Food"]),
            restaurant("Green Leaf", &["Healthy"]),
        ];
        let filter = RestaurantFilter::new("", CategoryFilter::parse("Pizza"));
        let result = filter_restaurants(&list, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].restaurant_name, "Pizza Hut");
    }

    #[test]
    fn test_category_matches_by_substring_ignoring_case() {
        let list = vec![restaurant("Dragon Bowl", &["chinese fusion"])];
        let filter = RestaurantFilter::new("", CategoryFilter::parse("Chinese"));
        assert_eq!(filter_restaurants(&list, &filter).len(), 1);
    }

    #[test]
    fn test_search_is_case_insensitive_name_substring() {
        let list = vec![
            restaurant("Biryani Blues", &["Biryani"]),
            restaurant("Burger Barn", &["Burger"]),
        ];
        let filter = RestaurantFilter::new("BLUE", CategoryFilter::All);
        let names: Vec<_> = filter_restaurants(&list, &filter)
            .into_iter()
            .map(|r| r.restaurant_name.as_str())
            .collect();
        assert_eq!(names, vec!["Biryani Blues"]);
    }

    #[test]
    fn test_all_category_parses_case_insensitively() {
        assert_eq!(CategoryFilter::parse("ALL"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse(" "), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("Dessert"),
            CategoryFilter::Cuisine("Dessert".to_string())
        );
    }

    #[test]
    fn test_veg_filter_groups_starters() {
        let menu = vec![
            dish("1", "Samosa", DietaryType::Veg, "Starters"),
            dish("2", "Chicken Wings", DietaryType::NonVeg, "Starters"),
        ];
        let veg_only = MenuFilter::new("", DietaryFilter::Only(DietaryType::Veg));
        let grouping = group_menu(&menu, &veg_only);
        assert_eq!(grouping.len(), 1);
        let starters = grouping.get("Starters").unwrap();
        assert_eq!(starters.len(), 1);
        assert_eq!(starters[0].id.as_str(), "1");
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let menu = vec![
            dish("1", "Paneer Tikka", DietaryType::Veg, "Starters"),
            dish("2", "Dal Makhani", DietaryType::Veg, "Mains"),
            dish("3", "Hara Kebab", DietaryType::Veg, "Starters"),
            dish("4", "Gulab Jamun", DietaryType::Veg, "Desserts"),
        ];
        let grouping = group_menu(&menu, &MenuFilter::default());
        let categories: Vec<_> = grouping.categories().collect();
        assert_eq!(categories, vec!["Starters", "Mains", "Desserts"]);
        let starters: Vec<_> = grouping
            .get("Starters")
            .unwrap()
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(starters, vec!["1", "3"]);
    }

    #[test]
    fn test_item_in_several_categories_appears_in_each() {
        let mut roll = dish("1", "Egg Roll", DietaryType::Egg, "Rolls");
        roll.categories.push("Snacks".to_owned());
        let menu = vec![roll];
        let grouping = group_menu(&menu, &MenuFilter::new("roll", DietaryFilter::All));
        assert_eq!(grouping.get("Rolls").map(<[_]>::len), Some(1));
        assert_eq!(grouping.get("Snacks").map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_no_match_and_empty_input_yield_empty_grouping() {
        let menu = vec![dish("1", "Samosa", DietaryType::Veg, "Starters")];
        assert!(group_menu(&menu, &MenuFilter::new("pizza", DietaryFilter::All)).is_empty());
        assert!(group_menu(&[], &MenuFilter::default()).is_empty());
        assert!(filter_restaurants(&[], &RestaurantFilter::default()).is_empty());
    }

    #[test]
    fn test_item_without_type_only_passes_all() {
        let mut plain = dish("1", "Water", DietaryType::Veg, "Drinks");
        plain.item_type = None;
        let menu = vec![plain];
        let veg_only = MenuFilter::new("", DietaryFilter::Only(DietaryType::Veg));
        assert!(group_menu(&menu, &veg_only).is_empty());
        assert_eq!(group_menu(&menu, &MenuFilter::default()).len(), 1);
    }

    #[test]
    fn test_dietary_toggle() {
        let veg = DietaryFilter::All.toggle(DietaryType::Veg);
        assert_eq!(veg, DietaryFilter::Only(DietaryType::Veg));
        assert_eq!(veg.toggle(DietaryType::Veg), DietaryFilter::All);
        assert_eq!(
            veg.toggle(DietaryType::NonVeg),
            DietaryFilter::Only(DietaryType::NonVeg)
        );
        assert_eq!(DietaryFilter::parse("ALL").unwrap(), DietaryFilter::All);
        assert!(DietaryFilter::parse("vegan").is_err());
    }
}
