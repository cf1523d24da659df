use std::collections::HashSet;

use proptest::prelude::*;
use tiffin_core::catalog::{
    CategoryFilter, DietaryFilter, MenuFilter, RestaurantFilter, filter_restaurants, group_menu,
};
use tiffin_core::{DietaryType, MenuItem, MenuItemId, Price, RestaurantId, RestaurantSummary};

const NAMES: &[&str] = &["Pizza Hut", "Green Leaf", "Biryani Blues", "Wok Express", "Sweet Tooth"];
const CUISINES: &[&str] = &[
    "Pizza",
    "Fast Food",
    "Healthy",
    "Chinese Fusion",
    "Dessert",
    "Biryani",
];
const CATEGORIES: &[&str] = &["Starters", "Mains", "Desserts", "Drinks", ""];

fn restaurant_strategy() -> impl Strategy<Value = RestaurantSummary> {
    (
        prop::sample::select(NAMES),
        prop::collection::vec(prop::sample::select(CUISINES), 0..3),
        any::<u16>(),
    )
        .prop_map(|(name, cuisines, n)| RestaurantSummary {
            id: RestaurantId::new(format!("r{n}")),
            restaurant_name: name.to_owned(),
            restaurant_type: None,
            cuisine_types: cuisines.into_iter().map(str::to_owned).collect(),
            address: None,
            delivery_settings: None,
            handling_charges_percentage: None,
            rating: None,
            accepts_dining: None,
        })
}

fn dietary_strategy() -> impl Strategy<Value = Option<DietaryType>> {
    prop::option::of(prop::sample::select(vec![
        DietaryType::Veg,
        DietaryType::NonVeg,
        DietaryType::Egg,
    ]))
}

fn menu_strategy() -> impl Strategy<Value = Vec<MenuItem>> {
    prop::collection::vec(
        (
            "[a-zA-Z ]{1,12}",
            dietary_strategy(),
            prop::collection::vec(prop::sample::select(CATEGORIES), 0..3),
        ),
        0..20,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, item_type, categories))| MenuItem {
                id: MenuItemId::new(format!("m{i}")),
                item_name: name,
                item_type,
                categories: categories.into_iter().map(str::to_owned).collect(),
                base_price: Price::from_paise(5_000),
                description: None,
                display_image: None,
                is_active: true,
                is_available: None,
            })
            .collect()
    })
}

fn dietary_filter_strategy() -> impl Strategy<Value = DietaryFilter> {
    dietary_strategy().prop_map(|d| d.map_or(DietaryFilter::All, DietaryFilter::Only))
}

proptest! {
    #[test]
    fn category_narrowing_is_idempotent(
        list in prop::collection::vec(restaurant_strategy(), 0..12),
        search in "[a-z]{0,3}",
        category in prop::sample::select(vec!["all", "Pizza", "chinese", "Food", "Sushi"]),
    ) {
        let narrowed = RestaurantFilter::new(&search, CategoryFilter::parse(category));
        let once: Vec<RestaurantSummary> =
            filter_restaurants(&list, &narrowed).into_iter().cloned().collect();
        let twice = filter_restaurants(&once, &narrowed.without_category());
        let once_refs: Vec<&RestaurantSummary> = once.iter().collect();
        prop_assert_eq!(once_refs, twice);
    }

    #[test]
    fn filtering_is_deterministic(
        list in prop::collection::vec(restaurant_strategy(), 0..12),
        search in "[a-z]{0,3}",
    ) {
        let filter = RestaurantFilter::new(&search, CategoryFilter::All);
        prop_assert_eq!(filter_restaurants(&list, &filter), filter_restaurants(&list, &filter));
    }

    #[test]
    fn menu_grouping_is_a_partition(
        menu in menu_strategy(),
        search in "[a-z]{0,2}",
        dietary in dietary_filter_strategy(),
    ) {
        let filter = MenuFilter::new(&search, dietary);
        let grouping = group_menu(&menu, &filter);

        let survivors: HashSet<&str> = menu
            .iter()
            .filter(|item| filter.matches(item))
            .map(|item| item.id.as_str())
            .collect();

        let mut grouped_ids: HashSet<&str> = HashSet::new();
        for group in grouping.groups() {
            let mut seen_in_group = HashSet::new();
            for item in &group.items {
                prop_assert!(survivors.contains(item.id.as_str()));
                prop_assert!(item.category_labels().contains(&group.category));
                prop_assert!(seen_in_group.insert(item.id.as_str()), "duplicate within a group");
                grouped_ids.insert(item.id.as_str());
            }
        }
        prop_assert_eq!(&grouped_ids, &survivors);

        // each survivor appears exactly once per category it belongs to
        for item in menu.iter().filter(|item| filter.matches(item)) {
            for label in item.category_labels() {
                let group = grouping.get(label);
                prop_assert!(group.is_some());
                let hits = group.map_or(0, |items| {
                    items.iter().filter(|i| i.id == item.id).count()
                });
                prop_assert_eq!(hits, 1);
            }
        }
    }
}
