//! `tiffin restaurants` - one-shot restaurant listing.

use std::io::Write;

use clap::Args;

use tiffin_core::RestaurantType;
use tiffin_core::catalog::{CategoryFilter, RestaurantFilter, filter_restaurants};
use tiffin_storefront::Storefront;

use super::CommandError;
use crate::render;

#[derive(Debug, Clone, Args)]
pub struct RestaurantsArgs {
    /// Service line: `food_delivery`, `food_delivery_and_dining` or `groceries`
    #[arg(long = "type", value_parser = parse_kind)]
    pub kind: Option<RestaurantType>,

    /// Server-side name search
    #[arg(long, short)]
    pub search: Option<String>,

    /// Cuisine chip to narrow the loaded list (`all` to disable)
    #[arg(long, short, default_value = "all")]
    pub category: String,

    /// How many pages to load
    #[arg(long, default_value_t = 1)]
    pub pages: u32,
}

pub fn parse_kind(value: &str) -> Result<RestaurantType, String> {
    value.parse().map_err(|e| format!("{e}"))
}

/// Load up to `args.pages` pages, then apply the local cuisine filter.
///
/// # Errors
///
/// Returns `CommandError` if a page fails to load or output fails.
pub async fn run(
    storefront: &Storefront,
    args: &RestaurantsArgs,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let mut feed = storefront.restaurant_feed(args.kind);
    match args.search.as_deref() {
        Some(term) => feed.search(term).await?,
        None => feed.load().await?,
    }
    for _ in 1..args.pages {
        if !feed.load_more().await? {
            break;
        }
    }

    let filter = RestaurantFilter::new("", CategoryFilter::parse(&args.category));
    let visible = filter_restaurants(feed.restaurants(), &filter);
    render::restaurants(out, feed.title(), &visible)?;
    if feed.has_more() {
        writeln!(
            out,
            "(page {} of {}; use --pages to load more)",
            feed.page(),
            feed.total_pages()
        )?;
    }
    Ok(())
}
