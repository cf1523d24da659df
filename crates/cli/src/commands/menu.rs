//! `tiffin menu` - a restaurant's menu grouped by category.

use std::io::Write;

use clap::Args;

use tiffin_core::RestaurantId;
use tiffin_core::catalog::{DietaryFilter, MenuFilter, group_menu};
use tiffin_storefront::Storefront;

use super::CommandError;
use crate::render;

#[derive(Debug, Clone, Args)]
pub struct MenuArgs {
    /// Restaurant id
    pub restaurant_id: String,

    /// Only dishes whose name contains this text
    #[arg(long, short, default_value = "")]
    pub search: String,

    /// `all`, `veg`, `non-veg` or `egg`
    #[arg(long, short, default_value = "all", value_parser = parse_diet)]
    pub diet: DietaryFilter,
}

pub fn parse_diet(value: &str) -> Result<DietaryFilter, String> {
    DietaryFilter::parse(value).map_err(|e| format!("{e}"))
}

/// Fetch the restaurant and its menu together, then group locally.
///
/// # Errors
///
/// Returns `CommandError` if either fetch fails or output fails.
pub async fn run(
    storefront: &Storefront,
    args: &MenuArgs,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let detail = storefront
        .catalog()
        .restaurant_with_menu(&RestaurantId::new(args.restaurant_id.as_str()))
        .await?;

    let grouping = group_menu(&detail.menu, &MenuFilter::new(&args.search, args.diet));
    render::menu(out, &detail.restaurant, &grouping)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tiffin_core::DietaryType;

    #[test]
    fn test_parse_diet() {
        assert_eq!(parse_diet("all").unwrap(), DietaryFilter::All);
        assert_eq!(
            parse_diet("non-veg").unwrap(),
            DietaryFilter::Only(DietaryType::NonVeg)
        );
        assert!(parse_diet("vegan").is_err());
    }
}
