//! Plain-text rendering of storefront data.
//!
//! Everything writes to a caller-supplied `Write` so the shell, the one-shot
//! commands and the tests share the same output.

use std::io::{self, Write};

use tiffin_core::catalog::{MenuGrouping, QUICK_CATEGORIES};
use tiffin_core::{CartSummary, DietaryType, MenuItem, Order, Price, RestaurantSummary, UserProfile};
use tiffin_storefront::cart::CartSnapshot;

fn diet_marker(item: &MenuItem) -> &'static str {
    match item.item_type {
        Some(DietaryType::Veg) => "[veg]",
        Some(DietaryType::NonVeg) => "[non-veg]",
        Some(DietaryType::Egg) => "[egg]",
        None => "",
    }
}

/// Cuisine chips, one per line.
pub fn quick_categories(out: &mut impl Write) -> io::Result<()> {
    let labels: Vec<String> = QUICK_CATEGORIES
        .iter()
        .map(|c| format!("{} ({})", c.label, c.id))
        .collect();
    writeln!(out, "Categories: {}", labels.join("  "))
}

pub fn restaurants(
    out: &mut impl Write,
    title: &str,
    restaurants: &[&RestaurantSummary],
) -> io::Result<()> {
    writeln!(out, "== {title} ==")?;
    if restaurants.is_empty() {
        return writeln!(out, "No restaurants found.");
    }
    for r in restaurants {
        let rating = r.rating.map_or_else(String::new, |x| format!("  ★ {x:.1}"));
        writeln!(out, "{}  ({}){rating}", r.restaurant_name, r.id)?;
        writeln!(out, "    {}", r.location_label())?;
        if !r.cuisine_types.is_empty() {
            writeln!(out, "    {}", r.cuisine_types.join(", "))?;
        }
        writeln!(out, "    {} · {}", r.delivery_label(), r.handling_fee_label())?;
    }
    Ok(())
}

pub fn menu(
    out: &mut impl Write,
    restaurant: &RestaurantSummary,
    grouping: &MenuGrouping<'_>,
) -> io::Result<()> {
    writeln!(out, "== {} ==", restaurant.restaurant_name)?;
    writeln!(out, "{}", restaurant.location_label())?;
    if grouping.is_empty() {
        return writeln!(out, "No dishes match your filters.");
    }
    for group in grouping.groups() {
        writeln!(out)?;
        writeln!(out, "{} ({})", group.category, group.items.len())?;
        for item in &group.items {
            let unavailable = if item.can_order() { "" } else { "  (unavailable)" };
            writeln!(
                out,
                "  {:<28} {:>10}  {:<9} {}{unavailable}",
                item.item_name,
                item.base_price.to_string(),
                diet_marker(item),
                item.id
            )?;
        }
    }
    Ok(())
}

fn summary_line(out: &mut impl Write, label: &str, amount: Option<Price>) -> io::Result<()> {
    match amount {
        Some(amount) => writeln!(out, "  {label:<18} {:>10}", amount.to_string()),
        None => Ok(()),
    }
}

fn summary(out: &mut impl Write, summary: &CartSummary) -> io::Result<()> {
    summary_line(out, "Subtotal", summary.subtotal)?;
    summary_line(out, "Tax", summary.tax_amount)?;
    summary_line(out, "Delivery fee", summary.delivery_fee)?;
    summary_line(out, "Handling charges", summary.handling_charges)?;
    summary_line(out, "Discount", summary.discount)?;
    summary_line(out, "Total", Some(summary.total_amount))
}

pub fn cart(out: &mut impl Write, snapshot: &CartSnapshot) -> io::Result<()> {
    if snapshot.busy {
        writeln!(out, "(updating...)")?;
    }
    if snapshot.cart.is_empty() {
        return writeln!(out, "Your cart is empty.");
    }
    for item in snapshot.cart.items() {
        writeln!(
            out,
            "  {:<24} x{:<3} {:>10}  [{}]",
            item.name(),
            item.quantity,
            item.total_price.to_string(),
            item.cart_item_key
        )?;
    }
    match snapshot.cart.summary() {
        Some(s) => summary(out, s),
        None => writeln!(out, "  Total unavailable"),
    }
}

pub fn orders(out: &mut impl Write, orders: &[Order]) -> io::Result<()> {
    if orders.is_empty() {
        return writeln!(out, "No orders yet.");
    }
    for order in orders {
        let placed = order
            .created_at
            .map_or_else(String::new, |at| at.format("  %d %b %Y %H:%M").to_string());
        writeln!(
            out,
            "#{}  {}  {}{placed}",
            order.reference(),
            order.status,
            order.total_amount
        )?;
        for line in &order.items {
            let name = line.item_name.as_deref().unwrap_or("Item");
            let price = line.total_price.map_or_else(String::new, |p| p.to_string());
            writeln!(out, "    {name} x{}  {price}", line.quantity)?;
        }
    }
    Ok(())
}

pub fn user(out: &mut impl Write, user: Option<&UserProfile>) -> io::Result<()> {
    match user {
        Some(user) => writeln!(out, "Signed in as {} <{}>", user.display_name(), user.email),
        None => writeln!(out, "Not signed in."),
    }
}
