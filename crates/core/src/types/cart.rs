//! Cart lines and the server-computed price summary.

use serde::{Deserialize, Serialize};

use super::{CartItemKey, MenuItemId, Price};

/// Reference to the menu item a cart line was created from.
///
/// The backend returns either the bare id or the populated menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MenuItemRef {
    Id(MenuItemId),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: MenuItemId,
        #[serde(default, rename = "itemName")]
        item_name: Option<String>,
    },
}

impl MenuItemRef {
    /// The referenced menu item id.
    #[must_use]
    pub const fn id(&self) -> &MenuItemId {
        match self {
            Self::Id(id) | Self::Populated { id, .. } => id,
        }
    }

    /// Item name, when the reference was populated.
    #[must_use]
    pub fn item_name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated { item_name, .. } => item_name.as_deref(),
        }
    }
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_item_key: CartItemKey,
    #[serde(rename = "menuItemId")]
    pub menu_item: MenuItemRef,
    pub quantity: u32,
    pub total_price: Price,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub unit_price: Option<Price>,
}

impl CartItem {
    /// Best available name for the line.
    #[must_use]
    pub fn name(&self) -> &str {
        self.item_name
            .as_deref()
            .or_else(|| self.menu_item.item_name())
            .unwrap_or_else(|| self.menu_item.id().as_str())
    }
}

/// Totals for the cart as computed by `GET /cart/summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub total_amount: Price,
    #[serde(default)]
    pub subtotal: Option<Price>,
    #[serde(default)]
    pub tax_amount: Option<Price>,
    #[serde(default)]
    pub delivery_fee: Option<Price>,
    #[serde(default)]
    pub handling_charges: Option<Price>,
    #[serde(default)]
    pub discount: Option<Price>,
    #[serde(default)]
    pub item_count: Option<u32>,
}

/// Cart contents plus its summary.
///
/// Lines with a zero quantity are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    summary: Option<CartSummary>,
}

impl Cart {
    /// An empty cart with no summary.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            summary: None,
        }
    }

    /// Build a cart from server data, dropping non-positive lines.
    #[must_use]
    pub fn new(items: Vec<CartItem>, summary: Option<CartSummary>) -> Self {
        let items = items.into_iter().filter(|item| item.quantity > 0).collect();
        Self { items, summary }
    }

    /// Lines in server order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Server-computed summary, if loaded.
    #[must_use]
    pub const fn summary(&self) -> Option<&CartSummary> {
        self.summary.as_ref()
    }

    /// Server-computed total, if a summary is loaded.
    #[must_use]
    pub fn total_amount(&self) -> Option<Price> {
        self.summary.as_ref().map(|s| s.total_amount)
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a line with `key` is present.
    #[must_use]
    pub fn contains(&self, key: &CartItemKey) -> bool {
        self.items.iter().any(|item| &item.cart_item_key == key)
    }

    /// Look up a line by key.
    #[must_use]
    pub fn get(&self, key: &CartItemKey) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.cart_item_key == key)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
