use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::Product;

/// Column names of an order record, in stored field order.
pub const ORDER_COLUMNS: [&str; 6] = [
    "id",
    "productId",
    "productName",
    "size",
    "instagramUsername",
    "orderDate",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub size: String,
    pub instagram_username: String,
    pub order_date: String,
}

impl Order {
    pub fn new(
        id: String,
        product: &Product,
        size: String,
        instagram_username: String,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            size,
            instagram_username,
            order_date: placed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Field values in the same order as [`ORDER_COLUMNS`].
    pub fn values(&self) -> [&str; 6] {
        [
            self.id.as_str(),
            self.product_id.as_str(),
            self.product_name.as_str(),
            self.size.as_str(),
            self.instagram_username.as_str(),
            self.order_date.as_str(),
        ]
    }
}

/// What a visitor has typed into a product card's order form so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub selected_size: String,
    pub instagram_username: String,
}

impl OrderDraft {
    pub fn is_complete(&self) -> bool {
        !self.selected_size.trim().is_empty() && !self.instagram_username.trim().is_empty()
    }
}

/// State of one product card for one visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CardState {
    #[default]
    Browsing,
    Ordering(OrderDraft),
}

impl CardState {
    pub fn start_ordering(self) -> Self {
        match self {
            CardState::Browsing => CardState::Ordering(OrderDraft::default()),
            ordering => ordering,
        }
    }

    /// Leaves the ordering form, dropping anything entered.
    pub fn cancel(self) -> Self {
        CardState::Browsing
    }

    pub fn draft(&self) -> Option<&OrderDraft> {
        match self {
            CardState::Browsing => None,
            CardState::Ordering(draft) => Some(draft),
        }
    }
}
