pub mod order;
pub mod product;

pub use order::{CardState, ORDER_COLUMNS, Order, OrderDraft};
pub use product::{NewProduct, Product, ProductDraft, Size, SizeDraft, SizeField, format_price};
