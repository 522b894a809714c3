use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use std::collections::HashMap;

use crate::AppState;
use crate::error::AppError;
use crate::models::{Product, ProductDraft, SizeField};
use crate::visitor::{Notice, Visitor};

#[derive(Template)]
#[template(path = "admin/panel.html")]
struct AdminPanelTemplate {
    products: Vec<ProductRow>,
    draft: ProductDraft,
    errors: HashMap<String, String>,
    notice: Option<Notice>,
    static_hash: &'static str,
}

struct ProductRow {
    name: String,
    image: String,
    price: String,
    sizes: String,
}

impl From<Product> for ProductRow {
    fn from(product: Product) -> Self {
        let sizes = product
            .sizes
            .iter()
            .map(|s| format!("{} ({})", s.name, s.stock))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            price: product.formatted_price(),
            name: product.name,
            image: product.image,
            sizes,
        }
    }
}

/// Which button submitted the product form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormAction {
    Save,
    AddSize,
    RemoveSize(usize),
}

impl FormAction {
    fn parse(value: &str) -> Self {
        match value {
            "add_size" => FormAction::AddSize,
            other => other
                .strip_prefix("remove_size:")
                .and_then(|index| index.parse().ok())
                .map(FormAction::RemoveSize)
                .unwrap_or(FormAction::Save),
        }
    }
}

/// Rebuilds the draft from the posted fields. Size rows arrive as repeated
/// `size_name`/`size_stock` pairs and are matched up by position.
fn parse_product_form(fields: Vec<(String, String)>) -> (ProductDraft, FormAction) {
    let mut draft = ProductDraft {
        sizes: Vec::new(),
        ..ProductDraft::default()
    };
    let mut action = FormAction::Save;
    let mut size_names = Vec::new();
    let mut size_stocks = Vec::new();

    for (key, value) in fields {
        match key.as_str() {
            "name" => draft.name = value,
            "image" => draft.image = value,
            "price" => draft.price = value,
            "size_name" => size_names.push(value),
            "size_stock" => size_stocks.push(value),
            "action" => action = FormAction::parse(&value),
            _ => {}
        }
    }

    let rows = size_names.len().max(size_stocks.len());
    for index in 0..rows {
        draft.add_size();
        if let Some(name) = size_names.get_mut(index) {
            draft.edit_size(index, SizeField::Name, std::mem::take(name));
        }
        if let Some(stock) = size_stocks.get_mut(index) {
            draft.edit_size(index, SizeField::Stock, std::mem::take(stock));
        }
    }

    (draft, action)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_panel))
        .route("/admin/products", post(submit_product))
}

async fn render_panel(
    state: &AppState,
    draft: ProductDraft,
    errors: HashMap<String, String>,
    notice: Option<Notice>,
) -> Result<Response, AppError> {
    let products = state.store.load_products().await?;

    let template = AdminPanelTemplate {
        products: products.into_iter().map(ProductRow::from).collect(),
        draft,
        errors,
        notice,
        static_hash: crate::STATIC_HASH,
    };
    Ok(Html(template.render()?).into_response())
}

async fn admin_panel(
    State(state): State<AppState>,
    visitor: Visitor,
) -> Result<impl IntoResponse, AppError> {
    let notice = visitor.take_notice().await?;
    render_panel(&state, ProductDraft::default(), HashMap::new(), notice).await
}

async fn submit_product(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let (mut draft, action) = parse_product_form(fields);

    match action {
        FormAction::AddSize => {
            draft.add_size();
            render_panel(&state, draft, HashMap::new(), None).await
        }
        FormAction::RemoveSize(index) => {
            draft.remove_size(index);
            render_panel(&state, draft, HashMap::new(), None).await
        }
        FormAction::Save => match draft.validate() {
            Err(errors) => render_panel(&state, draft, errors, None).await,
            Ok(new_product) => {
                let product = state.store.add_product(new_product).await?;
                visitor
                    .notify(Notice::success(format!("{} kaydedildi", product.name)))
                    .await?;
                Ok(Redirect::to("/admin").into_response())
            }
        },
    }
}
