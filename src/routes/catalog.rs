use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::models::{CardState, OrderDraft, Product};
use crate::store::StoreError;
use crate::visitor::{Notice, Visitor};

const MISSING_FIELDS: &str = "Lütfen beden ve Instagram kullanıcı adınızı giriniz";
const ORDER_RECEIVED: &str = "Siparişiniz alınmıştır!";
const OUT_OF_STOCK: &str = "Seçtiğiniz beden tükendi";
const UNKNOWN_SIZE: &str = "Seçtiğiniz beden bu üründe bulunmuyor";

#[derive(Template)]
#[template(path = "catalog/list.html")]
struct CatalogTemplate {
    cards: Vec<CardView>,
    notice: Option<Notice>,
    static_hash: &'static str,
}

struct SizeView {
    name: String,
    stock: i64,
    available: bool,
}

struct CardView {
    id: String,
    name: String,
    image: String,
    price: String,
    sizes: Vec<SizeView>,
    ordering: bool,
    selected_size: String,
    instagram_username: String,
}

impl CardView {
    fn new(product: Product, state: CardState) -> Self {
        let price = product.formatted_price();
        let draft = state.draft().cloned();
        let sizes = product
            .sizes
            .into_iter()
            .map(|s| SizeView {
                available: s.is_available(),
                name: s.name,
                stock: s.stock,
            })
            .collect();

        Self {
            id: product.id,
            name: product.name,
            image: product.image,
            price,
            sizes,
            ordering: draft.is_some(),
            selected_size: draft.as_ref().map(|d| d.selected_size.clone()).unwrap_or_default(),
            instagram_username: draft.map(|d| d.instagram_username).unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    size: String,
    #[serde(default)]
    instagram_username: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/products/{id}/order", post(start_order))
        .route("/products/{id}/order/cancel", post(cancel_order))
        .route("/products/{id}/order/confirm", post(confirm_order))
}

async fn require_product(state: &AppState, id: &str) -> Result<Product, AppError> {
    state.store.find_product(id).await?.ok_or(AppError::NotFound)
}

async fn list_products(
    State(state): State<AppState>,
    visitor: Visitor,
) -> Result<impl IntoResponse, AppError> {
    let products = state.store.load_products().await?;

    let cards: Vec<CardView> = products
        .into_iter()
        .map(|product| {
            let card_state = visitor.card_state(&product.id);
            CardView::new(product, card_state)
        })
        .collect();

    let template = CatalogTemplate {
        cards,
        notice: visitor.take_notice().await?,
        static_hash: crate::STATIC_HASH,
    };
    Ok(Html(template.render()?))
}

async fn start_order(
    State(state): State<AppState>,
    mut visitor: Visitor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = require_product(&state, &id).await?;

    let next = visitor.card_state(&product.id).start_ordering();
    visitor.set_card_state(&product.id, next).await?;

    Ok(Redirect::to("/"))
}

async fn cancel_order(
    State(state): State<AppState>,
    mut visitor: Visitor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = require_product(&state, &id).await?;

    let next = visitor.card_state(&product.id).cancel();
    visitor.set_card_state(&product.id, next).await?;

    Ok(Redirect::to("/"))
}

async fn confirm_order(
    State(state): State<AppState>,
    mut visitor: Visitor,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Result<impl IntoResponse, AppError> {
    let product = require_product(&state, &id).await?;

    let mut draft = OrderDraft {
        selected_size: form.size,
        instagram_username: form.instagram_username,
    };

    if !draft.is_complete() {
        visitor
            .set_card_state(&product.id, CardState::Ordering(draft))
            .await?;
        visitor.notify(Notice::error(MISSING_FIELDS)).await?;
        return Ok(Redirect::to("/"));
    }

    let placed = state
        .store
        .place_order(
            &product.id,
            draft.selected_size.trim(),
            draft.instagram_username.trim(),
        )
        .await;

    let rejection = match placed {
        Ok(_) => {
            visitor.set_card_state(&product.id, CardState::Browsing).await?;
            visitor.notify(Notice::success(ORDER_RECEIVED)).await?;
            return Ok(Redirect::to("/"));
        }
        Err(StoreError::OutOfStock) => OUT_OF_STOCK,
        Err(StoreError::UnknownSize) => UNKNOWN_SIZE,
        Err(e) => return Err(e.into()),
    };

    tracing::warn!(product_id = %product.id, size = %draft.selected_size, "order rejected: {rejection}");
    draft.selected_size.clear();
    visitor
        .set_card_state(&product.id, CardState::Ordering(draft))
        .await?;
    visitor.notify(Notice::error(rejection)).await?;

    Ok(Redirect::to("/"))
}
