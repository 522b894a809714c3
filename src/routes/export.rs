use axum::{
    Router,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
    routing::get,
};

use crate::AppState;
use crate::error::AppError;
use crate::export::{CONTENT_DISPOSITION, XLSX_CONTENT_TYPE, orders_workbook};

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/orders/export", get(export_orders))
}

async fn export_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let orders = state.store.load_orders().await?;
    let workbook = orders_workbook(&orders)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static(CONTENT_DISPOSITION),
    );

    tracing::info!(orders = orders.len(), "orders exported");
    Ok((headers, workbook))
}
