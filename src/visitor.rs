use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tower_sessions::Session;

use crate::models::{CardState, OrderDraft};

const ORDERING_KEY: &str = "ordering";
const NOTICE_KEY: &str = "notice";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "error")]
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Success => write!(f, "success"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// A one-shot message shown on the next page the visitor sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Per-visitor UI state kept in the session: which product cards are in the
/// ordering state (with what the visitor typed), plus a pending notice.
///
/// A product with no entry in the map is browsing.
pub struct Visitor {
    session: Session,
    ordering: HashMap<String, OrderDraft>,
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;

        let ordering: HashMap<String, OrderDraft> = session
            .get(ORDERING_KEY)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();

        Ok(Visitor { session, ordering })
    }
}

impl Visitor {
    pub fn card_state(&self, product_id: &str) -> CardState {
        match self.ordering.get(product_id) {
            Some(draft) => CardState::Ordering(draft.clone()),
            None => CardState::Browsing,
        }
    }

    pub async fn set_card_state(
        &mut self,
        product_id: &str,
        state: CardState,
    ) -> Result<(), tower_sessions::session::Error> {
        match state {
            CardState::Browsing => {
                self.ordering.remove(product_id);
            }
            CardState::Ordering(draft) => {
                self.ordering.insert(product_id.to_string(), draft);
            }
        }
        self.session.insert(ORDERING_KEY, &self.ordering).await
    }

    pub async fn notify(&self, notice: Notice) -> Result<(), tower_sessions::session::Error> {
        self.session.insert(NOTICE_KEY, notice).await
    }

    pub async fn take_notice(&self) -> Result<Option<Notice>, tower_sessions::session::Error> {
        self.session.remove(NOTICE_KEY).await
    }
}
