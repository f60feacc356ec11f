//! Gatekeeper middleware.
//!
//! Runs the pipeline in front of every downstream handler and applies its
//! outcome to the live request/response.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::gatekeeper::{GateAction, RequestDescriptor};
use crate::http::server::AppState;

pub async fn gatekeeper_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();
    let descriptor = RequestDescriptor::from_parts(&parts);
    let mut req = Request::from_parts(parts, body);
    let outcome = state.gatekeeper.evaluate(&descriptor);

    match outcome.action {
        GateAction::Bypass => next.run(req).await,
        GateAction::Redirect => outcome.response.into_response(),
        GateAction::Forward => {
            if let Some(locale) = outcome.locale {
                req.extensions_mut().insert(locale);
            }
            let mut response = next.run(req).await;
            outcome.response.merge_into(response.headers_mut());
            response
        }
    }
}
