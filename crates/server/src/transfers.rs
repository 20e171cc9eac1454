//! Transfer flow endpoints: initiate, complete, cancel, routing lookup.

use api_types::{
    routing::RoutingRuleView,
    transaction::TransactionView,
    transfer::{TransferCancel, TransferComplete, TransferInitiated, TransferNew},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::TransferDetails;

use crate::{ServerError, account::tx_view, server::ServerState};

pub async fn initiate(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferInitiated>), ServerError> {
    let issued = state
        .engine
        .initiate_transfer(
            &user.id,
            TransferDetails {
                recipient_name: payload.recipient_name,
                recipient_bank: payload.recipient_bank,
                recipient_account: payload.recipient_account,
                amount_minor: payload.amount_minor,
                recipient_country: payload.recipient_country,
                routing_code: payload.routing_code,
                description: payload.description,
            },
        )
        .await?;

    // The plaintext stays on the email channel; the API hands back only the
    // handle and the expiry for the countdown timer.
    Ok((
        StatusCode::CREATED,
        Json(TransferInitiated {
            code_id: issued.id,
            expires_at: issued.expires_at,
        }),
    ))
}

pub async fn complete(
    Extension(_user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferComplete>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state
        .engine
        .complete_transfer(payload.code_id, &payload.code)
        .await?;

    Ok((StatusCode::CREATED, Json(tx_view(tx))))
}

pub async fn cancel(
    Extension(_user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferCancel>,
) -> Result<StatusCode, ServerError> {
    state.engine.cancel_transfer(payload.code_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Routing-code field hints for a destination country.
///
/// `null` means the country does not use a routing code at all.
pub async fn routing_rule_get(
    Extension(_user): Extension<engine::users::Model>,
    Path(country): Path<String>,
) -> Json<Option<RoutingRuleView>> {
    let rule = engine::routing_rule(&country.to_uppercase()).map(|rule| RoutingRuleView {
        country: rule.country.to_string(),
        label: rule.label.to_string(),
        placeholder: rule.placeholder.to_string(),
        required: rule.required,
    });
    Json(rule)
}
