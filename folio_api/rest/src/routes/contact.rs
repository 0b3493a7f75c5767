use std::{sync::Arc, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing, Extension, Json, Router,
};
use folio_core_contact_contracts::{ContactFeatureService, ContactSendMessageError};
use folio_models::contact::FieldErrors;
use tracing::{debug, error};

use crate::{
    errors::error,
    middlewares::client_ip::ClientIp,
    models::{
        contact::{ApiContactMessage, ApiRateLimited},
        ApiResponse,
    },
};

pub fn router(service: Arc<impl ContactFeatureService>) -> Router<()> {
    Router::new()
        .route("/api/contact", routing::post(send_message))
        .with_state(service)
}

async fn send_message(
    service: State<Arc<impl ContactFeatureService>>,
    Extension(ClientIp(client_ip)): Extension<ClientIp>,
    message: Result<Json<ApiContactMessage>, JsonRejection>,
) -> Response {
    let Json(message) = match message {
        Ok(message) => message,
        Err(rejection) => return invalid_body(rejection),
    };

    match service.send_message(client_ip, message.into()).await {
        Ok(()) => Json(ApiResponse {
            success: true,
            message: "Message sent successfully!",
            code: None,
            errors: None,
        })
        .into_response(),
        Err(ContactSendMessageError::RateLimited { retry_after }) => too_many_requests(retry_after),
        Err(ContactSendMessageError::Validation(errors)) => validation_error(&errors),
        Err(ContactSendMessageError::NotConfigured) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Email service not configured. Please contact the administrator.",
            Some("email_not_configured"),
        ),
        Err(ContactSendMessageError::Authentication) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Email authentication failed. Please check your email credentials.",
            Some("email_authentication_failed"),
        ),
        Err(ContactSendMessageError::Send) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to send email. Please try again later.",
            Some("email_send_failed"),
        ),
        Err(ContactSendMessageError::Other(err)) => {
            error!("Failed to process contact message: {err:#}");
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send message. Please try again later.",
                None,
            )
        }
    }
}

fn too_many_requests(retry_after: Duration) -> Response {
    let seconds = retry_after
        .as_secs()
        .saturating_add(u64::from(retry_after.subsec_nanos() > 0))
        .max(1);

    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, seconds.to_string())],
        Json(ApiRateLimited {
            error: "Too many requests, please try again later.",
        }),
    )
        .into_response()
}

fn validation_error(errors: &FieldErrors) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse {
            success: false,
            message: "Validation error",
            code: None,
            errors: Some(errors.iter().map(Into::into).collect()),
        }),
    )
        .into_response()
}

fn invalid_body(rejection: JsonRejection) -> Response {
    debug!("Rejected contact request body: {rejection}");

    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };

    (
        status,
        Json(ApiResponse {
            success: false,
            message: "Validation error",
            code: Some("invalid_body"),
            errors: Some(Vec::new()),
        }),
    )
        .into_response()
}
