//! Per-invocation entry: maps API Gateway proxy events onto [`LeadIntake`].

use crate::core::form::{LeadForm, INVALID_BODY_MESSAGE};
use crate::core::intake::{IntakeReply, LeadIntake};
use crate::utils::error::IntakeError;
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl ProxyRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    fn decoded_body(&self) -> Result<Vec<u8>, IntakeError> {
        let raw = self.body.as_deref().unwrap_or_default();
        if self.is_base64_encoded {
            BASE64_STANDARD
                .decode(raw)
                .map_err(|_| IntakeError::validation(INVALID_BODY_MESSAGE))
        } else {
            Ok(raw.as_bytes().to_vec())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Serialize)]
struct RouteError {
    success: bool,
    message: &'static str,
}

#[derive(Clone)]
pub struct LambdaAdapter {
    intake: LeadIntake,
    allowed_origins: Vec<String>,
}

impl LambdaAdapter {
    pub fn new(intake: LeadIntake, allowed_origins: Vec<String>) -> Self {
        Self {
            intake,
            allowed_origins,
        }
    }

    pub async fn handle(&self, request: ProxyRequest) -> ProxyResponse {
        let path = request.path.trim_end_matches('/');
        let method = request.http_method.to_ascii_uppercase();
        tracing::debug!("{} {}", method, path);

        let mut response = match (method.as_str(), path) {
            ("OPTIONS", _) => ProxyResponse {
                status_code: 200,
                headers: HashMap::new(),
                body: String::new(),
            },
            ("POST", "/api/leads") => {
                let form = request.decoded_body().and_then(|body| {
                    LeadForm::from_body(request.header("content-type"), &body)
                });
                let reply = match form {
                    Ok(form) => self.intake.submit(form).await,
                    Err(e) => self.intake.reject(e),
                };
                json_response(reply)
            }
            (_, "/api/leads") => json_response(IntakeReply {
                status: 405,
                body: RouteError {
                    success: false,
                    message: "Method not allowed",
                },
            }),
            ("GET", "/api/health") => json_response(self.intake.health().await),
            _ => json_response(IntakeReply {
                status: 404,
                body: RouteError {
                    success: false,
                    message: "Not found",
                },
            }),
        };

        if let Some(origin) = request.header("origin") {
            if self.allowed_origins.iter().any(|allowed| allowed == origin) {
                response
                    .headers
                    .insert("Access-Control-Allow-Origin".to_string(), origin.to_string());
                response.headers.insert(
                    "Access-Control-Allow-Credentials".to_string(),
                    "true".to_string(),
                );
            }
        }
        response.headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            "GET, POST, OPTIONS, PUT, PATCH, DELETE".to_string(),
        );
        response.headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            "Origin, X-Requested-With, Content-Type, Accept, Authorization".to_string(),
        );
        response
    }
}

fn json_response<B: Serialize>(reply: IntakeReply<B>) -> ProxyResponse {
    let body = serde_json::to_string(&reply.body).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize response body: {}", e);
        r#"{"success":false}"#.to_string()
    });
    ProxyResponse {
        status_code: reply.status,
        headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
        body,
    }
}
