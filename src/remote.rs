//! Client for the league's admin REST API.
//!
//! A [`Session`] is built once from config and handed to [`ApiClient`];
//! nothing reads the token from anywhere else. Every request sends the
//! bearer token, and mutating requests send a fresh `Idempotency-Key`.
//! There are no retries: a failure is reported with the server's own
//! message when it sent one.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use ureq::Agent;

use crate::config::ApiSettings;
use crate::error::{BillingError, Result};
use crate::invoice::{Invoice, InvoiceStatus};
use crate::plan::PaymentPlan;

pub const TOKEN_ENV: &str = "LEAGUE_API_TOKEN";

/// Authenticated connection details
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    token: String,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Build from `[api]` settings; `env_token` (normally `LEAGUE_API_TOKEN`)
    /// takes precedence over the configured token.
    pub fn from_settings(api: &ApiSettings, env_token: Option<String>) -> Result<Self> {
        let base_url = api
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or(BillingError::ApiNotConfigured)?;
        let token = env_token
            .or_else(|| api.token.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or(BillingError::MissingToken)?;
        Ok(Self::new(base_url, token))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/admin/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[derive(Debug, Serialize)]
struct RejectRequest<'a> {
    affiliate_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ApproveRequest {
    affiliate_id: u32,
}

pub struct ApiClient {
    session: Session,
    agent: Agent,
}

impl ApiClient {
    pub fn new(session: Session) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(10)))
            .http_status_as_error(false)
            .build()
            .into();
        Self { session, agent }
    }

    pub fn list_invoices(&self) -> Result<Value> {
        self.get("invoices")
    }

    pub fn create_invoice(&self, invoice: &Invoice) -> Result<Value> {
        self.post("invoices", invoice)
    }

    pub fn update_invoice_status(&self, id: &str, status: InvoiceStatus) -> Result<Value> {
        let path = format!("invoices/{}/status", urlencoding::encode(id));
        let url = format!(
            "{}?status={}",
            self.session.endpoint(&path),
            urlencoding::encode(status.as_str())
        );
        self.put_empty(&url)
    }

    pub fn list_payment_plans(&self) -> Result<Value> {
        self.get("payment-plans")
    }

    pub fn create_payment_plan(&self, plan: &PaymentPlan) -> Result<Value> {
        self.post("payment-plans", plan)
    }

    pub fn plan_transactions(&self, plan_id: u32) -> Result<Value> {
        self.get(&format!("payment-plans/{plan_id}/transactions"))
    }

    pub fn mark_transaction_paid(&self, txn_id: u32) -> Result<Value> {
        let url = self
            .session
            .endpoint(&format!("payment-plan-transactions/{txn_id}/mark-paid"));
        self.put_empty(&url)
    }

    pub fn affiliate_applications(&self) -> Result<Value> {
        self.get("affiliates/applications")
    }

    pub fn approve_affiliate(&self, affiliate_id: u32) -> Result<Value> {
        self.post("affiliates/approve", &ApproveRequest { affiliate_id })
    }

    pub fn reject_affiliate(&self, affiliate_id: u32, reason: Option<&str>) -> Result<Value> {
        self.post("affiliates/reject", &RejectRequest { affiliate_id, reason })
    }

    pub fn process_payouts(&self) -> Result<Value> {
        self.post("affiliates/process-payouts", &serde_json::json!({}))
    }

    fn get(&self, path: &str) -> Result<Value> {
        let url = self.session.endpoint(path);
        tracing::debug!(%url, "GET");
        let response = self
            .agent
            .get(url.as_str())
            .header("Authorization", self.session.bearer().as_str())
            .call()
            .map_err(|e| transport_error(&url, e))?;
        read_response(&url, response)
    }

    fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value> {
        let url = self.session.endpoint(path);
        let payload = serde_json::to_string(body)?;
        let key = idempotency_key();
        tracing::debug!(%url, idempotency_key = %key, "POST");
        let response = self
            .agent
            .post(url.as_str())
            .header("Authorization", self.session.bearer().as_str())
            .header("Content-Type", "application/json")
            .header("Idempotency-Key", key.as_str())
            .send(payload.as_str())
            .map_err(|e| transport_error(&url, e))?;
        read_response(&url, response)
    }

    fn put_empty(&self, url: &str) -> Result<Value> {
        let key = idempotency_key();
        tracing::debug!(%url, idempotency_key = %key, "PUT");
        let response = self
            .agent
            .put(url)
            .header("Authorization", self.session.bearer().as_str())
            .header("Idempotency-Key", key.as_str())
            .send_empty()
            .map_err(|e| transport_error(url, e))?;
        read_response(url, response)
    }
}

fn idempotency_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn transport_error(url: &str, err: ureq::Error) -> BillingError {
    tracing::warn!(%url, error = %err, "request failed");
    BillingError::Remote(format!("Could not reach {url}: {err}"))
}

fn read_response(url: &str, mut response: ureq::http::Response<ureq::Body>) -> Result<Value> {
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| transport_error(url, e))?;

    if !(200..300).contains(&status) {
        tracing::warn!(%url, status, "server rejected request");
        return Err(BillingError::Remote(error_message(status, &body)));
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| BillingError::Remote(format!("Invalid response from {url}: {e}")))
}

/// The server's error text when the body carries one, else a generic line.
pub fn error_message(status: u16, body: &str) -> String {
    let from_server = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "error", "detail"]
            .iter()
            .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
    });
    match from_server {
        Some(message) if !message.trim().is_empty() => message,
        _ => format!("Request failed with status {status}"),
    }
}
