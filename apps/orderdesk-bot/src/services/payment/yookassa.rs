use std::time::Duration;

use async_trait::async_trait;
use orderdesk_core::models::{CreatedPayment, PaymentRequest};
use orderdesk_core::validation::{format_minor_units, Contact};
use orderdesk_core::{GatewayError, PaymentAdapter};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::YooKassaConfig;

pub struct YooKassaAdapter {
    client: reqwest::Client,
    api_url: String,
    shop_id: String,
    secret_key: String,
    vat_code: u8,
}

impl YooKassaAdapter {
    pub fn new(config: &YooKassaConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            shop_id: config.shop_id.clone(),
            secret_key: config.secret_key.clone(),
            vat_code: config.vat_code,
        })
    }
}

#[async_trait]
impl PaymentAdapter for YooKassaAdapter {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<CreatedPayment, GatewayError> {
        let body = payment_body(request, self.vat_code);

        let resp = self
            .client
            .post(format!("{}/payments", self.api_url))
            .basic_auth(&self.shop_id, Some(&self.secret_key))
            .header("Idempotence-Key", request.idempotency_key.to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        parse_response(status, &text)
    }

    fn name(&self) -> &str {
        "yookassa"
    }
}

/// JSON body for `POST /v3/payments`.
pub fn payment_body(request: &PaymentRequest, vat_code: u8) -> Value {
    let mut body = json!({
        "amount": {
            "value": format_minor_units(request.amount),
            "currency": request.currency,
        },
        "confirmation": {
            "type": "redirect",
            "return_url": request.return_url,
        },
        "capture": true,
        "description": request.description,
        "metadata": request.metadata,
    });

    if let Some(receipt) = &request.receipt {
        let customer = match &receipt.customer {
            Contact::Email(email) => json!({ "email": email }),
            Contact::Phone(phone) => json!({ "phone": phone.trim_start_matches('+') }),
        };
        let items: Vec<Value> = receipt
            .items
            .iter()
            .map(|item| {
                json!({
                    "description": item.description,
                    "quantity": format!("{}.00", item.quantity),
                    "amount": {
                        "value": format_minor_units(item.amount),
                        "currency": item.currency,
                    },
                    "vat_code": vat_code,
                    "payment_mode": "full_payment",
                    "payment_subject": "service",
                })
            })
            .collect();
        body["receipt"] = json!({ "customer": customer, "items": items });
    }

    body
}

#[derive(Deserialize)]
struct PaymentResponse {
    id: String,
    confirmation: Option<Confirmation>,
}

#[derive(Deserialize)]
struct Confirmation {
    confirmation_url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    description: Option<String>,
    code: Option<String>,
}

pub fn parse_response(status: u16, body: &str) -> Result<CreatedPayment, GatewayError> {
    if !(200..300).contains(&status) {
        let description = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|e| e.description.or(e.code))
            .unwrap_or_else(|| format!("HTTP {}", status));
        return Err(GatewayError::Rejected { status, description });
    }

    let payment: PaymentResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
    let confirmation_url = payment
        .confirmation
        .and_then(|c| c.confirmation_url)
        .ok_or_else(|| GatewayError::MalformedResponse("no confirmation_url".to_string()))?;

    Ok(CreatedPayment {
        id: payment.id,
        confirmation_url,
    })
}
