use crate::adapter::app_config::PaymentConfig;
use crate::domain::model::PaymentReference;
use crate::domain::port::{
    GatewayPaymentStatus, InitiatedPayment, PaymentGateway, PaymentGatewayError,
    PaymentInitiation, PaymentVerification,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Khalti決済ゲートウェイ
/// 決済の開始と照合をHTTPで呼び出すだけで、ビジネスロジックは持たない
#[derive(Clone)]
pub struct KhaltiPaymentGateway {
    client: Client,
    secret_key: String,
    base_url: String,
    website_url: String,
}

#[derive(Debug, Serialize)]
struct InitiateRequest<'a> {
    return_url: &'a str,
    website_url: &'a str,
    amount: i64,
    purchase_order_id: &'a str,
    purchase_order_name: &'a str,
    customer_info: CustomerInfoBody<'a>,
}

#[derive(Debug, Serialize)]
struct CustomerInfoBody<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct InitiateResponse {
    #[serde(alias = "pidx")]
    payment_reference: String,
    #[serde(alias = "payment_url")]
    payment_redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: String,
    #[serde(default)]
    transaction_id: Option<String>,
    total_amount: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

impl KhaltiPaymentGateway {
    /// 設定からゲートウェイクライアントを作成
    ///
    /// # Arguments
    /// * `config` - 秘密鍵、ベースURL、タイムアウトなど
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentGatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentGatewayError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            website_url: config.website_url.clone(),
        })
    }

    fn authorization(&self) -> String {
        format!("Key {}", self.secret_key)
    }

    /// ステータスコードを見て成功レスポンスのみJSONとして解釈する
    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: Response,
    ) -> Result<T, PaymentGatewayError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| PaymentGatewayError::InvalidResponse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }
}

/// 失敗レスポンスをエラーに分類する
/// 5xxは決済結果が不明なので到達不能扱い、4xxはゲートウェイの拒否
fn classify_failure(status: StatusCode, body: &str) -> PaymentGatewayError {
    if status.is_server_error() {
        return PaymentGatewayError::Unavailable(format!("HTTP {}", status.as_u16()));
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|error| error.detail)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                body.trim().to_string()
            }
        });
    PaymentGatewayError::Rejected(message)
}

fn send_failure(err: reqwest::Error) -> PaymentGatewayError {
    if err.is_timeout() {
        PaymentGatewayError::Unavailable(format!("request timed out: {}", err))
    } else {
        PaymentGatewayError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl PaymentGateway for KhaltiPaymentGateway {
    async fn initiate(
        &self,
        request: PaymentInitiation,
    ) -> Result<InitiatedPayment, PaymentGatewayError> {
        let body = InitiateRequest {
            return_url: &request.return_url,
            website_url: &self.website_url,
            amount: request.amount_minor,
            purchase_order_id: &request.order_id,
            purchase_order_name: &request.order_name,
            customer_info: CustomerInfoBody {
                name: &request.customer.name,
                email: &request.customer.email,
                phone: request.customer.phone.as_deref(),
            },
        };

        let response = self
            .client
            .post(format!("{}/payment/initiate", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&body)
            .send()
            .await
            .map_err(send_failure)?;

        let initiated: InitiateResponse = Self::read_json(response).await?;
        let reference = PaymentReference::new(initiated.payment_reference)
            .map_err(|e| PaymentGatewayError::InvalidResponse(e.to_string()))?;

        tracing::debug!(pidx = %reference, order_id = %request.order_id, "Khalti payment initiated");

        Ok(InitiatedPayment {
            reference,
            redirect_url: initiated.payment_redirect_url,
        })
    }

    async fn verify(
        &self,
        reference: &PaymentReference,
    ) -> Result<PaymentVerification, PaymentGatewayError> {
        let response = self
            .client
            .get(format!("{}/payment/verify", self.base_url))
            .query(&[("pidx", reference.as_str())])
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(send_failure)?;

        let verified: VerifyResponse = Self::read_json(response).await?;
        tracing::debug!(pidx = %reference, status = %verified.status, "Khalti payment looked up");

        Ok(PaymentVerification {
            status: GatewayPaymentStatus::parse(&verified.status),
            transaction_id: verified.transaction_id,
            total_amount: verified.total_amount,
        })
    }
}
