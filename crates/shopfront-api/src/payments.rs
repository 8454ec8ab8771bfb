//! Payment and subscription API.
//!
//! Shares the auth client's dispatch path, so every call here carries the
//! bearer token and participates in 401 invalidation. The backend owns
//! all payment state; these are transient views of its responses.

use crate::{ApiClient, AuthError, AuthResult};
use serde::{Deserialize, Serialize};

/// One-time payment intent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    Succeeded,
    Canceled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentPayload {
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
}

/// Stored payment method (cards only in this backend version).
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub card: CardDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub brand: String,
    pub last4: String,
    pub exp_month: u8,
    pub exp_year: u16,
}

/// Active subscription as reported by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub status: SubscriptionStatus,
    pub plan_id: String,
    pub plan_name: String,
    pub amount: i64,
    pub currency: String,
    pub current_period_end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionPayload {
    pub plan_id: String,
    pub payment_method_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub amount: i64,
    pub currency: String,
    pub interval: PlanInterval,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanInterval {
    Month,
    Year,
}

/// Stripe Checkout session creation request.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionRequest {
    pub order_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub checkout_url: String,
    pub order_id: i64,
}

/// Settlement state of an order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

#[derive(Debug, Clone)]
pub struct PaymentStatusResponse {
    pub status: PaymentStatus,
    pub payment_details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentHistoryItem {
    pub id: i64,
    pub order_id: i64,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentHistoryStatus,
    pub payment_method: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentHistoryStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundRequest {
    pub order_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Refund as reported by the backend. The backend passes Stripe's object
/// through loosely, so both fields may be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
struct PaymentMethodsBody {
    #[serde(rename = "paymentMethods")]
    payment_methods: Vec<PaymentMethod>,
}

#[derive(Deserialize)]
struct SubscriptionBody {
    subscription: Option<Subscription>,
}

#[derive(Deserialize)]
struct PlansBody {
    plans: Vec<SubscriptionPlan>,
}

#[derive(Deserialize)]
struct OrderBody {
    status: String,
    #[serde(default)]
    payment_details: Option<serde_json::Value>,
}

impl ApiClient {
    /// Create a Stripe Checkout session for an order.
    ///
    /// Requires an authenticated session up front; the hosted checkout
    /// page itself is the backend's (and Stripe's) concern.
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> AuthResult<CheckoutSessionResponse> {
        if self.session().token().await.is_none() {
            return Err(AuthError::NotAuthenticated);
        }

        let response = self
            .execute(
                self.post("/payments/stripe/checkout-session").json(request),
                "Failed to create checkout session",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Fetch an existing Checkout session.
    pub async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> AuthResult<CheckoutSessionResponse> {
        let response = self
            .execute(
                self.get(&format!("/payments/stripe/session/{}", session_id)),
                "Failed to get session",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Settlement status of an order's payment. Requires an authenticated
    /// session, like checkout creation.
    pub async fn check_payment_status(&self, order_id: i64) -> AuthResult<PaymentStatusResponse> {
        if self.session().token().await.is_none() {
            return Err(AuthError::NotAuthenticated);
        }

        let response = self
            .execute(
                self.get(&format!("/orders/{}", order_id)),
                "Failed to check payment status",
            )
            .await?;

        let order: OrderBody = response.json().await?;
        let status = match order.status.to_lowercase().as_str() {
            "pending" => PaymentStatus::Pending,
            "paid" => PaymentStatus::Paid,
            "failed" => PaymentStatus::Failed,
            other => {
                return Err(AuthError::InvalidResponse(format!(
                    "Unknown payment status: {}",
                    other
                )))
            }
        };

        Ok(PaymentStatusResponse {
            status,
            payment_details: order.payment_details,
        })
    }

    /// Payment history for the current user.
    pub async fn payment_history(&self) -> AuthResult<Vec<PaymentHistoryItem>> {
        let response = self
            .execute(
                self.get("/payments/history"),
                "Failed to fetch payment history",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Request a refund for an order.
    pub async fn request_refund(&self, request: &RefundRequest) -> AuthResult<RefundResponse> {
        let response = self
            .execute(
                self.post("/payments/stripe/refund").json(request),
                "Failed to request refund",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Current state of a previously requested refund.
    pub async fn refund_status(&self, refund_id: &str) -> AuthResult<RefundResponse> {
        let response = self
            .execute(
                self.get(&format!("/payments/stripe/refund/{}", refund_id)),
                "Failed to get refund status",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Create a payment intent for a one-time payment.
    pub async fn create_payment_intent(
        &self,
        payload: &CreatePaymentIntentPayload,
    ) -> AuthResult<PaymentIntent> {
        let response = self
            .execute(
                self.post("/payments/intents").json(payload),
                "Failed to create payment intent",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Confirm a payment intent with a payment method.
    pub async fn confirm_payment(
        &self,
        payment_intent_id: &str,
        payment_method_id: &str,
    ) -> AuthResult<PaymentIntent> {
        let body = serde_json::json!({ "paymentMethodId": payment_method_id });

        let response = self
            .execute(
                self.post(&format!("/payments/intents/{}/confirm", payment_intent_id))
                    .json(&body),
                "Failed to confirm payment",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Stored payment methods for the current user.
    pub async fn payment_methods(&self) -> AuthResult<Vec<PaymentMethod>> {
        let response = self
            .execute(
                self.get("/payments/methods"),
                "Failed to fetch payment methods",
            )
            .await?;

        let body: PaymentMethodsBody = response.json().await?;
        Ok(body.payment_methods)
    }

    /// Attach a new payment method.
    pub async fn add_payment_method(&self, payment_method_id: &str) -> AuthResult<PaymentMethod> {
        let body = serde_json::json!({ "paymentMethodId": payment_method_id });

        let response = self
            .execute(
                self.post("/payments/methods").json(&body),
                "Failed to add payment method",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Remove a payment method.
    pub async fn delete_payment_method(&self, payment_method_id: &str) -> AuthResult<()> {
        self.execute(
            self.delete(&format!("/payments/methods/{}", payment_method_id)),
            "Failed to delete payment method",
        )
        .await?;
        Ok(())
    }

    /// Start a subscription.
    pub async fn create_subscription(
        &self,
        payload: &CreateSubscriptionPayload,
    ) -> AuthResult<Subscription> {
        let response = self
            .execute(
                self.post("/subscriptions").json(payload),
                "Failed to create subscription",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// The current user's subscription; `None` when they have none.
    pub async fn current_subscription(&self) -> AuthResult<Option<Subscription>> {
        let result = self
            .execute(
                self.get("/subscriptions/current"),
                "Failed to fetch subscription",
            )
            .await;

        match result {
            Ok(response) => {
                let body: SubscriptionBody = response.json().await?;
                Ok(body.subscription)
            }
            Err(AuthError::Backend { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Cancel a subscription.
    pub async fn cancel_subscription(&self, subscription_id: &str) -> AuthResult<Subscription> {
        let response = self
            .execute(
                self.post(&format!("/subscriptions/{}/cancel", subscription_id)),
                "Failed to cancel subscription",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Available subscription plans.
    pub async fn subscription_plans(&self) -> AuthResult<Vec<SubscriptionPlan>> {
        let response = self
            .execute(self.get("/subscriptions/plans"), "Failed to fetch plans")
            .await?;

        let body: PlansBody = response.json().await?;
        Ok(body.plans)
    }
}
