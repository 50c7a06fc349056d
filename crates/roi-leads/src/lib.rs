#![deny(warnings)]

//! Lead capture for gated report downloads.
//!
//! A lead is pushed to the Customer.io track API before the gated action (the
//! churn report download) is allowed to run.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use roi_core::Notice;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_TRACK_URL: &str = "https://track.customer.io";
pub const LEAD_SOURCE: &str = "ROI calculator";

/// Shown once a lead has been accepted.
pub fn subscribed_notice() -> Notice {
    Notice::success("Thank you for subscribing!")
}

/// Contact details entered in the lead form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub email: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("email and first name are required")]
    MissingFields,
    #[error("email address is invalid")]
    InvalidEmail,
    #[error("environment variable {0} is not set")]
    MissingCredentials(&'static str),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Customer.io API error: {status}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl LeadError {
    /// The message shown to the user for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            LeadError::MissingFields => Notice::error("Please fill in all required fields"),
            LeadError::InvalidEmail => Notice::error("Please enter a valid email address"),
            _ => Notice::error("Failed to subscribe. Please try again."),
        }
    }
}

impl Lead {
    pub fn validate(&self) -> Result<(), LeadError> {
        if self.email.trim().is_empty() || self.first_name.trim().is_empty() {
            return Err(LeadError::MissingFields);
        }
        if !self.email.contains('@') {
            return Err(LeadError::InvalidEmail);
        }
        Ok(())
    }
}

/// Customer.io track API site credentials.
#[derive(Clone)]
pub struct Credentials {
    pub site_id: String,
    pub api_key: String,
}

// Manual Debug impl to redact the api key
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("site_id", &self.site_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Read `CUSTOMERIO_SITE_ID` and `CUSTOMERIO_API_KEY` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LeadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let site_id = lookup("CUSTOMERIO_SITE_ID")
            .filter(|v| !v.is_empty())
            .ok_or(LeadError::MissingCredentials("CUSTOMERIO_SITE_ID"))?;
        let api_key = lookup("CUSTOMERIO_API_KEY")
            .filter(|v| !v.is_empty())
            .ok_or(LeadError::MissingCredentials("CUSTOMERIO_API_KEY"))?;
        Ok(Self { site_id, api_key })
    }

    pub fn from_env() -> Result<Self, LeadError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }
}

/// Track URL from `CUSTOMERIO_TRACK_URL` or the default.
pub fn track_url() -> String {
    std::env::var("CUSTOMERIO_TRACK_URL").unwrap_or_else(|_| DEFAULT_TRACK_URL.to_string())
}

#[derive(Serialize)]
struct CustomerPayload<'a> {
    id: &'a str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    company: &'a str,
    created_at: i64,
    source: &'static str,
    subscribed: bool,
}

/// Somewhere leads can be delivered.
pub trait LeadSink: Send + Sync {
    fn submit(&self, lead: &Lead) -> impl Future<Output = Result<(), LeadError>> + Send;
}

#[derive(Clone, Debug)]
pub struct CustomerIoClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl CustomerIoClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, LeadError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Client configured from the `CUSTOMERIO_*` environment variables.
    pub fn from_env(timeout: Duration) -> Result<Self, LeadError> {
        Self::new(track_url(), Credentials::from_env()?, timeout)
    }

    /// Create or update the customer record for `lead`.
    ///
    /// # Errors
    ///
    /// Validation failures, transport errors and non-success statuses.
    pub async fn put_customer(&self, lead: &Lead) -> Result<(), LeadError> {
        lead.validate()?;
        let email = lead.email.trim();
        let payload = CustomerPayload {
            id: email,
            email,
            first_name: lead.first_name.trim(),
            last_name: lead.last_name.as_deref().unwrap_or(""),
            company: lead.company.as_deref().unwrap_or(""),
            created_at: chrono::Utc::now().timestamp(),
            source: LEAD_SOURCE,
            subscribed: true,
        };
        let url = format!("{}/api/v1/customers", self.base_url);
        let resp = self
            .http
            .put(&url)
            .basic_auth(&self.credentials.site_id, Some(&self.credentials.api_key))
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Customer.io rejected lead");
            return Err(LeadError::Status { status, body });
        }
        info!("lead submitted to Customer.io");
        Ok(())
    }
}

impl LeadSink for CustomerIoClient {
    fn submit(&self, lead: &Lead) -> impl Future<Output = Result<(), LeadError>> + Send {
        self.put_customer(lead)
    }
}

/// Run `action` only once `lead` has been accepted by `sink`.
///
/// An accepted lead yields the subscription notice followed by the action's
/// notice. A rejected lead yields only its error notice and the action never
/// runs.
pub async fn release_gated<S, F, Fut>(sink: &S, lead: &Lead, action: F) -> Vec<Notice>
where
    S: LeadSink,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Notice>,
{
    match sink.submit(lead).await {
        Ok(()) => vec![subscribed_notice(), action().await],
        Err(err) => {
            warn!(error = %err, "lead capture failed, action withheld");
            vec![err.notice()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn lead() -> Lead {
        Lead {
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: None,
            company: Some("Analytical Engines".into()),
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            site_id: "site-1".into(),
            api_key: "key-1".into(),
        }
    }

    fn client(url: String) -> CustomerIoClient {
        CustomerIoClient::new(url, credentials(), Duration::from_secs(5)).unwrap()
    }

    struct CountingSink {
        calls: AtomicUsize,
        accept: bool,
    }

    impl LeadSink for CountingSink {
        async fn submit(&self, lead: &Lead) -> Result<(), LeadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            lead.validate()?;
            if self.accept {
                Ok(())
            } else {
                Err(LeadError::MissingCredentials("CUSTOMERIO_SITE_ID"))
            }
        }
    }

    #[test]
    fn validation_rules() {
        assert!(lead().validate().is_ok());
        let no_name = Lead { first_name: " ".into(), ..lead() };
        assert!(matches!(no_name.validate(), Err(LeadError::MissingFields)));
        let bad_email = Lead { email: "ada.example.com".into(), ..lead() };
        assert!(matches!(bad_email.validate(), Err(LeadError::InvalidEmail)));
        assert_eq!(
            LeadError::InvalidEmail.notice().message,
            "Please enter a valid email address"
        );
    }

    #[test]
    fn credentials_from_lookup() {
        let creds = Credentials::from_lookup(|k| match k {
            "CUSTOMERIO_SITE_ID" => Some("s".to_string()),
            "CUSTOMERIO_API_KEY" => Some("k".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(creds.site_id, "s");
        assert_eq!(creds.api_key, "k");

        let missing = Credentials::from_lookup(|k| (k == "CUSTOMERIO_SITE_ID").then(|| "s".to_string()));
        assert!(matches!(
            missing,
            Err(LeadError::MissingCredentials("CUSTOMERIO_API_KEY"))
        ));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let shown = format!("{:?}", credentials());
        assert!(shown.contains("[REDACTED]"));
        assert!(!shown.contains("key-1"));
    }

    #[tokio::test]
    async fn submits_customer_with_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v1/customers")
            .match_header("authorization", "Basic c2l0ZS0xOmtleS0x")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "id": "ada@example.com",
                "email": "ada@example.com",
                "first_name": "Ada",
                "last_name": "",
                "company": "Analytical Engines",
                "source": "ROI calculator",
                "subscribed": true
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client(server.url()).put_customer(&lead()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v1/customers")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let err = client(server.url()).put_customer(&lead()).await.unwrap_err();
        match &err {
            LeadError::Status { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.notice().message, "Failed to subscribe. Please try again.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invalid_lead_never_reaches_the_api() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v1/customers")
            .expect(0)
            .create_async()
            .await;
        let bad = Lead { email: String::new(), ..lead() };
        let err = client(server.url()).put_customer(&bad).await.unwrap_err();
        assert!(matches!(err, LeadError::MissingFields));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn gated_action_runs_only_after_acceptance() {
        let ran = AtomicUsize::new(0);
        let accept = CountingSink { calls: AtomicUsize::new(0), accept: true };
        let notices = release_gated(&accept, &lead(), || async {
            ran.fetch_add(1, Ordering::SeqCst);
            Notice::report_downloaded()
        })
        .await;
        assert_eq!(
            notices,
            vec![
                Notice::success("Thank you for subscribing!"),
                Notice::report_downloaded()
            ]
        );
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        let reject = CountingSink { calls: AtomicUsize::new(0), accept: false };
        let notices = release_gated(&reject, &lead(), || async {
            ran.fetch_add(1, Ordering::SeqCst);
            Notice::report_downloaded()
        })
        .await;
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_error());
        assert_eq!(reject.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gate_reports_validation_problems() {
        let sink = CountingSink { calls: AtomicUsize::new(0), accept: true };
        let bad = Lead { email: "nope".into(), ..lead() };
        let notices = release_gated(&sink, &bad, || async { Notice::report_downloaded() }).await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Please enter a valid email address");
    }
}
