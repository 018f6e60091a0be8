pub mod auth;
pub mod hcaptcha;
pub mod recaptcha;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::store::Store;

// ── Captcha Verification ──────────────────────────────

/// Outbound human-check used by the contact and review forms.
///
/// `Ok(true)` verified, `Ok(false)` rejected by the provider,
/// `Err` on configuration, network or timeout failure.
#[rocket::async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, String>;
}

/// Gate a submission on the verifier. Anything short of a positive answer
/// becomes `AppError::Verification`.
pub async fn require_captcha(
    verifier: &dyn CaptchaVerifier,
    token: &str,
    remote_ip: Option<&str>,
) -> AppResult<()> {
    if token.trim().is_empty() {
        return Err(AppError::Verification("missing captcha response".into()));
    }
    match verifier.verify(token, remote_ip).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::Verification("rejected by provider".into())),
        Err(e) => {
            log::warn!("Captcha verification error: {}", e);
            Err(AppError::Verification(e))
        }
    }
}

/// Provider-backed verifier reading `captcha_*` settings on every call.
pub struct SiteCaptcha {
    store: Arc<dyn Store>,
    client: reqwest::Client,
}

impl SiteCaptcha {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            client: reqwest::Client::new(),
        }
    }
}

#[rocket::async_trait]
impl CaptchaVerifier for SiteCaptcha {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, String> {
        let secret = self.store.setting_get_or("captcha_secret_key", "");
        if secret.is_empty() {
            log::warn!("Captcha secret key not configured; rejecting submission");
            return Ok(false);
        }
        let timeout = Duration::from_secs(
            self.store.setting_get_i64("captcha_timeout_secs", 5).clamp(1, 60) as u64,
        );
        let provider = self.store.setting_get_or("captcha_provider", "recaptcha");

        match provider.as_str() {
            "recaptcha" => recaptcha::verify(&self.client, &secret, token, remote_ip, timeout).await,
            "hcaptcha" => {
                let site_key = self.store.setting_get_or("captcha_site_key", "");
                hcaptcha::verify(&self.client, &secret, &site_key, token, remote_ip, timeout).await
            }
            other => Err(format!("Unknown captcha provider '{}'", other)),
        }
    }
}

/// POST the form to a `siteverify` endpoint and read its `success` flag.
/// Both supported providers share this request and response shape.
async fn siteverify(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
    params: &[(&str, &str)],
    timeout: Duration,
) -> Result<bool, String> {
    let resp = client
        .post(url)
        .form(params)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| format!("{} request failed: {}", provider, e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        return Err(format!("{} returned {}: {}", provider, status, text));
    }

    let json: Value = resp
        .json()
        .await
        .map_err(|e| format!("{} JSON parse error: {}", provider, e))?;

    let success = json
        .get("success")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    if !success {
        let errors = json
            .get("error-codes")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        log::warn!("{} verification failed: {}", provider, errors);
    }

    Ok(success)
}

/// Provider name and public site key for rendering the widget.
#[derive(Debug, Serialize, Clone)]
pub struct CaptchaInfo {
    pub provider: String,
    pub site_key: String,
}

pub fn captcha_widget(store: &dyn Store) -> Option<CaptchaInfo> {
    let site_key = store.setting_get_or("captcha_site_key", "");
    if site_key.is_empty() {
        return None;
    }
    Some(CaptchaInfo {
        provider: store.setting_get_or("captcha_provider", "recaptcha"),
        site_key,
    })
}
