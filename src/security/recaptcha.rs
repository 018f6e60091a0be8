use std::time::Duration;

pub const VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Verify a Google reCAPTCHA v2 checkbox token.
/// https://developers.google.com/recaptcha/docs/verify
pub async fn verify(
    client: &reqwest::Client,
    secret_key: &str,
    token: &str,
    remote_ip: Option<&str>,
    timeout: Duration,
) -> Result<bool, String> {
    let mut params = vec![("secret", secret_key), ("response", token)];
    if let Some(ip) = remote_ip {
        params.push(("remoteip", ip));
    }
    super::siteverify(client, "reCAPTCHA", VERIFY_URL, &params, timeout).await
}
