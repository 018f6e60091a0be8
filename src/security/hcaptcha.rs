use std::time::Duration;

pub const VERIFY_URL: &str = "https://api.hcaptcha.com/siteverify";

/// Verify an hCaptcha token.
/// https://docs.hcaptcha.com/#verify-the-user-response-server-side
pub async fn verify(
    client: &reqwest::Client,
    secret_key: &str,
    site_key: &str,
    token: &str,
    remote_ip: Option<&str>,
    timeout: Duration,
) -> Result<bool, String> {
    let mut params = vec![("secret", secret_key), ("response", token)];
    if !site_key.is_empty() {
        params.push(("sitekey", site_key));
    }
    if let Some(ip) = remote_ip {
        params.push(("remoteip", ip));
    }
    super::siteverify(client, "hCaptcha", VERIFY_URL, &params, timeout).await
}
