//! Jira OAuth 1.0a Signing
//!
//! Jira application links authenticate with OAuth 1.0a using the RSA-SHA1
//! signature method. Every request carries an `Authorization: OAuth ...`
//! header signed with the consumer's private key.

use base64::{engine::general_purpose, Engine as _};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TrackerError;

const SIGNATURE_METHOD: &str = "RSA-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// OAuth credential tuple issued by a Jira application link
#[derive(Clone)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    /// RSA private key, either a full PEM or the bare base64 body
    pub private_key: String,
    pub access_token: String,
    /// Not part of an RSA-SHA1 signature; kept for HMAC-capable servers
    pub token_secret: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("private_key", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

/// Signs requests on behalf of one access token
pub struct OAuthSigner {
    consumer_key: String,
    access_token: String,
    signing_key: SigningKey<Sha1>,
}

impl OAuthSigner {
    /// Parse the private key and prepare a signer
    pub fn new(credentials: &OAuthCredentials) -> Result<Self, TrackerError> {
        let private_key = parse_private_key(&credentials.private_key)?;

        Ok(Self {
            consumer_key: credentials.consumer_key.clone(),
            access_token: credentials.access_token.clone(),
            signing_key: SigningKey::<Sha1>::new(private_key),
        })
    }

    /// Build the `Authorization` header value for a request
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, TrackerError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TrackerError::connect(format!("Failed to get current time: {e}")))?
            .as_secs();

        Ok(self.sign_request(method, url, query, &generate_nonce(), timestamp))
    }

    /// Sign a request with an explicit nonce and timestamp
    pub fn sign_request(
        &self,
        method: &str,
        url: &str,
        query: &[(&str, &str)],
        nonce: &str,
        timestamp: u64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let oauth_params = [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.access_token.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ];

        let all_params: Vec<(&str, &str)> = oauth_params
            .iter()
            .chain(query.iter())
            .copied()
            .collect();
        let base = signature_base_string(method, url, &all_params);

        let signature = self.signing_key.sign(base.as_bytes());
        let signature = general_purpose::STANDARD.encode(signature.to_bytes());

        let mut header_params = oauth_params.to_vec();
        header_params.push(("oauth_signature", signature.as_str()));
        header_params.sort_unstable_by_key(|(name, _)| *name);

        let fields: Vec<String> = header_params
            .iter()
            .map(|(name, value)| format!("{}=\"{}\"", name, urlencoding::encode(value)))
            .collect();

        format!("OAuth {}", fields.join(", "))
    }
}

/// Build the OAuth signature base string.
///
/// Parameters are percent-encoded (RFC 3986), sorted by name then value and
/// joined with `&` before the whole string is encoded again.
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(name, value)| {
            (
                urlencoding::encode(name).into_owned(),
                urlencoding::encode(value).into_owned(),
            )
        })
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        urlencoding::encode(url),
        urlencoding::encode(&normalized)
    )
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Accepts a PKCS#1 or PKCS#8 PEM, or the bare base64 body of a PKCS#1 key
/// (the form usually stored in CI secrets).
fn parse_private_key(raw: &str) -> Result<RsaPrivateKey, TrackerError> {
    let raw = raw.trim();

    if raw.contains("-----BEGIN") {
        return RsaPrivateKey::from_pkcs1_pem(raw)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(raw))
            .map_err(|e| TrackerError::connect(format!("Failed to parse private key: {e}")));
    }

    let body: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let der = general_purpose::STANDARD
        .decode(body)
        .map_err(|e| TrackerError::connect(format!("Failed to decode private key: {e}")))?;

    RsaPrivateKey::from_pkcs1_der(&der)
        .or_else(|_| RsaPrivateKey::from_pkcs8_der(&der))
        .map_err(|e| TrackerError::connect(format!("Failed to parse private key: {e}")))
}
