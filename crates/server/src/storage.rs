//! Presigned uploads to S3-compatible object storage (Cloudflare R2).
//!
//! Browsers upload profile images straight to the bucket with a `PUT` to a
//! URL signed here with AWS Signature Version 4 query parameters. The server
//! never sees the image bytes.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::StorageConfig;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of a presigned URL in seconds.
pub const PRESIGN_EXPIRES_SECS: u32 = 3600;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const REGION: &str = "auto";
const SERVICE: &str = "s3";

/// Errors from URL signing.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object key is empty.
    #[error("object key cannot be empty")]
    EmptyKey,

    /// HMAC could not be initialised.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// A signed upload target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    /// URL accepting a single `PUT` of the object body.
    pub url: String,
    /// Object key inside the bucket.
    pub key: String,
    /// Where the object will be served from once uploaded.
    pub public_url: String,
}

/// Signs upload URLs for the configured bucket.
#[derive(Clone)]
pub struct PresignedUploader {
    host: String,
    bucket: String,
    access_key_id: String,
    secret_access_key: SecretString,
    public_url: String,
}

impl PresignedUploader {
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            host: format!("{}.r2.cloudflarestorage.com", config.account_id),
            bucket: config.bucket.clone(),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
            public_url: config.public_url.clone(),
        }
    }

    /// Presign a `PUT` of `key`, valid for [`PRESIGN_EXPIRES_SECS`] from `now`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::EmptyKey` for an empty key.
    pub fn presign_put(&self, key: &str, now: DateTime<Utc>) -> Result<PresignedUpload, StorageError> {
        if key.is_empty() {
            return Err(StorageError::EmptyKey);
        }

        let path = format!("/{}/{}", uri_encode_path(&self.bucket), uri_encode_path(key));
        let url = presign_url(
            &PresignRequest {
                method: "PUT",
                host: &self.host,
                path: &path,
                region: REGION,
                access_key_id: &self.access_key_id,
                expires: PRESIGN_EXPIRES_SECS,
                now,
            },
            self.secret_access_key.expose_secret(),
        )?;

        Ok(PresignedUpload {
            url,
            key: key.to_string(),
            public_url: format!("{}/{}", self.public_url, uri_encode_path(key)),
        })
    }
}

struct PresignRequest<'a> {
    method: &'a str,
    host: &'a str,
    /// Already URI-encoded.
    path: &'a str,
    region: &'a str,
    access_key_id: &'a str,
    expires: u32,
    now: DateTime<Utc>,
}

fn presign_url(req: &PresignRequest<'_>, secret_access_key: &str) -> Result<String, StorageError> {
    let amz_date = req.now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = req.now.format("%Y%m%d").to_string();
    let scope = format!("{date}/{}/{SERVICE}/aws4_request", req.region);
    let credential = format!("{}/{scope}", req.access_key_id);

    // Parameter names are already in byte order
    let query = format!(
        "X-Amz-Algorithm={ALGORITHM}&X-Amz-Credential={}&X-Amz-Date={amz_date}&X-Amz-Expires={}&X-Amz-SignedHeaders=host",
        urlencoding::encode(&credential),
        req.expires,
    );

    let canonical_request = format!(
        "{}\n{}\n{query}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD",
        req.method, req.path, req.host
    );

    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let k_date = hmac_sha256(
        format!("AWS4{secret_access_key}").as_bytes(),
        date.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, req.region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes())?;
    let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes())?);

    Ok(format!(
        "https://{}{}?{query}&X-Amz-Signature={signature}",
        req.host, req.path
    ))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, StorageError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| StorageError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Percent-encode each path segment, keeping `/` separators.
fn uri_encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
