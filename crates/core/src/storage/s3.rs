//! Minimal S3 client over plain HTTP with AWS SigV4 request signing.
//!
//! Speaks the subset of the S3 API the pipeline needs (PutObject, GetObject,
//! DeleteObject) against AWS or any S3-compatible endpoint, using path-style
//! addressing so MinIO and Garage work out of the box.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::config::S3Config;

use super::error::StorageError;

type HmacSha256 = Hmac<Sha256>;

const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// S3 client bound to a single configured bucket and credential set.
///
/// Operations still take an explicit bucket so that stored `s3://` locations
/// referencing other buckets under the same credentials remain readable.
pub struct S3Client {
    client: reqwest::Client,
    config: S3Config,
    endpoint: String,
}

impl S3Client {
    pub fn new(config: S3Config) -> Self {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", config.region));
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .unwrap_or_default();

        Self {
            client,
            config,
            endpoint,
        }
    }

    /// The bucket new objects are written to.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Upload an object. Overwrites silently, matching S3 semantics.
    pub async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        let payload_hash = hex::encode(Sha256::digest(&body));
        let response = self
            .signed_request(reqwest::Method::PUT, &self.config.bucket, key, &payload_hash)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api { status, message });
        }
        Ok(())
    }

    /// Fetch an object's bytes. A 404 surfaces as `NotFound`.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .signed_request(reqwest::Method::GET, bucket, key, EMPTY_PAYLOAD_SHA256)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(StorageError::NotFound {
                location: format!("s3://{}/{}", bucket, key),
            });
        }
        if !(200..300).contains(&status) {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api { status, message });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Delete an object. Deleting a missing key is not an error (S3 returns
    /// 204 either way; some compatible stores return 404, which we ignore).
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let response = self
            .signed_request(reqwest::Method::DELETE, bucket, key, EMPTY_PAYLOAD_SHA256)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 404 || (200..300).contains(&status) {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(StorageError::Api { status, message })
    }

    /// Build a request with SigV4 headers for the given method/bucket/key.
    fn signed_request(
        &self,
        method: reqwest::Method,
        bucket: &str,
        key: &str,
        payload_hash: &str,
    ) -> reqwest::RequestBuilder {
        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let canonical_uri = canonical_uri(bucket, key);
        let host = self
            .endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .to_string();

        let canonical_headers = format!(
            "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
            host, payload_hash, amz_date
        );
        let signed_headers = "host;x-amz-content-sha256;x-amz-date";

        let canonical_request = format!(
            "{}\n{}\n\n{}\n{}\n{}",
            method.as_str(),
            canonical_uri,
            canonical_headers,
            signed_headers,
            payload_hash
        );

        let scope = format!("{}/{}/s3/aws4_request", date, self.config.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signature = hex::encode(self.signing_key(&date, string_to_sign.as_bytes()));

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.config.access_key_id, scope, signed_headers, signature
        );

        let url = format!("{}{}", self.endpoint, canonical_uri);
        self.client
            .request(method, url)
            .header("x-amz-date", amz_date)
            .header("x-amz-content-sha256", payload_hash)
            .header("authorization", authorization)
    }

    /// Derive the SigV4 signing key and sign the final string.
    fn signing_key(&self, date: &str, string_to_sign: &[u8]) -> Vec<u8> {
        let secret = format!("AWS4{}", self.config.secret_access_key);
        let k_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
        let k_region = hmac_sha256(&k_date, self.config.region.as_bytes());
        let k_service = hmac_sha256(&k_region, b"s3");
        let k_signing = hmac_sha256(&k_service, b"aws4_request");
        hmac_sha256(&k_signing, string_to_sign)
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Path-style canonical URI: each key segment percent-encoded, slashes kept.
fn canonical_uri(bucket: &str, key: &str) -> String {
    let encoded_key = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}/{}", bucket, encoded_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> S3Config {
        S3Config {
            bucket: "artifacts".to_string(),
            region: "us-east-1".to_string(),
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_canonical_uri_encodes_segments() {
        let uri = canonical_uri("bucket", "transcripts/user@example.com/My Video.txt");
        assert_eq!(
            uri,
            "/bucket/transcripts/user%40example.com/My%20Video.txt"
        );
    }

    #[test]
    fn test_canonical_uri_keeps_slashes() {
        let uri = canonical_uri("b", "a/b/c");
        assert_eq!(uri, "/b/a/b/c");
    }

    #[test]
    fn test_endpoint_defaults_to_region_host() {
        let mut config = test_config();
        config.endpoint = None;
        let client = S3Client::new(config);
        assert_eq!(client.endpoint, "https://s3.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_signing_key_is_deterministic() {
        let client = S3Client::new(test_config());
        let a = client.signing_key("20260101", b"payload");
        let b = client.signing_key("20260101", b"payload");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }
}
