//! Public and signed URLs for stored objects

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const PUBLIC_SEGMENT: &str = "/storage/object/public/";
const SIGN_SEGMENT: &str = "/storage/object/sign/";

#[derive(Clone)]
pub struct UrlSigner {
    base_url: String,
    bucket: String,
    secret: String,
}

impl UrlSigner {
    pub fn new(base_url: &str, bucket: &str, secret: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            secret: secret.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}{}{}/{}", self.base_url, PUBLIC_SEGMENT, self.bucket, path)
    }

    /// URL valid until `now + ttl_secs` (unix seconds)
    pub fn signed_url(&self, path: &str, ttl_secs: u64, now: i64) -> String {
        let expires = now + ttl_secs as i64;
        format!(
            "{}{}{}/{}?expires={}&token={}",
            self.base_url,
            SIGN_SEGMENT,
            self.bucket,
            path,
            expires,
            self.sign(path, expires)
        )
    }

    fn mac(&self, path: &str, expires: i64) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any size");
        mac.update(format!("{}/{}:{}", self.bucket, path, expires).as_bytes());
        mac
    }

    fn sign(&self, path: &str, expires: i64) -> String {
        hex::encode(self.mac(path, expires).finalize().into_bytes())
    }

    /// Check a signed URL token for `path`
    pub fn verify(&self, path: &str, expires: i64, token: &str, now: i64) -> bool {
        if expires < now {
            tracing::debug!("Signed URL for {} expired at {}", path, expires);
            return false;
        }
        let Ok(signature) = hex::decode(token) else {
            return false;
        };
        self.mac(path, expires).verify_slice(&signature).is_ok()
    }

    /// Recover the object path from a URL produced by this signer.
    /// URLs on another host or bucket yield `None`.
    pub fn path_from_url(&self, url: &str) -> Option<String> {
        let without_query = url.split(['?', '#']).next().unwrap_or_default();
        [PUBLIC_SEGMENT, SIGN_SEGMENT].iter().find_map(|segment| {
            let prefix = format!("{}{}{}/", self.base_url, segment, self.bucket);
            without_query
                .strip_prefix(prefix.as_str())
                .filter(|path| !path.is_empty())
                .map(str::to_string)
        })
    }
}
