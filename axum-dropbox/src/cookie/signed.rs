use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use cookie_monster::{Cookie, CookieBuilder, CookieJar};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Serialize, de::DeserializeOwned};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::cookie::CookieOptionsBuilder;

const HMAC_HASH_LEN: usize = 32;

/// A cookie whose value is a serialized, HMAC-SHA256 signed payload.
///
/// Layout of the value: `base64url(json || hmac(json))`.
pub struct SignedCookie {
    secret: Hmac<Sha256>,
    cookie_builder: CookieBuilder,
}

impl SignedCookie {
    pub fn name(&self) -> &str {
        self.cookie_builder.get_name()
    }

    pub fn cookie_builder(&self) -> &CookieBuilder {
        &self.cookie_builder
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Cookie, serde_json::Error> {
        let mut data = serde_json::to_vec(value)?;

        let mut hmac = self.secret.clone();
        hmac.update(&data);
        let signature = hmac.finalize().into_bytes();

        data.extend_from_slice(&signature);

        let encoded = BASE64_URL_SAFE_NO_PAD.encode(data);
        Ok(self.cookie_builder.clone().value(encoded).build())
    }

    /// Reads the cookie from `jar`. Missing, tampered or malformed cookies
    /// all come back as `None`.
    pub fn decode<T: DeserializeOwned>(&self, jar: &CookieJar) -> Option<T> {
        let cookie = jar.get(self.name())?;
        self.decode_value(cookie.value())
    }

    pub fn decode_value<T: DeserializeOwned>(&self, value: &str) -> Option<T> {
        let Ok(decoded) = BASE64_URL_SAFE_NO_PAD.decode(value) else {
            tracing::debug!("session cookie is not valid base64");
            return None;
        };

        let Some(data) = self.verify_signature(&decoded) else {
            tracing::debug!("session cookie signature does not match");
            return None;
        };

        match serde_json::from_slice(data) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("could not deserialize session cookie: {e}");
                None
            }
        }
    }

    fn verify_signature<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        if data.len() < HMAC_HASH_LEN {
            return None;
        }

        let (payload, received_signature) = data.split_at(data.len() - HMAC_HASH_LEN);

        let mut hmac = self.secret.clone();
        hmac.update(payload);
        let signature = hmac.finalize().into_bytes();

        if received_signature.ct_eq(&signature[..]).into() {
            Some(payload)
        } else {
            None
        }
    }
}

pub(crate) struct SignedCookieBuilder {
    pub(crate) secret: Option<Vec<u8>>,
    pub(crate) cookie_builder: CookieOptionsBuilder,
}

impl SignedCookieBuilder {
    pub fn new() -> Self {
        Self {
            secret: None,
            cookie_builder: CookieOptionsBuilder::new(),
        }
    }

    pub fn build(self) -> SignedCookie {
        let secret = if let Some(secret) = self.secret {
            secret
        } else {
            tracing::warn!("no cookie secret configured, dropbox sessions won't survive a restart");
            let mut secret = [0u8; 32];
            rand::rng().fill(&mut secret);
            secret.to_vec()
        };

        let secret = Hmac::new_from_slice(&secret).expect("Hmac accepts any secret length");

        SignedCookie {
            secret,
            cookie_builder: self.cookie_builder.build(),
        }
    }
}
