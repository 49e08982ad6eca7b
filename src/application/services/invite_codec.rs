use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// What an invite code vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteClaims {
    pub issued_at: i64,
    pub book_id: String,
    pub owner_id: String,
}

/// Signs and checks book invite codes.
///
/// A code is `base64url("{issued_at}_{book_id}_{owner_id}") + "." + hex(hmac)`,
/// so it can be shared as a plain URL segment and verified without storage.
#[derive(Clone)]
pub struct InviteCodec {
    secret: Vec<u8>,
    ttl_seconds: i64,
}

impl InviteCodec {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    fn mac(&self) -> ApiResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| ApiError::Internal(format!("Invalid invite secret: {}", e)))
    }

    pub fn encode(&self, claims: &InviteClaims) -> ApiResult<String> {
        let payload = URL_SAFE_NO_PAD.encode(format!(
            "{}_{}_{}",
            claims.issued_at, claims.book_id, claims.owner_id
        ));

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", payload, signature))
    }

    /// Verify signature and age of a code issued no later than `now`.
    pub fn decode(&self, code: &str, now: i64) -> ApiResult<InviteClaims> {
        let invalid = || ApiError::BadRequest("Invalid invite code".to_string());

        let (payload, signature) = code.trim().split_once('.').ok_or_else(invalid)?;
        let signature = hex::decode(signature).map_err(|_| invalid())?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| invalid())?;

        let raw = URL_SAFE_NO_PAD.decode(payload).map_err(|_| invalid())?;
        let raw = String::from_utf8(raw).map_err(|_| invalid())?;

        let mut parts = raw.splitn(3, '_');
        let issued_at: i64 = parts
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(invalid)?;
        let book_id = parts.next().filter(|v| !v.is_empty()).ok_or_else(invalid)?;
        let owner_id = parts.next().filter(|v| !v.is_empty()).ok_or_else(invalid)?;

        if issued_at > now || now - issued_at > self.ttl_seconds {
            return Err(ApiError::BadRequest("Invite code has expired".to_string()));
        }

        Ok(InviteClaims {
            issued_at,
            book_id: book_id.to_string(),
            owner_id: owner_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(issued_at: i64) -> InviteClaims {
        InviteClaims {
            issued_at,
            book_id: "3f1c2a9e-book".to_string(),
            owner_id: "8d0b7e41-owner".to_string(),
        }
    }

    #[test]
    fn test_code_verifies_within_ttl() {
        let codec = InviteCodec::new("invite-secret", 3600);
        let code = codec.encode(&claims(1_000)).unwrap();

        assert_eq!(codec.decode(&code, 1_000).unwrap(), claims(1_000));
        assert_eq!(codec.decode(&code, 4_600).unwrap(), claims(1_000));
    }

    #[test]
    fn test_expired_code_is_rejected() {
        let codec = InviteCodec::new("invite-secret", 3600);
        let code = codec.encode(&claims(1_000)).unwrap();

        let err = codec.decode(&code, 4_601).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("expired")));
    }

    #[test]
    fn test_tampered_code_is_rejected() {
        let codec = InviteCodec::new("invite-secret", 3600);
        let code = codec.encode(&claims(1_000)).unwrap();
        let (_, signature) = code.split_once('.').unwrap();

        let forged_payload = URL_SAFE_NO_PAD.encode("1000_other-book_8d0b7e41-owner");
        let forged = format!("{}.{}", forged_payload, signature);
        assert!(codec.decode(&forged, 1_000).is_err());

        let other = InviteCodec::new("another-secret", 3600);
        assert!(other.decode(&code, 1_000).is_err());

        assert!(codec.decode("no-dot-here", 1_000).is_err());
    }
}
