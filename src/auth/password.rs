use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes a plaintext password with bcrypt (cost 12, fresh salt per call).
///
/// Two calls on the same plaintext produce different digests; both verify.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, 12).map_err(AppError::from)
}

/// Checks a plaintext password against a stored bcrypt digest.
///
/// Fails closed: a malformed digest yields `false` rather than an error, so a
/// corrupt row can never be mistaken for a successful login.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_is_salted_and_verifiable() {
        let password = "test_password123";
        let first = hash_password(password).unwrap();
        let second = hash_password(password).unwrap();

        // Fresh salt per call, so the digests differ but both verify.
        assert_ne!(first, second);
        assert!(verify_password(password, &first));
        assert!(verify_password(password, &second));
    }

    #[test]
    fn test_wrong_password_fails() {
        let hashed = hash_password("test_password123").unwrap();
        assert!(!verify_password("wrong_password", &hashed));
    }

    #[test]
    fn test_malformed_digest_fails_closed() {
        assert!(!verify_password("test_password123", "invalidhashformat"));
        assert!(!verify_password("test_password123", ""));
    }
}
