//! Password hashing (§4.4, §10.1). Grounded on the teacher's identity
//! service, which hashes with Argon2id's default parameters and a random
//! salt per password.

use crate::error::{CoreError, CoreResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> CoreResult<String> {
    validate_strength(password)?;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, password_hash: &str) -> CoreResult<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| CoreError::Internal(anyhow::anyhow!("invalid password hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::Internal(anyhow::anyhow!(
            "password verification failed: {e}"
        ))),
    }
}

fn validate_strength(password: &str) -> CoreResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_and_verifies_round_trip() {
        let hash = hash_password("correcthorsebattery").unwrap();
        assert!(verify_password("correcthorsebattery", &hash).unwrap());
        assert!(!verify_password("wrongpassword", &hash).unwrap());
    }

    #[test]
    fn rejects_short_passwords() {
        assert!(matches!(
            hash_password("short"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn different_salts_produce_different_hashes() {
        let a = hash_password("correcthorsebattery").unwrap();
        let b = hash_password("correcthorsebattery").unwrap();
        assert_ne!(a, b);
    }
}
