//! Shared utility functions for synco-server

const REF_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const REF_LEN: usize = 12;

/// Generate a 12-character uppercase-alphanumeric booking reference.
///
/// Uniqueness is enforced by the DB constraint, not here; callers retry on
/// conflict.
pub fn generate_booking_ref() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..REF_LEN)
        .map(|_| REF_ALPHABET[rng.gen_range(0..REF_ALPHABET.len())] as char)
        .collect()
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_ref_format() {
        for _ in 0..100 {
            let r = generate_booking_ref();
            assert_eq!(r.len(), 12);
            assert!(
                r.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_booking_refs_vary() {
        let a = generate_booking_ref();
        let b = generate_booking_ref();
        // 36^12 keyspace; two identical draws in a row means the RNG is broken
        assert_ne!(a, b);
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("synco-secret").unwrap();
        assert!(verify_password("synco-secret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("synco-secret", "not-a-hash"));
    }
}
