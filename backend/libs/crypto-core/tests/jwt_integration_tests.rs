/// Integration tests for crypto-core JWT functionality
///
/// This test module covers:
/// - JWT token generation and validation
/// - Token expiration handling
/// - Claims extraction
/// - Error handling for invalid/tampered tokens
use crypto_core::jwt::{generate_access_token, get_user_id_from_token, initialize_jwt_secret, validate_token};
use std::sync::Once;
use uuid::Uuid;

const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes!!";

fn init_test_secret() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        initialize_jwt_secret(TEST_SECRET).expect("failed to initialize test secret");
    });
}

#[test]
fn test_generate_access_token_success() {
    init_test_secret();

    let user_id = Uuid::new_v4();
    let result = generate_access_token(user_id, 3600);

    assert!(result.is_ok(), "should generate access token successfully");
    let token = result.unwrap();
    assert!(!token.is_empty(), "token should not be empty");
    assert_eq!(
        token.matches('.').count(),
        2,
        "JWT should have 3 parts separated by dots"
    );
}

#[test]
fn test_validate_token_roundtrip() {
    init_test_secret();

    let user_id = Uuid::new_v4();
    let token = generate_access_token(user_id, 3600).unwrap();

    let data = validate_token(&token).expect("token should validate");
    assert_eq!(data.claims.sub, user_id.to_string());
}

#[test]
fn test_get_user_id_from_token_roundtrip() {
    init_test_secret();

    let user_id = Uuid::new_v4();
    let token = generate_access_token(user_id, 3600).unwrap();

    let recovered = get_user_id_from_token(&token).expect("should recover user id");
    assert_eq!(user_id, recovered);
}

#[test]
fn test_expired_token_rejected() {
    init_test_secret();

    let user_id = Uuid::new_v4();
    let token = generate_access_token(user_id, -10).unwrap();

    assert!(validate_token(&token).is_err(), "expired token should fail validation");
}

#[test]
fn test_tampered_signature_rejected() {
    init_test_secret();

    let user_id = Uuid::new_v4();
    let mut token = generate_access_token(user_id, 3600).unwrap();
    token.push('z');

    assert!(validate_token(&token).is_err(), "tampered token should fail validation");
}

#[test]
fn test_malformed_token_rejected() {
    init_test_secret();

    assert!(validate_token("not-a-jwt").is_err());
    assert!(get_user_id_from_token("not-a-jwt").is_err());
}

#[test]
fn test_distinct_users_get_distinct_tokens() {
    init_test_secret();

    let a = generate_access_token(Uuid::new_v4(), 3600).unwrap();
    let b = generate_access_token(Uuid::new_v4(), 3600).unwrap();
    assert_ne!(a, b);
}
