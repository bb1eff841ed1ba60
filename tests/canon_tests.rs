//! Integration tests for canonical JSON serialization and content hashing.

use bundle_expr::canon::{canonicalize, parse_json, HashAlgorithm, IntegrityChecker};
use bundle_expr::Value;

fn obj(fields: Vec<(&str, Value)>) -> Value {
    Value::Object(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

#[test]
fn canonicalize_sorts_keys_and_emits_no_whitespace() {
    let v = obj(vec![
        ("b", Value::Integer(1)),
        ("a", Value::Array(vec![Value::Integer(3), Value::Integer(2), Value::Integer(1)])),
        ("c", Value::Null),
    ]);
    assert_eq!(canonicalize(&v), r#"{"a":[3,2,1],"b":1,"c":null}"#);
}

#[test]
fn hash_json_is_order_independent_and_matches_sha256_of_canonical_bytes() {
    let a = obj(vec![("a", Value::Integer(1)), ("b", Value::Integer(2))]);
    let b = obj(vec![("b", Value::Integer(2)), ("a", Value::Integer(1))]);
    let hash_a = IntegrityChecker::hash_json(&a, HashAlgorithm::Sha256);
    let hash_b = IntegrityChecker::hash_json(&b, HashAlgorithm::Sha256);
    assert_eq!(hash_a, hash_b);
    assert_eq!(hash_a, IntegrityChecker::hash_string(r#"{"a":1,"b":2}"#, HashAlgorithm::Sha256));
}

#[test]
fn canonicalize_round_trips_through_parse_json_idempotently() {
    let v = obj(vec![
        ("z", Value::Array(vec![Value::Integer(1), Value::String("x".into()), Value::Bool(true)])),
        ("a", Value::Float(2.5)),
        ("m", Value::Null),
    ]);
    let once = canonicalize(&v);
    let reparsed = parse_json(&once).unwrap();
    let twice = canonicalize(&reparsed);
    assert_eq!(once, twice);
}

#[test]
fn hash_json_is_stable_across_repeated_calls() {
    let v = obj(vec![("k", Value::String("v".into()))]);
    let first = IntegrityChecker::hash_json(&v, HashAlgorithm::Sha256);
    let second = IntegrityChecker::hash_json(&v, HashAlgorithm::Sha256);
    assert_eq!(first, second);
}

#[test]
fn verify_flags_single_bit_flips_in_bytes_or_hash() {
    let payload = b"bundle payload bytes";
    let hash = IntegrityChecker::hash_bytes(payload, HashAlgorithm::Sha256);
    assert!(IntegrityChecker::verify(payload, &hash));

    let mut flipped = payload.to_vec();
    flipped[0] ^= 0x01;
    assert!(!IntegrityChecker::verify(&flipped, &hash));

    let text = hash.to_string();
    let (algo, hex_digits) = text.split_once(':').unwrap();
    let mut flipped_hex = hex_digits.to_string();
    let first_char = flipped_hex.chars().next().unwrap();
    let replacement = if first_char == '0' { '1' } else { '0' };
    flipped_hex.replace_range(0..1, &replacement.to_string());
    let bad_hash: bundle_expr::canon::ContentHash = format!("{algo}:{flipped_hex}").parse().unwrap();
    assert!(!hash.verify_eq(&bad_hash));
}

#[test]
fn textual_hash_form_round_trips_through_display_and_fromstr() {
    let hash = IntegrityChecker::hash_string("payload", HashAlgorithm::Sha384);
    let text = hash.to_string();
    assert!(text.starts_with("sha-384:"));
    let parsed: bundle_expr::canon::ContentHash = text.parse().unwrap();
    assert_eq!(hash, parsed);
}

#[test]
fn parse_json_rejects_trailing_input() {
    assert!(parse_json("1 2").is_err());
}

#[test]
fn parse_json_accepts_the_full_json_shape() {
    let v = parse_json(r#"{"a":[1,2.5,null,true,false,"s\n"]}"#).unwrap();
    match v {
        Value::Object(fields) => assert_eq!(fields.len(), 1),
        other => panic!("expected Object, got {other:?}"),
    }
}
