use chrono::{NaiveDate, NaiveDateTime};

use licensegate::config::DEVELOPMENT_SECRET_KEY;
use licensegate::license_key::{generate_license_key, verify_license_key, verify_license_key_at};
use licensegate::signing::{LicenseSigner, SecretKey};
use licensegate::VerificationError;

const MACHINE: &str = "AAAA-BBBB-CCCC-DDDD";

/// Secret embedded in the first generation of the key generator.
const LEGACY_SECRET: &str = "DATE_FACTORY_MANAGER_SECRET_KEY_2025_SECURE";

fn legacy_signer() -> LicenseSigner {
    LicenseSigner::new(&SecretKey::from(LEGACY_SECRET))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(12, 0, 0).unwrap()
}

// === Wire compatibility with previously issued keys ===

#[test]
fn reproduces_legacy_key_with_expiration() {
    let key = generate_license_key(&legacy_signer(), MACHINE, "Acme", Some(date(2099, 1, 1)));
    assert_eq!(
        key,
        "eyJtaWQiOiAiQUFBQS1CQkJCLUNDQ0MtRERERCIsICJuYW1lIjogIkFjbWUiLCAiZXhwIjogIjIwOTktMDEtMDEifQ==.A6B90B44A5F3FAFF"
    );
}

#[test]
fn reproduces_legacy_lifetime_key() {
    let key = generate_license_key(&legacy_signer(), MACHINE, "User", None);
    assert_eq!(
        key,
        "eyJtaWQiOiAiQUFBQS1CQkJCLUNDQ0MtRERERCIsICJuYW1lIjogIlVzZXIiLCAiZXhwIjogbnVsbH0=.EFDD103DDD31503B"
    );
}

#[test]
fn reproduces_legacy_key_with_non_ascii_name() {
    let key = generate_license_key(&legacy_signer(), MACHINE, "Café Ünïcode", None);
    assert_eq!(
        key,
        "eyJtaWQiOiAiQUFBQS1CQkJCLUNDQ0MtRERERCIsICJuYW1lIjogIkNhZlx1MDBlOSBcdTAwZGNuXHUwMGVmY29kZSIsICJleHAiOiBudWxsfQ==.4A6A41290045D3F0"
    );
}

#[test]
fn development_secret_vector() {
    let signer = LicenseSigner::new(&SecretKey::from(DEVELOPMENT_SECRET_KEY));
    let key = generate_license_key(&signer, MACHINE, "Acme", Some(date(2099, 1, 1)));
    assert!(key.ends_with(".DF96A53DA55A7DF2"), "unexpected key: {key}");
}

#[test]
fn accepts_unpadded_legacy_dates() {
    // Keys issued by hand sometimes carry dates like 2025-12-4.
    let signer = legacy_signer();
    let payload_str = base64_payload(r#"{"mid": "AAAA-BBBB-CCCC-DDDD", "name": "mas", "exp": "2025-12-4"}"#);
    let key = format!("{payload_str}.{}", signer.sign(&payload_str));

    assert!(verify_license_key_at(&signer, &key, MACHINE, noon(2025, 12, 3)).is_ok());
    assert_eq!(
        verify_license_key_at(&signer, &key, MACHINE, noon(2025, 12, 4)),
        Err(VerificationError::Expired(date(2025, 12, 4)))
    );
}

fn base64_payload(json: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    STANDARD.encode(json)
}

// === Scenarios ===

#[test]
fn scenario_a_valid_key_verifies() {
    let signer = legacy_signer();
    let key = generate_license_key(&signer, MACHINE, "Acme", Some(date(2099, 1, 1)));
    let payload = verify_license_key(&signer, &key, MACHINE).expect("key should verify");
    assert_eq!(payload.client_name, "Acme");
}

#[test]
fn scenario_b_other_machine_is_rejected() {
    let signer = legacy_signer();
    let key = generate_license_key(&signer, MACHINE, "Acme", Some(date(2099, 1, 1)));
    assert_eq!(
        verify_license_key(&signer, &key, "AAAA-BBBB-CCCC-0000"),
        Err(VerificationError::MachineMismatch)
    );
}

#[test]
fn scenario_c_past_expiration_is_rejected() {
    let signer = legacy_signer();
    let key = generate_license_key(&signer, MACHINE, "Acme", Some(date(2000, 1, 1)));
    assert_eq!(
        verify_license_key(&signer, &key, MACHINE),
        Err(VerificationError::Expired(date(2000, 1, 1)))
    );
}

#[test]
fn scenario_d_malformed_input_is_format_error() {
    assert_eq!(
        verify_license_key(&legacy_signer(), "not-a-real-token", MACHINE),
        Err(VerificationError::Format)
    );
}

// === Properties ===

#[test]
fn round_trip_preserves_fields() {
    let signer = legacy_signer();
    let cases = [
        ("0000-0000-0000-0000", "User", None),
        ("1AED-7CAA-D57F-993E", "mas", Some(date(2030, 12, 4))),
        ("FFFF-FFFF-FFFF-FFFF", "", Some(date(2099, 12, 31))),
        ("ABCD-EF01-2345-6789", "Ünïcode \"quoted\" name", None),
    ];

    for (machine_id, name, exp) in cases {
        let key = generate_license_key(&signer, machine_id, name, exp);
        let payload = verify_license_key_at(&signer, &key, machine_id, noon(2024, 6, 1))
            .unwrap_or_else(|e| panic!("{machine_id}/{name}: {e}"));

        assert_eq!(payload.machine_id, machine_id);
        assert_eq!(payload.client_name, name);
        assert_eq!(payload.expiration().unwrap(), exp);
    }
}

#[test]
fn flipping_any_payload_character_breaks_the_signature() {
    let signer = legacy_signer();
    let key = generate_license_key(&signer, MACHINE, "Acme", Some(date(2099, 1, 1)));
    let (payload, signature) = key.split_once('.').unwrap();

    for (i, original) in payload.char_indices() {
        let replacement = if original == 'A' { 'B' } else { 'A' };
        let mut tampered = payload.to_string();
        tampered.replace_range(i..i + original.len_utf8(), &replacement.to_string());

        assert_eq!(
            verify_license_key(&signer, &format!("{tampered}.{signature}"), MACHINE),
            Err(VerificationError::Signature),
            "tampering at index {i} was not detected"
        );
    }
}

#[test]
fn key_from_another_secret_is_rejected() {
    let other = LicenseSigner::new(&SecretKey::from("someone else's secret"));
    let key = generate_license_key(&other, MACHINE, "Acme", None);
    assert_eq!(
        verify_license_key(&legacy_signer(), &key, MACHINE),
        Err(VerificationError::Signature)
    );
}

#[test]
fn lowercase_signature_is_rejected() {
    let signer = legacy_signer();
    let key = generate_license_key(&signer, MACHINE, "Acme", Some(date(2099, 1, 1)));
    // The legacy vector's signature contains hex letters.
    assert_eq!(
        verify_license_key(&signer, &key.to_lowercase(), MACHINE),
        Err(VerificationError::Signature)
    );
}

#[test]
fn whitespace_around_key_is_ignored() {
    let signer = legacy_signer();
    let key = generate_license_key(&signer, MACHINE, "Acme", None);
    assert!(verify_license_key(&signer, &format!("  {key}\r\n"), MACHINE).is_ok());
}

#[test]
fn extra_separator_lands_in_signature() {
    let signer = legacy_signer();
    let key = generate_license_key(&signer, MACHINE, "Acme", None);
    assert_eq!(
        verify_license_key(&signer, &format!("{key}.extra"), MACHINE),
        Err(VerificationError::Signature)
    );
}

#[test]
fn errors_carry_readable_reasons() {
    let signer = legacy_signer();
    let err = verify_license_key(&signer, "garbage", MACHINE).unwrap_err();
    assert_eq!(err.to_string(), "Invalid key format");
    assert_eq!(err.code(), "FORMAT_ERROR");
}
