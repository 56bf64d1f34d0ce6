//! Cross-module determinism checks for the memory-hard KDF engine.

use vaultcore::kdf::{derive_argon2id, derive_balloon, Params, Variant};
use vaultcore::memory::SecureBytes;

#[test]
fn balloon_reproduces_the_same_key_across_independent_calls() {
    let params_a = Params::new(256, 2, 1, SecureBytes::copy_from_slice(b"saltsalt"), 32, Variant::Balloon)
        .expect("valid params");
    let params_b = Params::new(256, 2, 1, SecureBytes::copy_from_slice(b"saltsalt"), 32, Variant::Balloon)
        .expect("valid params");

    let a = derive_balloon(b"correct horse battery staple", params_a).expect("derives");
    let b = derive_balloon(b"correct horse battery staple", params_b).expect("derives");

    assert_eq!(a.key().as_slice(), b.key().as_slice());
    assert_eq!(a.key().len(), 32);
}

#[test]
fn argon2id_and_balloon_never_collide_on_the_same_inputs() {
    let argon_params = Params::new(8, 1, 1, SecureBytes::copy_from_slice(b"saltsalt"), 32, Variant::Argon2id)
        .expect("valid params");
    let balloon_params = Params::new(256, 1, 1, SecureBytes::copy_from_slice(b"saltsalt"), 32, Variant::Balloon)
        .expect("valid params");

    let argon_out = derive_argon2id(b"password", argon_params).expect("derives");
    let balloon_out = derive_balloon(b"password", balloon_params).expect("derives");

    assert_ne!(argon_out.key().as_slice(), balloon_out.key().as_slice());
}

#[test]
fn derivation_output_carries_a_non_secret_salt_copy() {
    let params = Params::new(8, 1, 1, SecureBytes::copy_from_slice(b"saltsalt"), 32, Variant::Argon2id)
        .expect("valid params");
    let output = derive_argon2id(b"password", params).expect("derives");
    assert_eq!(output.salt_copy(), b"saltsalt");
}
