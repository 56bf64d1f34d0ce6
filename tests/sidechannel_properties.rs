//! Property-style checks over randomly generated inputs.

use rand::RngCore;

use vaultcore::sidechannel::{constant_time_eq, fault_resistant_eq, masked_access};

fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

#[test]
fn constant_time_eq_agrees_with_native_equality_over_random_samples() {
    for len in [0, 1, 7, 32, 256] {
        for _ in 0..64 {
            let a = random_bytes(len);
            let b = random_bytes(len);
            assert_eq!(constant_time_eq(&a, &b), a == b);
            assert_eq!(constant_time_eq(&a, &a), true);
        }
    }
}

#[test]
fn constant_time_eq_and_fault_resistant_eq_agree_over_random_samples() {
    for _ in 0..256 {
        let a = random_bytes(48);
        let mut b = a.clone();
        // Flip a single byte half the time so both matching and
        // mismatching pairs are exercised.
        if rand::thread_rng().next_u32() % 2 == 0 {
            let idx = (rand::thread_rng().next_u32() as usize) % b.len();
            b[idx] ^= 0x01;
        }
        assert_eq!(constant_time_eq(&a, &b), fault_resistant_eq(&a, &b));
    }
}

#[test]
fn masked_access_matches_direct_indexing_over_random_tables() {
    let mut table = [[0u8; 4]; 16];
    for row in table.iter_mut() {
        let bytes = random_bytes(4);
        row.copy_from_slice(&bytes);
    }

    for index in 0..table.len() {
        assert_eq!(masked_access(&table, index).expect("in bounds"), table[index]);
    }
}
