//! Balloon hashing (Boneh–Corrigan-Gibbs–Schechter), hand-rolled.
//!
//! TRUST LEVEL: Secure Core
//!
//! No vetted crate implements this variant, so it is built here in
//! three phases: Expand (build a chain of SHA-512 blocks), Mix (round
//! over the blocks mixing in a sequential, a chaotic, and two
//! data-dependent predecessor), Extract (hash the tail blocks plus
//! salt, then stretch to the requested length).

use crate::error::Result;
use crate::hash::sha512;
use crate::memory::SecureBytes;

use super::Params;

pub const BLOCK_SIZE: usize = 64;

const MIN_BLOCKS: u32 = 256;
const MAX_BLOCKS: u32 = 65536;

pub fn derive(password: &[u8], params: &Params) -> Result<(SecureBytes, u32)> {
    let block_count = params.memory_cost_kib().clamp(MIN_BLOCKS, MAX_BLOCKS);
    let mut blocks = expand(password, params.salt(), block_count, params.time_cost());
    mix(&mut blocks, params.time_cost());
    let key = extract(&blocks, params.salt(), params.output_len() as usize);
    Ok((key, block_count))
}

fn expand(password: &[u8], salt: &[u8], block_count: u32, time_cost: u32) -> Vec<[u8; BLOCK_SIZE]> {
    let mut blocks = Vec::with_capacity(block_count as usize);

    let mut seed = Vec::with_capacity(password.len() + salt.len() + 8);
    seed.extend_from_slice(password);
    seed.extend_from_slice(salt);
    seed.extend_from_slice(&block_count.to_le_bytes());
    seed.extend_from_slice(&time_cost.to_le_bytes());
    blocks.push(sha512(&seed));

    for i in 1..block_count {
        let prev = blocks[(i - 1) as usize];
        let mut input = Vec::with_capacity(BLOCK_SIZE + 8 + 8);
        input.extend_from_slice(&prev);
        input.extend_from_slice(&(i as u64).to_le_bytes());
        input.extend_from_slice(&0u64.to_le_bytes());
        blocks.push(sha512(&input));
    }

    blocks
}

fn mix(blocks: &mut [[u8; BLOCK_SIZE]], time_cost: u32) {
    let n = blocks.len() as u64;
    if n == 0 {
        return;
    }

    for round in 0..time_cost as u64 {
        for i in 0..blocks.len() {
            let prev = blocks[if i == 0 { blocks.len() - 1 } else { i - 1 }];
            let chaotic_idx = ((i as u64) ^ round ^ ((i as u64).wrapping_mul(round))) % n;
            let chaotic = blocks[chaotic_idx as usize];

            let current = blocks[i];
            let (dep_a, dep_b) = data_dependent_indices(&current, n);
            let dep_block_a = blocks[dep_a as usize];
            let dep_block_b = blocks[dep_b as usize];

            let mut input = Vec::with_capacity(BLOCK_SIZE * 4 + 16);
            input.extend_from_slice(&current);
            input.extend_from_slice(&round.to_le_bytes());
            input.extend_from_slice(&(i as u64).to_le_bytes());
            input.extend_from_slice(&prev);
            input.extend_from_slice(&chaotic);
            input.extend_from_slice(&dep_block_a);
            input.extend_from_slice(&dep_block_b);

            blocks[i] = sha512(&input);
        }
    }
}

/// Derive two predecessor indices from the current block's own bytes,
/// so the memory access pattern genuinely depends on prior data.
fn data_dependent_indices(block: &[u8; BLOCK_SIZE], n: u64) -> (u64, u64) {
    let a = u64::from_le_bytes(block[0..8].try_into().expect("8 bytes")) % n;
    let b = u64::from_le_bytes(block[8..16].try_into().expect("8 bytes")) % n;
    (a, b)
}

fn extract(blocks: &[[u8; BLOCK_SIZE]], salt: &[u8], output_len: usize) -> SecureBytes {
    let tail_count = blocks.len().min(16);
    let tail = &blocks[blocks.len() - tail_count..];

    let mut input = Vec::with_capacity(tail_count * BLOCK_SIZE + salt.len());
    for block in tail {
        input.extend_from_slice(block);
    }
    input.extend_from_slice(salt);

    let mut out = SecureBytes::new(output_len);
    let mut filled = 0usize;
    let mut counter = 0u64;
    while filled < output_len {
        let mut stretch_input = input.clone();
        stretch_input.extend_from_slice(&counter.to_le_bytes());
        let digest = sha512(&stretch_input);
        let take = (output_len - filled).min(digest.len());
        out.as_mut_slice()[filled..filled + take].copy_from_slice(&digest[..take]);
        filled += take;
        counter += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::Variant;

    fn params(memory_cost_kib: u32, time_cost: u32, output_len: u32) -> Params {
        Params::new(
            memory_cost_kib,
            time_cost,
            1,
            SecureBytes::copy_from_slice(b"saltsalt"),
            output_len,
            Variant::Balloon,
        )
        .expect("valid params")
    }

    #[test]
    fn is_deterministic_for_identical_inputs() {
        let p = params(256, 2, 32);
        let (a, _) = derive(b"password", &p).expect("ok");
        let (b, _) = derive(b"password", &p).expect("ok");
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn differs_across_passwords() {
        let p = params(256, 2, 32);
        let (a, _) = derive(b"password-one", &p).expect("ok");
        let (b, _) = derive(b"password-two", &p).expect("ok");
        assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn respects_output_length() {
        let p = params(256, 1, 100);
        let (out, _) = derive(b"password", &p).expect("ok");
        assert_eq!(out.len(), 100);
    }

    #[test]
    fn block_count_is_clamped_to_floor() {
        let p = params(8, 1, 32);
        let (_, block_count) = derive(b"password", &p).expect("ok");
        assert_eq!(block_count, MIN_BLOCKS);
    }

    #[test]
    fn block_count_is_clamped_to_ceiling() {
        let p = params(u32::MAX, 1, 32);
        let (_, block_count) = derive(b"password", &p).expect("ok");
        assert_eq!(block_count, MAX_BLOCKS);
    }

    #[test]
    fn differs_across_salts() {
        let a = Params::new(
            256,
            1,
            1,
            SecureBytes::copy_from_slice(b"salt-aaaa"),
            32,
            Variant::Balloon,
        )
        .expect("valid");
        let b = Params::new(
            256,
            1,
            1,
            SecureBytes::copy_from_slice(b"salt-bbbb"),
            32,
            Variant::Balloon,
        )
        .expect("valid");
        let (out_a, _) = derive(b"password", &a).expect("ok");
        let (out_b, _) = derive(b"password", &b).expect("ok");
        assert_ne!(out_a.as_slice(), out_b.as_slice());
    }
}
