//! Module for SHA-1 ([FIPS 180-4]) hashing.
//!
//! Implemented here rather than pulled in as a dependency. It is meant to be
//! correct, not fast, and SHA-1 should not be relied on for collision resistance.
//!
//! [FIPS 180-4]: https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.180-4.pdf

use itertools::Itertools;

/// Length of a SHA-1 digest in bytes.
pub const DIGEST_LENGTH: usize = 20;
/// A 160-bit SHA-1 digest.
pub type Digest = [u8; DIGEST_LENGTH];

const BLOCK_LENGTH: usize = 64;
// where the big-endian bit length starts in the final block
const LENGTH_OFFSET: usize = BLOCK_LENGTH - 8;
const INITIAL_STATE: [u32; 5] = [0x6745_2301, 0xefcd_ab89, 0x98ba_dcfe, 0x1032_5476, 0xc3d2_e1f0];
// for t in [0, 80), use t / 20
const ROUND_CONSTANTS: [u32; 4] = [0x5a82_7999, 0x6ed9_eba1, 0x8f1b_bcdc, 0xca62_c1d6];

/// Incremental SHA-1 hasher.
///
/// Feeding a message through any number of [`update()`] calls produces
/// the same digest as passing the whole message to [`hash()`].
///
/// [`update()`]: #method.update
/// [`hash()`]: fn.hash.html
#[derive(Clone, Debug)]
pub struct Sha1 {
    state: [u32; 5],
    buffer: [u8; BLOCK_LENGTH],
    buffered: usize,
    // total message length in bytes
    length: u64,
}

impl Default for Sha1 {
    fn default() -> Sha1 {
        Sha1::new()
    }
}

impl Sha1 {
    pub fn new() -> Sha1 {
        Sha1 {
            state: INITIAL_STATE,
            buffer: [0; BLOCK_LENGTH],
            buffered: 0,
            length: 0,
        }
    }

    /// Append `bytes` to the message.
    pub fn update(&mut self, mut bytes: &[u8]) {
        self.length = self.length.wrapping_add(bytes.len() as u64);

        // top up a partially filled block first
        if self.buffered > 0 {
            let wanted = BLOCK_LENGTH - self.buffered;
            let taken = wanted.min(bytes.len());
            self.buffer[self.buffered..self.buffered + taken].copy_from_slice(&bytes[..taken]);
            self.buffered += taken;
            bytes = &bytes[taken..];

            if self.buffered < BLOCK_LENGTH {
                return;
            }
            let block = self.buffer;
            compress(&mut self.state, &block);
            self.buffered = 0;
        }

        let mut blocks = bytes.chunks_exact(BLOCK_LENGTH);
        for block in &mut blocks {
            compress(&mut self.state, block);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Pad the message and return its digest.
    ///
    /// The length field holds the message length in bits modulo 2^64.
    pub fn finalize(mut self) -> Digest {
        let bit_length = self.length.wrapping_mul(8);

        // a single `1` bit, then `0`s until the length is 448 (mod 512) bits
        let mut padding = [0_u8; BLOCK_LENGTH];
        padding[0] = 0x80;
        let padding_length = if self.buffered < LENGTH_OFFSET {
            LENGTH_OFFSET - self.buffered
        } else {
            BLOCK_LENGTH + LENGTH_OFFSET - self.buffered
        };
        self.update(&padding[..padding_length]);
        self.update(&bit_length.to_be_bytes());
        debug_assert_eq!(self.buffered, 0);

        let mut digest = [0_u8; DIGEST_LENGTH];
        for (chunk, word) in digest.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        digest
    }
}

/// Hash `message` and return its 20-byte digest.
pub fn hash(message: &[u8]) -> Digest {
    let mut hasher = Sha1::new();
    hasher.update(message);
    hasher.finalize()
}

/// Format `bytes` (typically a digest) as lower-case hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("{:02x}", bytes.iter().format(""))
}

fn choose(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (!x & z)
}

fn parity(x: u32, y: u32, z: u32) -> u32 {
    x ^ y ^ z
}

fn majority(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

fn compress(state: &mut [u32; 5], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_LENGTH);

    let mut schedule = [0_u32; 80];
    for (word, bytes) in schedule.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    for t in 16..80 {
        schedule[t] =
            (schedule[t - 3] ^ schedule[t - 8] ^ schedule[t - 14] ^ schedule[t - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = *state;
    for (t, word) in schedule.iter().enumerate() {
        let f = match t {
            0..=19 => choose(b, c, d),
            20..=39 => parity(b, c, d),
            40..=59 => majority(b, c, d),
            _ => parity(b, c, d),
        };
        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(ROUND_CONSTANTS[t / 20])
            .wrapping_add(*word);

        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    for (word, value) in state.iter_mut().zip([a, b, c, d, e].iter()) {
        *word = word.wrapping_add(*value);
    }
}
