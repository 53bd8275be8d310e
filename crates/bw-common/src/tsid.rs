//! TSID Generation
//!
//! Time-sorted identifiers encoded as 13-character Crockford Base32 strings.
//! The top 42 bits carry the millisecond timestamp so ids sort roughly by
//! creation time; the low 22 bits are random.

use chrono::Utc;
use rand::Rng;

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const RANDOM_BITS: u32 = 22;
const RANDOM_MASK: u64 = (1 << RANDOM_BITS) - 1;

pub struct TsidGenerator;

impl TsidGenerator {
    /// Generate a new TSID string.
    pub fn generate() -> String {
        let millis = Utc::now().timestamp_millis() as u64;
        let random = rand::thread_rng().gen::<u64>() & RANDOM_MASK;
        encode((millis << RANDOM_BITS) | random)
    }
}

fn encode(mut value: u64) -> String {
    let mut buf = [b'0'; 13];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(value & 0x1F) as usize];
        value >>= 5;
    }
    // The buffer only ever holds alphabet bytes, all ASCII.
    String::from_utf8_lossy(&buf).into_owned()
}
