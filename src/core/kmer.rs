use anyhow::{Result, bail};

/// Display alphabet, indexed by packed code. The packing below maps
/// A->0, C->1, T->2, G->3, so this table is not in alphabetical order.
const DECODE: [u8; 4] = [b'A', b'C', b'T', b'G'];

/// 2-bit code of one symbol byte. Bits 1-2 of the ASCII value distinguish
/// the four bases and the case bit is shifted out, so `a` and `A` collapse
/// to the same code.
#[inline]
pub fn symbol_code(b: u8) -> u64 {
    ((b >> 1) & 0x3) as u64
}

/// Encode a literal subsequence into a packed key, first symbol in the low
/// bits — the same layout the scanner produces. Unlike the scanner, which
/// trusts its pre-extracted buffer, literals come from the command line and
/// are checked.
pub fn encode(literal: &[u8]) -> Result<u64> {
    if literal.is_empty() || literal.len() > 32 {
        bail!("subsequence must be 1..=32 symbols, got {}", literal.len());
    }
    let mut key = 0u64;
    for (i, &b) in literal.iter().enumerate() {
        match b & 0xDF {
            b'A' | b'C' | b'G' | b'T' => {}
            _ => bail!("invalid symbol {:?} in subsequence", b as char),
        }
        key |= symbol_code(b) << (2 * i);
    }
    Ok(key)
}

/// Decode a packed key back to its display string in canonical casing.
pub fn decode(key: u64, window: u32) -> String {
    let mut out = String::with_capacity(window as usize);
    for i in 0..window {
        out.push(DECODE[((key >> (2 * i)) & 0x3) as usize] as char);
    }
    out
}
