use rand_core::{OsRng, RngCore};

/// Random bytes per token; rendered as twice as many hex characters.
pub const SHARE_TOKEN_BYTES: usize = 16;

/// Generates a fresh share token: 16 CSPRNG bytes as 32 lowercase hex chars.
///
/// Hex keeps the token safe to embed directly in a URL path segment.
pub fn generate() -> String {
    let mut bytes = [0u8; SHARE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
