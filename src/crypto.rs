use {
    hmac::{Hmac, Mac},
    sha2::{Digest, Sha256},
};

type HmacSha256 = Hmac<Sha256>;

/// The length of a SHA-256 digest in bytes.
pub(crate) const SHA256_OUTPUT_LEN: usize = 32;

/// HMAC-SHA256 of `value` keyed by `key`.
#[inline(always)]
pub(crate) fn hmac_sha256(key: &[u8], value: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any size"),
    };
    mac.update(value);
    let mut tag = [0; SHA256_OUTPUT_LEN];
    tag.copy_from_slice(mac.finalize().into_bytes().as_slice());
    tag
}

#[inline(always)]
pub(crate) fn sha256_hex(value: &[u8]) -> String {
    hex::encode(Sha256::digest(value))
}
