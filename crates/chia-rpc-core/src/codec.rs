//! Address <-> puzzle hash conversion.
//!
//! The facade consumes address encoding through the narrow [`AddressCodec`]
//! trait. [`Bech32mCodec`] is the standard implementation: a 32-byte puzzle
//! hash encoded as bech32m under a network prefix (`xch` on mainnet,
//! `txch` on testnets).

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32m, Hrp};

use crate::error::CoreError;
use crate::types::is_header_hash;

const PUZZLE_HASH_LEN: usize = 32;
const MAINNET_PREFIX: Hrp = Hrp::parse_unchecked("xch");

pub trait AddressCodec: Send + Sync {
    /// Decode an address into a `0x`-prefixed puzzle hash.
    fn address_to_puzzle_hash(&self, address: &str) -> Result<String, CoreError>;

    /// Encode a puzzle hash (with or without `0x`) into an address.
    fn puzzle_hash_to_address(&self, puzzle_hash: &str) -> Result<String, CoreError>;
}

#[derive(Debug, Clone)]
pub struct Bech32mCodec {
    prefix: Hrp,
}

impl Bech32mCodec {
    pub fn new(prefix: &str) -> Result<Self, CoreError> {
        let prefix = Hrp::parse(prefix)
            .map_err(|e| CoreError::Codec(format!("invalid address prefix `{prefix}`: {e}")))?;
        Ok(Self { prefix })
    }

    pub fn mainnet() -> Self {
        Self {
            prefix: MAINNET_PREFIX,
        }
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }
}

impl Default for Bech32mCodec {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl AddressCodec for Bech32mCodec {
    fn address_to_puzzle_hash(&self, address: &str) -> Result<String, CoreError> {
        // Only the bech32m checksum is valid for addresses.
        let checked = CheckedHrpstring::new::<Bech32m>(address)
            .map_err(|e| CoreError::Codec(format!("invalid address `{address}`: {e}")))?;
        let prefix = checked.hrp();
        let data: Vec<u8> = checked.byte_iter().collect();
        if prefix != self.prefix {
            return Err(CoreError::Codec(format!(
                "address `{address}` has prefix `{prefix}`, expected `{}`",
                self.prefix
            )));
        }
        if data.len() != PUZZLE_HASH_LEN {
            return Err(CoreError::Codec(format!(
                "address `{address}` decodes to {} bytes, expected {PUZZLE_HASH_LEN}",
                data.len()
            )));
        }
        Ok(format!("0x{}", hex::encode(data)))
    }

    fn puzzle_hash_to_address(&self, puzzle_hash: &str) -> Result<String, CoreError> {
        let digits = puzzle_hash.strip_prefix("0x").unwrap_or(puzzle_hash);
        let bytes = hex::decode(digits)
            .map_err(|e| CoreError::Codec(format!("invalid puzzle hash `{puzzle_hash}`: {e}")))?;
        if bytes.len() != PUZZLE_HASH_LEN {
            return Err(CoreError::Codec(format!(
                "puzzle hash `{puzzle_hash}` is {} bytes, expected {PUZZLE_HASH_LEN}",
                bytes.len()
            )));
        }
        bech32::encode::<Bech32m>(self.prefix, &bytes)
            .map_err(|e| CoreError::Codec(format!("failed to encode `{puzzle_hash}`: {e}")))
    }
}

/// Accept either a puzzle hash or an address and return the puzzle hash.
///
/// Input that already looks like a `0x`-prefixed 32-byte hash is passed
/// through untouched; anything else is decoded as an address.
pub fn resolve_puzzle_hash(codec: &dyn AddressCodec, input: &str) -> Result<String, CoreError> {
    if is_header_hash(input) {
        return Ok(input.to_owned());
    }
    codec.address_to_puzzle_hash(input)
}
