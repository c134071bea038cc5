use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Length in bytes of a hash lock and of a secret.
pub const HASH_LENGTH: usize = 32;

/// Account identifier on the host ledger.
///
/// The engine treats addresses as opaque strings; the host is responsible for
/// their encoding and for verifying that the submitter controls them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an account identifier.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address of a module-owned account, e.g. the HTLC escrow.
    pub fn module(name: &str) -> Self {
        Self(format!("module/{}", name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Value in the smallest unit of `denom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// Value in atomic units.
    pub value: u128,
    /// Denomination, e.g. `uiris`.
    pub denom: String,
}

impl Amount {
    /// Create a new amount.
    pub fn new(value: u128, denom: impl Into<String>) -> Self {
        Self {
            value,
            denom: denom.into(),
        }
    }

    /// A positive amount has a non-zero value and a denomination.
    pub fn is_positive(&self) -> bool {
        self.value > 0 && !self.denom.trim().is_empty()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.denom)
    }
}

/// Parses the coin notation used on the command line: `100uiris`.
impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ValidationError::InvalidAmount(format!("missing denom in '{}'", s)))?;
        let (value, denom) = s.split_at(split);
        let value = value
            .parse::<u128>()
            .map_err(|e| ValidationError::InvalidAmount(format!("'{}': {}", s, e)))?;
        Ok(Self::new(value, denom.trim()))
    }
}

fn decode_fixed(input: &str) -> Result<[u8; HASH_LENGTH], String> {
    let bytes = hex::decode(input).map_err(|e| e.to_string())?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("expected {} bytes, got {}", HASH_LENGTH, b.len()))
}

/// The 32-byte commitment a contract is locked under. Also its store key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashLock([u8; HASH_LENGTH]);

impl HashLock {
    pub fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Decode a hex string that must encode exactly 32 bytes.
    pub fn from_hex(input: &str) -> Result<Self, ValidationError> {
        decode_fixed(input)
            .map(Self)
            .map_err(|e| ValidationError::InvalidHashLock(format!("'{}': {}", input, e)))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }
}

impl fmt::Display for HashLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for HashLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashLock({})", self.to_hex())
    }
}

impl Serialize for HashLock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HashLock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// The 32-byte preimage revealed by a successful claim.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Secret([u8; HASH_LENGTH]);

impl Secret {
    pub fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Decode a hex string that must encode exactly 32 bytes.
    pub fn from_hex(input: &str) -> Result<Self, ValidationError> {
        decode_fixed(input)
            .map(Self)
            .map_err(ValidationError::InvalidSecret)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Secrets stay out of debug output until they are published by a claim.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Hex (de)serialization for opaque byte strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of an HTLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HtlcState {
    /// Funds are locked and the contract awaits a claim or its deadline.
    Open,
    /// The receiver was paid after the secret was revealed. Final state.
    Completed,
    /// The deadline passed without a claim; awaiting refund.
    Expired,
    /// Funds were returned to the sender. Final state.
    Refunded,
}

impl HtlcState {
    /// Whether this is a final (terminal) state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Refunded)
    }
}

impl fmt::Display for HtlcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Completed => write!(f, "Completed"),
            Self::Expired => write!(f, "Expired"),
            Self::Refunded => write!(f, "Refunded"),
        }
    }
}

/// A hashed time-locked contract as held by the contract store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Htlc {
    /// Funds originator; the only account allowed to refund.
    pub sender: Address,
    /// Beneficiary of a successful claim.
    pub receiver: Address,
    /// Receiver address on the counter-chain. Carried, never interpreted.
    #[serde(with = "hex_bytes")]
    pub receiver_on_other_chain: Vec<u8>,
    /// Locked amount.
    pub out_amount: Amount,
    /// Amount expected on the counter-chain. Informational only.
    pub in_amount: u64,
    /// Commitment the secret must hash to.
    pub hash_lock: HashLock,
    /// Nonce folded into the commitment alongside the secret.
    pub timestamp: u64,
    /// Height at or after which the contract may expire.
    pub expiration_height: u64,
    /// Current lifecycle state.
    pub state: HtlcState,
    /// Revealed preimage, set once the contract is claimed.
    pub secret: Option<Secret>,
}
