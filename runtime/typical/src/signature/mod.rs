//! Type signatures of tuples.
//!
//! A signature is the leading `SignatureTag` byte followed by the interned
//! index of every slot type, LEB128 encoded. Index `0` is absent. Equal
//! ordered type lists always produce equal signatures, and the tag keeps data
//! and error signatures apart.
//!
//! Every signature is recorded in the `MatchCache` together with its decoded
//! type list, which is what the matcher reads on a cache miss.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::cache::MatchCache;
use crate::leb128::{read_uleb128_u64, write_uleb128_u64};
use crate::typed::TypeToken;
use crate::value::{Datum, ErrorSlot};

/// The runtime type of every slot, `None` for absent slots.
pub type TypeList = Arc<[Option<TypeToken>]>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignatureTag {
    /// Computed from the slots.
    Data = 0,
    /// Reused from the producing handler's output type.
    StaticData = 1,
    Error = 2,
}

impl SignatureTag {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(SignatureTag::Data),
            1 => Some(SignatureTag::StaticData),
            2 => Some(SignatureTag::Error),
            _ => None,
        }
    }
}

/// Comparable, hashable identity of a tuple's runtime types.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature(Arc<[u8]>);

impl Signature {
    fn from_bytes(bytes: Vec<u8>) -> Self {
        Signature(bytes.into())
    }

    pub fn tag(&self) -> SignatureTag {
        self.0
            .first()
            .copied()
            .and_then(SignatureTag::from_byte)
            .unwrap_or(SignatureTag::Data)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.tag() == SignatureTag::Error
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The encoded indices after the tag: interned slot types for data and
    /// error signatures, the interned output type for static ones.
    pub fn indices(&self) -> Vec<u64> {
        let bytes = self.0.get(1..).unwrap_or_default();
        let mut offset = 0;
        let mut out = Vec::new();
        while let Some(index) = read_uleb128_u64(bytes, &mut offset) {
            out.push(index);
        }
        out
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Signature(")?;
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        f.write_str(")")
    }
}

fn encode(cache: &MatchCache, tag: SignatureTag, types: &[Option<TypeToken>]) -> Signature {
    let mut bytes = Vec::with_capacity(types.len().saturating_add(1));
    bytes.push(tag as u8);
    for ty in types {
        let index = ty.as_ref().map_or(0, |ty| cache.intern_type(ty));
        write_uleb128_u64(&mut bytes, index);
    }
    Signature::from_bytes(bytes)
}

/// Signature of a data tuple.
///
/// With a `static_key` (the output type of a handler whose slots are all
/// concrete) the slots are only inspected the first time the key is seen;
/// afterwards the recorded signature is reused.
pub(crate) fn data_signature(
    cache: &MatchCache,
    slots: &[Datum],
    static_key: Option<TypeId>,
) -> Signature {
    if let Some(key) = static_key {
        if let Some(signature) = cache.static_signature(key) {
            return signature;
        }
    }

    let types: TypeList = slots.iter().map(Datum::type_token).collect();
    let Some(key) = static_key else {
        let signature = encode(cache, SignatureTag::Data, &types);
        cache.record_types(&signature, types);
        return signature;
    };

    let mut bytes = vec![SignatureTag::StaticData as u8];
    write_uleb128_u64(&mut bytes, cache.intern_type_id(key));
    let signature = Signature::from_bytes(bytes);
    tracing::debug!(?signature, slots = types.len(), "recorded static signature");
    // The type list must be visible before the key can be reused.
    cache.record_types(&signature, types);
    cache.record_static(key, signature.clone());
    signature
}

/// Signature of an error tuple: the tag and the concrete error type.
pub(crate) fn error_signature(cache: &MatchCache, slot: &ErrorSlot) -> Signature {
    let types: TypeList = Arc::new([slot.datum().type_token()]);
    let signature = encode(cache, SignatureTag::Error, &types);
    cache.record_types(&signature, types);
    signature
}
