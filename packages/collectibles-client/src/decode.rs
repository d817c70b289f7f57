//! Fail-closed mapping from ABI-decoded tuples to view-models.
//!
//! Fields are looked up by ABI component name, with aliases for names that
//! changed between contract revisions.

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::Param;
use alloy_primitives::{Address, U256};

use crate::models::{Campaign, CollectibleItem};
use crate::Error;

/// One returned struct, fields keyed by ABI name.
pub struct Record<'a> {
    kind: &'static str,
    fields: Vec<(&'a str, &'a DynSolValue)>,
}

impl<'a> Record<'a> {
    pub fn new(
        kind: &'static str,
        components: &'a [Param],
        value: &'a DynSolValue,
    ) -> Result<Self, Error> {
        let DynSolValue::Tuple(values) = value else {
            return Err(Error::Decode(format!("{kind}: expected a tuple")));
        };
        if values.len() != components.len() {
            return Err(Error::Decode(format!(
                "{kind}: expected {} fields, got {}",
                components.len(),
                values.len()
            )));
        }
        if let Some(pos) = components.iter().position(|p| p.name.is_empty()) {
            return Err(Error::Decode(format!("{kind}: field {pos} has no ABI name")));
        }
        let fields = components
            .iter()
            .map(|p| p.name.as_str())
            .zip(values.iter())
            .collect();
        Ok(Self { kind, fields })
    }

    fn field(&self, names: &[&str]) -> Result<&'a DynSolValue, Error> {
        names
            .iter()
            .find_map(|name| {
                self.fields
                    .iter()
                    .find(|(field, _)| field == name)
                    .map(|(_, v)| *v)
            })
            .ok_or_else(|| Error::Decode(format!("{}: missing field {}", self.kind, names[0])))
    }

    fn mistyped(&self, names: &[&str], expected: &str) -> Error {
        Error::Decode(format!("{}: field {} is not {expected}", self.kind, names[0]))
    }

    pub fn uint(&self, names: &[&str]) -> Result<U256, Error> {
        match self.field(names)? {
            DynSolValue::Uint(v, _) => Ok(*v),
            _ => Err(self.mistyped(names, "an unsigned integer")),
        }
    }

    pub fn u64(&self, names: &[&str]) -> Result<u64, Error> {
        let wide = self.uint(names)?;
        u64::try_from(wide).map_err(|_| self.mistyped(names, "within u64"))
    }

    pub fn u8(&self, names: &[&str]) -> Result<u8, Error> {
        let wide = self.uint(names)?;
        u8::try_from(wide).map_err(|_| self.mistyped(names, "within u8"))
    }

    pub fn string(&self, names: &[&str]) -> Result<String, Error> {
        match self.field(names)? {
            DynSolValue::String(s) => Ok(s.clone()),
            _ => Err(self.mistyped(names, "a string")),
        }
    }

    pub fn address(&self, names: &[&str]) -> Result<Address, Error> {
        match self.field(names)? {
            DynSolValue::Address(a) => Ok(*a),
            _ => Err(self.mistyped(names, "an address")),
        }
    }

    pub fn addresses(&self, names: &[&str]) -> Result<Vec<Address>, Error> {
        self.sequence(names)?
            .iter()
            .map(|v| match v {
                DynSolValue::Address(a) => Ok(*a),
                _ => Err(self.mistyped(names, "an address list")),
            })
            .collect()
    }

    pub fn uints(&self, names: &[&str]) -> Result<Vec<U256>, Error> {
        self.sequence(names)?
            .iter()
            .map(|v| match v {
                DynSolValue::Uint(n, _) => Ok(*n),
                _ => Err(self.mistyped(names, "an integer list")),
            })
            .collect()
    }

    fn sequence(&self, names: &[&str]) -> Result<&'a [DynSolValue], Error> {
        match self.field(names)? {
            DynSolValue::Array(items) | DynSolValue::FixedArray(items) => Ok(items.as_slice()),
            _ => Err(self.mistyped(names, "a list")),
        }
    }
}

/// View-models built from one returned struct.
pub trait FromRecord: Sized {
    const KIND: &'static str;

    fn from_record(record: &Record<'_>) -> Result<Self, Error>;
}

impl FromRecord for CollectibleItem {
    const KIND: &'static str = "collectible";

    fn from_record(r: &Record<'_>) -> Result<Self, Error> {
        Ok(Self {
            token_id: r.u64(&["tokenId", "id"])?,
            title: r.string(&["name", "title"])?,
            image: r.string(&["imageURL", "imageURI", "image"])?,
            creator: r.address(&["creator"])?,
            price: r.uint(&["price"])?,
            owner: r.address(&["owner"])?,
            created_at: r.u64(&["createdAt", "timestamp"])?,
        })
    }
}

impl FromRecord for Campaign {
    const KIND: &'static str = "campaign";

    fn from_record(r: &Record<'_>) -> Result<Self, Error> {
        let contributors = r.addresses(&["contributors"])?;
        let contribution_amounts = r.uints(&["contributionAmounts"])?;
        if contributors.len() != contribution_amounts.len() {
            return Err(Error::Decode(format!(
                "campaign: {} contributors but {} amounts",
                contributors.len(),
                contribution_amounts.len()
            )));
        }
        Ok(Self {
            id: r.u64(&["id"])?,
            title: r.string(&["title"])?,
            description: r.string(&["description"])?,
            image_uri: r.string(&["imageURI", "imageURL", "image"])?,
            goal: r.uint(&["goal"])?,
            starts_at: r.u64(&["startsAt"])?,
            ends_at: r.u64(&["endsAt"])?,
            status: r.u8(&["status"])?,
            total_contributions: r.uint(&["totalContributions"])?,
            contributors,
            contribution_amounts,
        })
    }
}

/// Decoded return values of one contract call.
#[derive(Debug, Clone)]
pub struct CallOutput {
    params: Vec<Param>,
    values: Vec<DynSolValue>,
}

impl CallOutput {
    pub fn new(params: Vec<Param>, values: Vec<DynSolValue>) -> Self {
        Self { params, values }
    }

    /// The `index`-th return value as an unsigned integer.
    pub fn uint(&self, index: usize) -> Result<U256, Error> {
        match self.values.get(index) {
            Some(DynSolValue::Uint(v, _)) => Ok(*v),
            Some(other) => Err(Error::Decode(format!(
                "return value {index} is not an unsigned integer: {other:?}"
            ))),
            None => Err(Error::Decode(format!("missing return value {index}"))),
        }
    }

    /// A single `tuple[]` return value as view-models.
    pub fn list<T: FromRecord>(&self) -> Result<Vec<T>, Error> {
        let (Some(param), Some(value)) = (self.params.first(), self.values.first()) else {
            return Err(Error::Decode(format!("{}: call returned nothing", T::KIND)));
        };
        let DynSolValue::Array(entries) = value else {
            return Err(Error::Decode(format!("{}: expected a list", T::KIND)));
        };
        entries
            .iter()
            .map(|entry| T::from_record(&Record::new(T::KIND, &param.components, entry)?))
            .collect()
    }
}
