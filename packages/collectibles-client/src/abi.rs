//! Contract interface descriptors (JSON ABI).

use alloy_json_abi::{Function, JsonAbi};
use serde_json::Value;
use std::sync::Arc;

use crate::config::{ContractKind, Deployment};
use crate::Error;

const NFT_MARKETPLACE_TOKEN: &str = include_str!("../abi/NFTMarketplaceToken.json");
const CROWDFUNDING: &str = include_str!("../abi/CrowdFunding.json");

/// A parsed ABI, shared by every binding to the same deployment.
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    abi: Arc<JsonAbi>,
}

impl InterfaceDescriptor {
    /// Parse a Hardhat artifact (`{"abi": [...]}`) or a bare ABI array.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::Interface(format!("ABI is not valid JSON: {e}")))?;
        let abi_value = match value {
            Value::Object(mut artifact) => artifact
                .remove("abi")
                .ok_or_else(|| Error::Interface("artifact has no \"abi\" field".into()))?,
            array @ Value::Array(_) => array,
            other => {
                return Err(Error::Interface(format!(
                    "expected ABI array or artifact, got {other}"
                )))
            }
        };
        let abi: JsonAbi = serde_json::from_value(abi_value)
            .map_err(|e| Error::Interface(format!("malformed ABI: {e}")))?;
        Ok(Self { abi: Arc::new(abi) })
    }

    /// ABI shipped with the client for each contract kind.
    pub fn bundled(kind: ContractKind) -> Self {
        let json = match kind {
            ContractKind::Nft | ContractKind::Marketplace => NFT_MARKETPLACE_TOKEN,
            ContractKind::Crowdfunding => CROWDFUNDING,
        };
        Self::from_json(json).expect("bundled ABI is a valid artifact")
    }

    /// The deployment's configured ABI file, or the bundled one.
    pub fn for_deployment(kind: ContractKind, deployment: &Deployment) -> Result<Self, Error> {
        match &deployment.abi_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("failed to read ABI {path}: {e}")))?;
                Self::from_json(&json)
            }
            None => Ok(Self::bundled(kind)),
        }
    }

    /// Resolve `name` taking `arity` arguments.
    pub fn function(&self, name: &str, arity: usize) -> Result<&Function, Error> {
        let overloads = self
            .abi
            .function(name)
            .ok_or_else(|| Error::Interface(format!("interface has no method {name}")))?;
        overloads
            .iter()
            .find(|f| f.inputs.len() == arity)
            .ok_or_else(|| {
                Error::Interface(format!("{name} does not take {arity} argument(s)"))
            })
    }
}
