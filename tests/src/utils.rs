use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::Function;
use alloy_primitives::{hex, Address, U256};
use collectibles_client::abi::InterfaceDescriptor;
use collectibles_client::provider::parse_quantity;
use collectibles_client::{
    Client, Config, ContractKind, MemoryKeyValueStore, ProviderError, WalletProvider,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub fn account() -> Address {
    Address::repeat_byte(0xab)
}

pub fn creator() -> Address {
    Address::repeat_byte(0xc0)
}

pub fn ether(decimal: &str) -> U256 {
    collectibles_types::parse_ether(decimal).unwrap()
}

/// What `eth_getTransactionReceipt` answers for submitted transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipts {
    Mined,
    Reverted,
    Pending,
}

#[derive(Debug, Clone)]
pub struct FakeItem {
    pub token_id: u64,
    pub title: String,
    pub image: String,
    pub creator: Address,
    pub price: U256,
    pub owner: Address,
}

#[derive(Debug, Clone)]
pub struct FakeCampaign {
    pub id: u64,
    pub title: String,
    pub goal: U256,
    pub ends_at: u64,
    pub total: U256,
    pub contributors: Vec<Address>,
    pub amounts: Vec<U256>,
}

struct ChainState {
    items: Vec<FakeItem>,
    campaigns: Vec<FakeCampaign>,
    mint_price: U256,
    deployed: bool,
    receipts: Receipts,
    permission_pending: bool,
    tx_count: u64,
}

/// In-process chain and wallet. Contract calls are answered by ABI-encoding
/// the state above, and every request is recorded.
pub struct FakeChain {
    state: Mutex<ChainState>,
    calls: Mutex<Vec<(String, Value)>>,
    functions: Vec<Function>,
}

impl FakeChain {
    pub fn new() -> Self {
        let market = InterfaceDescriptor::bundled(ContractKind::Marketplace);
        let crowd = InterfaceDescriptor::bundled(ContractKind::Crowdfunding);
        let functions = [
            (&market, "getAllNFTs", 0),
            (&market, "mintPrice", 0),
            (&market, "createNFT", 2),
            (&market, "mintNFT", 2),
            (&crowd, "getAllCampaigns", 0),
            (&crowd, "contribute", 1),
        ]
        .into_iter()
        .map(|(abi, name, arity)| abi.function(name, arity).unwrap().clone())
        .collect();

        Self {
            state: Mutex::new(ChainState {
                items: Vec::new(),
                campaigns: Vec::new(),
                mint_price: ether("0.01"),
                deployed: true,
                receipts: Receipts::Mined,
                permission_pending: false,
                tx_count: 0,
            }),
            calls: Mutex::new(Vec::new()),
            functions,
        }
    }

    pub fn with_item(self, token_id: u64, title: &str, price: &str) -> Self {
        self.state.lock().unwrap().items.push(FakeItem {
            token_id,
            title: title.into(),
            image: format!("/uploads/{token_id}.png"),
            creator: creator(),
            price: ether(price),
            owner: creator(),
        });
        self
    }

    pub fn with_campaign(self, id: u64, title: &str, goal: &str, raised: &str) -> Self {
        self.state.lock().unwrap().campaigns.push(FakeCampaign {
            id,
            title: title.into(),
            goal: ether(goal),
            ends_at: 4_102_444_800,
            total: ether(raised),
            contributors: vec![creator()],
            amounts: vec![ether(raised)],
        });
        self
    }

    pub fn without_code(self) -> Self {
        self.state.lock().unwrap().deployed = false;
        self
    }

    pub fn with_receipts(self, receipts: Receipts) -> Self {
        self.state.lock().unwrap().receipts = receipts;
        self
    }

    pub fn with_pending_permission(self) -> Self {
        self.state.lock().unwrap().permission_pending = true;
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(m, _)| m).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Transaction objects passed to `eth_sendTransaction`.
    pub fn sent(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == "eth_sendTransaction")
            .map(|(_, params)| params[0].clone())
            .collect()
    }

    pub fn campaign(&self, id: u64) -> Option<FakeCampaign> {
        let state = self.state.lock().unwrap();
        state.campaigns.iter().find(|c| c.id == id).cloned()
    }

    fn function_for(&self, data: &[u8]) -> Option<&Function> {
        self.functions
            .iter()
            .find(|f| data.len() >= 4 && f.selector().as_slice() == &data[..4])
    }

    fn handle(&self, method: &str, params: &Value) -> Result<Value, ProviderError> {
        let mut state = self.state.lock().unwrap();
        match method {
            "wallet_requestPermissions" if state.permission_pending => Err(rpc_error(
                -32002,
                "Request of type 'wallet_requestPermissions' already pending",
            )),
            "wallet_requestPermissions" => Ok(json!([{ "parentCapability": "eth_accounts" }])),
            "eth_requestAccounts" => Ok(json!([account().to_checksum(None).to_lowercase()])),
            "eth_getBalance" => Ok(json!("0xde0b6b3a7640000")),
            "eth_chainId" => Ok(json!("0x7a69")),
            "eth_getCode" if state.deployed => Ok(json!("0x608060405234801561001057600080fd5b50")),
            "eth_getCode" => Ok(json!("0x")),
            "eth_call" => {
                let data = calldata(params)?;
                let function = self
                    .function_for(&data)
                    .ok_or_else(|| rpc_error(-32000, "execution reverted"))?;
                let output = match function.name.as_str() {
                    "getAllNFTs" => DynSolValue::Array(state.items.iter().map(item_tuple).collect()),
                    "mintPrice" => uint(state.mint_price),
                    "getAllCampaigns" => {
                        DynSolValue::Array(state.campaigns.iter().map(campaign_tuple).collect())
                    }
                    _ => return Err(rpc_error(-32000, "execution reverted")),
                };
                let encoded = function
                    .abi_encode_output(&[output])
                    .map_err(|e| rpc_error(-32603, &e.to_string()))?;
                Ok(json!(hex::encode_prefixed(encoded)))
            }
            "eth_sendTransaction" => {
                let tx = &params[0];
                let data = calldata(params)?;
                let function = self
                    .function_for(&data)
                    .ok_or_else(|| rpc_error(-32000, "execution reverted"))?
                    .clone();
                let args = function
                    .abi_decode_input(&data[4..], true)
                    .map_err(|e| rpc_error(-32602, &e.to_string()))?;
                let value = tx
                    .get("value")
                    .map(parse_quantity)
                    .transpose()
                    .map_err(|e| rpc_error(-32602, &e.to_string()))?
                    .unwrap_or_default();
                let from: Address = tx["from"]
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| rpc_error(-32602, "missing from"))?;

                if state.receipts == Receipts::Mined {
                    apply(&mut state, &function.name, &args, from, value);
                }
                state.tx_count += 1;
                Ok(json!(format!("0x{:064x}", state.tx_count)))
            }
            "eth_getTransactionReceipt" => match state.receipts {
                Receipts::Pending => Ok(Value::Null),
                mode => {
                    let status = if mode == Receipts::Mined { "0x1" } else { "0x0" };
                    Ok(json!({
                        "transactionHash": params[0],
                        "blockNumber": "0x10",
                        "gasUsed": "0x5208",
                        "status": status,
                    }))
                }
            },
            _ => Err(rpc_error(-32601, "method not found")),
        }
    }
}

impl Default for FakeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletProvider for FakeChain {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));
        self.handle(method, &params)
    }
}

fn apply(state: &mut ChainState, function: &str, args: &[DynSolValue], from: Address, value: U256) {
    match (function, args) {
        ("contribute", [DynSolValue::Uint(id, _)]) => {
            if let Some(c) = state.campaigns.iter_mut().find(|c| U256::from(c.id) == *id) {
                c.total += value;
                c.contributors.push(from);
                c.amounts.push(value);
            }
        }
        ("mintNFT", [DynSolValue::Uint(id, _), DynSolValue::Address(to)]) => {
            if let Some(item) = state.items.iter_mut().find(|i| U256::from(i.token_id) == *id) {
                item.owner = *to;
            }
        }
        ("createNFT", [DynSolValue::String(name), DynSolValue::Uint(price, _)]) => {
            let token_id = state.items.len() as u64;
            state.items.push(FakeItem {
                token_id,
                title: name.clone(),
                image: String::new(),
                creator: from,
                price: *price,
                owner: from,
            });
        }
        _ => {}
    }
}

fn calldata(params: &Value) -> Result<Vec<u8>, ProviderError> {
    let raw = params[0]["data"]
        .as_str()
        .ok_or_else(|| rpc_error(-32602, "missing data"))?;
    hex::decode(raw).map_err(|e| rpc_error(-32602, &e.to_string()))
}

fn rpc_error(code: i64, message: &str) -> ProviderError {
    ProviderError::Rpc {
        code,
        message: message.into(),
        data: None,
    }
}

fn uint(value: U256) -> DynSolValue {
    DynSolValue::Uint(value, 256)
}

fn item_tuple(item: &FakeItem) -> DynSolValue {
    DynSolValue::Tuple(vec![
        uint(U256::from(item.token_id)),
        DynSolValue::String(item.title.clone()),
        DynSolValue::String(item.image.clone()),
        DynSolValue::Address(item.creator),
        uint(item.price),
        DynSolValue::Address(item.owner),
        uint(U256::from(1_700_000_000u64)),
    ])
}

fn campaign_tuple(c: &FakeCampaign) -> DynSolValue {
    DynSolValue::Tuple(vec![
        uint(U256::from(c.id)),
        DynSolValue::String(c.title.clone()),
        DynSolValue::String(format!("{} description", c.title)),
        DynSolValue::String(format!("/uploads/campaign-{}.png", c.id)),
        uint(c.goal),
        uint(U256::from(1_700_000_000u64)),
        uint(U256::from(c.ends_at)),
        DynSolValue::Uint(U256::ZERO, 8),
        uint(c.total),
        DynSolValue::Array(c.contributors.iter().copied().map(DynSolValue::Address).collect()),
        DynSolValue::Array(c.amounts.iter().copied().map(uint).collect()),
    ])
}

/// Short confirmation waits.
pub fn test_config() -> Config {
    Config {
        poll_interval_ms: 5,
        confirmation_timeout_secs: 2,
        ..Config::default()
    }
}

pub type TestClient = Client<FakeChain, MemoryKeyValueStore>;

/// Client with a connected session; the connect requests are cleared.
pub async fn connected(chain: FakeChain) -> anyhow::Result<(Arc<FakeChain>, TestClient)> {
    connected_with(test_config(), chain).await
}

pub async fn connected_with(
    config: Config,
    chain: FakeChain,
) -> anyhow::Result<(Arc<FakeChain>, TestClient)> {
    let chain = Arc::new(chain);
    let mut client = Client::new(
        config,
        Arc::clone(&chain),
        Arc::new(MemoryKeyValueStore::default()),
    );
    client.connect().await?;
    chain.clear_calls();
    Ok((chain, client))
}

pub fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "collectibles_it_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
