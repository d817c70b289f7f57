use crate::utils::*;
use anyhow::Result;
use collectibles_client::{
    Client, Config, ContractKind, Deployment, Error, HttpProvider, MemoryKeyValueStore,
};
use std::sync::Arc;

#[tokio::test]
async fn test_connect_populates_session() -> Result<()> {
    let chain = Arc::new(FakeChain::new());
    let mut client = Client::new(
        test_config(),
        Arc::clone(&chain),
        Arc::new(MemoryKeyValueStore::default()),
    );
    let session = client.connect().await?.clone();

    assert_eq!(session.address, account());
    assert_eq!(session.balance, "1.0");
    assert_eq!(session.chain_id.as_deref(), Some("31337"));
    assert_eq!(session.network.as_deref(), Some("unknown"));
    assert_eq!(
        chain.methods(),
        vec!["wallet_requestPermissions", "eth_requestAccounts", "eth_getBalance", "eth_chainId"]
    );
    Ok(())
}

#[tokio::test]
async fn test_pending_permission_request_is_distinct() -> Result<()> {
    let chain = Arc::new(FakeChain::new().with_pending_permission());
    let mut client = Client::new(
        test_config(),
        Arc::clone(&chain),
        Arc::new(MemoryKeyValueStore::default()),
    );
    let err = client.connect().await.unwrap_err();

    assert!(matches!(err, Error::RequestPending));
    assert!(err.user_message().contains("pending"));
    assert!(client.session().is_none());
    assert_eq!(chain.methods(), vec!["wallet_requestPermissions"]);
    Ok(())
}

#[test]
fn test_missing_wallet_is_unavailable() {
    let config = Config {
        rpc_url: String::new(),
        ..Config::default()
    };
    let err = HttpProvider::detect(&config).err().unwrap();
    assert!(matches!(err, Error::WalletUnavailable));
    assert!(err.user_message().starts_with("No wallet found"));
}

#[tokio::test]
async fn test_missing_code_blocks_binding() -> Result<()> {
    let (chain, client) = connected(FakeChain::new().without_code()).await?;

    let err = client.items().await.unwrap_err();
    assert!(matches!(err, Error::ContractNotFound(_)));
    assert_eq!(chain.methods(), vec!["eth_getCode"]);

    // Still unbound: the next read checks again rather than calling.
    assert!(client.campaigns().await.is_err());
    assert!(!chain.methods().iter().any(|m| m == "eth_call"));
    Ok(())
}

#[tokio::test]
async fn test_pinned_chain_mismatch() -> Result<()> {
    let mut config = test_config();
    config.marketplace = Deployment {
        chain_id: Some(11155111),
        ..config.marketplace.clone()
    };
    let (chain, client) = connected_with(config, FakeChain::new()).await?;

    let err = client.items().await.unwrap_err();
    assert!(matches!(
        err,
        Error::WrongNetwork { expected: 11155111, ref actual } if actual == "31337"
    ));
    assert!(chain.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_session_change_rebinds() -> Result<()> {
    let (chain, mut client) = connected(FakeChain::new()).await?;
    let code_checks = || chain.methods().iter().filter(|m| *m == "eth_getCode").count();

    client.binding(ContractKind::Marketplace).await?;
    client.items().await?;
    assert_eq!(code_checks(), 1);

    client.connect().await?;
    client.items().await?;
    assert_eq!(code_checks(), 2);

    client.disconnect()?;
    assert!(matches!(client.items().await, Err(Error::NotConnected)));
    assert_eq!(code_checks(), 2);
    Ok(())
}
