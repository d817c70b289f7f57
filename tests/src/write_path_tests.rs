use crate::utils::*;
use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_primitives::{hex, U256};
use anyhow::Result;
use collectibles_client::abi::InterfaceDescriptor;
use collectibles_client::{ContractKind, CreateNftForm, Error};
use std::time::Duration;

fn form() -> CreateNftForm {
    CreateNftForm {
        name: "Lighthouse".into(),
        owner: account().to_checksum(None),
        price: "0.3".into(),
        description: String::new(),
        image_data: "/uploads/lighthouse.png".into(),
    }
}

#[tokio::test]
async fn test_contribute_half_ether_to_campaign_7() -> Result<()> {
    let (chain, client) = connected(FakeChain::new().with_campaign(7, "Well", "2", "1")).await?;

    let refreshed = client.contribute(7, "0.5").await?;

    let sent = chain.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["value"], "0x6f05b59d3b20000");
    let data = hex::decode(sent[0]["data"].as_str().unwrap())?;
    let contribute = InterfaceDescriptor::bundled(ContractKind::Crowdfunding)
        .function("contribute", 1)?
        .clone();
    assert_eq!(&data[..4], contribute.selector().as_slice());
    assert_eq!(
        contribute.abi_decode_input(&data[4..], true)?,
        vec![DynSolValue::Uint(U256::from(7u8), 256)]
    );

    assert_eq!(refreshed[0].total_contributions, ether("1.5"));
    assert_eq!(refreshed[0].patrons(), 2);
    assert_eq!(chain.campaign(7).unwrap().amounts.last(), Some(&ether("0.5")));

    assert!(client.owned()?.is_empty());
    assert!(client.created()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_create_with_empty_name_issues_no_calls() -> Result<()> {
    let (chain, client) = connected(FakeChain::new()).await?;
    let mut form = CreateNftForm {
        name: String::new(),
        ..form()
    };

    let err = client.create_nft(&mut form).await.unwrap_err();
    let fields = err.field_errors().unwrap();
    assert_eq!(fields.name.as_deref(), Some("Name is required"));
    assert!(fields.owner.is_none() && fields.price.is_none());
    assert!(chain.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_bad_contribution_issues_no_calls() -> Result<()> {
    let (chain, client) = connected(FakeChain::new().with_campaign(7, "Well", "2", "1")).await?;
    for amount in ["0", "-0.5", "half"] {
        let err = client.contribute(7, amount).await.unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)), "{amount}");
        assert_eq!(err.user_message(), "Amount must be a positive number.");
    }
    assert!(chain.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_create_persists_and_resets_form() -> Result<()> {
    let (chain, client) = connected(FakeChain::new()).await?;
    let mut form = CreateNftForm {
        description: "North shore".into(),
        ..form()
    };

    let done = client.create_nft(&mut form).await?;
    assert_eq!(form, CreateNftForm::default());
    assert!(chain.sent()[0].get("value").is_none());

    let created = client.created()?;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0], done.record);
    assert_eq!(created[0].title, "Lighthouse");
    assert_eq!(created[0].price, "0.3");
    assert_eq!(created[0].description.as_deref(), Some("North shore"));
    assert_eq!(created[0].tx_hash.as_deref(), Some(done.tx_hash.as_str()));

    // The contract now lists it.
    assert_eq!(client.items().await?[0].title, "Lighthouse");
    Ok(())
}

#[tokio::test]
async fn test_mint_persists_purchase() -> Result<()> {
    let (chain, client) = connected(FakeChain::new().with_item(3, "Robot", "0.2")).await?;
    let robot = client.items().await?.remove(0);

    let done = client.mint(&robot).await?;
    assert_eq!(chain.sent()[0]["value"], "0x2386f26fc10000");

    let owned = client.owned()?;
    assert_eq!(owned, vec![done.record.clone()]);
    assert_eq!(owned[0].token_id, Some(3));
    assert_eq!(owned[0].price, "0.01");
    assert_eq!(owned[0].owner, account().to_checksum(None));
    assert_eq!(owned[0].creator, creator().to_checksum(None));
    assert_eq!(owned[0].metadata_uri.as_deref(), Some("Robot"));
    Ok(())
}

#[tokio::test]
async fn test_reverted_mint_persists_nothing() -> Result<()> {
    let (_, client) = connected(
        FakeChain::new()
            .with_item(3, "Robot", "0.2")
            .with_receipts(Receipts::Reverted),
    )
    .await?;
    let robot = client.items().await?.remove(0);

    let err = client.mint(&robot).await.unwrap_err();
    assert!(matches!(err, Error::TransactionFailed(ref reason) if reason == "transaction reverted"));
    assert!(client.owned()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_confirmation_timeout() -> Result<()> {
    let config = collectibles_client::Config {
        confirmation_timeout_secs: 1,
        ..test_config()
    };
    let (chain, client) = connected_with(
        config,
        FakeChain::new().with_campaign(7, "Well", "2", "1").with_receipts(Receipts::Pending),
    )
    .await?;

    let err = client.contribute(7, "0.5").await.unwrap_err();
    let Error::Timeout(hash) = &err else {
        panic!("expected timeout, got {err:?}");
    };
    assert_eq!(hash, &format!("0x{:064x}", 1));
    assert!(chain.methods().iter().any(|m| m == "eth_getTransactionReceipt"));
    Ok(())
}

#[tokio::test]
async fn test_shutdown_cancels_wait() -> Result<()> {
    let config = collectibles_client::Config {
        confirmation_timeout_secs: 0,
        ..test_config()
    };
    let (_, client) = connected_with(
        config,
        FakeChain::new().with_item(3, "Robot", "0.2").with_receipts(Receipts::Pending),
    )
    .await?;
    let robot = client.items().await?.remove(0);

    let (result, _) = tokio::join!(client.mint(&robot), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.shutdown();
    });
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(client.owned()?.is_empty());
    Ok(())
}
