use crate::utils::*;
use anyhow::Result;
use collectibles_client::models::Titled;

#[tokio::test]
async fn test_empty_listing() -> Result<()> {
    let (_, client) = connected(FakeChain::new()).await?;
    assert!(client.items().await?.is_empty());
    assert!(client.campaigns().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_items_map_to_view_models() -> Result<()> {
    let (chain, client) = connected(
        FakeChain::new()
            .with_item(1, "Sunset", "0.5")
            .with_item(2, "Harbor", "1.25"),
    )
    .await?;

    let items = client.items().await?;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].token_id, 1);
    assert_eq!(items[0].title(), "Sunset");
    assert_eq!(items[0].image, "/uploads/1.png");
    assert_eq!(items[0].creator, creator());
    assert_eq!(items[0].price_display(), "0.5");
    assert_eq!(items[1].price, ether("1.25"));
    assert_eq!(items[1].created_at, 1_700_000_000);
    assert_eq!(chain.methods(), vec!["eth_getCode", "eth_call"]);
    Ok(())
}

#[tokio::test]
async fn test_campaign_progress() -> Result<()> {
    let (_, client) = connected(FakeChain::new().with_campaign(7, "Well", "2", "0.5")).await?;

    let campaigns = client.campaigns().await?;
    let well = &campaigns[0];
    assert_eq!(well.id, 7);
    assert_eq!(well.image_uri, "/uploads/campaign-7.png");
    assert_eq!(well.goal_display(), "2.0");
    assert_eq!(well.raised_display(), "0.5");
    assert_eq!(well.progress_percent(), 25);
    assert_eq!(well.patrons(), 1);
    assert!(well.days_left(1_700_000_000) > 0);
    Ok(())
}

#[tokio::test]
async fn test_mint_price_in_base_units() -> Result<()> {
    let (_, client) = connected(FakeChain::new()).await?;
    assert_eq!(client.mint_price().await?, ether("0.01"));
    Ok(())
}

#[tokio::test]
async fn test_minted_items_hidden_from_listing() -> Result<()> {
    let (_, client) = connected(
        FakeChain::new()
            .with_item(1, "Sunset", "0.5")
            .with_item(2, "Harbor", "0.5"),
    )
    .await?;

    let sunset = client.items().await?.remove(0);
    client.mint(&sunset).await?;

    let available = client.available_items().await?;
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].title, "Harbor");
    // The full listing is unaffected.
    assert_eq!(client.items().await?.len(), 2);
    Ok(())
}
