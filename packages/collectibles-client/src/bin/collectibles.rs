//! Collectibles command-line front end.

use collectibles_client::shutdown;
use collectibles_client::upload::{data_url, UploadFile};
use collectibles_client::{
    Campaign, Client, CollectibleItem, Config, CreateNftForm, Error, FileKeyValueStore,
    HttpProvider,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
usage: collectibles <command>

commands:
  connect                                   request wallet access and cache the session
  disconnect                                forget the cached session
  session                                   show the cached session
  items                                     marketplace listings not yet minted by you
  campaigns                                 crowdfunding campaigns
  owned                                     collectibles you minted
  created                                   collectibles you created
  mint <title>                              mint a listed collectible
  create <name> <price> <image-file> [owner] [description]
  contribute <campaign-id> <amount>";

enum Failure {
    Usage(String),
    Client(Error),
}

impl From<Error> for Failure {
    fn from(e: Error) -> Self {
        Failure::Client(e)
    }
}

type Wallet = Client<HttpProvider, FileKeyValueStore>;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the JSON result.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Config error, fix collectibles.toml or COLLECTIBLES_* env vars");
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    match run(config, &args).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        }
        Err(Failure::Usage(msg)) => {
            eprintln!("{msg}\n\n{USAGE}");
            std::process::exit(2);
        }
        Err(Failure::Client(e)) => {
            error!(error = %e, "Command failed");
            eprintln!("{}", e.user_message());
            if let Some(fields) = e.field_errors() {
                for (field, message) in fields.fields() {
                    eprintln!("  {field}: {message}");
                }
            }
            std::process::exit(1);
        }
    }
}

async fn run(config: Config, args: &[String]) -> Result<Value, Failure> {
    let Some(command) = args.first() else {
        return Err(Failure::Usage("missing command".into()));
    };
    let rest = &args[1..];

    let store = Arc::new(FileKeyValueStore::new(&config.store_path));
    let provider = Arc::new(HttpProvider::detect(&config)?);
    let mut client = Client::new(config, provider, store);

    if command == "connect" {
        let session = client.connect().await?;
        return Ok(json!(session));
    }
    if command == "disconnect" {
        client.disconnect()?;
        return Ok(json!({ "disconnected": true }));
    }

    if client.restore_session()?.is_none() {
        return Err(Error::NotConnected.into());
    }

    tokio::select! {
        result = dispatch(&client, command, rest) => result,
        _ = shutdown::signal("collectibles") => {
            info!("Abandoning confirmation wait");
            client.shutdown();
            Err(Error::Cancelled.into())
        }
    }
}

async fn dispatch(client: &Wallet, command: &str, args: &[String]) -> Result<Value, Failure> {
    match (command, args) {
        ("session", []) => Ok(json!(client.session())),
        ("items", []) => {
            let items = client.available_items().await?;
            Ok(Value::Array(items.iter().map(item_json).collect()))
        }
        ("campaigns", []) => {
            let campaigns = client.campaigns().await?;
            Ok(campaigns_json(&campaigns))
        }
        ("owned", []) => Ok(json!(client.owned()?)),
        ("created", []) => Ok(json!(client.created()?)),
        ("mint", [title]) => {
            let item = client
                .items()
                .await?
                .into_iter()
                .find(|item| item.title == *title)
                .ok_or_else(|| Failure::Usage(format!("no listed collectible titled {title:?}")))?;
            Ok(json!(client.mint(&item).await?))
        }
        ("create", [name, price, image, extra @ ..]) if extra.len() <= 2 => {
            let file = UploadFile::from_path(Path::new(image))
                .map_err(|e| Failure::Usage(e.to_string()))?;
            let session_owner = client
                .session()
                .map(|s| s.address.to_checksum(None))
                .unwrap_or_default();
            let mut form = CreateNftForm {
                name: name.clone(),
                owner: extra.first().cloned().unwrap_or(session_owner),
                price: price.clone(),
                description: extra.get(1).cloned().unwrap_or_default(),
                image_data: data_url(&file),
            };
            Ok(json!(client.create_nft(&mut form).await?))
        }
        ("contribute", [id, amount]) => {
            let id: u64 = id
                .parse()
                .map_err(|_| Failure::Usage(format!("campaign id must be a number, got {id:?}")))?;
            let campaigns = client.contribute(id, amount).await?;
            Ok(campaigns_json(&campaigns))
        }
        _ => Err(Failure::Usage(format!("unknown command or arguments: {command}"))),
    }
}

fn item_json(item: &CollectibleItem) -> Value {
    json!({
        "tokenId": item.token_id,
        "title": item.title,
        "image": item.image,
        "creator": item.creator,
        "owner": item.owner,
        "price": item.price_display(),
        "createdAt": item.created_at,
    })
}

fn campaigns_json(campaigns: &[Campaign]) -> Value {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    Value::Array(
        campaigns
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "title": c.title,
                    "description": c.description,
                    "imageURI": c.image_uri,
                    "goal": c.goal_display(),
                    "raised": c.raised_display(),
                    "progress": c.progress_percent(),
                    "daysLeft": c.days_left(now),
                    "patrons": c.patrons(),
                    "status": c.status,
                })
            })
            .collect(),
    )
}
