//! Social client binary.
//!
//! Composition root: loads configuration, builds the client through
//! `client-bootstrap`, follows the feed, and publishes one post per line read
//! from stdin.
//!
//! # Examples
//!
//! ```bash
//! UPLOAD_HOST=http://localhost:3000 PROVIDER_RPC_URL=http://localhost:8545 \
//! SOCIAL_WALLET_ADDRESS=0xabc cargo run -p social-client
//! ```

use anyhow::{Context, Result};
use client_blockchain_core::{BlockNumber, ProfileFields, SocialAddress};
use client_bootstrap::{ClientBuilder, ClientConfig, ClientSetup};
use social_client::{Input, parse_line, resync_block};
use social_runtime::{DiagnosticEvent, Event, FeedEvent, SocialClient, Topic};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env().context("invalid configuration")?;
    let from_block = config.subscription_from_block;

    tracing::info!("Starting social client");
    tracing::info!("Upload host: {}", config.upload_host);
    tracing::info!("Wallet type: {}", config.wallet_type);

    let ClientSetup {
        mut client,
        actor,
        connections,
        ..
    } = ClientBuilder::new(config).build().await?;

    let printer = tokio::spawn(print_events(
        client.subscribe(Topic::Feed),
        client.subscribe(Topic::Diagnostics),
    ));

    client.start_post_subscription(from_block).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = parse_line(&line);
        if input == Input::Quit {
            break;
        }
        let result =
            handle_input(&mut client, actor.as_ref(), &connections, from_block, input).await;
        if let Err(err) = result {
            tracing::error!("{:#}", err);
        }
    }

    drop(connections);
    client.shutdown().await?;
    printer.abort();
    Ok(())
}

async fn handle_input(
    client: &mut SocialClient,
    actor: Option<&SocialAddress>,
    connections: &client_bootstrap::ConnectionsService,
    from_block: BlockNumber,
    input: Input,
) -> Result<()> {
    let require_actor = || actor.cloned().context("SOCIAL_WALLET_ADDRESS is not set");

    match input {
        Input::Post(text) => {
            let draft = client.build_post(&text, &[], require_actor()?);
            if client.send_post(draft).await?.is_none() {
                tracing::info!("Nothing to post");
            }
        }
        Input::Reply { in_reply_to, text } => {
            let draft = client.build_post(&text, &[], require_actor()?);
            if client.send_reply(draft, &in_reply_to).await?.is_none() {
                tracing::info!("Reply needs a target and some text");
            }
        }
        Input::Profile(name) => {
            let draft = client.build_profile(ProfileFields::named(name), require_actor()?);
            client.send_profile(draft).await?;
        }
        Input::Connections => {
            let list = connections.connections(&require_actor()?).await?;
            let names = |profiles: &[client_blockchain_core::Profile]| {
                profiles
                    .iter()
                    .map(|p| p.name().unwrap_or(p.social_address.as_str()).to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            println!("following:     {}", names(&list.following));
            println!("followers:     {}", names(&list.followers));
            println!("not following: {}", names(&list.not_following));
        }
        Input::PostCount => {
            let count = connections.post_count(&require_actor()?).await?;
            println!("posts: {count}");
        }
        Input::Resync(block) => {
            client
                .start_post_subscription(resync_block(block, from_block))
                .await?;
        }
        Input::Unknown(line) => tracing::warn!("Unknown command: {}", line),
        Input::Empty | Input::Quit => {}
    }
    Ok(())
}

async fn print_events(
    mut feed: broadcast::Receiver<Event>,
    mut diagnostics: broadcast::Receiver<Event>,
) {
    loop {
        let event = tokio::select! {
            event = feed.recv() => event,
            event = diagnostics.recv() => event,
        };

        match event {
            Ok(Event::Feed(FeedEvent::FeedItemAdded(item))) => {
                let marker = if item.is_reply() { "↳" } else { "•" };
                println!(
                    "{} [{}] {}: {}",
                    marker, item.block_number, item.from_address, item.content.content
                );
            }
            Ok(Event::Feed(FeedEvent::FeedCleared { cleared })) => {
                tracing::debug!("Feed cleared ({} items)", cleared);
            }
            Ok(Event::Diagnostics(DiagnosticEvent::RowSkipped { batch_url, row, error, .. })) => {
                tracing::warn!("Skipped row {} of {}: {}", row, batch_url, error);
            }
            Ok(Event::Diagnostics(DiagnosticEvent::BatchRejected { batch_url, error, .. })) => {
                tracing::warn!("Rejected batch {}: {}", batch_url, error);
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Event printer lagged, {} events dropped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
