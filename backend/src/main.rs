//! `gig-market` command-line entry point.
//!
//! Wires configuration, tracing, and the in-memory marketplace, then runs
//! one marketplace operation per invocation and prints the result.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use gig_market::MarketplaceSettings;
use gig_market::domain::ports::MarketplaceApi;
use gig_market::domain::{
    AssistantLanguage, AssistantService, BookingFlow, ChatThread, FavoritesSynchronizer,
    GigCategory, GigFilter, GigId, NewGig, PaymentStatus, Price, SessionState, UserName,
    UserRole,
};
use gig_market::outbound::memory::InMemoryMarketplace;
use ortho_config::OrthoConfig;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `gig-market` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "gig-market",
    about = "Browse, book, and manage gigs in the demonstration marketplace",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List gigs, optionally filtered by category and search term.
    Gigs {
        /// Category label, for example "Home Repair".
        #[arg(long)]
        category: Option<GigCategory>,
        /// Case-insensitive text matched against titles and descriptions.
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show up to three gigs in the same category as a gig.
    Similar {
        /// Reference gig.
        gig_id: String,
    },
    /// Show the reviews left on a gig.
    Reviews {
        /// Reviewed gig.
        gig_id: String,
    },
    /// Pay for a booking, retrying declined attempts.
    Pay {
        /// Booked gig.
        gig_id: String,
        /// Maximum number of attempts.
        #[arg(long, default_value_t = 3)]
        attempts: u32,
    },
    /// Send a chat message about a gig and print the thread.
    Chat {
        /// Gig under discussion.
        gig_id: String,
        /// Message text.
        message: String,
    },
    /// Sign in as a customer, favourite gigs, and print the favourites.
    Favorite {
        /// Customer name.
        #[arg(long)]
        name: String,
        /// Gigs to favourite.
        gig_ids: Vec<String>,
    },
    /// Sign in as a worker and publish a gig.
    Publish {
        /// Worker name.
        #[arg(long)]
        name: String,
        /// Listing title.
        #[arg(long)]
        title: String,
        /// Category label.
        #[arg(long)]
        category: GigCategory,
        /// Price in the marketplace currency.
        #[arg(long)]
        price: Decimal,
        /// Listing description.
        #[arg(long)]
        description: String,
    },
    /// Draft a gig description from keywords.
    Describe {
        /// Keywords guiding the description.
        keywords: String,
        /// Output language code (`en`, `fr`, `es`, `ht`).
        #[arg(long, default_value = "en")]
        lang: String,
    },
    /// Suggest a resolution for a dispute.
    Mediate {
        /// Description of the dispute.
        details: String,
        /// Output language code (`en`, `fr`, `es`, `ht`).
        #[arg(long, default_value = "en")]
        lang: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = MarketplaceSettings::load_from_iter([OsString::from("gig-market")])
        .map_err(|error| eyre!("failed to load configuration: {error}"))?;
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    runtime.block_on(run(cli.command, settings))
}

async fn run(command: Command, settings: MarketplaceSettings) -> Result<()> {
    let api = Arc::new(
        settings
            .marketplace()
            .wrap_err("failed to load the seed catalogue")?,
    );
    match command {
        Command::Gigs { category, search } => {
            let filter = GigFilter { category, search };
            print_json(&filter.apply(api.list_gigs().await?))
        }
        Command::Similar { gig_id } => {
            let gig_id = parse_gig_id(gig_id)?;
            let gig = api
                .gig(&gig_id)
                .await?
                .ok_or_else(|| eyre!("gig {gig_id} not found"))?;
            print_json(&api.similar_gigs(&gig.id, gig.category).await?)
        }
        Command::Reviews { gig_id } => {
            let gig_id = parse_gig_id(gig_id)?;
            print_json(&api.reviews_for_gig(&gig_id).await?)
        }
        Command::Pay { gig_id, attempts } => pay(api, parse_gig_id(gig_id)?, attempts).await,
        Command::Chat { gig_id, message } => {
            let thread = ChatThread::open(api, parse_gig_id(gig_id)?);
            thread.send(&message).await;
            print_json(&thread.messages())
        }
        Command::Favorite { name, gig_ids } => favorite(api, name, gig_ids).await,
        Command::Publish {
            name,
            title,
            category,
            price,
            description,
        } => {
            let session = SessionState::new(api.clone());
            let worker = session
                .login(&UserName::new(name)?, UserRole::Worker)
                .await?;
            let new_gig = NewGig {
                title,
                category,
                price: Price::new(price)?,
                description,
                eta: "1 hour".to_owned(),
                distance: "Nearby".to_owned(),
                image: format!("https://picsum.photos/seed/{}/400/300", worker.id()),
            };
            print_json(&api.create_gig(worker.id(), new_gig).await?)
        }
        Command::Describe { keywords, lang } => {
            let assistant = AssistantService::new(settings.text_generator()?);
            let text = assistant
                .describe_gig(&keywords, AssistantLanguage::from_code(&lang))
                .await;
            println!("{text}");
            Ok(())
        }
        Command::Mediate { details, lang } => {
            let assistant = AssistantService::new(settings.text_generator()?);
            let text = assistant
                .suggest_resolution(&details, AssistantLanguage::from_code(&lang))
                .await;
            println!("{text}");
            Ok(())
        }
    }
}

async fn pay(api: Arc<InMemoryMarketplace>, gig_id: GigId, attempts: u32) -> Result<()> {
    let booking = BookingFlow::new(api, gig_id);
    for attempt in 1..=attempts {
        let status = booking.pay().await;
        println!("attempt={attempt} status={status:?}");
        if status == PaymentStatus::Success {
            return Ok(());
        }
    }
    Err(eyre!("payment for {} was declined", booking.gig_id()))
}

async fn favorite(api: Arc<InMemoryMarketplace>, name: String, gig_ids: Vec<String>) -> Result<()> {
    let session = SessionState::new(api.clone());
    let customer = session
        .login(&UserName::new(name)?, UserRole::Customer)
        .await?;
    let favorites = FavoritesSynchronizer::new(api);
    favorites.activate(Some(customer.id().clone())).await;
    for gig_id in gig_ids {
        favorites.add(&parse_gig_id(gig_id)?).await;
    }
    print_json(&favorites.favorite_gigs().await)
}

fn parse_gig_id(raw: String) -> Result<GigId> {
    GigId::new(raw).wrap_err("invalid gig id")
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).wrap_err("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
