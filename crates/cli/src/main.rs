//! Fudsiti CLI - cart, orders and account from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Put 1.5 kg of product 1 in the cart and show totals
//! fudsiti --catalog products.json cart add 1 1.5
//! fudsiti --catalog products.json cart show
//!
//! # Place an order and move it through the workflow
//! fudsiti --catalog products.json order place --address "Moscow, Arbat, 25"
//! fudsiti order advance <order-id>
//!
//! # Sign in with a one-time code
//! fudsiti auth request-otp --phone +79998887766
//! fudsiti auth verify-otp --phone +79998887766 --request-id <id> --code 123456 --accept-terms
//! ```
//!
//! # Commands
//!
//! - `cart` - Add, update, remove and list cart lines
//! - `order` - Place orders and change their status
//! - `catalog` - Search the product catalogue
//! - `address` - Manage saved delivery addresses
//! - `auth` - Sign in, register and manage the session
//! - `state` - Inspect or reset the persisted snapshot

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fudsiti_core::{DeliveryMethod, OrderStatus, PaymentMethod, ProductUnit, UserRole};
use fudsiti_storefront::config::StorefrontConfig;
use fudsiti_storefront::error::AppError;

mod commands;
mod context;
mod output;

use context::Context;

#[derive(Parser)]
#[command(name = "fudsiti")]
#[command(author, version, about = "Fudsiti storefront CLI")]
struct Cli {
    /// JSON file with the product catalogue (array of products)
    #[arg(long, global = true, env = "FUDSITI_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place and track orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Browse the catalogue
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage saved delivery addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Account and session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Persisted snapshot
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product, merging with an existing line
    Add {
        product_id: String,
        quantity: Decimal,
        /// Unit (`kg`, `piece`, `box`); defaults to the catalogue unit
        #[arg(short, long)]
        unit: Option<ProductUnit>,
        /// Note for the vendor
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Set the quantity of a line
    Update { product_id: String, quantity: Decimal },
    /// Remove a line
    Remove { product_id: String },
    /// Empty the cart
    Clear,
    /// List lines, grouped by vendor when a catalogue is given
    Show,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List placed orders
    List,
    /// Turn the cart into a pending order
    Place {
        /// Delivery address text
        #[arg(short, long, conflicts_with = "address_id")]
        address: Option<String>,
        /// ID of a saved address
        #[arg(long)]
        address_id: Option<String>,
        /// `delivery` or `pickup`
        #[arg(long, default_value = "delivery")]
        delivery: DeliveryMethod,
        /// `cash`, `card` or `transfer`
        #[arg(long, default_value = "cash")]
        payment: PaymentMethod,
    },
    /// Move an order to a given status
    Status { order_id: String, status: OrderStatus },
    /// Move an order to the next status in the workflow
    Advance { order_id: String },
    /// Cancel an order
    Cancel { order_id: String },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Filter products by text and category
    Search {
        /// Text to match in name or description
        #[arg(default_value = "")]
        query: String,
        /// Category, or `all`
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List categories
    Categories,
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address to the signed-in profile
    Add {
        #[arg(long)]
        city: String,
        #[arg(long)]
        street: String,
        #[arg(long)]
        house: String,
        #[arg(long)]
        apartment: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Remove a saved address
    Remove { address_id: String },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in with email and password (and phone, if given)
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, env = "FUDSITI_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Register a new account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "FUDSITI_PASSWORD", hide_env_values = true)]
        password: String,
        /// `buyer` or `seller`
        #[arg(long, default_value = "buyer")]
        role: UserRole,
        #[arg(long)]
        accept_terms: bool,
    },
    /// Send a login code by SMS
    RequestOtp {
        #[arg(long)]
        phone: String,
    },
    /// Sign in with a received code
    VerifyOtp {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        request_id: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        remember_me: bool,
        #[arg(long)]
        accept_terms: bool,
    },
    /// Ask for an email or phone verification message
    SendVerification { channel: commands::auth::Channel },
    /// Confirm the phone with a texted code
    VerifyPhone { code: String },
    /// Refresh and show the signed-in user
    Me,
    /// End the session
    Logout,
}

#[derive(Subcommand)]
enum StateAction {
    /// Print the persisted snapshot
    Show,
    /// Delete the snapshot and start empty
    Reset,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fudsiti_storefront=info,fudsiti_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        e.report();
        tracing::error!("Command failed: {e}");
        output::error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let mut ctx = Context::open(config, cli.catalog.as_deref())?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Add {
                product_id,
                quantity,
                unit,
                comment,
            } => commands::cart::add(&mut ctx, &product_id, quantity, unit, comment)?,
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&mut ctx, &product_id, quantity)?,
            CartAction::Remove { product_id } => commands::cart::remove(&mut ctx, &product_id)?,
            CartAction::Clear => commands::cart::clear(&mut ctx),
            CartAction::Show => commands::cart::show(&ctx),
        },
        Commands::Order { action } => match action {
            OrderAction::List => commands::order::list(&ctx),
            OrderAction::Place {
                address,
                address_id,
                delivery,
                payment,
            } => commands::order::place(
                &mut ctx,
                address.as_deref(),
                address_id.as_deref(),
                delivery,
                payment,
            )?,
            OrderAction::Status { order_id, status } => {
                commands::order::set_status(&mut ctx, &order_id, status)?;
            }
            OrderAction::Advance { order_id } => commands::order::advance(&mut ctx, &order_id)?,
            OrderAction::Cancel { order_id } => {
                commands::order::set_status(&mut ctx, &order_id, OrderStatus::Cancelled)?;
            }
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Search { query, category } => {
                commands::catalog::search(&mut ctx, &query, category)?;
            }
            CatalogAction::Categories => commands::catalog::categories(&ctx)?,
        },
        Commands::Address { action } => match action {
            AddressAction::List => commands::address::list(&ctx)?,
            AddressAction::Add {
                city,
                street,
                house,
                apartment,
                comment,
            } => commands::address::add(&mut ctx, city, street, house, apartment, comment)?,
            AddressAction::Remove { address_id } => {
                commands::address::remove(&mut ctx, &address_id)?;
            }
        },
        Commands::Auth { action } => match action {
            AuthAction::Login {
                email,
                phone,
                password,
            } => commands::auth::login(&mut ctx, email, phone, password).await?,
            AuthAction::Signup {
                name,
                phone,
                email,
                password,
                role,
                accept_terms,
            } => {
                commands::auth::signup(
                    &mut ctx,
                    commands::auth::SignupArgs {
                        name,
                        phone,
                        email,
                        password,
                        role,
                        accept_terms,
                    },
                )
                .await?;
            }
            AuthAction::RequestOtp { phone } => commands::auth::request_otp(&mut ctx, phone).await?,
            AuthAction::VerifyOtp {
                phone,
                request_id,
                code,
                remember_me,
                accept_terms,
            } => {
                commands::auth::verify_otp(
                    &mut ctx,
                    phone,
                    request_id,
                    code,
                    remember_me,
                    accept_terms,
                )
                .await?;
            }
            AuthAction::SendVerification { channel } => {
                commands::auth::send_verification(&mut ctx, channel).await?;
            }
            AuthAction::VerifyPhone { code } => commands::auth::verify_phone(&mut ctx, &code).await?,
            AuthAction::Me => commands::auth::me(&mut ctx).await?,
            AuthAction::Logout => commands::auth::logout(&mut ctx).await?,
        },
        Commands::State { action } => match action {
            StateAction::Show => commands::state::show(&ctx)?,
            StateAction::Reset => commands::state::reset(&mut ctx)?,
        },
    }

    ctx.finish()
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_cart_add() {
        let cli = Cli::try_parse_from(["fudsiti", "cart", "add", "1", "1.5", "--unit", "kg"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Add {
                    unit: Some(ProductUnit::Kg),
                    ..
                }
            })
        ));
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["fudsiti", "order", "status", "o-1", "shipped"]).is_err());
    }
}
