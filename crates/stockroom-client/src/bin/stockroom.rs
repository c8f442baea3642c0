//! # Stockroom Console CLI
//!
//! A small command-line front end for the console.
//!
//! ## Usage
//! ```bash
//! # Sign in (token is persisted for later commands)
//! cargo run -p stockroom-client --bin stockroom -- login ana@example.com secret
//!
//! # Who is signed in
//! cargo run -p stockroom-client --bin stockroom -- whoami
//!
//! # Search the catalog and orders ready for a sale
//! cargo run -p stockroom-client --bin stockroom -- products cola
//! cargo run -p stockroom-client --bin stockroom -- shippable "bar do"
//!
//! # Sales table
//! cargo run -p stockroom-client --bin stockroom -- sales
//!
//! # Scripted order → sale → reconciliation run against an in-memory store
//! cargo run -p stockroom-client --bin stockroom -- demo
//! ```
//!
//! `--config <PATH>` points at a `console.toml`. `RUST_LOG` controls logging.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use stockroom_client::{
    AuthSession, ClientError, Console, ConsoleConfig, LookupState, MemoryStore,
};
use stockroom_core::{
    CustomerRef, Money, OrderComposer, OrderStatus, PaymentMethod, Product, SaleDraft,
    SaleListing,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_help() {
    println!("Stockroom Console");
    println!();
    println!("Usage: stockroom [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  login <EMAIL> <PASSWORD>   Sign in and persist the session");
    println!("  whoami                     Show the signed-in staff member");
    println!("  products [QUERY]           Search products (empty lists the catalog)");
    println!("  shippable <QUERY>          Search orders ready for a sale");
    println!("  sales                      List recorded sales");
    println!("  logout                     Forget the session");
    println!("  demo                       Run the order/sale lifecycle in memory");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>        Configuration file");
    println!("  -h, --help                 Show this help message");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut command: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            other => command.push(other.to_string()),
        }
        i += 1;
    }

    let Some((name, rest)) = command.split_first() else {
        print_help();
        return Ok(());
    };

    if name == "demo" {
        return Ok(run_demo().await?);
    }

    let console = Console::connect(ConsoleConfig::load(config_path)?)?;

    match (name.as_str(), rest) {
        ("login", [email, password]) => {
            let identity = console.login(email, password).await?;
            println!("✓ Signed in as {} (staff #{})", identity.email, identity.id);
        }
        ("whoami", []) => match console.resume().await {
            Ok(identity) => println!("{} (staff #{})", identity.email, identity.id),
            Err(e) if e.is_unauthorized() => println!("Not signed in"),
            Err(e) => return Err(e.into()),
        },
        ("products", rest) => {
            console.resume().await?;
            let query = rest.join(" ");
            console.lookup().search_products(&query).await;
            match console.lookup().products() {
                LookupState::Ready { results, .. } => {
                    for product in results {
                        println!(
                            "#{:<5} {:<30} {:>10}  stock {}",
                            product.id,
                            product.name,
                            product.unit_price.to_string(),
                            product.stock
                        );
                    }
                }
                LookupState::Failed { message, .. } => eprintln!("Search failed: {}", message),
                _ => {}
            }
        }
        ("shippable", rest) => {
            console.resume().await?;
            let query = rest.join(" ");
            console.lookup().search_shippable_orders(&query).await;
            match console.lookup().shippable_orders() {
                LookupState::Ready { results, .. } => {
                    for order in results {
                        println!(
                            "Order #{:<5} {:<25} {:>10}  {}",
                            order.id,
                            order.customer.name,
                            order.total.to_string(),
                            order.items_summary()
                        );
                    }
                }
                LookupState::Failed { message, .. } => eprintln!("Search failed: {}", message),
                _ => {}
            }
        }
        ("sales", []) => {
            console.resume().await?;
            for listing in console.sales().list_sales().await? {
                print_listing(&listing);
            }
        }
        ("logout", []) => {
            console.logout().await;
            println!("✓ Signed out");
        }
        _ => {
            eprintln!("Unknown command or wrong arguments: {}", command.join(" "));
            print_help();
        }
    }

    Ok(())
}

fn print_listing(listing: &SaleListing) {
    let sale = &listing.sale;
    println!(
        "{}  order #{:<5} {:<25} {:>10}  {:<22} {}",
        sale.invoice_number(),
        sale.order_id,
        listing.customer_name.as_deref().unwrap_or("?"),
        sale.amount.to_string(),
        sale.payment_method
            .map(|m| m.as_wire().to_string())
            .unwrap_or_else(|| "-".to_string()),
        listing
            .order_status
            .map(|s| s.as_wire().to_string())
            .unwrap_or_else(|| "?".to_string()),
    );
}

/// Order → sale → reconciliation against a seeded in-memory store.
async fn run_demo() -> Result<(), ClientError> {
    let store = Arc::new(MemoryStore::new());
    store.add_staff(1, "demo@stockroom.local", "demo");
    store.add_customer(10, "Bar do Zé");
    store.add_product(Product::new(20, "Cola 2L", Money::from_cents(299), 5));
    store.add_product(Product::new(21, "Mineral Water 500ml", Money::from_cents(149), 24));

    let console = Console::with_store(
        ConsoleConfig::default(),
        Arc::new(AuthSession::in_memory()),
        store.clone(),
    );

    println!("🥤 Stockroom demo");
    println!("=================");

    let identity = console.login("demo@stockroom.local", "demo").await?;
    println!("✓ Signed in as {}", identity.email);

    console.lookup().search_products("").await;
    let mut composer = OrderComposer::new();
    composer.load_catalog(console.lookup().products().results());
    composer.set_customer(CustomerRef {
        id: 10,
        name: "Bar do Zé".to_string(),
    });
    composer.add_item(20, 2)?;
    composer.add_item(21, 3)?;
    if let Err(e) = composer.add_item(20, 4) {
        println!("  Rejected locally: {}", e);
    }

    let order = console.orders().submit(&composer).await?;
    println!("✓ Order #{} created: {} ({})", order.id, order.total, order.items_summary());

    console.orders().set_status(order.id, OrderStatus::Shipped).await?;
    println!("✓ Order #{} shipped", order.id);

    console.lookup().search_shippable_orders("bar").await;
    let shipped = console
        .lookup()
        .shippable_orders()
        .results()
        .iter()
        .find(|o| o.id == order.id)
        .cloned()
        .ok_or(ClientError::InvalidResponse {
            operation: stockroom_client::Operation::SearchOrders,
            reason: "shipped order missing from search".to_string(),
        })?;

    let mut draft = SaleDraft::for_order(&shipped);
    draft.set_payment_method(PaymentMethod::Pix);
    let sale = console.sales().create_sale(&draft).await?.into_result()?;
    println!("✓ Sale {} recorded, order delivered", sale.invoice_number());

    let listings = console.sales().list_sales().await?;
    for listing in &listings {
        print_listing(listing);
    }

    if let Some(listing) = listings.iter().find(|l| l.sale.id == sale.id) {
        let prompt = console.sales().delete_sale(listing).await?;
        println!("✓ Sale deleted, prompt: {:?}", prompt);
        console.sales().skip_reconciliation();
        let status = store.order(order.id).map(|o| o.status);
        println!("  Skipped; order status stays {:?}", status);
    }

    println!();
    println!("✓ Demo complete!");
    Ok(())
}
