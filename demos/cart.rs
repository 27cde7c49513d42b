//! Cart Example
//!
//! Builds a donation or event-registration cart from the command line and
//! prints the checkout summary.
//!
//! Use `-i` once per line, as `CATEGORY:AMOUNT[:QUANTITY]` (e.g. `-i general:10.00:2`)
//! Use `-k event-registration` for an event cart
//! Use `-r` to enable Gift Aid
//! Use `-c` to load a YAML config file

use std::{io, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use mandir::{
    money::parse_amount,
    prelude::{Cart, CartKind, CartSummary, Config, NewCartItem},
};
use tracing_subscriber::EnvFilter;

/// Kind of cart to build
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Donation,
    EventRegistration,
}

impl From<Kind> for CartKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Donation => CartKind::Donation,
            Kind::EventRegistration => CartKind::EventRegistration,
        }
    }
}

/// Arguments for the cart example
#[derive(Debug, Parser)]
struct ExampleCartArgs {
    /// Cart lines as `CATEGORY:AMOUNT[:QUANTITY]`
    #[clap(short, long = "item")]
    items: Vec<String>,

    /// Kind of cart
    #[clap(short, long, value_enum, default_value = "donation")]
    kind: Kind,

    /// Enable Gift Aid
    #[clap(short, long)]
    relief: bool,

    /// YAML config file
    #[clap(short, long)]
    config: Option<PathBuf>,
}

fn parse_line(line: &str, currency: &str) -> Result<NewCartItem> {
    let mut parts = line.split(':');

    let (Some(category), Some(amount)) = (parts.next(), parts.next()) else {
        bail!("expected CATEGORY:AMOUNT[:QUANTITY], got {line}");
    };

    let mut item = NewCartItem::new(category, parse_amount(&format!("{amount} {currency}"))?);

    if let Some(quantity) = parts.next() {
        item = item.with_quantity(quantity.parse().context("invalid quantity")?);
    }

    Ok(item)
}

/// Cart Example
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = ExampleCartArgs::parse();

    let config = match args.config.as_deref() {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };

    let mut cart = Cart::from_config(args.kind.into(), &config.cart)?;

    for line in &args.items {
        cart.add_item(parse_line(line, &config.cart.currency)?)?;
    }

    cart.set_relief_enabled(args.relief);

    CartSummary::new(&cart).write_to(io::stdout().lock())?;

    Ok(())
}
