//! Print shop CLI - catalog inspection and a local cart.
//!
//! # Usage
//!
//! ```bash
//! # Show sizes, papers, and the price matrix
//! print-shop catalog
//!
//! # Work with a cart persisted under .print-shop/
//! print-shop cart add prints/Sea_Cliff_03.jpg --size large --paper canvas -q 2
//! print-shop cart show
//! print-shop cart set prints/Sea_Cliff_03.jpg-large-canvas 1
//! print-shop cart remove prints/Sea_Cliff_03.jpg-large-canvas
//! print-shop cart clear
//! ```
//!
//! # Environment Variables
//!
//! - `PRINT_SHOP_DATA_DIR` - Cart directory (default: `.print-shop`)
//! - `IMAGE_PUBLIC_URL` - Public base URL product images are served from

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "print-shop")]
#[command(author, version, about = "Print shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show print sizes, paper types, and prices
    Catalog,
    /// Manage the local cart
    Cart {
        /// Directory the cart file is stored in
        #[arg(long, env = "PRINT_SHOP_DATA_DIR", default_value = ".print-shop", global = true)]
        data_dir: PathBuf,

        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a print of a photograph
    Add {
        /// Image key of the photograph
        product_key: String,

        /// Print size id
        #[arg(short, long, default_value = print_shop_core::catalog::DEFAULT_SIZE_ID)]
        size: String,

        /// Paper type id
        #[arg(short, long, default_value = print_shop_core::catalog::DEFAULT_PAPER_ID)]
        paper: String,

        /// Number of prints
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,

        /// Public base URL for product images
        #[arg(long, env = "IMAGE_PUBLIC_URL")]
        image_base: Option<String>,
    },
    /// Set a line's quantity (zero or less removes it)
    Set {
        /// Cart line key (`<product>-<size>-<paper>`)
        item_key: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Cart line key (`<product>-<size>-<paper>`)
        item_key: String,
    },
    /// Empty the cart
    Clear,
}

fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{output}");
            }
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String, CommandError> {
    match cli.command {
        Commands::Catalog => Ok(commands::catalog::render()),
        Commands::Cart { data_dir, action } => {
            let mut store = commands::cart::open(data_dir);
            let _log = commands::cart::log_changes(&store);

            let cart = match action {
                CartAction::Show => store.read(),
                CartAction::Add {
                    product_key,
                    size,
                    paper,
                    quantity,
                    image_base,
                } => commands::cart::add(
                    &mut store,
                    &product_key,
                    &size,
                    &paper,
                    quantity,
                    image_base.as_deref(),
                )?,
                CartAction::Set { item_key, quantity } => {
                    commands::cart::set(&mut store, &item_key, quantity)
                }
                CartAction::Remove { item_key } => commands::cart::remove(&mut store, &item_key),
                CartAction::Clear => store.clear(),
            };

            Ok(commands::cart::render(&cart))
        }
    }
}
