//! Command-line front end over the storefront library.

#![expect(clippy::print_stdout, reason = "command output is the CLI's interface")]

use clap::{Parser, Subcommand};

use storefront_app::{
    config::{AppConfig, ConfigError},
    context::AppContext,
};

mod account;
mod cart;
mod checkout;
mod orders;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "STATIC storefront client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and adopt the server cart
    Login(account::LoginArgs),

    /// Create an account and sign in
    Register(account::RegisterArgs),

    /// Forget the stored session
    Logout,

    /// Show or edit the signed-in profile
    Profile(account::ProfileCommand),

    /// List the products that can be added to the cart
    Catalogue,

    Cart(cart::CartCommand),

    /// Validate, review and place an order for the current cart
    Checkout(checkout::CheckoutArgs),

    Orders(orders::OrdersCommand),
}

impl Cli {
    /// Parse arguments, reading `.env` first.
    pub(crate) fn load() -> Result<Self, ConfigError> {
        _ = dotenvy::dotenv();

        let cli = Self::try_parse()?;
        cli.config.validate()?;

        Ok(cli)
    }

    pub(crate) async fn run(self, context: &AppContext) -> Result<(), String> {
        match self.command {
            Commands::Login(args) => account::login(context, &args).await,
            Commands::Register(args) => account::register(context, args).await,
            Commands::Logout => {
                context.account.logout();
                println!("signed out");

                Ok(())
            }
            Commands::Profile(command) => account::profile(context, command).await,
            Commands::Catalogue => {
                cart::list_catalogue();

                Ok(())
            }
            Commands::Cart(command) => cart::run(context, &command).await,
            Commands::Checkout(args) => checkout::run(context, &args).await,
            Commands::Orders(command) => orders::run(context, command).await,
        }
    }
}
