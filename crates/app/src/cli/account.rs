use clap::{Args, Subcommand};

use storefront::checkout::ProfilePatch;
use storefront_app::{api::NewAccount, context::AppContext};

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long)]
    email: String,

    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
pub(crate) struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProfileSubcommand {
    /// Fetch and show the profile
    Show,

    /// Change contact and address fields
    Update(UpdateProfileArgs),

    /// Change the account password
    Password(PasswordArgs),
}

#[derive(Debug, Args)]
struct UpdateProfileArgs {
    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    /// Shipping address
    #[arg(long)]
    address: Option<String>,

    #[arg(long)]
    billing_address: Option<String>,
}

#[derive(Debug, Args)]
struct PasswordArgs {
    #[arg(long)]
    current: String,

    #[arg(long = "new")]
    new_password: String,

    #[arg(long)]
    confirm: String,
}

pub(crate) async fn login(context: &AppContext, args: &LoginArgs) -> Result<(), String> {
    let user = context
        .account
        .login(&args.email, &args.password)
        .await
        .map_err(|error| format!("failed to sign in: {error}"))?;

    println!("signed in as {} <{}>", user.display_name(), user.email);
    println!("cart: {} item(s)", context.cart.count());

    Ok(())
}

pub(crate) async fn register(context: &AppContext, args: RegisterArgs) -> Result<(), String> {
    let user = context
        .account
        .register(NewAccount {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            password: args.password,
        })
        .await
        .map_err(|error| format!("failed to register: {error}"))?;

    println!("registered and signed in as {}", user.email);

    Ok(())
}

pub(crate) async fn profile(context: &AppContext, command: ProfileCommand) -> Result<(), String> {
    match command.command {
        ProfileSubcommand::Show => {
            let user = context
                .account
                .refresh_profile()
                .await
                .map_err(|error| format!("failed to load profile: {error}"))?;

            println!("name: {}", user.display_name());
            println!("email: {}", user.email);
            println!("phone: {}", user.phone.as_deref().unwrap_or("-"));
            println!("address: {}", user.address.as_deref().unwrap_or("-"));
            println!(
                "billing_address: {}",
                user.billing_address.as_deref().unwrap_or("-")
            );

            for method in &user.payment_methods {
                let marker = if method.is_default { " (default)" } else { "" };
                println!("payment_method: {} {}{marker}", method.id, method.masked_label);
            }

            Ok(())
        }
        ProfileSubcommand::Update(args) => {
            let patch = ProfilePatch {
                email: args.email,
                phone: args.phone,
                address: args.address,
                billing_address: args.billing_address,
                ..ProfilePatch::default()
            };

            if patch.is_empty() {
                return Err("nothing to update".to_string());
            }

            let user = context
                .account
                .update_profile(patch)
                .await
                .map_err(|error| format!("failed to update profile: {error}"))?;

            println!("profile updated for {}", user.email);

            Ok(())
        }
        ProfileSubcommand::Password(args) => {
            context
                .account
                .change_password(&args.current, &args.new_password, &args.confirm)
                .await
                .map_err(|error| format!("failed to change password: {error}"))?;

            println!("password changed");

            Ok(())
        }
    }
}
