use std::{fs, path::PathBuf};

use clap::{Args, Subcommand, ValueEnum};

use storefront::{
    documents::DocumentKind,
    money::format_price,
    orders::{Order, OrderId},
};
use storefront_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// List orders, incomplete ones first
    List,

    /// Put a past order's products back into the cart
    Reorder { order: OrderId },

    /// Download a stored document
    Document {
        order: OrderId,

        #[arg(value_enum)]
        kind: KindArg,

        /// Output file; defaults to the stored filename
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Invoice,
    Summary,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Invoice => Self::Invoice,
            KindArg::Summary => Self::Summary,
        }
    }
}

pub(crate) async fn run(context: &AppContext, command: OrdersCommand) -> Result<(), String> {
    let history = context.history();

    match command.command {
        OrdersSubcommand::List => {
            let list = history.load().await.map_err(|error| error.to_string())?;
            let groups = list.groups();

            println!("incomplete:");

            for order in groups.incomplete {
                print_order(order);
            }

            println!("confirmed:");

            for order in groups.confirmed {
                print_order(order);
            }

            Ok(())
        }
        OrdersSubcommand::Reorder { order } => {
            let list = history.load().await.map_err(|error| error.to_string())?;
            let order = list
                .find(order)
                .ok_or_else(|| format!("order {order} not found"))?;

            history
                .reorder(order)
                .await
                .map_err(|error| error.to_string())?;

            println!(
                "cart: {} item(s), {}",
                context.cart.count(),
                format_price(context.cart.total())
            );

            Ok(())
        }
        OrdersSubcommand::Document {
            order,
            kind,
            output,
        } => {
            let mut viewer = context.document_viewer();

            let document = viewer
                .open(order, kind.into())
                .await
                .map_err(|error| error.to_string())?;

            let blob = context
                .blobs
                .resolve(document.url.as_str())
                .ok_or_else(|| format!("{} is no longer available", document.url))?;

            let path = output.unwrap_or_else(|| PathBuf::from(&document.file_name));

            fs::write(&path, &blob.bytes)
                .map_err(|error| format!("failed to write {}: {error}", path.display()))?;

            println!(
                "{} ({}): {}",
                document.file_name,
                document.mime_type,
                path.display()
            );

            viewer.close();

            Ok(())
        }
    }
}

fn print_order(order: &Order) {
    let documents: Vec<String> = order
        .documents
        .iter()
        .map(|document| document.kind.to_string())
        .collect();

    println!(
        "  #{:<6} {:<10} {:>12}  {}  [{}]",
        order.id,
        format!("{:?}", order.status),
        format_price(order.total),
        order.created_at,
        documents.join(", ")
    );
}
