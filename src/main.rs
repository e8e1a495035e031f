use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use ot_console::{
    catalog::LineCatalog,
    client::HttpClient,
    config::{self, AppConfig},
    draft::DraftGrid,
    errors::ServiceError,
    payload::SubmissionDates,
    services::{
        demo::{DemoBackend, DemoRecipeFetcher},
        recipes::{HttpRecipeFetcher, RecipeService},
        work_orders::{WorkOrderService, WorkOrdersApi},
    },
    submit::SubmissionOrchestrator,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize()?;

    match cli.command {
        Commands::Recipe(args) => handle_recipe(&context, args, cli.json).await?,
        Commands::Orders(command) => handle_orders_command(&context, command, cli.json).await?,
        Commands::Submit(args) => handle_submit(&context, args, cli.json).await?,
        Commands::Resend(args) => handle_resend(&context, args).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "ot-console",
    about = "Work-order console: recipe lookup, draft submission and WMS status",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the production recipe for a product SKU
    Recipe(RecipeArgs),
    #[command(subcommand)]
    Orders(OrdersCommands),
    /// Validate and submit a draft file (integration + creation + status)
    Submit(SubmitArgs),
    /// Re-send the integration batch for already-created orders
    Resend(SubmitArgs),
}

#[derive(Subcommand)]
enum OrdersCommands {
    /// Fetch an existing work order by number
    Get(GetOrderArgs),
    /// Show the next suggested correlative order number
    Next,
    /// Poll the WMS status of one order
    Status(GetOrderArgs),
}

#[derive(Args)]
struct RecipeArgs {
    #[arg(long, help = "Product SKU to resolve")]
    sku: String,
}

#[derive(Args)]
struct GetOrderArgs {
    #[arg(long, help = "Work order number")]
    number: String,
}

#[derive(Args)]
struct SubmitArgs {
    #[arg(long, help = "Tab-separated draft file: order number, SKU, description, quantity, line, supervisor")]
    file: PathBuf,
    #[arg(long, value_parser = parse_date, help = "Order date (YYYY-MM-DD)")]
    fecha: NaiveDate,
    #[arg(long, value_parser = parse_date, help = "Production start date (YYYY-MM-DD)")]
    fecha_ini: NaiveDate,
    #[arg(long, value_parser = parse_date, help = "Production end date (YYYY-MM-DD)")]
    fecha_fin: NaiveDate,
}

struct CliContext {
    config: AppConfig,
    recipes: RecipeService,
    api: Arc<dyn WorkOrdersApi>,
}

impl CliContext {
    fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let (recipes, api): (RecipeService, Arc<dyn WorkOrdersApi>) = if config.demo_mode {
            info!("demo mode enabled; using in-memory backend");
            (
                RecipeService::new(Arc::new(DemoRecipeFetcher)),
                Arc::new(DemoBackend::new()),
            )
        } else {
            let client = HttpClient::new(&config.api_base_url)
                .context("invalid api_base_url in configuration")?;
            (
                RecipeService::new(Arc::new(HttpRecipeFetcher::new(client.clone()))),
                Arc::new(WorkOrderService::new(
                    client,
                    config.integration_url.clone(),
                    config.wms_env.clone(),
                )),
            )
        };

        Ok(Self {
            config,
            recipes,
            api,
        })
    }

    fn orchestrator(&self) -> SubmissionOrchestrator {
        SubmissionOrchestrator::new(self.api.clone(), self.config.integration_source.clone())
    }
}

async fn handle_recipe(context: &CliContext, args: RecipeArgs, json: bool) -> Result<()> {
    let recipe = context
        .recipes
        .resolve(&args.sku)
        .await
        .map_err(user_error)?;
    if json {
        print_json(&*recipe)?;
    } else {
        println!(
            "Receta {} para {} ({}) — cantidad base {}",
            recipe.recipe_code, recipe.product_sku, recipe.description, recipe.base_quantity
        );
        for material in &recipe.materials {
            println!(
                "  • {} {} {} ({})",
                material.quantity_per_base,
                material.unit_of_measure,
                material.sku,
                material.description
            );
        }
    }
    Ok(())
}

async fn handle_orders_command(
    context: &CliContext,
    command: OrdersCommands,
    json: bool,
) -> Result<()> {
    match command {
        OrdersCommands::Get(args) => {
            let order = context
                .api
                .get_order(args.number.trim())
                .await
                .map_err(user_error)?;
            if json {
                print_json(&order)?;
            } else {
                println!(
                    "OT {} • {} x {} • línea {} • encargado {}",
                    order.ot,
                    order.contenido.cantidad,
                    order.contenido.sku,
                    order.contenido.linea,
                    order.contenido.encargado
                );
            }
            Ok(())
        }
        OrdersCommands::Next => {
            let last = context.api.last_order_number().await.map_err(user_error)?;
            if json {
                print_json(&serde_json::json!({ "next": last + 1 }))?;
            } else {
                println!("Próxima OT sugerida: {}", last + 1);
            }
            Ok(())
        }
        OrdersCommands::Status(args) => {
            let state = context
                .api
                .poll_status(args.number.trim())
                .await
                .map_err(user_error)?;
            if json {
                print_json(&serde_json::json!({ "ot": args.number, "estado": state.to_string() }))?;
            } else {
                println!("OT {} • {}", args.number, state);
            }
            Ok(())
        }
    }
}

/// Loads the draft file into a grid and resolves every row's recipe.
async fn load_drafts(context: &CliContext, file: &PathBuf) -> Result<DraftGrid> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read draft file {}", file.display()))?;

    let last = context.api.last_order_number().await.unwrap_or(0);
    let mut grid = DraftGrid::new(LineCatalog::standard(), last);
    // Drop the auto-seeded empty row; the file provides the real lines.
    let seeded = grid.rows()[0].id;
    grid.remove_row(seeded);

    let created = grid.paste_tsv(&text).map_err(user_error)?;
    if created.is_empty() {
        return Err(anyhow!("el archivo no contiene líneas"));
    }

    for id in created {
        if let Some((ticket, sku)) = grid.begin_resolution(id) {
            if sku.trim().is_empty() {
                continue;
            }
            let outcome = context.recipes.resolve(&sku).await;
            grid.apply_resolution(ticket, outcome);
        }
    }
    Ok(grid)
}

async fn handle_submit(context: &CliContext, args: SubmitArgs, json: bool) -> Result<()> {
    let grid = load_drafts(context, &args.file).await?;
    let dates = SubmissionDates {
        fecha: args.fecha,
        fecha_ini: args.fecha_ini,
        fecha_fin: args.fecha_fin,
    };

    let mut orchestrator = context.orchestrator();
    let outcome = orchestrator
        .submit(grid.rows(), &dates)
        .await
        .map_err(user_error)?;

    if json {
        print_json(&outcome)?;
    } else {
        println!("OT creadas: {}", outcome.created.join(", "));
        for status in &outcome.statuses {
            println!("  • OT {} ({}) • {}", status.order_number, status.sku, status.state);
        }
    }
    Ok(())
}

async fn handle_resend(context: &CliContext, args: SubmitArgs) -> Result<()> {
    let grid = load_drafts(context, &args.file).await?;
    let dates = SubmissionDates {
        fecha: args.fecha,
        fecha_ini: args.fecha_ini,
        fecha_fin: args.fecha_fin,
    };

    let mut orchestrator = context.orchestrator();
    orchestrator
        .resend(grid.rows(), &dates)
        .await
        .map_err(user_error)?;
    println!("Integración reenviada.");
    Ok(())
}

fn user_error(err: ServiceError) -> anyhow::Error {
    anyhow!(err.user_message())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}
