use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use lager_api::{InventoryApi, InventoryService, MutationOutcome, Resource, SimApi};
use lager_core::columns::SortField;
use lager_core::{Product, ProductPatch, StockStatus};
use lager_select::{Choice, FilterSet, SortDir, SortSpec, ViewPipeline};
use lager_store::{spawn_inventory, Mutation};
use lager_virt::{plan_window, RowLayout, Viewport};

#[derive(Parser, Debug)]
#[command(name = "lagerctl", version, about = "Lager inventory engine CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Authenticate against the simulated backend
    Login {
        email: String,
        password: String,
    },
    /// Load the catalog and list products through the view pipeline
    Ls {
        /// Substring over name, SKU or supplier (case-insensitive)
        #[arg(long = "search", default_value = "")]
        search: String,
        /// Category filter ("all" for no filter)
        #[arg(long = "category", default_value = "all")]
        category: String,
        /// Status filter: all, in_stock, low_stock, out_of_stock
        #[arg(long = "status", default_value = "all")]
        status: String,
        /// Sort field: sku, name, category, price, quantity, status, supplier, location, last_updated
        #[arg(long = "sort", default_value = "name")]
        sort: String,
        /// Sort direction: asc or desc
        #[arg(long = "dir", default_value = "asc")]
        dir: String,
        /// Limit printed rows
        #[arg(long = "limit", default_value_t = 20)]
        limit: usize,
    },
    /// Aggregate stats over the full catalog
    Stats,
    /// Compute the virtual window for a scroll position
    Window {
        /// Scroll offset in pixels
        #[arg(long = "scroll", default_value_t = 0.0)]
        scroll: f32,
        /// Viewport height in pixels
        #[arg(long = "viewport", default_value_t = 600.0)]
        viewport: f32,
        /// Rows rendered beyond the visible range on each side
        #[arg(long = "overscan", default_value_t = lager_virt::DEFAULT_OVERSCAN)]
        overscan: usize,
    },
    /// Patch one product through the mutation layer
    Edit {
        /// Product id, e.g. "prod-42"
        id: String,
        #[arg(long = "name")]
        name: Option<String>,
        #[arg(long = "price")]
        price: Option<f64>,
        #[arg(long = "quantity")]
        quantity: Option<u32>,
    },
    /// Delete one product through the mutation layer
    Rm {
        /// Product id, e.g. "prod-42"
        id: String,
    },
    /// Exercise the async resource lifecycle against the flaky demo endpoint
    Demo {
        /// Give up after this many attempts
        #[arg(long = "attempts", default_value_t = 5)]
        attempts: u32,
    },
}

fn init_tracing() {
    let env = std::env::var("LAGER_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("LAGER_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid LAGER_METRICS_ADDR; expected host:port");
        }
    }
}

fn parse_filters(search: &str, category: &str, status: &str) -> Result<FilterSet> {
    let category = match category {
        "all" => Choice::All,
        c => Choice::Only(c.to_string()),
    };
    let status = match status {
        "all" => Choice::All,
        s => Choice::Only(StockStatus::parse(s).ok_or_else(|| {
            anyhow::anyhow!("unknown status {s:?}; expected all, in_stock, low_stock or out_of_stock")
        })?),
    };
    Ok(FilterSet { search: search.to_string(), category, status })
}

fn parse_sort(sort: &str, dir: &str) -> Result<SortSpec> {
    let field = SortField::parse(sort)
        .ok_or_else(|| anyhow::anyhow!("unknown sort field {sort:?}"))?;
    let direction = match dir {
        "asc" => SortDir::Asc,
        "desc" => SortDir::Desc,
        other => anyhow::bail!("unknown direction {other:?}; expected asc or desc"),
    };
    Ok(SortSpec { field, direction })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();
    let api = SimApi::from_env();

    match cli.command {
        Commands::Login { email, password } => {
            info!(email = %email, "login invoked");
            let mut auth: Resource<lager_api::User> = Resource::new();
            let gen = auth.begin();
            match api.login(&email, &password).await {
                Ok(user) => {
                    auth.succeed(gen, user);
                }
                Err(e) => {
                    auth.fail(gen, e.to_string());
                }
            }
            match auth.data() {
                Some(user) => match cli.output {
                    Output::Human => {
                        println!("logged in as {} <{}> ({:?})", user.name, user.email, user.role)
                    }
                    Output::Json => println!("{}", serde_json::to_string_pretty(user)?),
                },
                None => {
                    let msg = auth.error().unwrap_or("login failed");
                    error!(error = %msg, "login failed");
                    eprintln!("login error: {msg}");
                }
            }
        }
        Commands::Ls { search, category, status, sort, dir, limit } => {
            info!(search = %search, category = %category, status = %status, sort = %sort, "ls invoked");
            let filters = parse_filters(&search, &category, &status)?;
            let sort = parse_sort(&sort, &dir)?;

            let cap = std::env::var("LAGER_QUEUE_CAP")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(2048);
            let (tx, backend) = spawn_inventory(cap);
            let records = api.fetch_inventory().await?;
            tx.send(Mutation::SetAll(records)).await?;

            // wait for the apply loop to publish the first snapshot
            let mut rx = backend.subscribe_epoch();
            let deadline = Instant::now() + Duration::from_secs(5);
            while *rx.borrow() == 0 {
                let now = Instant::now();
                if now >= deadline { break; }
                let rem = deadline.duration_since(now).min(Duration::from_secs(1));
                if tokio::time::timeout(rem, rx.changed()).await.is_err() { break; }
            }
            let snap = backend.current();

            let mut pipeline = ViewPipeline::new();
            let rows = pipeline.rows(&snap, &filters, &sort);

            match cli.output {
                Output::Human => {
                    println!(
                        "{:<12} {:<24} {:<16} {:>9} {:>8}  {:<12} {:<14} {}",
                        "SKU", "NAME", "CATEGORY", "PRICE", "QTY", "STATUS", "SUPPLIER", "UPDATED"
                    );
                    for p in rows.iter().take(limit) {
                        println!(
                            "{:<12} {:<24} {:<16} {:>9.2} {:>8}  {:<12} {:<14} {}",
                            p.sku,
                            p.name,
                            p.category,
                            p.price,
                            p.quantity,
                            p.status,
                            p.supplier,
                            render_age(p.last_updated),
                        );
                    }
                    println!("{} of {} rows", rows.len().min(limit), rows.len());
                }
                Output::Json => {
                    let items: Vec<&Product> = rows.iter().take(limit).collect();
                    println!("{}", serde_json::to_string_pretty(&items)?);
                }
            }
            drop(tx);
        }
        Commands::Stats => {
            info!("stats invoked");
            let mut svc = InventoryService::new();
            svc.load(api.fetch_inventory().await?);
            let stats = svc.stats();
            match cli.output {
                Output::Human => {
                    println!("products:     {}", stats.total_products);
                    println!("items:        {}", stats.total_items);
                    println!("total value:  {:.2}", stats.total_value);
                    println!("low stock:    {}", stats.low_stock);
                    println!("out of stock: {}", stats.out_of_stock);
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
            }
        }
        Commands::Window { scroll, viewport, overscan } => {
            info!(scroll, viewport, "window invoked");
            let records = api.fetch_inventory().await?;
            let layout = RowLayout::uniform(records.len());
            let vp = Viewport { height: viewport, scroll_offset: scroll, overscan };
            let plan = plan_window(&layout, &vp);
            match cli.output {
                Output::Human => {
                    println!(
                        "window [{}, {}) of {} rows, total height {:.0}px",
                        plan.start,
                        plan.end,
                        records.len(),
                        plan.total_height
                    );
                    for row in &plan.rows {
                        let p = &records[row.index];
                        println!("{:>6}  y={:<8.0} {:<12} {}", row.index, row.offset, p.sku, p.name);
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            }
        }
        Commands::Edit { id, name, price, quantity } => {
            info!(id = %id, "edit invoked");
            let mut svc = InventoryService::new();
            svc.load(api.fetch_inventory().await?);
            let patch = ProductPatch { name, price, quantity, ..Default::default() };
            match svc.update_product(&id, patch) {
                Ok(MutationOutcome::Applied) => {
                    print_toasts(&svc);
                    match cli.output {
                        Output::Human => {
                            if let Some(p) = svc.store().get(&id) {
                                println!(
                                    "{} {} price={:.2} qty={} status={}",
                                    p.sku, p.name, p.price, p.quantity, p.status
                                );
                            }
                        }
                        Output::Json => {
                            println!("{}", serde_json::to_string_pretty(&svc.store().get(&id))?)
                        }
                    }
                }
                Ok(outcome) => eprintln!("edit not applied: {outcome:?}"),
                Err(e) => {
                    error!(error = %e, "edit rejected");
                    eprintln!("edit error: {e}");
                }
            }
        }
        Commands::Rm { id } => {
            info!(id = %id, "rm invoked");
            let mut svc = InventoryService::new();
            svc.load(api.fetch_inventory().await?);
            match svc.delete_product(&id) {
                Ok(MutationOutcome::Applied) => {
                    print_toasts(&svc);
                    println!("{} removed ({} products left)", id, svc.store().len());
                }
                Ok(outcome) => eprintln!("rm not applied: {outcome:?}"),
                Err(e) => {
                    error!(error = %e, "rm failed");
                    eprintln!("rm error: {e}");
                }
            }
        }
        Commands::Demo { attempts } => {
            info!(attempts, "demo invoked");
            let mut res: Resource<lager_api::DemoProfile> = Resource::new();
            for attempt in 1..=attempts {
                let gen = res.begin();
                println!("attempt {attempt}: {:?}", res.phase());
                match api.fetch_profile().await {
                    Ok(profile) => {
                        res.succeed(gen, profile);
                    }
                    Err(e) => {
                        res.fail(gen, e.to_string());
                    }
                }
                match res.data() {
                    Some(profile) => {
                        println!("success: {} ({})", profile.name, profile.role);
                        break;
                    }
                    None => println!("failure: {}", res.error().unwrap_or("unknown")),
                }
            }
            if res.data().is_none() {
                eprintln!("demo gave up after {attempts} attempts");
            }
        }
    }

    Ok(())
}

fn print_toasts(svc: &InventoryService) {
    for n in svc.notifications().iter() {
        println!("[{}] {}: {}", n.severity.as_str(), n.title, n.message);
    }
}

fn render_age(last_updated: i64) -> String {
    if last_updated <= 0 { return "-".to_string(); }
    let now = chrono::Utc::now().timestamp();
    let mut secs = (now - last_updated).max(0) as u64;
    let days = secs / 86_400; secs %= 86_400;
    let hours = secs / 3600; secs %= 3600;
    let mins = secs / 60; secs %= 60;
    if days > 0 { format!("{}d{}h", days, hours) }
    else if hours > 0 { format!("{}h{}m", hours, mins) }
    else if mins > 0 { format!("{}m", mins) }
    else { format!("{}s", secs) }
}
