use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

use tillpoint::api::{ApiClient, HttpTransport, Navigator};
use tillpoint::config::Config;
use tillpoint::logging;
use tillpoint::pos::auth::{AuthService, EmployeeCredentials, OwnerCredentials};
use tillpoint::pos::kitchen::{self, KitchenService};
use tillpoint::pos::menu::MenuService;
use tillpoint::pos::orders::OrderService;
use tillpoint::pos::products::{ProductFilter, ProductService};
use tillpoint::pos::purchasing::{NewGoodsReceiving, PurchasingService};
use tillpoint::pos::systems::SystemService;
use tillpoint::pos::waiter::WaiterService;
use tillpoint::session::SessionStore;
use tillpoint::tenant::{SelectionStore, SystemId};

#[derive(Parser, Debug)]
#[command(name = "tillpoint")]
#[command(about = "Command-line client for the restaurant and supermarket POS backend")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/tillpoint/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// System to act on instead of the selected one
  #[arg(short, long)]
  system: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Start a session and keep it for later commands
  Login {
    /// Owner username, or email with --employee
    username: String,
    #[arg(short, long)]
    password: String,
    /// Log in as an employee
    #[arg(long)]
    employee: bool,
  },
  /// End the current session
  Logout,
  /// List, select or show the active system
  System {
    #[command(subcommand)]
    action: SystemAction,
  },
  Menu {
    #[command(subcommand)]
    action: MenuAction,
  },
  Orders {
    #[command(subcommand)]
    action: OrdersAction,
  },
  /// Kitchen board with counts
  Kitchen,
  /// Waiter view of tables and their orders
  Tables,
  Products {
    #[command(subcommand)]
    action: ProductsAction,
  },
  Purchase {
    #[command(subcommand)]
    action: PurchaseAction,
  },
  /// Record goods received against a purchase order
  Receive {
    #[arg(long)]
    order: u64,
    #[arg(long)]
    quantity: u32,
    /// Date received (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,
    #[arg(long)]
    expiry: Option<NaiveDate>,
    #[arg(long)]
    location: Option<String>,
  },
}

#[derive(Subcommand, Debug)]
enum SystemAction {
  /// Systems owned by the logged-in user
  List,
  Select {
    id: String,
    /// restaurant or supermarket
    #[arg(long)]
    category: Option<String>,
  },
  Show,
}

#[derive(Subcommand, Debug)]
enum MenuAction {
  List {
    #[arg(long)]
    category: Option<String>,
  },
}

#[derive(Subcommand, Debug)]
enum OrdersAction {
  List,
}

#[derive(Subcommand, Debug)]
enum ProductsAction {
  LowStock,
  Expiring,
}

#[derive(Subcommand, Debug)]
enum PurchaseAction {
  List,
}

/// Tells the user to log in again when the backend drops the session.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
  fn navigate(&self, route: &str) {
    info!(route, "session missing");
    eprintln!("Session expired or missing. Run `tillpoint login` first.");
  }
}

fn print(value: &impl Serialize) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn system_id(explicit: Option<String>, selection: &SelectionStore) -> Result<SystemId> {
  match explicit {
    Some(id) => Ok(SystemId::new(id)),
    None => selection
      .system_id()?
      .ok_or_else(|| eyre!("No system selected. Run `tillpoint system select <id>` or pass --system")),
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let config = Config::load(args.config.as_deref())?;
  let data_dir = Config::data_dir()?;
  let _guard = logging::init(&data_dir)?;

  let transport = HttpTransport::from_config(&config)?;
  let sessions = SessionStore::in_dir(&data_dir);
  sessions.restore(&transport)?;

  let client = ApiClient::configured(transport.clone(), &config).with_navigator(TerminalNavigator);
  let selection = SelectionStore::in_dir(&data_dir);

  match args.command {
    Command::Login {
      username,
      password,
      employee,
    } => {
      let auth = AuthService::new(&client);
      if employee {
        let profile = auth
          .employee_login(&EmployeeCredentials {
            email: username,
            password,
          })
          .await?;
        print(&profile)?;
      } else {
        let response = auth.login(&OwnerCredentials { username, password }).await?;
        print(&response)?;
      }
      sessions.save(&transport)?;
    }
    Command::Logout => {
      AuthService::new(&client).logout().await?;
      sessions.clear()?;
      print(&json!({"message": "Logged out"}))?;
    }
    Command::System { action } => match action {
      SystemAction::List => print(&SystemService::new(&client).list().await?)?,
      SystemAction::Select { id, category } => {
        selection.switch_system(&client, SystemId::new(id), category)?;
        print(&selection.load()?)?;
      }
      SystemAction::Show => print(&selection.load()?)?,
    },
    Command::Menu {
      action: MenuAction::List { category },
    } => {
      let menu = MenuService::new(&client, system_id(args.system, &selection)?);
      print(&menu.list(category.as_deref()).await?)?;
    }
    Command::Orders {
      action: OrdersAction::List,
    } => {
      let orders = OrderService::new(&client, system_id(args.system, &selection)?);
      print(&orders.list().await?)?;
    }
    Command::Kitchen => {
      let service = KitchenService::new(&client, system_id(args.system, &selection)?);
      let orders = service.orders().await?.unwrap_or_default();
      print(&json!({
        "stats": kitchen::stats(&orders),
        "tables": kitchen::unique_tables(&orders),
        "orders": orders,
      }))?;
    }
    Command::Tables => {
      let waiter = WaiterService::new(&client, system_id(args.system, &selection)?);
      print(&waiter.tables().await?)?;
    }
    Command::Products { action } => {
      let products = ProductService::new(&client, system_id(args.system, &selection)?);
      let filter = match action {
        ProductsAction::LowStock => ProductFilter::LowStock,
        ProductsAction::Expiring => ProductFilter::ExpiringSoon,
      };
      print(&products.list(filter).await?)?;
    }
    Command::Purchase {
      action: PurchaseAction::List,
    } => {
      let purchasing = PurchasingService::new(&client, system_id(args.system, &selection)?);
      print(&purchasing.orders().await?)?;
    }
    Command::Receive {
      order,
      quantity,
      date,
      expiry,
      location,
    } => {
      let purchasing = PurchasingService::new(&client, system_id(args.system, &selection)?);
      let record = purchasing
        .receive(&NewGoodsReceiving {
          purchase_order_id: order,
          received_quantity: quantity,
          received_date: date,
          expiry_date: expiry,
          location,
        })
        .await?;
      print(&record)?;
    }
  }

  Ok(())
}
