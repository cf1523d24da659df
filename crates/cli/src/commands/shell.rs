//! `tiffin shell` - an interactive storefront session.
//!
//! One storefront context lives for the whole session, so the cookie-backed
//! login, the cart and the restaurant feed carry over between lines.

use std::io::Write;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use tiffin_core::catalog::{CategoryFilter, RestaurantFilter, filter_restaurants};
use tiffin_core::{CartItemKey, MenuItemId};
use tiffin_storefront::Storefront;
use tiffin_storefront::feed::{LiveSearch, RestaurantFeed};
use tiffin_storefront::session::Navigation;

use super::CommandError;
use super::menu::MenuArgs;
use super::restaurants::{RestaurantsArgs, parse_kind};
use crate::render;

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// Email a one-time code
    RequestOtp { email: String },
    /// Sign in with the emailed code
    Login { email: String, otp: String },
    /// Sign out and forget the session cookie
    Logout,
    /// Show who is signed in
    Whoami,
    /// Show the cart
    Cart,
    /// Add a dish to the cart
    Add {
        menu_item_id: String,
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    /// Set a cart line's quantity; zero or less removes it
    Qty {
        key: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a cart line
    Remove { key: String },
    /// Place a cash-on-delivery order for the cart
    Order {
        /// Delivery instructions
        #[arg(long, default_value = "")]
        notes: String,
        /// Delivery address
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        address: Vec<String>,
    },
    /// List past orders
    Orders,
    /// Show a restaurant's menu
    Menu(MenuArgs),
    /// List restaurants
    Restaurants(RestaurantsArgs),
    /// Load the next page of the last listing
    More,
    /// Search restaurants as you type; results appear once typing pauses
    Search {
        #[arg(long = "type", value_parser = parse_kind)]
        kind: Option<tiffin_core::RestaurantType>,
        #[arg(trailing_var_arg = true)]
        term: Vec<String>,
    },
    /// Show cuisine categories
    Categories,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

struct Shell<'a> {
    storefront: &'a Storefront,
    feed: Option<(RestaurantFeed, CategoryFilter)>,
    search: Option<(LiveSearch, JoinHandle<()>)>,
}

impl<'a> Shell<'a> {
    const fn new(storefront: &'a Storefront) -> Self {
        Self {
            storefront,
            feed: None,
            search: None,
        }
    }

    async fn dispatch(
        &mut self,
        command: ShellCommand,
        out: &mut impl Write,
    ) -> Result<Flow, CommandError> {
        match command {
            ShellCommand::RequestOtp { email } => {
                let email = self.storefront.session().request_otp(&email).await?;
                writeln!(out, "Code sent to {email}.")?;
            }
            ShellCommand::Login { email, otp } => {
                let user = self
                    .storefront
                    .login(&email, SecretString::from(otp))
                    .await?;
                writeln!(out, "Welcome, {}.", user.display_name())?;
                render::cart(out, &self.storefront.cart().snapshot())?;
            }
            ShellCommand::Logout => match self.storefront.logout().await {
                Navigation::Login => writeln!(out, "Signed out.")?,
            },
            ShellCommand::Whoami => {
                render::user(out, self.storefront.session().user().as_ref())?;
            }
            ShellCommand::Cart => {
                self.storefront.cart().refresh().await?;
                render::cart(out, &self.storefront.cart().snapshot())?;
            }
            ShellCommand::Add {
                menu_item_id,
                quantity,
            } => {
                self.storefront
                    .cart()
                    .add_to_cart(&MenuItemId::new(menu_item_id), quantity)
                    .await?;
                render::cart(out, &self.storefront.cart().snapshot())?;
            }
            ShellCommand::Qty { key, quantity } => {
                self.storefront
                    .cart()
                    .update_quantity(&CartItemKey::new(key), quantity)
                    .await?;
                render::cart(out, &self.storefront.cart().snapshot())?;
            }
            ShellCommand::Remove { key } => {
                self.storefront
                    .cart()
                    .remove_item(&CartItemKey::new(key))
                    .await?;
                render::cart(out, &self.storefront.cart().snapshot())?;
            }
            ShellCommand::Order { notes, address } => {
                let order = self
                    .storefront
                    .place_order(&address.join(" "), &notes)
                    .await?;
                writeln!(
                    out,
                    "Order #{} placed ({}). Pay {} on delivery.",
                    order.reference(),
                    order.status,
                    order.total_amount
                )?;
            }
            ShellCommand::Orders => {
                let orders = self.storefront.orders().my_orders().await?;
                render::orders(out, &orders)?;
            }
            ShellCommand::Menu(args) => super::menu::run(self.storefront, &args, out).await?,
            ShellCommand::Restaurants(args) => {
                let mut feed = self.storefront.restaurant_feed(args.kind);
                match args.search.as_deref() {
                    Some(term) => feed.search(term).await?,
                    None => feed.load().await?,
                }
                let category = CategoryFilter::parse(&args.category);
                render_feed(out, &feed, &category)?;
                self.feed = Some((feed, category));
            }
            ShellCommand::More => match self.feed.as_mut() {
                Some((feed, category)) => {
                    if feed.load_more().await? {
                        render_feed(out, feed, category)?;
                    } else {
                        writeln!(out, "No more restaurants.")?;
                    }
                }
                None => {
                    return Err(CommandError::InvalidArgument(
                        "Run `restaurants` first.".to_owned(),
                    ));
                }
            },
            ShellCommand::Search { kind, term } => {
                let term = term.join(" ");
                self.live_search(kind).input(&term);
            }
            ShellCommand::Categories => render::quick_categories(out)?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// The running live search, restarted when the service line changes.
    fn live_search(&mut self, kind: Option<tiffin_core::RestaurantType>) -> &LiveSearch {
        if kind.is_some()
            && let Some((_, watcher)) = self.search.take()
        {
            watcher.abort();
        }
        let storefront = self.storefront;
        let (search, _) = self.search.get_or_insert_with(|| {
            let search = storefront.live_search(kind);
            let watcher = spawn_result_printer(&search);
            (search, watcher)
        });
        search
    }
}

impl Drop for Shell<'_> {
    fn drop(&mut self) {
        if let Some((_, watcher)) = self.search.take() {
            watcher.abort();
        }
    }
}

fn render_feed(
    out: &mut impl Write,
    feed: &RestaurantFeed,
    category: &CategoryFilter,
) -> std::io::Result<()> {
    let filter = RestaurantFilter::new("", category.clone());
    render::restaurants(out, feed.title(), &filter_restaurants(feed.restaurants(), &filter))?;
    if feed.has_more() {
        writeln!(out, "(page {} of {}; `more` for the next)", feed.page(), feed.total_pages())?;
    }
    Ok(())
}

/// Print each batch of live-search results as it lands.
fn spawn_result_printer(search: &LiveSearch) -> JoinHandle<()> {
    let mut results = search.subscribe();
    tokio::spawn(async move {
        while results.changed().await.is_ok() {
            let batch = results.borrow_and_update().clone();
            let title = batch
                .term
                .as_deref()
                .map_or_else(|| "Restaurants".to_owned(), |t| format!("Results for \"{t}\""));
            let visible: Vec<_> = batch.restaurants.iter().collect();
            let mut out = std::io::stdout().lock();
            if let Err(e) = render::restaurants(&mut out, &title, &visible) {
                tracing::warn!(error = %e, "Failed to print search results");
            }
        }
    })
}

fn parse_line(line: &str) -> Result<ShellCommand, clap::Error> {
    ShellLine::try_parse_from(line.split_whitespace()).map(|l| l.command)
}

/// Run the interactive loop until `quit` or end of input.
///
/// # Errors
///
/// Returns `CommandError` only if the terminal itself fails; command
/// failures are reported and the loop carries on.
pub async fn run(storefront: &Storefront) -> Result<(), CommandError> {
    let state = storefront.start().await;
    {
        let mut out = std::io::stdout().lock();
        render::user(&mut out, state.user())?;
        writeln!(out, "Type `help` for commands.")?;
    }

    let mut shell = Shell::new(storefront);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        {
            let mut out = std::io::stdout().lock();
            write!(out, "tiffin> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let mut buf = Vec::new();
        let flow = match parse_line(&line) {
            Ok(command) => match shell.dispatch(command, &mut buf).await {
                Ok(flow) => flow,
                Err(e) => {
                    e.report();
                    writeln!(buf, "Error: {}", e.user_message())?;
                    Flow::Continue
                }
            },
            Err(e) => {
                write!(buf, "{e}")?;
                Flow::Continue
            }
        };
        std::io::stdout().lock().write_all(&buf)?;

        if matches!(flow, Flow::Quit) {
            break;
        }
    }
    Ok(())
}
