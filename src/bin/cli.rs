//! FolioDB CLI Client
//!
//! Command-line interface for interacting with a running FolioDB server.

use std::collections::{HashMap, HashSet};
use std::process::exit;

use clap::{Parser, Subcommand};

use foliodb::{Book, BookSpec, BookStore, CatalogClient, Isbn, StockBook, StockManager};

/// FolioDB CLI
#[derive(Parser, Debug)]
#[command(name = "foliodb-cli")]
#[command(about = "CLI for the FolioDB bookstore catalog")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8081")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a book to the catalog
    Add {
        isbn: Isbn,
        title: String,
        author: String,
        price: f32,
        copies: u32,

        /// Flag the book as an editor pick
        #[arg(long)]
        pick: bool,
    },

    /// Add copies to existing books (ISBN:QTY pairs)
    Restock { items: Vec<String> },

    /// Buy copies of books (ISBN:QTY pairs)
    Buy { items: Vec<String> },

    /// Rate books (ISBN:RATING pairs, ratings 0-5)
    Rate { items: Vec<String> },

    /// Show the public view of the named books
    Get { isbns: Vec<Isbn> },

    /// List the whole catalog (administrative view)
    List,

    /// Show up to COUNT editor picks
    Picks { count: i64 },

    /// Set or clear a book's editor-pick flag
    SetPick {
        isbn: Isbn,

        /// Clear the flag instead of setting it
        #[arg(long)]
        clear: bool,
    },

    /// Show the top COUNT books by average rating
    Top { count: i64 },

    /// Show books with unmet demand
    Demand,

    /// Remove the named books
    Remove { isbns: Vec<Isbn> },

    /// Remove every book from the catalog
    Clear,

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    let client = match CatalogClient::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            exit(1);
        }
    };

    if let Err(e) = run(&client, args.command) {
        eprintln!("error: {}", e);
        exit(1);
    }
}

fn run(client: &CatalogClient, command: Commands) -> foliodb::Result<()> {
    match command {
        Commands::Add {
            isbn,
            title,
            author,
            price,
            copies,
            pick,
        } => {
            client.add_books(&[BookSpec {
                isbn,
                title,
                author,
                price,
                num_copies: copies,
                editor_pick: pick,
            }])?;
            println!("added {}", isbn);
        }
        Commands::Restock { items } => {
            client.add_copies(&parse_pairs(&items)?)?;
            println!("ok");
        }
        Commands::Buy { items } => {
            client.buy_books(&parse_pairs(&items)?)?;
            println!("ok");
        }
        Commands::Rate { items } => {
            client.rate_books(&parse_pairs(&items)?)?;
            println!("ok");
        }
        Commands::Get { isbns } => {
            let isbns: HashSet<Isbn> = isbns.into_iter().collect();
            for book in client.get_books(&isbns)? {
                print_book(&book);
            }
        }
        Commands::List => {
            for book in client.list_books()? {
                print_stock_book(&book);
            }
        }
        Commands::Picks { count } => {
            for book in client.get_editor_picks(count)? {
                print_book(&book);
            }
        }
        Commands::SetPick { isbn, clear } => {
            let picks: HashMap<Isbn, bool> = [(isbn, !clear)].into_iter().collect();
            client.update_editor_picks(&picks)?;
            println!("ok");
        }
        Commands::Top { count } => {
            for book in client.get_top_rated_books(count)? {
                print_book(&book);
            }
        }
        Commands::Demand => {
            for book in client.get_books_in_demand()? {
                println!(
                    "{:>12}  {:<30} misses={}",
                    book.isbn, book.title, book.num_sale_misses
                );
            }
        }
        Commands::Remove { isbns } => {
            let isbns: HashSet<Isbn> = isbns.into_iter().collect();
            client.remove_books(&isbns)?;
            println!("ok");
        }
        Commands::Clear => {
            client.remove_all_books()?;
            println!("ok");
        }
        Commands::Ping => {
            let reply = client.ping()?;
            println!("{}", String::from_utf8_lossy(&reply));
        }
    }
    Ok(())
}

/// Parse "ISBN:VALUE" pairs into a batch map
fn parse_pairs<V: std::str::FromStr>(items: &[String]) -> foliodb::Result<HashMap<Isbn, V>> {
    let mut map = HashMap::with_capacity(items.len());
    for item in items {
        let (isbn, value) = item.split_once(':').ok_or_else(|| {
            foliodb::FolioError::Config(format!("expected ISBN:VALUE, got {:?}", item))
        })?;
        let isbn: Isbn = isbn.parse().map_err(|_| {
            foliodb::FolioError::Config(format!("invalid ISBN in {:?}", item))
        })?;
        let value: V = value.parse().map_err(|_| {
            foliodb::FolioError::Config(format!("invalid value in {:?}", item))
        })?;
        map.insert(isbn, value);
    }
    Ok(map)
}

fn print_book(book: &Book) {
    println!(
        "{:>12}  {:<30} {:<20} {:>8.2}",
        book.isbn, book.title, book.author, book.price
    );
}

fn print_stock_book(book: &StockBook) {
    println!(
        "{:>12}  {:<30} {:<20} {:>8.2}  copies={} avg={:.2} misses={}{}",
        book.isbn,
        book.title,
        book.author,
        book.price,
        book.num_copies,
        book.average_rating(),
        book.num_sale_misses,
        if book.editor_pick { " [pick]" } else { "" }
    );
}
