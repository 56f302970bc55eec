//! Savvy CLI
//!
//! Command-line interface for Savvy - save links, images, and notes for
//! later, organized into categories.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use savvy_core::{Config, Store};

mod commands;
mod metadata;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "savvy")]
#[command(about = "Savvy - save links, images, and notes for later")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign up, and session management
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Manage saved links
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Save a shared URL or image file (share-sheet intake)
    Share {
        /// A web URL or a path to a local image file
        target: String,
        /// Title override
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Categories to file the item under (by name)
        #[arg(short, long)]
        category: Vec<String>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (session, counts, cache)
    Status,
    /// Fetch the latest data from the server
    Sync,
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Sign in with email and password
    Login {
        /// Email address (prompted when omitted)
        email: Option<String>,
    },
    /// Create a new account
    Register {
        /// Email address (prompted when omitted)
        email: Option<String>,
        /// Full name to attach to the account
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign out and forget the session
    Logout,
    /// Send a password reset email
    ResetPassword {
        /// Email address
        email: String,
    },
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
enum LinkCommands {
    /// Save a new link
    #[command(alias = "add")]
    Create {
        /// URL to save
        url: String,
        /// Title override (skips the fetched title)
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Categories to file the link under (by name)
        #[arg(short, long)]
        category: Vec<String>,
        /// Type override: link, video, image, music, text, other
        #[arg(short, long)]
        kind: Option<String>,
        /// Skip fetching page metadata
        #[arg(long)]
        no_fetch: bool,
    },
    /// List links
    #[command(alias = "ls")]
    List {
        /// Filter by type: link, video, image, music, text, other
        #[arg(short, long)]
        kind: Option<String>,
        /// Filter by category name
        #[arg(short, long)]
        category: Option<String>,
        /// Only links marked read
        #[arg(long, conflicts_with = "unread")]
        read: bool,
        /// Only unread links
        #[arg(long)]
        unread: bool,
    },
    /// Show link details
    Show {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Edit a link interactively
    Edit {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Delete a link
    #[command(alias = "rm")]
    Delete {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Mark a link read
    Read {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Mark a link unread
    Unread {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Set reading/watching progress (0-100)
    Progress {
        /// Link ID (full UUID or prefix)
        id: String,
        /// Progress percentage
        percent: u8,
    },
    /// Search links by title, URL, or description
    Search {
        /// Search query
        query: String,
    },
    /// Open a link in the browser
    Open {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Delete all links
    Clear,
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Create a new category
    #[command(alias = "add")]
    Create {
        /// Category name
        name: String,
        /// Display color (hex)
        #[arg(long, default_value = "#0A84FF")]
        color: String,
        /// Icon name
        #[arg(long)]
        icon: Option<String>,
    },
    /// List categories with link counts
    #[command(alias = "ls")]
    List,
    /// Edit a category
    Edit {
        /// Category name or ID prefix
        category: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New color (hex)
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category (links are kept unless --delete-links)
    #[command(alias = "rm")]
    Delete {
        /// Category name or ID prefix
        category: String,
        /// Also delete every link in this category
        #[arg(long)]
        delete_links: bool,
    },
    /// Delete all categories (links are kept)
    Clear,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, api_key, bucket, data_dir)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    if let Err(e) = run(cli, &output).await {
        // Remote errors carry a recovery hint; everything else prints the
        // anyhow context chain on one line.
        let remote = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<savvy_core::RemoteError>());
        match remote {
            Some(remote) => eprintln!("Error: {}", remote.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    // Config doesn't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), output);
    }

    let config = Config::load()?;
    let mut store = if config.is_configured() {
        Store::open(config).await?
    } else {
        Store::open_cached(config)?
    };

    // Refresh before read commands so the mirror is current; failures fall
    // back to the cached snapshot.
    if is_read_command(&cli.command) && store.is_signed_in() {
        if let Err(e) = store.refresh().await {
            if !output.is_quiet() {
                eprintln!("⚠ Refresh failed, using cached data: {}", e);
            }
        }
    }

    match cli.command {
        Commands::Auth { command } => handle_auth_command(command, &mut store, output).await,
        Commands::Link { command } => handle_link_command(command, &mut store, output).await,
        Commands::Category { command } => {
            handle_category_command(command, &mut store, output).await
        }
        Commands::Share {
            target,
            title,
            category,
        } => commands::share::save(&mut store, target, title, category, output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Status => commands::status::show(&store, output),
        Commands::Sync => commands::sync::sync(&mut store, output).await,
    }
}

/// Commands that only read the mirror
fn is_read_command(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Link {
            command: LinkCommands::List { .. }
                | LinkCommands::Show { .. }
                | LinkCommands::Search { .. }
                | LinkCommands::Open { .. }
        } | Commands::Category {
            command: CategoryCommands::List
        } | Commands::Status
    )
}

async fn handle_auth_command(
    command: AuthCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    match command {
        AuthCommands::Login { email } => commands::auth::login(store, email, output).await,
        AuthCommands::Register { email, name } => {
            commands::auth::register(store, email, name, output).await
        }
        AuthCommands::Logout => commands::auth::logout(store, output).await,
        AuthCommands::ResetPassword { email } => {
            commands::auth::reset_password(store, email, output).await
        }
        AuthCommands::Whoami => commands::auth::whoami(store, output),
    }
}

async fn handle_link_command(
    command: LinkCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    match command {
        LinkCommands::Create {
            url,
            title,
            category,
            kind,
            no_fetch,
        } => commands::link::create(store, url, title, category, kind, no_fetch, output).await,
        LinkCommands::List {
            kind,
            category,
            read,
            unread,
        } => commands::link::list(store, kind, category, read, unread, output),
        LinkCommands::Show { id } => commands::link::show(store, id, output),
        LinkCommands::Edit { id } => commands::link::edit(store, id, output).await,
        LinkCommands::Delete { id } => commands::link::delete(store, id, output).await,
        LinkCommands::Read { id } => commands::link::set_read(store, id, true, output).await,
        LinkCommands::Unread { id } => commands::link::set_read(store, id, false, output).await,
        LinkCommands::Progress { id, percent } => {
            commands::link::progress(store, id, percent, output).await
        }
        LinkCommands::Search { query } => commands::link::search(store, query, output),
        LinkCommands::Open { id } => commands::link::open(store, id, output),
        LinkCommands::Clear => commands::link::clear(store, output).await,
    }
}

async fn handle_category_command(
    command: CategoryCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    match command {
        CategoryCommands::Create { name, color, icon } => {
            commands::category::create(store, name, color, icon, output).await
        }
        CategoryCommands::List => commands::category::list(store, output),
        CategoryCommands::Edit {
            category,
            name,
            color,
        } => commands::category::edit(store, category, name, color, output).await,
        CategoryCommands::Delete {
            category,
            delete_links,
        } => commands::category::delete(store, category, delete_links, output).await,
        CategoryCommands::Clear => commands::category::clear(store, output).await,
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_link_create() {
        let cli = Cli::try_parse_from([
            "savvy", "link", "add", "https://example.com", "-c", "Tech", "-c", "News",
        ])
        .unwrap();
        match cli.command {
            Commands::Link {
                command: LinkCommands::Create { url, category, .. },
            } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(category, vec!["Tech", "News"]);
            }
            _ => panic!("expected link create"),
        }
    }

    #[test]
    fn test_cli_parses_list_filters() {
        let cli = Cli::try_parse_from([
            "savvy", "link", "ls", "--kind", "video", "--unread", "--category", "Tech",
        ])
        .unwrap();
        match cli.command {
            Commands::Link {
                command:
                    LinkCommands::List {
                        kind,
                        category,
                        read,
                        unread,
                    },
            } => {
                assert_eq!(kind.as_deref(), Some("video"));
                assert_eq!(category.as_deref(), Some("Tech"));
                assert!(!read);
                assert!(unread);
            }
            _ => panic!("expected link list"),
        }
    }

    #[test]
    fn test_cli_rejects_read_and_unread_together() {
        assert!(Cli::try_parse_from(["savvy", "link", "ls", "--read", "--unread"]).is_err());
    }

    #[test]
    fn test_cli_parses_category_delete_flags() {
        let cli =
            Cli::try_parse_from(["savvy", "category", "delete", "Tech", "--delete-links"]).unwrap();
        match cli.command {
            Commands::Category {
                command:
                    CategoryCommands::Delete {
                        category,
                        delete_links,
                    },
            } => {
                assert_eq!(category, "Tech");
                assert!(delete_links);
            }
            _ => panic!("expected category delete"),
        }
    }

    #[test]
    fn test_cli_parses_share() {
        let cli = Cli::try_parse_from([
            "savvy",
            "share",
            "/tmp/photo.jpg",
            "-T",
            "Holiday",
            "--category",
            "Photos",
        ])
        .unwrap();
        match cli.command {
            Commands::Share {
                target,
                title,
                category,
            } => {
                assert_eq!(target, "/tmp/photo.jpg");
                assert_eq!(title.as_deref(), Some("Holiday"));
                assert_eq!(category, vec!["Photos"]);
            }
            _ => panic!("expected share"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["savvy", "--json", "status"]).unwrap();
        assert!(cli.json);
        assert!(!cli.quiet);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_is_read_command() {
        let list = Cli::try_parse_from(["savvy", "link", "ls"]).unwrap();
        assert!(is_read_command(&list.command));

        let add = Cli::try_parse_from(["savvy", "link", "add", "https://x.com"]).unwrap();
        assert!(!is_read_command(&add.command));

        let sync = Cli::try_parse_from(["savvy", "sync"]).unwrap();
        assert!(!is_read_command(&sync.command));
    }
}
