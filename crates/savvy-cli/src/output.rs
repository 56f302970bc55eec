//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use savvy_core::{Category, Link};
use uuid::Uuid;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single link with full details
    pub fn print_link(&self, link: &Link, categories: &[Category]) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", link.id);
                println!("Title:       {}", link.title);
                println!("URL:         {}", link.url);
                println!("Type:        {}", link.kind);
                if let Some(ref desc) = link.description {
                    println!("Description: {}", desc);
                }
                if let Some(ref thumb) = link.thumbnail {
                    println!("Thumbnail:   {}", thumb);
                }
                let names = category_names(&link.category_ids, categories);
                if !names.is_empty() {
                    println!("Categories:  {}", names.join(", "));
                }
                println!("Status:      {}", read_label(link));
                if let Some(progress) = link.progress {
                    println!("Progress:    {}%", progress);
                }
                println!("Created:     {}", link.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:     {}", link.updated_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(link).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", link.id);
            }
        }
    }

    /// Print a list of links, one line each
    pub fn print_links(&self, links: &[&Link]) {
        match self.format {
            OutputFormat::Human => {
                if links.is_empty() {
                    println!("No links found.");
                    return;
                }
                for link in links {
                    let marker = if link.is_read { "x" } else { " " };
                    println!(
                        "{} [{}] {:<6} | {} | {}",
                        &link.id.to_string()[..8],
                        marker,
                        link.kind.to_string(),
                        truncate(&link.title, 35),
                        truncate(&link.url, 45)
                    );
                }
                println!("\n{} link(s)", links.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(links).unwrap());
            }
            OutputFormat::Quiet => {
                for link in links {
                    println!("{}", link.id);
                }
            }
        }
    }

    /// Print a list of categories with their link counts
    pub fn print_categories(&self, categories: &[Category], links: &[Link]) {
        match self.format {
            OutputFormat::Human => {
                if categories.is_empty() {
                    println!("No categories found.");
                    return;
                }
                for category in categories {
                    let count = links
                        .iter()
                        .filter(|link| link.in_category(category.id))
                        .count();
                    println!(
                        "{} | {:<20} {} ({} link{})",
                        &category.id.to_string()[..8],
                        category.name,
                        category.color,
                        count,
                        if count == 1 { "" } else { "s" }
                    );
                }
                println!("\n{} categorie(s)", categories.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(categories).unwrap());
            }
            OutputFormat::Quiet => {
                for category in categories {
                    println!("{}", category.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

/// Resolve category ids to display names, skipping unknown ids
fn category_names(ids: &[Uuid], categories: &[Category]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| categories.iter().find(|c| c.id == *id))
        .map(|c| c.name.clone())
        .collect()
}

fn read_label(link: &Link) -> String {
    if link.is_read {
        match link.read_at {
            Some(at) => format!("read ({})", at.format("%Y-%m-%d")),
            None => "read".to_string(),
        }
    } else {
        "unread".to_string()
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
