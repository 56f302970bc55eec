//! Link commands: create, list, show, edit, delete, read state, search

use anyhow::{anyhow, bail, Context, Result};
use savvy_core::{Link, LinkFilter, LinkType, ReadFilter, Store};
use uuid::Uuid;

use crate::metadata;
use crate::output::Output;
use crate::prompt;

pub async fn create(
    store: &mut Store,
    url: String,
    title: Option<String>,
    categories: Vec<String>,
    kind: Option<String>,
    no_fetch: bool,
    output: &Output,
) -> Result<()> {
    let category_ids = resolve_categories(store, &categories)?;

    let mut link = Link::new(&url);

    if !no_fetch {
        let meta = metadata::fetch_metadata(&url).await;
        if let Some(fetched) = meta.title {
            link.set_title(fetched);
        }
        link.set_description(meta.description);
        link.set_thumbnail(meta.thumbnail);
    }
    if let Some(title) = title {
        link.set_title(title);
    }
    if let Some(kind) = kind {
        link.set_kind(kind.parse::<LinkType>().map_err(|e| anyhow!(e))?);
    }
    link.set_categories(category_ids);

    let saved = store.add_link(link).await?;
    output.success(&format!("Saved '{}'", saved.title));
    if output.is_quiet() {
        println!("{}", saved.id);
    }
    Ok(())
}

pub fn list(
    store: &Store,
    kind: Option<String>,
    category: Option<String>,
    read: bool,
    unread: bool,
    output: &Output,
) -> Result<()> {
    let kind = kind
        .map(|k| k.parse::<LinkType>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let category_id = category
        .map(|name| {
            store
                .find_category(&name)
                .map(|c| c.id)
                .ok_or_else(|| anyhow!("Unknown category '{}'", name))
        })
        .transpose()?;
    let read = if read {
        ReadFilter::Read
    } else if unread {
        ReadFilter::Unread
    } else {
        ReadFilter::All
    };

    let filter = LinkFilter {
        kind,
        read,
        category_id,
        query: None,
    };
    output.print_links(&store.filtered(&filter));
    Ok(())
}

pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let id = parse_link_id(store, &id)?;
    let link = store
        .get_link(id)
        .ok_or_else(|| anyhow!("Link not found: {}", id))?;
    output.print_link(link, store.categories());
    Ok(())
}

pub async fn edit(store: &mut Store, id: String, output: &Output) -> Result<()> {
    let id = parse_link_id(store, &id)?;
    let mut link = store
        .get_link(id)
        .cloned()
        .ok_or_else(|| anyhow!("Link not found: {}", id))?;

    if !output.should_prompt() {
        bail!("Interactive edit requires human output mode");
    }

    if let Some(title) = prompt::prompt_with_default("Title", &link.title)? {
        link.set_title(title);
    }
    let current_desc = link.description.clone().unwrap_or_default();
    if let Some(desc) = prompt::prompt_with_default("Description", &current_desc)? {
        link.set_description(Some(desc));
    }
    let current_names: Vec<String> = link
        .category_ids
        .iter()
        .filter_map(|id| store.get_category(*id))
        .map(|c| c.name.clone())
        .collect();
    if let Some(names) =
        prompt::prompt_with_default("Categories (comma-separated)", &current_names.join(", "))?
    {
        let names: Vec<String> = names
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        link.set_categories(resolve_categories(store, &names)?);
    }

    store.update_link(link).await?;
    output.success("Link updated");
    Ok(())
}

pub async fn delete(store: &mut Store, id: String, output: &Output) -> Result<()> {
    let id = parse_link_id(store, &id)?;
    let link = store
        .get_link(id)
        .ok_or_else(|| anyhow!("Link not found: {}", id))?;

    if output.should_prompt() && !prompt::confirm(&format!("Delete '{}'?", link.title))? {
        output.message("Cancelled.");
        return Ok(());
    }

    store.delete_link(id).await?;
    output.success("Link deleted");
    Ok(())
}

pub async fn set_read(store: &mut Store, id: String, read: bool, output: &Output) -> Result<()> {
    let id = parse_link_id(store, &id)?;
    let link = store.set_read(id, read).await?;
    let label = if read { "read" } else { "unread" };
    output.success(&format!("Marked '{}' {}", link.title, label));
    Ok(())
}

pub async fn progress(store: &mut Store, id: String, percent: u8, output: &Output) -> Result<()> {
    let id = parse_link_id(store, &id)?;
    let link = store.set_progress(id, percent).await?;
    output.success(&format!(
        "Progress on '{}' set to {}%",
        link.title,
        link.progress.unwrap_or(0)
    ));
    Ok(())
}

pub fn search(store: &Store, query: String, output: &Output) -> Result<()> {
    output.print_links(&store.search(&query));
    Ok(())
}

pub fn open(store: &Store, id: String, output: &Output) -> Result<()> {
    let id = parse_link_id(store, &id)?;
    let link = store
        .get_link(id)
        .ok_or_else(|| anyhow!("Link not found: {}", id))?;
    open::that(&link.url).with_context(|| format!("Failed to open {}", link.url))?;
    output.success(&format!("Opened {}", link.url));
    Ok(())
}

pub async fn clear(store: &mut Store, output: &Output) -> Result<()> {
    let count = store.link_count();
    if output.should_prompt() && !prompt::confirm(&format!("Delete ALL {} link(s)?", count))? {
        output.message("Cancelled.");
        return Ok(());
    }

    store.clear_links().await?;
    output.success(&format!("Deleted {} link(s)", count));
    Ok(())
}

/// Resolve a full UUID or unique prefix to a link id
pub fn parse_link_id(store: &Store, input: &str) -> Result<Uuid> {
    if let Ok(id) = input.parse::<Uuid>() {
        return Ok(id);
    }

    let matches: Vec<Uuid> = store
        .links()
        .iter()
        .filter(|link| link.id.to_string().starts_with(input))
        .map(|link| link.id)
        .collect();

    match matches.len() {
        0 => bail!("No link matches id '{}'", input),
        1 => Ok(matches[0]),
        n => bail!("Ambiguous id '{}' matches {} links", input, n),
    }
}

/// Resolve category names to ids, failing on unknown names
pub(crate) fn resolve_categories(store: &Store, names: &[String]) -> Result<Vec<Uuid>> {
    names
        .iter()
        .map(|name| {
            store.find_category(name).map(|c| c.id).ok_or_else(|| {
                anyhow!(
                    "Unknown category '{}'. Create it with `savvy category add`",
                    name
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use savvy_core::{Category, Config, Mirror};
    use tempfile::TempDir;

    fn cached_store(links: Vec<Link>, categories: Vec<Category>) -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        let mirror = Mirror::new(&config);
        mirror.save_links(&links).unwrap();
        mirror.save_categories(&categories).unwrap();
        let store = Store::open_cached(config).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_parse_link_id_prefix() {
        let link = Link::new("https://example.com");
        let full = link.id;
        let (_tmp, store) = cached_store(vec![link], vec![]);

        let prefix = &full.to_string()[..8];
        assert_eq!(parse_link_id(&store, prefix).unwrap(), full);
        assert_eq!(parse_link_id(&store, &full.to_string()).unwrap(), full);
        assert!(parse_link_id(&store, "zzzzzzzz").is_err());
    }

    #[test]
    fn test_resolve_categories() {
        let tech = Category::new("Tech", "#FF2D55");
        let tech_id = tech.id;
        let (_tmp, store) = cached_store(vec![], vec![tech]);

        // Name lookup is case-insensitive
        let ids = resolve_categories(&store, &["tech".to_string()]).unwrap();
        assert_eq!(ids, vec![tech_id]);

        let err = resolve_categories(&store, &["Missing".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown category"));
    }
}
