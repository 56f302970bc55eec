//! Category commands: create, list, edit, delete, clear

use anyhow::{bail, Result};
use savvy_core::{Category, CategoryDelete, Store};

use crate::output::Output;
use crate::prompt;

pub async fn create(
    store: &mut Store,
    name: String,
    color: String,
    icon: Option<String>,
    output: &Output,
) -> Result<()> {
    if store.find_category(&name).is_some() {
        bail!("Category '{}' already exists", name);
    }

    let mut category = Category::new(name, color);
    category.icon = icon;

    let saved = store.add_category(category).await?;
    output.success(&format!("Created category '{}'", saved.name));
    if output.is_quiet() {
        println!("{}", saved.id);
    }
    Ok(())
}

pub fn list(store: &Store, output: &Output) -> Result<()> {
    output.print_categories(store.categories(), store.links());
    Ok(())
}

pub async fn edit(
    store: &mut Store,
    ident: String,
    name: Option<String>,
    color: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut category = resolve_category(store, &ident)?;

    if name.is_none() && color.is_none() {
        bail!("Nothing to change, pass --name or --color");
    }
    let name = name.unwrap_or_else(|| category.name.clone());
    category.edit(name, color);

    store.update_category(category.clone()).await?;
    output.success(&format!("Updated category '{}'", category.name));
    Ok(())
}

pub async fn delete(
    store: &mut Store,
    ident: String,
    delete_links: bool,
    output: &Output,
) -> Result<()> {
    let category = resolve_category(store, &ident)?;
    let associated = store
        .links()
        .iter()
        .filter(|link| link.in_category(category.id))
        .count();

    if output.should_prompt() {
        let question = if delete_links {
            format!(
                "Delete category '{}' AND its {} link(s)?",
                category.name, associated
            )
        } else {
            format!(
                "Delete category '{}'? Its {} link(s) will be kept.",
                category.name, associated
            )
        };
        if !prompt::confirm(&question)? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    let mode = if delete_links {
        CategoryDelete::DeleteLinks
    } else {
        CategoryDelete::KeepLinks
    };
    store.delete_category(category.id, mode).await?;

    if delete_links {
        output.success(&format!(
            "Deleted category '{}' and {} link(s)",
            category.name, associated
        ));
    } else {
        output.success(&format!("Deleted category '{}'", category.name));
    }
    Ok(())
}

pub async fn clear(store: &mut Store, output: &Output) -> Result<()> {
    let count = store.category_count();
    if output.should_prompt()
        && !prompt::confirm(&format!(
            "Delete ALL {} categorie(s)? Links will be kept.",
            count
        ))?
    {
        output.message("Cancelled.");
        return Ok(());
    }

    store.clear_categories().await?;
    output.success(&format!("Deleted {} categorie(s)", count));
    Ok(())
}

/// Resolve a category by name (case-insensitive) or id prefix
fn resolve_category(store: &Store, ident: &str) -> Result<Category> {
    if let Some(category) = store.find_category(ident) {
        return Ok(category.clone());
    }

    let matches: Vec<&Category> = store
        .categories()
        .iter()
        .filter(|c| c.id.to_string().starts_with(ident))
        .collect();

    match matches.len() {
        0 => bail!("No category matches '{}'", ident),
        1 => Ok(matches[0].clone()),
        n => bail!("Ambiguous id '{}' matches {} categories", ident, n),
    }
}
