//! Share intake: save a shared URL or a local image file
//!
//! Mirrors the share-sheet flow: a web URL is saved like a normal link,
//! a local image file is uploaded to the storage bucket first and saved
//! as an image link pointing at its public URL.

use std::path::Path;

use anyhow::Result;
use savvy_core::{Link, LinkType, Store};

use super::link::resolve_categories;
use crate::metadata;
use crate::output::Output;

pub async fn save(
    store: &mut Store,
    target: String,
    title: Option<String>,
    categories: Vec<String>,
    output: &Output,
) -> Result<()> {
    let category_ids = resolve_categories(store, &categories)?;

    let path = target.strip_prefix("file://").unwrap_or(&target);
    let link = if Path::new(path).is_file() {
        save_image(store, Path::new(path), title).await?
    } else {
        save_url(&target, title).await
    };

    let mut link = link;
    link.set_categories(category_ids);

    let saved = store.add_link(link).await?;
    output.success(&format!("Saved '{}'", saved.title));
    if output.is_quiet() {
        println!("{}", saved.id);
    }
    Ok(())
}

/// Upload a local image and build the link that points at it
async fn save_image(store: &Store, path: &Path, title: Option<String>) -> Result<Link> {
    let url = store.upload_image(path).await?;

    let mut link = Link::new(&url);
    link.set_kind(LinkType::Image);
    link.set_thumbnail(Some(url));
    let title = title.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Shared Image".to_string())
    });
    link.set_title(title);
    Ok(link)
}

/// Build a link from a shared web URL, fetching page metadata
async fn save_url(url: &str, title: Option<String>) -> Link {
    let mut link = Link::new(url);

    let meta = metadata::fetch_metadata(url).await;
    if let Some(fetched) = meta.title {
        link.set_title(fetched);
    }
    link.set_description(meta.description);
    link.set_thumbnail(meta.thumbnail);

    if let Some(title) = title {
        link.set_title(title);
    }
    link
}
