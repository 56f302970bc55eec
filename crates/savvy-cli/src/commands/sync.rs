//! Sync command

use anyhow::Result;
use savvy_core::Store;

use crate::output::Output;

pub async fn sync(store: &mut Store, output: &Output) -> Result<()> {
    store.refresh().await?;
    output.success(&format!(
        "Synced {} link(s), {} categorie(s)",
        store.link_count(),
        store.category_count()
    ));
    Ok(())
}
