//! Unified storage interface
//!
//! The `Store` is the entry point for all link and category operations.
//! It keeps a local in-memory mirror of remote state and coordinates:
//! - the hosted data service (source of truth)
//! - the on-disk snapshot (read access without a network round-trip)
//!
//! The only invariant is "local mirrors remote": every mutation goes to
//! the service first, then updates the local copy and the snapshot.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open(config).await?;
//! store.refresh().await?;
//!
//! let link = Link::new("https://example.com");
//! store.add_link(link).await?;
//!
//! let unread = store.filtered(&LinkFilter { read: ReadFilter::Unread, ..Default::default() });
//! ```

use anyhow::{Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::filter::{filter_links, search_links, LinkFilter};
use crate::mirror::Mirror;
use crate::models::{Category, Link};
use crate::remote::tables::{fold_links, CategoryRow, LinkCategoryRow, LinkRow};
use crate::remote::{RemoteClient, RemoteError, Session};

/// How to handle links when deleting a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDelete {
    /// Delete the category only; associated links lose the association
    KeepLinks,
    /// Delete the category and every link associated with it
    DeleteLinks,
}

/// Unified storage interface for Savvy
pub struct Store {
    /// Remote client, `None` when running from the cached snapshot only
    remote: Option<RemoteClient>,
    /// On-disk snapshot
    mirror: Mirror,
    /// Configuration
    config: Config,
    /// Local mirror of remote links, newest first
    links: Vec<Link>,
    /// Local mirror of remote categories, newest first
    categories: Vec<Category>,
}

impl Store {
    /// Open the store against the remote service
    ///
    /// Loads the persisted session (refreshing it when expired) and the
    /// last snapshot, so queries work before the first `refresh()`.
    pub async fn open(config: Config) -> Result<Self> {
        let mut remote = RemoteClient::new(&config).context("Failed to create remote client")?;

        if let Some(session) = Session::load(&config.session_path())
            .context("Failed to load persisted session")?
        {
            let expired = session.is_expired();
            remote.set_session(Some(session));
            if expired {
                // A failed refresh keeps the stale session; the next remote
                // call surfaces the auth error to the user.
                match remote.refresh_session().await {
                    Ok(fresh) => fresh
                        .save(&config.session_path())
                        .context("Failed to persist refreshed session")?,
                    Err(e) => warn!("session refresh failed: {}", e),
                }
            }
        }

        Ok(Self::from_parts(Some(remote), config)?)
    }

    /// Open from the cached snapshot only, no remote access
    ///
    /// Read-only commands degrade to this when the service is unreachable
    /// or unconfigured.
    pub fn open_cached(config: Config) -> Result<Self> {
        Self::from_parts(None, config)
    }

    fn from_parts(remote: Option<RemoteClient>, config: Config) -> Result<Self> {
        let mirror = Mirror::new(&config);
        let links = mirror
            .load_links()
            .context("Failed to load cached links")?
            .unwrap_or_default();
        let categories = mirror
            .load_categories()
            .context("Failed to load cached categories")?
            .unwrap_or_default();

        Ok(Self {
            remote,
            mirror,
            config,
            links,
            categories,
        })
    }

    fn remote(&self) -> Result<&RemoteClient, RemoteError> {
        self.remote.as_ref().ok_or(RemoteError::NotConfigured)
    }

    fn remote_mut(&mut self) -> Result<&mut RemoteClient, RemoteError> {
        self.remote.as_mut().ok_or(RemoteError::NotConfigured)
    }

    /// The signed-in session, if any
    pub fn session(&self) -> Option<&Session> {
        self.remote.as_ref().and_then(|r| r.session())
    }

    /// Whether a session is attached
    pub fn is_signed_in(&self) -> bool {
        self.session().is_some()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether any snapshot exists on disk
    pub fn has_snapshot(&self) -> bool {
        self.mirror.exists()
    }

    // ==================== Auth ====================

    /// Sign in and persist the session
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Session> {
        let session_path = self.config.session_path();
        let session = self
            .remote_mut()?
            .sign_in(email, password)
            .await
            .context("Sign-in failed")?;
        session
            .save(&session_path)
            .context("Failed to persist session")?;
        Ok(session)
    }

    /// Create an account; persists the session when one is issued
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Option<Session>> {
        let session_path = self.config.session_path();
        let session = self
            .remote_mut()?
            .sign_up(email, password, full_name)
            .await
            .context("Sign-up failed")?;
        if let Some(ref session) = session {
            session
                .save(&session_path)
                .context("Failed to persist session")?;
        }
        Ok(session)
    }

    /// Sign out and drop the persisted session
    pub async fn sign_out(&mut self) -> Result<()> {
        let session_path = self.config.session_path();
        if let Ok(remote) = self.remote_mut() {
            if remote.session().is_some() {
                remote.sign_out().await.context("Sign-out failed")?;
            }
        }
        Session::delete(&session_path).context("Failed to remove persisted session")?;
        Ok(())
    }

    /// Request a password reset email
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        self.remote()?
            .reset_password(email)
            .await
            .context("Password reset request failed")?;
        Ok(())
    }

    // ==================== Sync ====================

    /// Fetch remote state into the local mirror
    ///
    /// A fresh account (no categories) is seeded with the defaults.
    pub async fn refresh(&mut self) -> Result<()> {
        let remote = self.remote()?;
        let user_id = remote
            .session()
            .ok_or(RemoteError::Unauthorized)?
            .user
            .id;

        let mut categories: Vec<Category> = remote
            .fetch_categories()
            .await
            .context("Failed to fetch categories")?
            .into_iter()
            .map(CategoryRow::into_model)
            .collect();

        if categories.is_empty() {
            info!("no categories on the account, seeding defaults");
            for category in Category::defaults() {
                let row = CategoryRow::from_model(&category, user_id);
                let stored = remote
                    .insert_category(&row)
                    .await
                    .with_context(|| format!("Failed to seed category '{}'", category.name))?;
                categories.push(stored.into_model());
            }
        }

        let rows = remote.fetch_links().await.context("Failed to fetch links")?;
        let joins = remote
            .fetch_link_categories()
            .await
            .context("Failed to fetch link associations")?;

        self.links = fold_links(rows, &joins);
        self.categories = categories;
        self.save_snapshot()?;
        Ok(())
    }

    // ==================== Link operations ====================

    /// Add a new link with its category associations
    pub async fn add_link(&mut self, link: Link) -> Result<Link> {
        let remote = self.remote()?;
        let user_id = remote
            .session()
            .ok_or(RemoteError::Unauthorized)?
            .user
            .id;

        let row = LinkRow::from_model(&link, user_id);
        let stored = remote
            .insert_link(&row)
            .await
            .context("Failed to create link")?;

        let joins = join_rows(link.id, &link.category_ids, user_id);
        remote
            .insert_link_categories(&joins)
            .await
            .context("Failed to associate categories")?;

        let link = stored.into_model(link.category_ids);
        self.links.insert(0, link.clone());
        self.save_snapshot()?;
        Ok(link)
    }

    /// Update an existing link, replacing its category associations
    pub async fn update_link(&mut self, link: Link) -> Result<()> {
        let remote = self.remote()?;
        let user_id = remote
            .session()
            .ok_or(RemoteError::Unauthorized)?
            .user
            .id;

        let row = LinkRow::from_model(&link, user_id);
        remote
            .update_link(&row)
            .await
            .context("Failed to update link")?;

        remote
            .delete_joins_for_link(link.id)
            .await
            .context("Failed to clear category associations")?;
        let joins = join_rows(link.id, &link.category_ids, user_id);
        remote
            .insert_link_categories(&joins)
            .await
            .context("Failed to associate categories")?;

        if let Some(slot) = self.links.iter_mut().find(|l| l.id == link.id) {
            *slot = link;
        }
        self.save_snapshot()?;
        Ok(())
    }

    /// Delete a link and its associations
    pub async fn delete_link(&mut self, id: Uuid) -> Result<()> {
        let remote = self.remote()?;
        remote
            .delete_joins_for_link(id)
            .await
            .context("Failed to clear category associations")?;
        remote
            .delete_link(id)
            .await
            .context("Failed to delete link")?;

        self.links.retain(|l| l.id != id);
        self.save_snapshot()?;
        Ok(())
    }

    /// Toggle the read flag, keeping `read_at` consistent
    pub async fn set_read(&mut self, id: Uuid, read: bool) -> Result<Link> {
        let mut link = self
            .get_link(id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound("Link".to_string()))?;
        if read {
            link.mark_read();
        } else {
            link.mark_unread();
        }
        self.update_link(link.clone()).await?;
        Ok(link)
    }

    /// Set reading/watching progress (clamped to 0-100)
    pub async fn set_progress(&mut self, id: Uuid, progress: u8) -> Result<Link> {
        let mut link = self
            .get_link(id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound("Link".to_string()))?;
        link.set_progress(progress);
        self.update_link(link.clone()).await?;
        Ok(link)
    }

    /// Delete every link (categories are kept)
    pub async fn clear_links(&mut self) -> Result<()> {
        let remote = self.remote()?;
        remote
            .delete_all_link_categories()
            .await
            .context("Failed to clear category associations")?;
        remote
            .delete_all_links()
            .await
            .context("Failed to delete links")?;

        self.links.clear();
        self.save_snapshot()?;
        Ok(())
    }

    // ==================== Category operations ====================

    /// Add a new category
    pub async fn add_category(&mut self, category: Category) -> Result<Category> {
        let remote = self.remote()?;
        let user_id = remote
            .session()
            .ok_or(RemoteError::Unauthorized)?
            .user
            .id;

        let row = CategoryRow::from_model(&category, user_id);
        let stored = remote
            .insert_category(&row)
            .await
            .context("Failed to create category")?;

        let category = stored.into_model();
        self.categories.insert(0, category.clone());
        self.save_snapshot()?;
        Ok(category)
    }

    /// Update an existing category
    pub async fn update_category(&mut self, category: Category) -> Result<()> {
        let remote = self.remote()?;
        let user_id = remote
            .session()
            .ok_or(RemoteError::Unauthorized)?
            .user
            .id;

        let row = CategoryRow::from_model(&category, user_id);
        remote
            .update_category(&row)
            .await
            .context("Failed to update category")?;

        if let Some(slot) = self.categories.iter_mut().find(|c| c.id == category.id) {
            *slot = category;
        }
        self.save_snapshot()?;
        Ok(())
    }

    /// Delete a category, either keeping or cascading to its links
    ///
    /// KeepLinks: associated links survive with the category id detached
    /// from their association list. DeleteLinks: every associated link is
    /// deleted along with the category.
    pub async fn delete_category(&mut self, id: Uuid, mode: CategoryDelete) -> Result<()> {
        let remote = self.remote()?;

        if mode == CategoryDelete::DeleteLinks {
            let doomed = links_in_category(&self.links, id);
            for link_id in &doomed {
                remote
                    .delete_joins_for_link(*link_id)
                    .await
                    .context("Failed to clear category associations")?;
                remote
                    .delete_link(*link_id)
                    .await
                    .context("Failed to delete associated link")?;
            }
        }

        remote
            .delete_joins_for_category(id)
            .await
            .context("Failed to clear category associations")?;
        remote
            .delete_category(id)
            .await
            .context("Failed to delete category")?;

        match mode {
            CategoryDelete::KeepLinks => detach_category(&mut self.links, id),
            CategoryDelete::DeleteLinks => {
                self.links.retain(|link| !link.in_category(id));
            }
        }
        self.categories.retain(|c| c.id != id);
        self.save_snapshot()?;
        Ok(())
    }

    /// Delete every category; links survive with empty associations
    pub async fn clear_categories(&mut self) -> Result<()> {
        let remote = self.remote()?;
        remote
            .delete_all_link_categories()
            .await
            .context("Failed to clear category associations")?;
        remote
            .delete_all_categories()
            .await
            .context("Failed to delete categories")?;

        for link in &mut self.links {
            link.set_categories(Vec::new());
        }
        self.categories.clear();
        self.save_snapshot()?;
        Ok(())
    }

    // ==================== Queries (local mirror) ====================

    /// All links, newest first
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// All categories, newest first
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a link by id
    pub fn get_link(&self, id: Uuid) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Look up a category by id
    pub fn get_category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Look up a category by name, case-insensitive
    pub fn find_category(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Apply a filter to the link list
    pub fn filtered(&self, filter: &LinkFilter) -> Vec<&Link> {
        filter_links(&self.links, filter)
    }

    /// Substring search over title, URL, and description
    pub fn search(&self, query: &str) -> Vec<&Link> {
        search_links(&self.links, query)
    }

    /// Count of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Count of categories
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    // ==================== Uploads ====================

    /// Upload a local image to the storage bucket, returning its public URL
    pub async fn upload_image(&self, path: &std::path::Path) -> Result<String> {
        let url = self
            .remote()?
            .upload_image(path)
            .await
            .context("Failed to upload image")?;
        Ok(url)
    }

    fn save_snapshot(&self) -> Result<()> {
        self.mirror
            .save_links(&self.links)
            .context("Failed to save link snapshot")?;
        self.mirror
            .save_categories(&self.categories)
            .context("Failed to save category snapshot")?;
        Ok(())
    }
}

/// Build join rows for a link's associations
fn join_rows(link_id: Uuid, category_ids: &[Uuid], user_id: Uuid) -> Vec<LinkCategoryRow> {
    category_ids
        .iter()
        .map(|category_id| LinkCategoryRow {
            link_id,
            category_id: *category_id,
            user_id,
        })
        .collect()
}

/// Detach a category id from every link's association list
fn detach_category(links: &mut [Link], category_id: Uuid) {
    for link in links.iter_mut() {
        link.remove_category(category_id);
    }
}

/// Ids of links associated with a category
fn links_in_category(links: &[Link], category_id: Uuid) -> Vec<Uuid> {
    links
        .iter()
        .filter(|link| link.in_category(category_id))
        .map(|link| link.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ReadFilter;
    use crate::models::LinkType;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    fn seeded_mirror(temp_dir: &TempDir) -> (Vec<Link>, Vec<Category>) {
        let cat_tech = Category::new("Tech", "#FF2D55");
        let cat_news = Category::new("News", "#0A84FF");

        let mut a = Link::new("https://a.example.com/rust");
        a.set_title("Rust post");
        a.add_category(cat_tech.id);

        let mut b = Link::new("https://b.example.com/video");
        b.set_kind(LinkType::Video);
        b.add_category(cat_tech.id);
        b.add_category(cat_news.id);
        b.mark_read();

        let c = Link::new("https://c.example.com");

        let links = vec![a, b, c];
        let categories = vec![cat_tech, cat_news];

        let mirror = Mirror::new(&test_config(temp_dir));
        mirror.save_links(&links).unwrap();
        mirror.save_categories(&categories).unwrap();

        (links, categories)
    }

    #[test]
    fn test_open_cached_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open_cached(test_config(&temp_dir)).unwrap();

        assert!(!store.has_snapshot());
        assert!(!store.is_signed_in());
        assert_eq!(store.link_count(), 0);
        assert_eq!(store.category_count(), 0);
    }

    #[test]
    fn test_open_cached_loads_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let (links, categories) = seeded_mirror(&temp_dir);

        let store = Store::open_cached(test_config(&temp_dir)).unwrap();
        assert!(store.has_snapshot());
        assert_eq!(store.link_count(), links.len());
        assert_eq!(store.category_count(), categories.len());
        assert_eq!(store.get_link(links[0].id).unwrap().title, "Rust post");
    }

    #[test]
    fn test_cached_store_rejects_remote_ops() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open_cached(test_config(&temp_dir)).unwrap();
        let err = store.remote().unwrap_err();
        assert!(matches!(err, RemoteError::NotConfigured));
    }

    #[test]
    fn test_queries_on_cached_store() {
        let temp_dir = TempDir::new().unwrap();
        let (_, categories) = seeded_mirror(&temp_dir);
        let store = Store::open_cached(test_config(&temp_dir)).unwrap();

        // Filter by category
        let tech = store.find_category("tech").unwrap();
        assert_eq!(tech.name, "Tech");
        let filter = LinkFilter {
            category_id: Some(categories[0].id),
            ..Default::default()
        };
        assert_eq!(store.filtered(&filter).len(), 2);

        // Filter unread
        let unread = LinkFilter {
            read: ReadFilter::Unread,
            ..Default::default()
        };
        assert_eq!(store.filtered(&unread).len(), 2);

        // Search
        assert_eq!(store.search("rust").len(), 1);
    }

    #[test]
    fn test_detach_category_keeps_links() {
        let cat = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mut a = Link::new("https://a.com");
        a.add_category(cat);
        a.add_category(other);
        let mut b = Link::new("https://b.com");
        b.add_category(cat);
        let c = Link::new("https://c.com");

        let mut links = vec![a, b, c];
        detach_category(&mut links, cat);

        // No link deleted, category id gone from every association list
        assert_eq!(links.len(), 3);
        assert!(links.iter().all(|l| !l.in_category(cat)));
        // Other associations untouched
        assert!(links[0].in_category(other));
    }

    #[test]
    fn test_links_in_category_selects_associated() {
        let cat = Uuid::new_v4();

        let mut a = Link::new("https://a.com");
        a.add_category(cat);
        let b = Link::new("https://b.com");
        let mut c = Link::new("https://c.com");
        c.add_category(cat);

        let links = vec![a.clone(), b.clone(), c.clone()];
        let doomed = links_in_category(&links, cat);
        assert_eq!(doomed, vec![a.id, c.id]);

        // Cascade removal leaves only the unassociated link
        let mut links = links;
        links.retain(|link| !link.in_category(cat));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, b.id);
    }

    #[test]
    fn test_join_rows() {
        let link_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let cats = vec![Uuid::new_v4(), Uuid::new_v4()];

        let rows = join_rows(link_id, &cats, user_id);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.link_id == link_id && r.user_id == user_id));
        assert_eq!(rows[0].category_id, cats[0]);

        assert!(join_rows(link_id, &[], user_id).is_empty());
    }
}
