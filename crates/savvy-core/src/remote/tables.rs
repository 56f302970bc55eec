//! Table CRUD against the hosted data service
//!
//! Three tables, all owned by user id under row-level security:
//! - `links` - saved items
//! - `categories` - user-defined groupings
//! - `link_categories` - many-to-many join between the two
//!
//! Row structs mirror the remote schema (snake_case, a `type` column for
//! the link kind). The join rows are folded into `Link::category_ids`
//! client-side after fetching.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::error::{RemoteError, RemoteResult};
use super::{eq_filter, RemoteClient};
use crate::models::{Category, Link, LinkType};

/// A row in the `links` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkRow {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(rename = "type")]
    pub kind: LinkType,
    pub user_id: Uuid,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub progress: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkRow {
    /// Build a row from the client model, stamping the owning user
    pub fn from_model(link: &Link, user_id: Uuid) -> Self {
        Self {
            id: link.id,
            url: link.url.clone(),
            title: link.title.clone(),
            description: link.description.clone(),
            thumbnail: link.thumbnail.clone(),
            kind: link.kind,
            user_id,
            is_read: link.is_read,
            read_at: link.read_at,
            progress: link.progress,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }

    /// Convert back to the client model with the given associations
    pub fn into_model(self, category_ids: Vec<Uuid>) -> Link {
        Link {
            id: self.id,
            url: self.url,
            title: self.title,
            description: self.description,
            thumbnail: self.thumbnail,
            kind: self.kind,
            category_ids,
            is_read: self.is_read,
            read_at: self.read_at,
            progress: self.progress,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A row in the `categories` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl CategoryRow {
    pub fn from_model(category: &Category, user_id: Uuid) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
            icon: category.icon.clone(),
            user_id,
            created_at: category.created_at,
        }
    }

    pub fn into_model(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
            color: self.color,
            icon: self.icon,
            created_at: self.created_at,
        }
    }
}

/// A row in the `link_categories` join table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkCategoryRow {
    pub link_id: Uuid,
    pub category_id: Uuid,
    pub user_id: Uuid,
}

/// Fold join rows into client models, preserving row order
pub fn fold_links(rows: Vec<LinkRow>, joins: &[LinkCategoryRow]) -> Vec<Link> {
    rows.into_iter()
        .map(|row| {
            let category_ids = joins
                .iter()
                .filter(|join| join.link_id == row.id)
                .map(|join| join.category_id)
                .collect();
            row.into_model(category_ids)
        })
        .collect()
}

impl RemoteClient {
    /// Start a REST request with the standard headers
    fn rest(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.http()
            .request(method, url)
            .header("apikey", self.api_key())
            .bearer_auth(self.bearer())
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, table: &str) -> RemoteResult<Vec<T>> {
        self.require_session()?;

        let url = format!(
            "{}?select=*&order=created_at.desc",
            self.rest_url(table)
        );
        let response = self.rest(Method::GET, &url).send().await?;
        let response = Self::check(response).await?;
        let rows = response.json().await?;
        Ok(rows)
    }

    async fn insert_row<T: Serialize + DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> RemoteResult<T> {
        self.require_session()?;

        let url = self.rest_url(table);
        let response = self
            .rest(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        let response = Self::check(response).await?;

        let rows: Vec<T> = response.json().await?;
        debug!(table, "inserted row");
        rows.into_iter().next().ok_or(RemoteError::Api {
            status: 200,
            message: "insert returned no representation".to_string(),
        })
    }

    async fn update_row<T: Serialize>(&self, table: &str, id: Uuid, row: &T) -> RemoteResult<()> {
        self.require_session()?;

        let url = format!("{}?{}", self.rest_url(table), eq_filter("id", &id.to_string()));
        let response = self.rest(Method::PATCH, &url).json(row).send().await?;
        Self::check(response).await?;
        debug!(table, %id, "updated row");
        Ok(())
    }

    async fn delete_where(&self, table: &str, filter: &str) -> RemoteResult<()> {
        self.require_session()?;

        let url = format!("{}?{}", self.rest_url(table), filter);
        let response = self.rest(Method::DELETE, &url).send().await?;
        Self::check(response).await?;
        debug!(table, filter, "deleted rows");
        Ok(())
    }

    // ==================== links ====================

    /// Fetch all of the user's link rows, newest first
    pub async fn fetch_links(&self) -> RemoteResult<Vec<LinkRow>> {
        self.fetch_rows("links").await
    }

    /// Insert a link row, returning the stored representation
    pub async fn insert_link(&self, row: &LinkRow) -> RemoteResult<LinkRow> {
        self.insert_row("links", row).await
    }

    /// Update a link row by id
    pub async fn update_link(&self, row: &LinkRow) -> RemoteResult<()> {
        self.update_row("links", row.id, row).await
    }

    /// Delete a link row by id
    pub async fn delete_link(&self, id: Uuid) -> RemoteResult<()> {
        self.delete_where("links", &eq_filter("id", &id.to_string()))
            .await
    }

    /// Delete every link owned by the signed-in user
    pub async fn delete_all_links(&self) -> RemoteResult<()> {
        let user_id = self.require_session()?.user.id;
        self.delete_where("links", &eq_filter("user_id", &user_id.to_string()))
            .await
    }

    // ==================== categories ====================

    /// Fetch all of the user's category rows, newest first
    pub async fn fetch_categories(&self) -> RemoteResult<Vec<CategoryRow>> {
        self.fetch_rows("categories").await
    }

    /// Insert a category row, returning the stored representation
    pub async fn insert_category(&self, row: &CategoryRow) -> RemoteResult<CategoryRow> {
        self.insert_row("categories", row).await
    }

    /// Update a category row by id
    pub async fn update_category(&self, row: &CategoryRow) -> RemoteResult<()> {
        self.update_row("categories", row.id, row).await
    }

    /// Delete a category row by id
    pub async fn delete_category(&self, id: Uuid) -> RemoteResult<()> {
        self.delete_where("categories", &eq_filter("id", &id.to_string()))
            .await
    }

    /// Delete every category owned by the signed-in user
    pub async fn delete_all_categories(&self) -> RemoteResult<()> {
        let user_id = self.require_session()?.user.id;
        self.delete_where("categories", &eq_filter("user_id", &user_id.to_string()))
            .await
    }

    // ==================== link_categories ====================

    /// Fetch all of the user's join rows
    pub async fn fetch_link_categories(&self) -> RemoteResult<Vec<LinkCategoryRow>> {
        self.require_session()?;

        let url = format!("{}?select=*", self.rest_url("link_categories"));
        let response = self.rest(Method::GET, &url).send().await?;
        let response = Self::check(response).await?;
        let rows = response.json().await?;
        Ok(rows)
    }

    /// Insert join rows for a link
    pub async fn insert_link_categories(&self, rows: &[LinkCategoryRow]) -> RemoteResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.require_session()?;

        let url = self.rest_url("link_categories");
        let response = self.rest(Method::POST, &url).json(rows).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Remove all join rows for a link
    pub async fn delete_joins_for_link(&self, link_id: Uuid) -> RemoteResult<()> {
        self.delete_where(
            "link_categories",
            &eq_filter("link_id", &link_id.to_string()),
        )
        .await
    }

    /// Remove all join rows for a category
    pub async fn delete_joins_for_category(&self, category_id: Uuid) -> RemoteResult<()> {
        self.delete_where(
            "link_categories",
            &eq_filter("category_id", &category_id.to_string()),
        )
        .await
    }

    /// Remove every join row owned by the signed-in user
    pub async fn delete_all_link_categories(&self) -> RemoteResult<()> {
        let user_id = self.require_session()?.user.id;
        self.delete_where(
            "link_categories",
            &eq_filter("user_id", &user_id.to_string()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_link_row_roundtrip() {
        let user_id = user();
        let mut link = Link::new("https://example.com");
        link.set_title("Example");
        link.set_progress(60);
        link.mark_read();

        let row = LinkRow::from_model(&link, user_id);
        assert_eq!(row.user_id, user_id);
        assert_eq!(row.kind, LinkType::Link);

        let back = row.into_model(link.category_ids.clone());
        assert_eq!(back, link);
    }

    #[test]
    fn test_link_row_serializes_type_column() {
        let row = LinkRow::from_model(&Link::new("https://youtu.be/abc"), user());
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], "video");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_category_row_roundtrip() {
        let category = Category::new("Tech", "#FF2D55");
        let row = CategoryRow::from_model(&category, user());
        assert_eq!(row.name, "Tech");
        assert_eq!(row.into_model(), category);
    }

    #[test]
    fn test_fold_links_assigns_joins() {
        let user_id = user();
        let link_a = Link::new("https://a.com");
        let link_b = Link::new("https://b.com");
        let cat_1 = Uuid::new_v4();
        let cat_2 = Uuid::new_v4();

        let rows = vec![
            LinkRow::from_model(&link_a, user_id),
            LinkRow::from_model(&link_b, user_id),
        ];
        let joins = vec![
            LinkCategoryRow {
                link_id: link_a.id,
                category_id: cat_1,
                user_id,
            },
            LinkCategoryRow {
                link_id: link_a.id,
                category_id: cat_2,
                user_id,
            },
        ];

        let links = fold_links(rows, &joins);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].category_ids, vec![cat_1, cat_2]);
        assert!(links[1].category_ids.is_empty());
    }

    #[test]
    fn test_fold_links_preserves_order() {
        let user_id = user();
        let rows: Vec<LinkRow> = ["https://one.com", "https://two.com", "https://three.com"]
            .iter()
            .map(|url| LinkRow::from_model(&Link::new(*url), user_id))
            .collect();

        let links = fold_links(rows.clone(), &[]);
        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://one.com", "https://two.com", "https://three.com"]);
    }

    #[test]
    fn test_row_ignores_unknown_columns() {
        // PostgREST may return columns the client doesn't model
        let raw = serde_json::json!({
            "id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "name": "Tech",
            "color": "#FF2D55",
            "icon": null,
            "user_id": "6ba7b811-9dad-11d1-80b4-00c04fd430c8",
            "created_at": "2024-04-01T10:00:00Z",
            "some_new_column": 42
        });
        let row: CategoryRow = serde_json::from_value(raw).unwrap();
        assert_eq!(row.name, "Tech");
    }
}
