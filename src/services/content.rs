//! Content catalog: articles, products, projects and their categories.
//!
//! DESIGN
//! ======
//! `Resource` maps each dashboard resource onto its backend endpoints. Page
//! loaders are generic over `AuthenticatedFetch` so they only ever see data
//! that already passed the token check. Path parameters are encoded as a
//! single segment before they are spliced into backend paths.

use axum::http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fetch::{AuthenticatedFetch, FetchError};

pub const MAX_PAGE_LIMIT: u32 = 100;

// =============================================================================
// SECTIONS + RESOURCES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Articles,
    Products,
    Projects,
}

impl Section {
    pub const ALL: [Self; 3] = [Self::Articles, Self::Products, Self::Projects];

    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "articles" => Some(Self::Articles),
            "products" => Some(Self::Products),
            "projects" => Some(Self::Projects),
            _ => None,
        }
    }

    #[must_use]
    pub fn segment(self) -> &'static str {
        match self {
            Self::Articles => "articles",
            Self::Products => "products",
            Self::Projects => "projects",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Entity(Section),
    Category(Section),
}

/// Backend endpoints for one resource. `show`/`update` take the id appended.
struct Endpoints {
    list: &'static str,
    show: &'static str,
    create: Option<(Method, &'static str)>,
    update: Option<(Method, &'static str)>,
}

impl Resource {
    fn endpoints(self) -> Endpoints {
        match self {
            Self::Entity(Section::Articles) => Endpoints {
                list: "article/get-all-articles-admin",
                show: "article/show-article-admin/",
                create: Some((Method::POST, "article/add-article")),
                update: Some((Method::PUT, "article/edit-article/")),
            },
            Self::Category(Section::Articles) => Endpoints {
                list: "article/show-categories-article",
                show: "article/show-category-article/",
                create: Some((Method::POST, "article/add-article-category")),
                update: Some((Method::POST, "article/edit-article-category/")),
            },
            Self::Entity(Section::Products) => Endpoints {
                list: "shop/get-all-products",
                show: "shop/show-admin-product/",
                create: Some((Method::POST, "shop/add-product")),
                update: Some((Method::PUT, "shop/edit-product/")),
            },
            Self::Category(Section::Products) => Endpoints {
                list: "shop/show-category-product",
                show: "shop/show-category-product/",
                create: None,
                update: None,
            },
            Self::Entity(Section::Projects) => Endpoints {
                list: "project/get-all-admin-projects",
                show: "project/show-admin-project/",
                create: Some((Method::POST, "project/add-project")),
                update: Some((Method::PUT, "project/edit-project/")),
            },
            Self::Category(Section::Projects) => Endpoints {
                list: "project/show-all-project-categories",
                show: "project/show-project-category/",
                create: Some((Method::POST, "project/add-project-category")),
                update: Some((Method::PUT, "project/edit-project-category/")),
            },
        }
    }

    /// Key under which list payloads carry their rows.
    #[must_use]
    pub fn collection_key(self) -> &'static str {
        match self {
            Self::Entity(Section::Articles) => "articles",
            Self::Entity(Section::Products) => "products",
            Self::Entity(Section::Projects) => "projects",
            Self::Category(Section::Articles) => "articleCategories",
            Self::Category(Section::Products) => "productCategories",
            Self::Category(Section::Projects) => "projectCategories",
        }
    }

    #[must_use]
    pub fn default_limit(self) -> u32 {
        match self {
            Self::Entity(_) => 5,
            Self::Category(_) => 10,
        }
    }

    #[must_use]
    pub fn list_path(self, pagination: Pagination) -> String {
        format!("{}?page={}&limit={}", self.endpoints().list, pagination.page, pagination.limit)
    }

    #[must_use]
    pub fn show_path(self, id: &str) -> String {
        format!("{}{}", self.endpoints().show, urlencoding::encode(id))
    }

    /// Method and path for a create, or `None` if the backend has no such endpoint.
    #[must_use]
    pub fn create_route(self) -> Option<(Method, String)> {
        self.endpoints()
            .create
            .map(|(method, path)| (method, path.to_owned()))
    }

    /// Method and path for an update of `id`, or `None` if unsupported.
    #[must_use]
    pub fn update_route(self, id: &str) -> Option<(Method, String)> {
        self.endpoints()
            .update
            .map(|(method, prefix)| (method, format!("{prefix}{}", urlencoding::encode(id))))
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Raw `?page=&limit=` query. Values are strings so junk input falls back to
/// defaults instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    #[must_use]
    pub fn resolve(&self, default_limit: u32) -> Pagination {
        let page = parse_positive(self.page.as_deref()).unwrap_or(1);
        let limit = parse_positive(self.limit.as_deref())
            .unwrap_or(default_limit)
            .min(MAX_PAGE_LIMIT);
        Pagination { page, limit }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    let value = raw?.trim().parse::<i64>().ok()?;
    Some(u32::try_from(value.max(1)).unwrap_or(u32::MAX))
}

// =============================================================================
// PAGE DATA
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub items: Vec<Value>,
    pub total_count: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// Data for an entity edit page: the entity plus the category options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditView {
    pub item: Value,
    pub categories: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateView {
    pub categories: Vec<Value>,
}

#[derive(Deserialize)]
struct ListPayload {
    #[serde(rename = "totalCount", default)]
    total_count: Option<u64>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

fn take_collection(resource: Resource, data: Value) -> Result<(Vec<Value>, Option<u64>), FetchError> {
    let key = resource.collection_key();
    let mut payload: ListPayload =
        serde_json::from_value(data).map_err(|e| FetchError::Malformed(format!("{key}: {e}")))?;
    match payload.rest.remove(key) {
        Some(Value::Array(items)) => Ok((items, payload.total_count)),
        Some(_) => Err(FetchError::Malformed(format!("'{key}' is not a list"))),
        None => Err(FetchError::Malformed(format!("missing '{key}'"))),
    }
}

#[must_use]
pub fn total_pages(total_count: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 1;
    }
    total_count.div_ceil(u64::from(limit)).max(1)
}

// =============================================================================
// LOADERS
// =============================================================================

/// Load one page of a resource list.
pub async fn list<F>(api: &F, resource: Resource, params: &PageParams) -> Result<Listing, FetchError>
where
    F: AuthenticatedFetch + ?Sized,
{
    let pagination = params.resolve(resource.default_limit());
    let data = api.get(&resource.list_path(pagination)).await?;
    let (items, total_count) = take_collection(resource, data)?;
    let total_count = total_count.unwrap_or(items.len() as u64);
    Ok(Listing {
        items,
        total_count,
        page: pagination.page,
        limit: pagination.limit,
        total_pages: total_pages(total_count, pagination.limit),
    })
}

/// Load a single record.
pub async fn show<F>(api: &F, resource: Resource, id: &str) -> Result<Value, FetchError>
where
    F: AuthenticatedFetch + ?Sized,
{
    let data = api.get(&resource.show_path(id)).await?;
    if data.is_null() {
        return Err(FetchError::NotFound(format!("no {} record '{id}'", resource.collection_key())));
    }
    Ok(data)
}

/// All categories of a section, unpaginated, for form dropdowns.
pub async fn category_options<F>(api: &F, section: Section) -> Result<Vec<Value>, FetchError>
where
    F: AuthenticatedFetch + ?Sized,
{
    let resource = Resource::Category(section);
    let data = api.get(resource.endpoints().list).await?;
    take_collection(resource, data).map(|(items, _)| items)
}

/// Entity and category options load concurrently. Both halves always run to
/// completion so a rejected token in either one wins over any other error.
pub async fn edit_view<F>(api: &F, section: Section, id: &str) -> Result<EditView, FetchError>
where
    F: AuthenticatedFetch + ?Sized,
{
    let (item, categories) = tokio::join!(show(api, Resource::Entity(section), id), category_options(api, section));
    match (item, categories) {
        (Ok(item), Ok(categories)) => Ok(EditView { item, categories }),
        (Err(FetchError::Unauthorized), _) | (_, Err(FetchError::Unauthorized)) => Err(FetchError::Unauthorized),
        (Err(e), _) | (_, Err(e)) => Err(e),
    }
}

/// Data for a new-entity form: the section's category options.
pub async fn create_view<F>(api: &F, section: Section) -> Result<CreateView, FetchError>
where
    F: AuthenticatedFetch + ?Sized,
{
    let categories = category_options(api, section).await?;
    Ok(CreateView { categories })
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
