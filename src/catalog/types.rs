//! Catalog wire types and the normalized `BookRecord`.

use serde::{Deserialize, Serialize};

/// Display-ready book entry. `id` is the catalog's identifier and the only
/// equality key used for de-duplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "thumbnail", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

/// Search response from the volumes endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumesResponse {
    #[serde(default)]
    pub items: Option<Vec<VolumeItem>>,
    #[serde(default)]
    pub total_items: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeItem {
    pub id: String,
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: String,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub industry_identifiers: Option<Vec<IndustryIdentifier>>,
    pub page_count: Option<u32>,
    pub image_links: Option<ImageLinks>,
    pub info_link: Option<String>,
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}

impl VolumeInfo {
    fn identifier(&self, kind: &str) -> Option<&str> {
        self.industry_identifiers
            .as_ref()?
            .iter()
            .find(|id| id.kind == kind)
            .map(|id| id.identifier.as_str())
    }
}

impl From<VolumeItem> for BookRecord {
    fn from(item: VolumeItem) -> Self {
        let info = item.volume_info;

        let isbn = info
            .identifier("ISBN_13")
            .or_else(|| info.identifier("ISBN_10"))
            .map(str::to_string);

        let thumbnail_url = info
            .image_links
            .as_ref()
            .and_then(|links| links.thumbnail.clone().or_else(|| links.small_thumbnail.clone()));

        BookRecord {
            id: item.id,
            title: info.title,
            authors: info.authors,
            description: info.description,
            thumbnail_url,
            isbn,
            published_date: info.published_date,
            publisher: info.publisher,
            page_count: info.page_count,
            info_link: info.info_link,
            categories: info.categories,
        }
    }
}
