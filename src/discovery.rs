//! Discovery of a map resource, its request template and styles
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{SuiteError, SuiteResult};
use crate::executor::Timeouts;

/// Link relation for map resources
pub const MAP_REL: &str = "http://www.opengis.net/def/rel/ogc/1.0/map";

const JSON_MEDIA_TYPE: &str = "application/json";

/// OGC API Link object
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default)]
    pub rel: String,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct CollectionsDocument {
    #[serde(default)]
    collections: Vec<CollectionSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConformanceDeclaration {
    conforms_to: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct StylesDocument {
    #[serde(default)]
    styles: Vec<StyleSummary>,
}

#[derive(Debug, Deserialize)]
struct StyleSummary {
    id: String,
}

/// The subset of a Mapbox GL style needed to find its background color
#[derive(Debug, Deserialize)]
struct StyleSheet {
    #[serde(default)]
    layers: Vec<StyleLayer>,
}

#[derive(Debug, Deserialize)]
struct StyleLayer {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    paint: serde_json::Map<String, serde_json::Value>,
}

impl StyleSheet {
    fn background_color(&self) -> Option<String> {
        self.layers
            .iter()
            .filter(|l| l.kind.as_deref() == Some("background"))
            .find_map(|l| l.paint.get("background-color"))
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
    }
}

pub fn find_link_by_rel<'a>(links: &'a [Link], rel: &str) -> Option<&'a Link> {
    links.iter().find(|l| l.rel == rel)
}

/// A collection exposing an `[ogc-rel:map]` link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapResource {
    pub collection_id: String,
    pub href: Url,
    pub media_type: Option<String>,
}

/// Base map URL plus the fixed parameters shared by every case of one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    base: Url,
    format: String,
    bbox: String,
    width: u32,
    height: u32,
}

impl RequestTemplate {
    pub fn new(base: Url, format: impl Into<String>, bbox: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            base,
            format: format.into(),
            bbox: bbox.into(),
            width,
            height,
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn bbox(&self) -> &str {
        &self.bbox
    }

    /// The map URL with `f`, `bbox`, `width` and `height` set.
    pub fn url(&self) -> Url {
        self.url_with(&[])
    }

    /// The template URL with additional query parameters appended.
    pub fn url_with(&self, extra: &[(&str, String)]) -> Url {
        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("f", &self.format)
                .append_pair("bbox", &self.bbox)
                .append_pair("width", &self.width.to_string())
                .append_pair("height", &self.height.to_string());
            for (name, value) in extra {
                query.append_pair(name, value);
            }
        }
        url
    }
}

/// Normalize an API root so relative references resolve beneath it.
pub fn normalize_root(root: &str) -> SuiteResult<Url> {
    let mut url = Url::parse(root.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Thin JSON client for the discovery endpoints of the API under test
#[derive(Debug, Clone)]
pub struct ResourceDiscovery {
    client: reqwest::Client,
    root: Url,
}

impl ResourceDiscovery {
    pub fn new(root: &str, timeouts: Timeouts) -> SuiteResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .build()
            .map_err(|e| SuiteError::from_reqwest(root, e))?;

        Ok(Self {
            client,
            root: normalize_root(root)?,
        })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn endpoint(&self, path: &str) -> SuiteResult<Url> {
        Ok(self.root.join(path.trim_start_matches('/'))?)
    }

    /// Fetch and parse a JSON document. `None` when the server answers with a
    /// status other than 200.
    async fn get_json<T: DeserializeOwned>(&self, mut url: Url) -> SuiteResult<Option<T>> {
        url.query_pairs_mut().append_pair("f", "json");

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, JSON_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| SuiteError::from_reqwest(url.as_str(), e))?;

        if response.status() != reqwest::StatusCode::OK {
            tracing::warn!(%url, status = response.status().as_u16(), "Discovery request failed");
            return Ok(None);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SuiteError::from_reqwest(url.as_str(), e))?;

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| SuiteError::Json {
                url: url.to_string(),
                source,
            })
    }

    /// Conformance class URIs declared at `/conformance`
    pub async fn conformance_classes(&self) -> SuiteResult<Option<Vec<String>>> {
        let doc: Option<ConformanceDeclaration> = self.get_json(self.endpoint("conformance")?).await?;
        Ok(doc.and_then(|d| d.conforms_to))
    }

    pub async fn collections(&self) -> SuiteResult<Option<Vec<CollectionSummary>>> {
        let doc: Option<CollectionsDocument> = self.get_json(self.endpoint("collections")?).await?;
        Ok(doc.map(|d| d.collections))
    }

    /// Map resources of up to `limit` collections, in listing order.
    pub async fn map_resources(&self, limit: usize) -> SuiteResult<Vec<MapResource>> {
        let Some(collections) = self.collections().await? else {
            return Ok(Vec::new());
        };

        let mut resources = Vec::new();
        for collection in collections.iter().take(limit) {
            let Some(link) = find_link_by_rel(&collection.links, MAP_REL) else {
                continue;
            };
            if link.href.is_empty() {
                continue;
            }
            resources.push(MapResource {
                collection_id: collection.id.clone(),
                href: self.root.join(&link.href)?,
                media_type: link.media_type.clone(),
            });
        }
        Ok(resources)
    }

    pub async fn first_map_resource(&self) -> SuiteResult<Option<MapResource>> {
        Ok(self.map_resources(usize::MAX).await?.into_iter().next())
    }

    /// Id of the first style offered for a collection. Any failure means no
    /// style is used.
    pub async fn first_style_id(&self, collection_id: &str) -> Option<String> {
        let url = self.endpoint(&format!("collections/{}/styles", collection_id)).ok()?;
        match self.get_json::<StylesDocument>(url).await {
            Ok(Some(doc)) => {
                let id = doc.styles.into_iter().next().map(|s| s.id);
                match &id {
                    Some(id) => tracing::info!(collection_id, style_id = %id, "Found style"),
                    None => tracing::info!(collection_id, "No styles offered"),
                }
                id
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(collection_id, error = %e, "Style discovery failed");
                None
            }
        }
    }

    /// Background color declared by a style, as written in the style document.
    pub async fn style_background(&self, collection_id: &str, style_id: &str) -> Option<String> {
        let url = self
            .endpoint(&format!("collections/{}/styles/{}", collection_id, style_id))
            .ok()?;
        match self.get_json::<StyleSheet>(url).await {
            Ok(Some(sheet)) => sheet.background_color(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(collection_id, style_id, error = %e, "Failed to read style");
                None
            }
        }
    }
}
