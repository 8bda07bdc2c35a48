use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;
use url::Url;
use wk_core::{Config, ContentProvider, Error, PageContent, PageId, PageInfo, Result};
use crate::wikitext::parse_extract;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<QueryBody>,
    #[serde(rename = "continue", default)]
    continuation: Option<HashMap<String, Value>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<ApiPage>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    #[serde(default)]
    pageid: Option<u64>,
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    canonicalurl: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    categories: Vec<TitleRef>,
    #[serde(default)]
    links: Vec<TitleRef>,
}

#[derive(Debug, Deserialize)]
struct TitleRef {
    title: String,
}

/// Reads articles through the MediaWiki Action API of a Wikipedia edition.
/// At most `concurrency` requests are in flight, across every title.
pub struct WikipediaProvider {
    client: Client,
    api_url: String,
    permits: Semaphore,
}

impl fmt::Debug for WikipediaProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WikipediaProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_url", &self.api_url)
            .field("available_permits", &self.permits.available_permits())
            .finish()
    }
}

impl WikipediaProvider {
    pub fn new(config: &Config) -> Result<Self> {
        config.api_endpoint(&config.language)?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            permits: Semaphore::new(config.concurrency.max(1)),
        })
    }

    fn endpoint(&self, language: &str) -> Result<Url> {
        let raw = self.api_url.replace("{lang}", language);
        Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))
    }

    async fn query(&self, language: &str, params: &[(String, String)]) -> Result<ApiResponse> {
        let mut all = vec![
            ("action".to_string(), "query".to_string()),
            ("format".to_string(), "json".to_string()),
            ("formatversion".to_string(), "2".to_string()),
            ("redirects".to_string(), "1".to_string()),
        ];
        all.extend_from_slice(params);

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| Error::Provider(format!("request limiter closed: {}", e)))?;
        let response: ApiResponse = self
            .client
            .get(self.endpoint(language)?)
            .query(&all)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(Error::Provider(format!("{}: {}", error.code, error.info)));
        }
        Ok(response)
    }

    /// Runs a list query, following `continue` tokens until the result set is complete.
    async fn query_titles<F>(&self, page: &PageInfo, prop: &[(&str, &str)], pick: F) -> Result<Vec<String>>
    where
        F: Fn(ApiPage) -> Vec<TitleRef>,
    {
        let mut base = vec![page_selector(page)];
        base.extend(prop.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let mut titles = Vec::new();
        let mut continuation: Vec<(String, String)> = Vec::new();
        loop {
            let mut params = base.clone();
            params.extend(continuation.iter().cloned());

            let response = self.query(&page.language, &params).await?;
            if let Some(query) = response.query {
                for api_page in query.pages {
                    titles.extend(pick(api_page).into_iter().map(|t| t.title));
                }
            }

            match response.continuation {
                Some(tokens) if !tokens.is_empty() => {
                    continuation = tokens
                        .into_iter()
                        .map(|(k, v)| {
                            let v = match v {
                                Value::String(s) => s,
                                other => other.to_string(),
                            };
                            (k, v)
                        })
                        .collect();
                    debug!("Continuing {} query for {}", prop[0].1, page.title);
                }
                _ => break,
            }
        }
        Ok(titles)
    }
}

fn page_selector(page: &PageInfo) -> (String, String) {
    match &page.pageid {
        PageId::Numeric(id) => ("pageids".to_string(), id.to_string()),
        PageId::Opaque(_) => ("titles".to_string(), page.title.clone()),
    }
}

fn first_page(response: ApiResponse) -> Option<ApiPage> {
    response.query.and_then(|q| q.pages.into_iter().next())
}

#[async_trait]
impl ContentProvider for WikipediaProvider {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn resolve(&self, title: &str, language: &str) -> Result<Option<PageInfo>> {
        let params = vec![
            ("prop".to_string(), "info".to_string()),
            ("inprop".to_string(), "url".to_string()),
            ("titles".to_string(), title.to_string()),
        ];
        let response = self.query(language, &params).await?;
        let page = match first_page(response) {
            Some(page) if !page.missing && !page.invalid => page,
            _ => return Ok(None),
        };
        let Some(pageid) = page.pageid else {
            return Ok(None);
        };

        let url = page.fullurl.unwrap_or_default();
        Ok(Some(PageInfo {
            title: page.title,
            pageid: PageId::Numeric(pageid),
            canonical_url: page.canonicalurl.unwrap_or_else(|| url.clone()),
            url,
            language: language.to_string(),
        }))
    }

    async fn page_content(&self, page: &PageInfo) -> Result<PageContent> {
        let params = vec![
            page_selector(page),
            ("prop".to_string(), "extracts".to_string()),
            ("explaintext".to_string(), "1".to_string()),
            ("exsectionformat".to_string(), "wiki".to_string()),
        ];
        let response = self.query(&page.language, &params).await?;
        let extract = first_page(response)
            .ok_or_else(|| Error::NotFound(page.title.clone()))?
            .extract
            .unwrap_or_default();
        Ok(parse_extract(&extract))
    }

    async fn categories(&self, page: &PageInfo) -> Result<Vec<String>> {
        self.query_titles(page, &[("prop", "categories"), ("cllimit", "max")], |p| p.categories)
            .await
    }

    async fn links(&self, page: &PageInfo) -> Result<Vec<String>> {
        self.query_titles(page, &[("prop", "links"), ("pllimit", "max")], |p| p.links)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> WikipediaProvider {
        let config = Config {
            api_url: format!("{}/{{lang}}/api.php", server.uri()),
            ..Config::default()
        };
        WikipediaProvider::new(&config).unwrap()
    }

    fn page_info() -> PageInfo {
        PageInfo {
            title: "Rust".to_string(),
            pageid: PageId::Numeric(42),
            url: "https://en.wikipedia.org/wiki/Rust".to_string(),
            canonical_url: "https://en.wikipedia.org/wiki/Rust".to_string(),
            language: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_existing_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/api.php"))
            .and(query_param("prop", "info"))
            .and(query_param("titles", "Rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{
                    "pageid": 42, "ns": 0, "title": "Rust",
                    "fullurl": "https://en.wikipedia.org/wiki/Rust",
                    "canonicalurl": "https://en.wikipedia.org/wiki/Rust_canonical"
                }]}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let info = provider.resolve("Rust", "en").await.unwrap().unwrap();
        assert_eq!(info.pageid, PageId::Numeric(42));
        assert_eq!(info.url, "https://en.wikipedia.org/wiki/Rust");
        assert_eq!(info.canonical_url, "https://en.wikipedia.org/wiki/Rust_canonical");
        assert_eq!(info.language, "en");
    }

    #[tokio::test]
    async fn test_resolve_missing_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{"ns": 0, "title": "Test Article", "missing": true}]}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        assert!(provider.resolve("Test Article", "en").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": "badvalue", "info": "Unrecognized value"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.resolve("Rust", "en").await.unwrap_err();
        assert!(matches!(err, Error::Provider(msg) if msg.contains("badvalue")));
    }

    #[tokio::test]
    async fn test_page_content_parses_extract() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("prop", "extracts"))
            .and(query_param("pageids", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{
                    "pageid": 42, "title": "Rust",
                    "extract": "Intro.\n\n== History ==\nOld.\n\n=== Recent ===\nNew."
                }]}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let content = provider.page_content(&page_info()).await.unwrap();
        assert_eq!(content.summary, "Intro.");
        assert_eq!(content.sections.len(), 1);
        assert_eq!(content.sections[0].subsections[0].title, "Recent");
    }

    #[tokio::test]
    async fn test_links_follow_continuation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("prop", "links"))
            .and(query_param("plcontinue", "42|0|Next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": [{"pageid": 42, "title": "Rust",
                    "links": [{"ns": 0, "title": "Next"}]}]}
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("prop", "links"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "continue": {"plcontinue": "42|0|Next", "continue": "||"},
                "query": {"pages": [{"pageid": 42, "title": "Rust",
                    "links": [{"ns": 0, "title": "C++"}, {"ns": 0, "title": "Go"}]}]}
            })))
            .with_priority(2)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let links = provider.links(&page_info()).await.unwrap();
        assert_eq!(links, vec!["C++", "Go", "Next"]);
    }

    #[tokio::test]
    async fn test_requests_respect_concurrency() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"query": {"pages": []}}))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let config = Config {
            api_url: format!("{}/{{lang}}/api.php", server.uri()),
            concurrency: 1,
            ..Config::default()
        };
        let provider = WikipediaProvider::new(&config).unwrap();
        let page = page_info();

        let started = std::time::Instant::now();
        let (categories, links) = tokio::join!(provider.categories(&page), provider.links(&page));
        assert!(categories.unwrap().is_empty());
        assert!(links.unwrap().is_empty());
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_categories_http_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        assert!(matches!(
            provider.categories(&page_info()).await,
            Err(Error::Http(_))
        ));
    }
}
