//! Browser session over the W3C WebDriver protocol
//!
//! Talks plain HTTP/JSON to a running driver (chromedriver, geckodriver) so no
//! browser bindings are needed. The session is created on first use; pages are
//! located through configurable CSS selectors.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{process_debug, process_warn, ProcessId};
use tokio::sync::OnceCell;
use url::Url;

use crate::error::{OutreachError, OutreachResult};
use crate::traits::{BrowserSession, ProfileCard};

/// Key under which WebDriver returns element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Upper bound for one driver command; page loads included
const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Where things live on the target site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSelectors {
    pub login_url: String,
    /// Substring of the current URL that shows the operator is logged in
    pub logged_in_url_marker: String,
    pub people_search_url: String,
    pub card: String,
    pub card_id_attribute: String,
    pub card_link: String,
    pub card_name: String,
    pub card_title: String,
    pub connect_button: String,
    pub add_note_button: String,
    pub note_field: String,
    pub send_button: String,
    pub send_without_note_button: String,
    pub next_page_button: String,
}

impl Default for BrowserSelectors {
    fn default() -> Self {
        Self {
            login_url: "https://www.linkedin.com/login".into(),
            logged_in_url_marker: "/feed".into(),
            people_search_url: "https://www.linkedin.com/search/results/people/".into(),
            card: "li.reusable-search__result-container".into(),
            card_id_attribute: "data-chameleon-result-urn".into(),
            card_link: "a.app-aware-link".into(),
            card_name: "span.entity-result__title-text a span[aria-hidden='true']".into(),
            card_title: ".entity-result__primary-subtitle".into(),
            connect_button: "button[aria-label^='Invite']".into(),
            add_note_button: "button[aria-label='Add a note']".into(),
            note_field: "textarea[name='message']".into(),
            send_button: "button[aria-label='Send now'], button[aria-label='Send invitation']".into(),
            send_without_note_button: "button[aria-label='Send without a note'], button[aria-label='Send now']"
                .into(),
            next_page_button: "button[aria-label='Next']".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    value: Value,
}

/// Live WebDriver-backed browser session
pub struct WebDriverSession {
    client: reqwest::Client,
    driver_url: Url,
    selectors: BrowserSelectors,
    session_id: OnceCell<String>,
    /// Pause after clicks that open dialogs or load pages
    settle_delay: Duration,
}

impl WebDriverSession {
    pub fn new(driver_url: &str, selectors: BrowserSelectors) -> OutreachResult<Self> {
        let normalized = if driver_url.ends_with('/') {
            driver_url.to_string()
        } else {
            format!("{driver_url}/")
        };
        let driver_url = Url::parse(&normalized).map_err(|e| OutreachError::config(format!("webdriver url: {e}")))?;
        let client = reqwest::Client::builder().timeout(COMMAND_TIMEOUT).build()?;
        Ok(Self {
            client,
            driver_url,
            selectors,
            session_id: OnceCell::new(),
            settle_delay: Duration::from_millis(1_500),
        })
    }

    /// Replace the per-command timeout; a driver that stalls past it fails the step
    pub fn with_command_timeout(mut self, timeout: Duration) -> OutreachResult<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    async fn call(&self, method: reqwest::Method, path: &str, body: Option<Value>, step: &str) -> OutreachResult<Value> {
        let url = self
            .driver_url
            .join(path)
            .map_err(|e| OutreachError::navigation(step, e))?;
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(|e| OutreachError::navigation(step, e))?;
        let status = response.status();
        let wire: WireResponse = response.json().await.map_err(|e| OutreachError::navigation(step, e))?;

        if !status.is_success() {
            let message = wire
                .value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message")
                .to_string();
            return Err(OutreachError::navigation(step, format!("driver returned {status}: {message}")));
        }
        Ok(wire.value)
    }

    async fn session(&self) -> OutreachResult<&str> {
        let id = self
            .session_id
            .get_or_try_init(|| async {
                let value = self
                    .call(
                        reqwest::Method::POST,
                        "session",
                        Some(json!({"capabilities": {"alwaysMatch": {}}})),
                        "create session",
                    )
                    .await?;
                let id = value
                    .get("sessionId")
                    .and_then(Value::as_str)
                    .ok_or_else(|| OutreachError::navigation("create session", "response without sessionId"))?
                    .to_string();
                process_debug!(ProcessId::current(), "🌐 WebDriver session {} created", id);
                Ok::<_, OutreachError>(id)
            })
            .await?;
        Ok(id.as_str())
    }

    async fn navigate(&self, url: &str, step: &str) -> OutreachResult<()> {
        let session = self.session().await?;
        self.call(
            reqwest::Method::POST,
            &format!("session/{session}/url"),
            Some(json!({ "url": url })),
            step,
        )
        .await?;
        Ok(())
    }

    fn element_ids(value: Value) -> Vec<String> {
        value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(ELEMENT_KEY).and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Elements matching `selector`, optionally scoped to a parent element
    async fn find_all(&self, selector: &str, parent: Option<&str>, step: &str) -> OutreachResult<Vec<String>> {
        let session = self.session().await?;
        let path = match parent {
            Some(parent) => format!("session/{session}/element/{parent}/elements"),
            None => format!("session/{session}/elements"),
        };
        let value = self
            .call(
                reqwest::Method::POST,
                &path,
                Some(json!({"using": "css selector", "value": selector})),
                step,
            )
            .await?;
        Ok(Self::element_ids(value))
    }

    async fn find_first(&self, selector: &str, parent: Option<&str>, step: &str) -> OutreachResult<Option<String>> {
        Ok(self.find_all(selector, parent, step).await?.into_iter().next())
    }

    async fn text(&self, element: &str, step: &str) -> OutreachResult<String> {
        let session = self.session().await?;
        let value = self
            .call(
                reqwest::Method::GET,
                &format!("session/{session}/element/{element}/text"),
                None,
                step,
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().trim().to_string())
    }

    async fn attribute(&self, element: &str, name: &str, step: &str) -> OutreachResult<Option<String>> {
        let session = self.session().await?;
        let value = self
            .call(
                reqwest::Method::GET,
                &format!("session/{session}/element/{element}/attribute/{name}"),
                None,
                step,
            )
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn click(&self, element: &str, step: &str) -> OutreachResult<()> {
        let session = self.session().await?;
        self.call(
            reqwest::Method::POST,
            &format!("session/{session}/element/{element}/click"),
            Some(json!({})),
            step,
        )
        .await?;
        Ok(())
    }

    async fn type_text(&self, element: &str, text: &str, step: &str) -> OutreachResult<()> {
        let session = self.session().await?;
        self.call(
            reqwest::Method::POST,
            &format!("session/{session}/element/{element}/value"),
            Some(json!({ "text": text })),
            step,
        )
        .await?;
        Ok(())
    }

    /// Text of the first match inside `parent`, empty when there is none
    async fn child_text(&self, parent: &str, selector: &str, step: &str) -> OutreachResult<String> {
        match self.find_first(selector, Some(parent), step).await? {
            Some(child) => self.text(&child, step).await,
            None => Ok(String::new()),
        }
    }

    async fn read_card(&self, element: &str) -> OutreachResult<ProfileCard> {
        let step = "read result card";
        let name = self.child_text(element, &self.selectors.card_name, step).await?;
        let title = self.child_text(element, &self.selectors.card_title, step).await?;

        let mut card_id = self
            .attribute(element, &self.selectors.card_id_attribute, step)
            .await?
            .filter(|id| !id.is_empty());
        if card_id.is_none() {
            if let Some(link) = self.find_first(&self.selectors.card_link, Some(element), step).await? {
                card_id = self.attribute(&link, "href", step).await?;
            }
        }

        let connect_handle = self
            .find_first(&self.selectors.connect_button, Some(element), step)
            .await?;

        Ok(ProfileCard {
            card_id: card_id.unwrap_or_else(|| name.clone()),
            name,
            title,
            connect_handle,
        })
    }

    /// Close the remote session; the driver keeps it alive otherwise
    pub async fn close(&self) -> OutreachResult<()> {
        if let Some(session) = self.session_id.get() {
            self.call(reqwest::Method::DELETE, &format!("session/{session}"), None, "close session")
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn open_login(&self) -> OutreachResult<()> {
        self.navigate(&self.selectors.login_url, "open login").await
    }

    async fn is_logged_in(&self) -> OutreachResult<bool> {
        let session = self.session().await?;
        let value = self
            .call(reqwest::Method::GET, &format!("session/{session}/url"), None, "check login")
            .await?;
        Ok(value
            .as_str()
            .map(|url| url.contains(&self.selectors.logged_in_url_marker))
            .unwrap_or(false))
    }

    async fn open_company_search(&self, company: &str) -> OutreachResult<()> {
        let mut url = Url::parse(&self.selectors.people_search_url)
            .map_err(|e| OutreachError::navigation("company search", e))?;
        url.query_pairs_mut()
            .append_pair("keywords", company)
            .append_pair("origin", "GLOBAL_SEARCH_HEADER");
        self.navigate(url.as_str(), "company search").await?;
        tokio::time::sleep(self.settle_delay).await;
        Ok(())
    }

    async fn candidate_cards(&self) -> OutreachResult<Vec<ProfileCard>> {
        let elements = self.find_all(&self.selectors.card, None, "list result cards").await?;
        let mut cards = Vec::with_capacity(elements.len());
        for element in elements {
            match self.read_card(&element).await {
                Ok(card) => cards.push(card),
                Err(e) => {
                    process_warn!(ProcessId::current(), "⚠️ Skipping unreadable result card {}: {}", element, e);
                }
            }
        }
        Ok(cards)
    }

    async fn connect(&self, card: &ProfileCard, note: Option<String>) -> OutreachResult<bool> {
        let Some(handle) = card.connect_handle.as_deref() else {
            return Ok(false);
        };
        let step = "connect";
        self.click(handle, step).await?;
        tokio::time::sleep(self.settle_delay).await;

        if let Some(note) = note {
            if let Some(add_note) = self.find_first(&self.selectors.add_note_button, None, step).await? {
                self.click(&add_note, step).await?;
                if let Some(field) = self.find_first(&self.selectors.note_field, None, step).await? {
                    self.type_text(&field, &note, step).await?;
                }
                return match self.find_first(&self.selectors.send_button, None, step).await? {
                    Some(send) => self.click(&send, step).await.map(|_| true),
                    None => Ok(false),
                };
            }
        }

        match self
            .find_first(&self.selectors.send_without_note_button, None, step)
            .await?
        {
            Some(send) => self.click(&send, step).await.map(|_| true),
            None => Ok(false),
        }
    }

    async fn next_page(&self) -> OutreachResult<bool> {
        let step = "next page";
        let Some(next) = self.find_first(&self.selectors.next_page_button, None, step).await? else {
            return Ok(false);
        };
        if self.attribute(&next, "disabled", step).await?.is_some() {
            return Ok(false);
        }
        self.click(&next, step).await?;
        tokio::time::sleep(self.settle_delay).await;
        Ok(true)
    }
}
