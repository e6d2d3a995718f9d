// XML API HTTP client
//
// Wraps `reqwest::Client` with PAN-OS URL construction, API key
// injection, and `<response>` envelope checking. Resource endpoints
// (objects, policies, system) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::xmlapi::models::{ConfigEntry, Envelope, EntryList, EntryName, unmodelled_children};
use crate::xmlapi::xpath;

/// Header carrying the API key, so it never lands in request URLs or logs.
const API_KEY_HEADER: &str = "X-PAN-KEY";

const DEFAULT_VSYS: &str = "vsys1";

/// Raw HTTP client for the firewall's XML API.
///
/// Every call is a form-encoded `POST /api/`. Responses are checked for
/// the `<response status="error">` envelope before the caller sees them;
/// the device's own error text is preserved verbatim.
pub struct XmlApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    vsys: String,
}

impl XmlApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` is the management interface root, e.g.
    /// `https://192.168.1.1`.
    pub fn new(
        base_url: Url,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, api_key))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, api_key: SecretString) -> Self {
        Self {
            http,
            base_url,
            api_key,
            vsys: DEFAULT_VSYS.into(),
        }
    }

    /// Scope configuration requests to another virtual system.
    pub fn with_vsys(mut self, vsys: impl Into<String>) -> Self {
        self.vsys = vsys.into();
        self
    }

    /// The management interface base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The virtual system configuration requests are scoped to.
    pub fn vsys(&self) -> &str {
        &self.vsys
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/api/`
    fn api_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join("api/")?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send one API request and return the body of a successful envelope.
    pub(crate) async fn request(&self, params: &[(&str, &str)]) -> Result<String, Error> {
        let url = self.api_url()?;
        trace!(?params, "POST {}", url);

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .form(params)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("API key rejected (HTTP {})", status.as_u16()),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        // PAN-OS answers most failures with an XML envelope, sometimes
        // alongside a 4xx status. Prefer the device's message when present.
        match check_envelope(&body) {
            Err(err @ (Error::Api { .. } | Error::Authentication { .. })) => Err(err),
            _ if !status.is_success() => Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            }),
            Ok(()) => Ok(body),
            Err(err) => Err(err),
        }
    }

    /// `type=config&action=get`, returning the checked response body.
    pub(crate) async fn config_get(&self, xpath: &str) -> Result<String, Error> {
        debug!(xpath, "config get");
        self.request(&[("type", "config"), ("action", "get"), ("xpath", xpath)])
            .await
    }

    /// `type=config&action=set`: merge `element` under `xpath`.
    pub(crate) async fn config_set(&self, xpath: &str, element: &str) -> Result<(), Error> {
        debug!(xpath, "config set");
        self.request(&[
            ("type", "config"),
            ("action", "set"),
            ("xpath", xpath),
            ("element", element),
        ])
        .await?;
        Ok(())
    }

    /// `type=config&action=edit`: replace the node at `xpath` with `element`.
    pub(crate) async fn config_edit(&self, xpath: &str, element: &str) -> Result<(), Error> {
        debug!(xpath, "config edit");
        self.request(&[
            ("type", "config"),
            ("action", "edit"),
            ("xpath", xpath),
            ("element", element),
        ])
        .await?;
        Ok(())
    }

    /// `type=config&action=delete`
    pub(crate) async fn config_delete(&self, xpath: &str) -> Result<(), Error> {
        debug!(xpath, "config delete");
        self.request(&[("type", "config"), ("action", "delete"), ("xpath", xpath)])
            .await?;
        Ok(())
    }

    // ── Entry helpers shared by resource modules ─────────────────────

    /// Every entry under `container`, each carrying its unmodelled
    /// children so a later `edit` writes them back.
    pub(crate) async fn list_entries<T: DeserializeOwned + ConfigEntry>(
        &self,
        container: &str,
    ) -> Result<Vec<T>, Error> {
        let body = self.config_get(&xpath::all_entries(container)).await?;
        let mut entries: Vec<T> = decode_entries(&body)?;
        let raw = unmodelled_children(&body, T::MODELLED).map_err(|e| Error::Deserialization {
            message: format!("malformed XML response: {e}"),
            body: body.clone(),
        })?;
        for (entry, raw) in entries.iter_mut().zip(raw) {
            entry.set_unmodelled(raw);
        }
        Ok(entries)
    }

    /// Whether `container` already holds an entry called `name`.
    pub(crate) async fn entry_exists(&self, container: &str, name: &str) -> Result<bool, Error> {
        let body = self.config_get(&xpath::entry(container, name)).await?;
        let entries: Vec<EntryName> = decode_entries(&body)?;
        Ok(!entries.is_empty())
    }

    pub(crate) async fn set_entry(
        &self,
        container: &str,
        entry: &impl ConfigEntry,
    ) -> Result<(), Error> {
        let path = xpath::entry(container, entry.name());
        self.config_set(&path, &entry.children_xml()).await
    }

    pub(crate) async fn edit_entry(
        &self,
        container: &str,
        entry: &impl ConfigEntry,
    ) -> Result<(), Error> {
        let path = xpath::entry(container, entry.name());
        self.config_edit(&path, &entry.to_xml()).await
    }

    pub(crate) async fn delete_entry(&self, container: &str, name: &str) -> Result<(), Error> {
        self.config_delete(&xpath::entry(container, name)).await
    }
}

// ── Envelope parsing ────────────────────────────────────────────────

/// Decode every `<entry>` under `<result>`; an empty result is no entries.
fn decode_entries<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, Error> {
    let envelope: Envelope<EntryList<T>> =
        quick_xml::de::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        })?;
    Ok(envelope.result.map(|r| r.entry).unwrap_or_default())
}

/// Check the `<response status="..">` envelope.
///
/// On `status="error"` every text node under `<msg>` (PAN-OS nests them in
/// `<line>` and CDATA depending on the request type) is joined with single
/// spaces into the error message.
pub(crate) fn check_envelope(body: &str) -> Result<(), Error> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut status: Option<String> = None;
    let mut code: Option<String> = None;
    let mut msg_depth = 0usize;
    let mut parts: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"response" if status.is_none() => {
                    status = attribute(&e, "status");
                    code = attribute(&e, "code");
                }
                b"msg" => msg_depth += 1,
                _ => {}
            },
            Ok(Event::Empty(e)) if status.is_none() && e.name().as_ref() == b"response" => {
                status = attribute(&e, "status");
                code = attribute(&e, "code");
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"msg" => {
                msg_depth = msg_depth.saturating_sub(1);
            }
            Ok(Event::Text(t)) if msg_depth > 0 => {
                if let Ok(text) = t.unescape() {
                    parts.push(text.into_owned());
                }
            }
            Ok(Event::CData(c)) if msg_depth > 0 => {
                parts.push(String::from_utf8_lossy(&c.into_inner()).trim().to_owned());
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Deserialization {
                    message: format!("malformed XML response: {e}"),
                    body: body.to_owned(),
                });
            }
            Ok(_) => {}
        }
    }

    match status.as_deref() {
        Some("success") => Ok(()),
        Some(_) => {
            let message = parts
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let message = if message.is_empty() {
                format!(
                    "request failed (code {})",
                    code.as_deref().unwrap_or("unknown")
                )
            } else {
                message
            };
            if code.as_deref() == Some("403") {
                Err(Error::Authentication { message })
            } else {
                Err(Error::Api { code, message })
            }
        }
        None => Err(Error::Deserialization {
            message: format!("missing <response> envelope (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        }),
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Option<String> {
    element
        .try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(Cow::into_owned)
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
