// XML API response and entity types
//
// Every response is wrapped in `<response status=".." code="..">`.
// Config reads addressed at `<container>/entry` return the matching
// `<entry>` elements directly under `<result>`. Fields use `default`
// liberally because PAN-OS omits empty elements. Child elements a type
// does not decode are kept as raw XML and written back on `edit`.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Deserialize;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard XML API response envelope.
///
/// ```xml
/// <response status="success" code="19"><result>...</result></response>
/// ```
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "@status")]
    pub status: String,
    #[serde(rename = "@code", default)]
    pub code: Option<String>,
    pub result: Option<T>,
}

/// `<result>` of a config `get` aimed at `.../entry`.
#[derive(Debug, Deserialize)]
pub struct EntryList<T> {
    #[serde(default = "Vec::new")]
    pub entry: Vec<T>,
}

/// Just the name of an `<entry>`, for existence checks.
#[derive(Debug, Deserialize)]
pub struct EntryName {
    #[serde(rename = "@name")]
    pub name: String,
}

/// A `<member>` list, e.g. `<from><member>trust</member></from>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Members {
    #[serde(default)]
    pub member: Vec<String>,
}

impl Members {
    fn to_xml(tag: &str, values: &[String]) -> String {
        let members: String = values
            .iter()
            .map(|v| format!("<member>{}</member>", escape(v.as_str())))
            .collect();
        format!("<{tag}>{members}</{tag}>")
    }
}

// ── Config entries ───────────────────────────────────────────────────

/// A configuration `<entry name="...">` that can be written back.
pub trait ConfigEntry {
    /// Child element names decoded into typed fields.
    const MODELLED: &'static [&'static str];

    fn name(&self) -> &str;

    /// Keep `raw` child elements to append verbatim on write.
    fn set_unmodelled(&mut self, raw: Vec<String>);

    /// Child elements of the entry, without the `<entry>` wrapper.
    fn children_xml(&self) -> String;

    /// The complete `<entry name="...">...</entry>` element.
    fn to_xml(&self) -> String {
        format!(
            "<entry name=\"{}\">{}</entry>",
            escape(self.name()),
            self.children_xml()
        )
    }
}

/// Address object (`<address><entry>`).
///
/// Exactly one of `ip_netmask`, `ip_range`, `fqdn` is set on a valid
/// object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddressEntry {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "ip-netmask", default)]
    pub ip_netmask: Option<String>,
    #[serde(rename = "ip-range", default)]
    pub ip_range: Option<String>,
    #[serde(default)]
    pub fqdn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw child elements with no field above (e.g. `<tag>`).
    #[serde(skip)]
    pub unmodelled: Vec<String>,
}

impl AddressEntry {
    /// An `ip-netmask` address object.
    pub fn ip_netmask(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip_netmask: Some(value.into()),
            ..Self::default()
        }
    }
}

impl ConfigEntry for AddressEntry {
    const MODELLED: &'static [&'static str] = &["ip-netmask", "ip-range", "fqdn", "description"];

    fn name(&self) -> &str {
        &self.name
    }

    fn set_unmodelled(&mut self, raw: Vec<String>) {
        self.unmodelled = raw;
    }

    fn children_xml(&self) -> String {
        let mut xml = String::new();
        for (tag, value) in [
            ("ip-netmask", &self.ip_netmask),
            ("ip-range", &self.ip_range),
            ("fqdn", &self.fqdn),
            ("description", &self.description),
        ] {
            if let Some(value) = value {
                xml.push_str(&format!("<{tag}>{}</{tag}>", escape(value.as_str())));
            }
        }
        xml.push_str(&self.unmodelled.concat());
        xml
    }
}

/// Security rule (`<rulebase><security><rules><entry>`).
///
/// Member lists keep the device's stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SecurityRuleEntry {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(default)]
    pub from: Members,
    #[serde(default)]
    pub to: Members,
    #[serde(default)]
    pub source: Members,
    #[serde(default)]
    pub destination: Members,
    #[serde(default)]
    pub application: Members,
    #[serde(default)]
    pub service: Members,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw child elements with no field above (`disabled`, `tag`,
    /// `log-setting`, `profile-setting` and the like).
    #[serde(skip)]
    pub unmodelled: Vec<String>,
}

impl ConfigEntry for SecurityRuleEntry {
    const MODELLED: &'static [&'static str] = &[
        "from",
        "to",
        "source",
        "destination",
        "application",
        "service",
        "action",
        "description",
    ];

    fn name(&self) -> &str {
        &self.name
    }

    fn set_unmodelled(&mut self, raw: Vec<String>) {
        self.unmodelled = raw;
    }

    fn children_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(&Members::to_xml("from", &self.from.member));
        xml.push_str(&Members::to_xml("to", &self.to.member));
        xml.push_str(&Members::to_xml("source", &self.source.member));
        xml.push_str(&Members::to_xml("destination", &self.destination.member));
        xml.push_str(&Members::to_xml("application", &self.application.member));
        // The device rejects rules without a service; `any` is its own default.
        if self.service.member.is_empty() {
            xml.push_str(&Members::to_xml("service", &["any".to_owned()]));
        } else {
            xml.push_str(&Members::to_xml("service", &self.service.member));
        }
        if let Some(ref action) = self.action {
            xml.push_str(&format!("<action>{}</action>", escape(action.as_str())));
        }
        if let Some(ref description) = self.description {
            xml.push_str(&format!(
                "<description>{}</description>",
                escape(description.as_str())
            ));
        }
        xml.push_str(&self.unmodelled.concat());
        xml
    }
}

// ── Unmodelled children ──────────────────────────────────────────────

/// Depth of `<entry>` elements: `<response><result><entry>`.
const ENTRY_DEPTH: usize = 2;

/// Raw XML of the children of each `<entry>` under `<result>` whose tag
/// is not in `modelled`, one list per entry in document order.
pub(crate) fn unmodelled_children(
    body: &str,
    modelled: &[&str],
) -> Result<Vec<Vec<String>>, quick_xml::Error> {
    let mut reader = Reader::from_str(body);
    let mut depth = 0usize;
    let mut in_entry = false;
    let mut entries: Vec<Vec<String>> = Vec::new();

    loop {
        let start = position(&reader);
        match reader.read_event()? {
            Event::Start(e) if in_entry && depth == ENTRY_DEPTH + 1 => {
                let name = e.name();
                reader.read_to_end(name)?;
                if !is_modelled(modelled, name.as_ref()) {
                    keep(&mut entries, body, start, position(&reader));
                }
            }
            Event::Empty(e) if in_entry && depth == ENTRY_DEPTH + 1 => {
                if !is_modelled(modelled, e.name().as_ref()) {
                    keep(&mut entries, body, start, position(&reader));
                }
            }
            Event::Start(e) => {
                if depth == ENTRY_DEPTH && e.name().as_ref() == b"entry" {
                    entries.push(Vec::new());
                    in_entry = true;
                }
                depth += 1;
            }
            Event::Empty(e) if depth == ENTRY_DEPTH && e.name().as_ref() == b"entry" => {
                entries.push(Vec::new());
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == ENTRY_DEPTH {
                    in_entry = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(entries)
}

fn position(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

fn is_modelled(modelled: &[&str], name: &[u8]) -> bool {
    modelled.iter().any(|m| m.as_bytes() == name)
}

fn keep(entries: &mut [Vec<String>], body: &str, start: usize, end: usize) {
    if let (Some(current), Some(raw)) = (entries.last_mut(), body.get(start..end)) {
        current.push(raw.to_owned());
    }
}
