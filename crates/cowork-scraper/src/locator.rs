//! Element locators and their in-page JavaScript form.

use std::fmt;

/// How to find an element on the live page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
    Id(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    /// Strategy name used in logs.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css",
            Locator::XPath(_) => "xpath",
            Locator::Id(_) => "id",
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) | Locator::Id(s) => s,
        }
    }

    /// A JavaScript expression evaluating to the array of matching elements.
    #[must_use]
    pub fn js_all(&self) -> String {
        let literal = js_string(self.value());
        match self {
            Locator::Css(_) => format!("Array.from(document.querySelectorAll({literal}))"),
            Locator::Id(_) => {
                format!("[document.getElementById({literal})].filter(Boolean)")
            }
            Locator::XPath(_) => format!(
                "(() => {{ const r = document.evaluate({literal}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                 for (let i = 0; i < r.snapshotLength; i++) {{ out.push(r.snapshotItem(i)); }} \
                 return out; }})()"
            ),
        }
    }

    /// A JavaScript expression evaluating to the first match or `null`.
    #[must_use]
    pub fn js_first(&self) -> String {
        format!("({}[0] || null)", self.js_all())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

/// Quotes `raw` as a JavaScript string literal. JSON strings are valid JS.
fn js_string(raw: &str) -> String {
    serde_json::Value::String(raw.to_owned()).to_string()
}
