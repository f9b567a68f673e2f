use std::borrow::Cow;

use serde_json::Value;

/// Consent queries whose results carry vendor ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentQuery {
    VendorList,
    ConsentData,
    VendorConsents,
}

impl ConsentQuery {
    pub const ALL: [ConsentQuery; 3] = [Self::VendorList, Self::ConsentData, Self::VendorConsents];

    /// Command name understood by the underlying CMP.
    pub fn command_name(self) -> &'static str {
        match self {
            Self::VendorList => "getVendorList",
            Self::ConsentData => "getConsentData",
            Self::VendorConsents => "getVendorConsents",
        }
    }

    /// Name of the unfiltered variant, e.g. `rawGetVendorList`.
    pub fn raw_command_name(self) -> &'static str {
        match self {
            Self::VendorList => "rawGetVendorList",
            Self::ConsentData => "rawGetConsentData",
            Self::VendorConsents => "rawGetVendorConsents",
        }
    }
}

/// A command issued through the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Query whose result is passed through the custom-vendor filter.
    Filtered(ConsentQuery),
    /// Query returned exactly as the CMP produced it.
    Raw(ConsentQuery),
    /// Show the consent UI, subject to the `hideUi` gate.
    ShowConsentTool,
    /// Any other command, forwarded unchanged.
    Passthrough(String),
}

/// Command name of the consent UI command.
pub const SHOW_CONSENT_TOOL: &str = "showConsentTool";

impl Command {
    /// Map a command name to its variant.
    pub fn parse(name: &str) -> Self {
        if name == SHOW_CONSENT_TOOL {
            return Self::ShowConsentTool;
        }
        for query in ConsentQuery::ALL {
            if name == query.command_name() {
                return Self::Filtered(query);
            }
            if name == query.raw_command_name() {
                return Self::Raw(query);
            }
        }
        Self::Passthrough(name.to_string())
    }

    /// Name the command was (or would be) issued under.
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Filtered(query) => Cow::Borrowed(query.command_name()),
            Self::Raw(query) => Cow::Borrowed(query.raw_command_name()),
            Self::ShowConsentTool => Cow::Borrowed(SHOW_CONSENT_TOOL),
            Self::Passthrough(name) => Cow::Borrowed(name.as_str()),
        }
    }
}

/// Returns true if a show-UI parameter forces display past `hideUi`.
///
/// Accepts `true` or `{ "force": true }`.
pub fn forces_display(parameter: &Value) -> bool {
    match parameter {
        Value::Bool(force) => *force,
        Value::Object(map) => map.get("force").and_then(Value::as_bool).unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_override_table() {
        assert_eq!(
            Command::parse("getVendorList"),
            Command::Filtered(ConsentQuery::VendorList)
        );
        assert_eq!(
            Command::parse("getConsentData"),
            Command::Filtered(ConsentQuery::ConsentData)
        );
        assert_eq!(
            Command::parse("getVendorConsents"),
            Command::Filtered(ConsentQuery::VendorConsents)
        );
        assert_eq!(Command::parse("showConsentTool"), Command::ShowConsentTool);
    }

    #[test]
    fn parses_raw_variants() {
        for query in ConsentQuery::ALL {
            assert_eq!(Command::parse(query.raw_command_name()), Command::Raw(query));
        }
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(
            Command::parse("ping"),
            Command::Passthrough("ping".to_string())
        );
        assert_eq!(
            Command::parse("rawPing"),
            Command::Passthrough("rawPing".to_string())
        );
    }

    #[test]
    fn name_roundtrips_through_parse() {
        for name in ["getVendorList", "rawGetConsentData", "showConsentTool", "ping"] {
            assert_eq!(Command::parse(name).name(), name);
        }
    }

    #[test]
    fn force_flag_shapes() {
        assert!(forces_display(&json!(true)));
        assert!(forces_display(&json!({"force": true})));
        assert!(!forces_display(&json!({"force": "yes"})));
        assert!(!forces_display(&Value::Null));
    }
}
