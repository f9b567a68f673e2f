//! Embedded schema documents.

/// A vendor list (global, publisher or custom).
pub const VENDOR_LIST: &str = r##"{
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "type": "object",
    "properties": {
        "vendorListVersion": { "type": "integer", "minimum": 0 },
        "lastUpdated": { "type": "string" },
        "purposes": { "type": "array" },
        "features": { "type": "array" },
        "vendors": {
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "minimum": 0 },
                    "name": { "type": "string" },
                    "policyUrl": { "type": "string" },
                    "purposeIds": { "$ref": "#/$defs/ids" },
                    "legIntPurposeIds": { "$ref": "#/$defs/ids" },
                    "featureIds": { "$ref": "#/$defs/ids" },
                    "deletedDate": { "type": "string" }
                },
                "required": ["id"]
            }
        }
    },
    "required": ["vendors"],
    "$defs": {
        "ids": {
            "type": "array",
            "items": { "type": "integer", "minimum": 0 }
        }
    }
}"##;

/// The page-supplied proxy configuration.
pub const CONFIG: &str = r##"{
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "type": "object",
    "properties": {
        "useBuiltInVendorList": { "type": "boolean" },
        "pubVendorList": { "type": "object" },
        "legitimateInterest": { "enum": ["hard", "soft"] },
        "customVendors": { "type": "object" },
        "injectInSmartTags": { "type": "boolean" },
        "deferDfpLoading": { "type": "boolean" },
        "syncCxenseConsent": { "type": "boolean" },
        "hideUi": { "type": "boolean" },
        "knownVendorsCookie": { "type": "string", "minLength": 1 },
        "ensightenMapping": {
            "type": "object",
            "additionalProperties": {
                "type": "object",
                "properties": {
                    "purposes": {
                        "type": "array",
                        "items": { "type": "integer", "minimum": 0 }
                    }
                },
                "required": ["purposes"]
            }
        }
    }
}"##;

/// An inbound cross-frame call envelope.
pub const CMP_CALL: &str = r##"{
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "type": "object",
    "properties": {
        "__cmpCall": {
            "type": "object",
            "properties": {
                "callId": { "type": ["string", "number"] },
                "command": { "type": "string", "minLength": 1 },
                "parameter": {}
            },
            "required": ["command"]
        }
    },
    "required": ["__cmpCall"]
}"##;
