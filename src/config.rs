//! Parser configuration.
//!
//! Annotation keywords are plain identifiers the header author places in
//! front of the declarations that should be exported. Enum, class,
//! constructor and namespace annotations use a single keyword each; function,
//! property and free-standing macro annotations accept several aliases.

use serde::{Deserialize, Serialize};

/// Annotation keywords recognized by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Keyword placed in front of an exported `enum`.
    pub enum_keyword: String,
    /// Keyword placed in front of an exported `class` or `struct`.
    pub class_keyword: String,
    /// Keyword placed in front of an exported constructor.
    pub constructor_keyword: String,
    /// Keyword placed in front of an annotated `namespace`.
    pub namespace_keyword: String,
    /// Keywords placed in front of exported functions.
    pub function_keywords: Vec<String>,
    /// Keywords placed in front of exported data members.
    pub property_keywords: Vec<String>,
    /// Free-standing marker macros, recorded with their meta block only.
    pub custom_keywords: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            enum_keyword: "ENUM".to_string(),
            class_keyword: "CLASS".to_string(),
            constructor_keyword: "CONSTRUCTOR".to_string(),
            namespace_keyword: "NAMESPACE".to_string(),
            function_keywords: vec!["FUNCTION".to_string()],
            property_keywords: vec!["PROPERTY".to_string()],
            custom_keywords: Vec::new(),
        }
    }
}

impl Options {
    /// Create options with the default keywords.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON document. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Set the enum keyword.
    pub fn enum_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.enum_keyword = keyword.into();
        self
    }

    /// Set the class keyword.
    pub fn class_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.class_keyword = keyword.into();
        self
    }

    pub fn constructor_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.constructor_keyword = keyword.into();
        self
    }

    pub fn namespace_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.namespace_keyword = keyword.into();
        self
    }

    /// Add a function keyword alias.
    pub fn function_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.function_keywords.push(keyword.into());
        self
    }

    /// Add a property keyword alias.
    pub fn property_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.property_keywords.push(keyword.into());
        self
    }

    /// Add a free-standing marker macro.
    pub fn custom_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.custom_keywords.push(keyword.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.enum_keyword, "ENUM");
        assert_eq!(options.class_keyword, "CLASS");
        assert_eq!(options.function_keywords, vec!["FUNCTION"]);
        assert!(options.custom_keywords.is_empty());
    }

    #[test]
    fn test_builder_appends_aliases() {
        let options = Options::new()
            .class_keyword("LUA_CLASS")
            .function_keyword("LUA_FUNCTION")
            .custom_keyword("LUA_MODULE");
        assert_eq!(options.class_keyword, "LUA_CLASS");
        assert_eq!(options.function_keywords, vec!["FUNCTION", "LUA_FUNCTION"]);
        assert_eq!(options.custom_keywords, vec!["LUA_MODULE"]);
    }

    #[test]
    fn test_from_json_keeps_missing_defaults() {
        let options = Options::from_json(
            r#"{ "enum_keyword": "LUA_ENUM", "property_keywords": ["GET", "SET"] }"#,
        )
        .unwrap();
        assert_eq!(options.enum_keyword, "LUA_ENUM");
        assert_eq!(options.property_keywords, vec!["GET", "SET"]);
        assert_eq!(options.class_keyword, "CLASS");
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        assert!(Options::from_json(r#"{ "function_keywords": "F" }"#).is_err());
    }
}
