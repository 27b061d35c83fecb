//! Test fixtures and constants.

/// Private key held by the plain test backend.
pub const PLAIN_KEY: &str = "0xDEADBEEF";

/// Public-only key known to the plain test backend.
pub const PLAIN_TEAMMATE_KEY: &str = "0xFEEDBEEF";

/// A key the plain backend cannot resolve.
pub const UNKNOWN_KEY: &str = "0xC0FFEE";

/// A structured document that must survive byte for byte.
pub const JSON_SECRET: &str = r#"Password: SECRET
--
glossary": {
    "title": "example glossary",
    "GlossDiv": {
        "title": "S",
        "GlossList": {
            "GlossEntry": {
                "ID": "SGML",
                "SortAs": "SGML",
                "GlossTerm": "Standard Generalized Markup Language",
                "Acronym": "SGML",
                "Abbrev": "ISO 8879:1986",
                "GlossDef": {
                    "para": "A meta-markup language, used to create markup languages such as DocBook.",
                    "GlossSeeAlso": ["GML", "XML"]
                },
                "GlossSee": "markup"
            }
        }
    }
}"#;

/// Duplicate keys and free text mixed with attributes.
pub const MULTIKEY_SECRET: &str = "thepassword\nuser: a user\nweb: test.com\nuser: second user";

/// YAML section with an octal-looking value.
pub const YAML_OCTAL_SECRET: &str = "yamltest\n---\nuser: 0123";

/// YAML section with a colon line that is not a mapping.
pub const KV_WITH_SPACE_SECRET: &str = "somepasswd\n---\nTest / test.com\nuser:myuser\nurl: test.com/";
