//! Extended attributes (annotations) on interfaces and members.
//!
//! The recognized vocabulary is a closed enum so that code which reacts to
//! an annotation names it exactly once. Anything the parser hands over that
//! is not in the vocabulary lands in an explicit `unrecognized` bucket and is
//! carried through untouched.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A recognized extended attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtendedAttribute {
    ActiveDOMObject,
    CallWith,
    CheckSecurity,
    Conditional,
    Custom,
    DependentLifetime,
    DeprecateAs,
    DoNotCheckConstants,
    DoNotCheckSecurity,
    ImplementedAs,
    /// Provenance tag added to members merged in from a dependency.
    ImplementedBy,
    /// Dependency members are implemented on the target's own class.
    LegacyImplementedInBaseClass,
    PerContextEnabled,
    RaisesException,
    Reflect,
    Replaceable,
    RuntimeEnabled,
    StrictTypeChecking,
    TreatNullAs,
}

impl ExtendedAttribute {
    /// Every recognized attribute, in declaration order.
    pub const ALL: [ExtendedAttribute; 19] = [
        ExtendedAttribute::ActiveDOMObject,
        ExtendedAttribute::CallWith,
        ExtendedAttribute::CheckSecurity,
        ExtendedAttribute::Conditional,
        ExtendedAttribute::Custom,
        ExtendedAttribute::DependentLifetime,
        ExtendedAttribute::DeprecateAs,
        ExtendedAttribute::DoNotCheckConstants,
        ExtendedAttribute::DoNotCheckSecurity,
        ExtendedAttribute::ImplementedAs,
        ExtendedAttribute::ImplementedBy,
        ExtendedAttribute::LegacyImplementedInBaseClass,
        ExtendedAttribute::PerContextEnabled,
        ExtendedAttribute::RaisesException,
        ExtendedAttribute::Reflect,
        ExtendedAttribute::Replaceable,
        ExtendedAttribute::RuntimeEnabled,
        ExtendedAttribute::StrictTypeChecking,
        ExtendedAttribute::TreatNullAs,
    ];

    /// The attribute's spelling in declaration files.
    pub fn as_str(self) -> &'static str {
        match self {
            ExtendedAttribute::ActiveDOMObject => "ActiveDOMObject",
            ExtendedAttribute::CallWith => "CallWith",
            ExtendedAttribute::CheckSecurity => "CheckSecurity",
            ExtendedAttribute::Conditional => "Conditional",
            ExtendedAttribute::Custom => "Custom",
            ExtendedAttribute::DependentLifetime => "DependentLifetime",
            ExtendedAttribute::DeprecateAs => "DeprecateAs",
            ExtendedAttribute::DoNotCheckConstants => "DoNotCheckConstants",
            ExtendedAttribute::DoNotCheckSecurity => "DoNotCheckSecurity",
            ExtendedAttribute::ImplementedAs => "ImplementedAs",
            ExtendedAttribute::ImplementedBy => "ImplementedBy",
            ExtendedAttribute::LegacyImplementedInBaseClass => "LegacyImplementedInBaseClass",
            ExtendedAttribute::PerContextEnabled => "PerContextEnabled",
            ExtendedAttribute::RaisesException => "RaisesException",
            ExtendedAttribute::Reflect => "Reflect",
            ExtendedAttribute::Replaceable => "Replaceable",
            ExtendedAttribute::RuntimeEnabled => "RuntimeEnabled",
            ExtendedAttribute::StrictTypeChecking => "StrictTypeChecking",
            ExtendedAttribute::TreatNullAs => "TreatNullAs",
        }
    }

    /// Look up a recognized attribute by its spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.as_str() == name)
    }
}

impl fmt::Display for ExtendedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value of an extended attribute.
///
/// `[Custom]` is a bare presence flag; `[ImplementedAs=Foo]` carries a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAttributeValue", into = "RawAttributeValue")]
pub enum AttributeValue {
    Present,
    Value(String),
}

impl AttributeValue {
    /// Build a valued attribute.
    pub fn value(value: impl Into<String>) -> Self {
        AttributeValue::Value(value.into())
    }

    /// The attribute's value, if it carries one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Present => None,
            AttributeValue::Value(value) => Some(value),
        }
    }
}

/// Wire form: `true` for presence, a string for a value.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawAttributeValue {
    Flag(bool),
    Text(String),
}

impl TryFrom<RawAttributeValue> for AttributeValue {
    type Error = String;

    fn try_from(raw: RawAttributeValue) -> Result<Self, Self::Error> {
        match raw {
            RawAttributeValue::Flag(true) => Ok(AttributeValue::Present),
            RawAttributeValue::Flag(false) => {
                Err("presence-only extended attributes must be `true`".to_string())
            }
            RawAttributeValue::Text(value) => Ok(AttributeValue::Value(value)),
        }
    }
}

impl From<AttributeValue> for RawAttributeValue {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Present => RawAttributeValue::Flag(true),
            AttributeValue::Value(value) => RawAttributeValue::Text(value),
        }
    }
}

/// Extended attributes attached to an interface or a member.
///
/// Serializes as one flat object sorted by attribute name, so two equal
/// attribute sets always produce identical output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, AttributeValue>",
    into = "BTreeMap<String, AttributeValue>"
)]
pub struct ExtendedAttributes {
    known: BTreeMap<ExtendedAttribute, AttributeValue>,
    unrecognized: BTreeMap<String, AttributeValue>,
}

impl ExtendedAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: ExtendedAttribute, value: AttributeValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: ExtendedAttribute) -> Option<&AttributeValue> {
        self.known.get(&key)
    }

    /// The string value of `key`, if present and valued.
    pub fn value_of(&self, key: ExtendedAttribute) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }

    pub fn contains(&self, key: ExtendedAttribute) -> bool {
        self.known.contains_key(&key)
    }

    /// Set `key`, returning the value it replaced.
    pub fn insert(&mut self, key: ExtendedAttribute, value: AttributeValue) -> Option<AttributeValue> {
        self.known.insert(key, value)
    }

    /// Set `key` only if it is not already present. Returns whether it was set.
    pub fn insert_if_absent(&mut self, key: ExtendedAttribute, value: AttributeValue) -> bool {
        if self.known.contains_key(&key) {
            return false;
        }
        self.known.insert(key, value);
        true
    }

    pub fn remove(&mut self, key: ExtendedAttribute) -> Option<AttributeValue> {
        self.known.remove(&key)
    }

    /// Record an attribute by spelling, routing unknown names to the
    /// unrecognized bucket.
    pub fn insert_named(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        match ExtendedAttribute::from_name(&name) {
            Some(key) => {
                self.known.insert(key, value);
            }
            None => {
                self.unrecognized.insert(name, value);
            }
        }
    }

    /// Recognized attributes, in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (ExtendedAttribute, &AttributeValue)> {
        self.known.iter().map(|(key, value)| (*key, value))
    }

    /// Attributes outside the recognized vocabulary.
    pub fn unrecognized(&self) -> &BTreeMap<String, AttributeValue> {
        &self.unrecognized
    }

    pub fn len(&self) -> usize {
        self.known.len() + self.unrecognized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.unrecognized.is_empty()
    }

    /// The subset of recognized attributes whose key is in `keys`.
    pub fn restricted_to(&self, keys: &[ExtendedAttribute]) -> ExtendedAttributes {
        let known = self
            .known
            .iter()
            .filter(|(key, _)| keys.contains(*key))
            .map(|(key, value)| (*key, value.clone()))
            .collect();
        ExtendedAttributes {
            known,
            unrecognized: BTreeMap::new(),
        }
    }

    /// Copy every attribute of `other` that is not already set here.
    pub fn extend_absent(&mut self, other: &ExtendedAttributes) {
        for (key, value) in &other.known {
            self.known.entry(*key).or_insert_with(|| value.clone());
        }
        for (name, value) in &other.unrecognized {
            self.unrecognized
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

impl From<BTreeMap<String, AttributeValue>> for ExtendedAttributes {
    fn from(flat: BTreeMap<String, AttributeValue>) -> Self {
        let mut attributes = ExtendedAttributes::new();
        for (name, value) in flat {
            attributes.insert_named(name, value);
        }
        attributes
    }
}

impl From<ExtendedAttributes> for BTreeMap<String, AttributeValue> {
    fn from(attributes: ExtendedAttributes) -> Self {
        let mut flat = attributes.unrecognized;
        flat.extend(
            attributes
                .known
                .into_iter()
                .map(|(key, value)| (key.as_str().to_string(), value)),
        );
        flat
    }
}

impl FromIterator<(ExtendedAttribute, AttributeValue)> for ExtendedAttributes {
    fn from_iter<I: IntoIterator<Item = (ExtendedAttribute, AttributeValue)>>(iter: I) -> Self {
        let mut attributes = ExtendedAttributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_names_go_to_unrecognized_bucket() {
        let mut attrs = ExtendedAttributes::new();
        attrs.insert_named("Conditional", AttributeValue::value("WEB_AUDIO"));
        attrs.insert_named("SomeFutureThing", AttributeValue::Present);

        assert_eq!(attrs.value_of(ExtendedAttribute::Conditional), Some("WEB_AUDIO"));
        assert!(attrs.unrecognized().contains_key("SomeFutureThing"));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_insert_if_absent_keeps_existing_value() {
        let mut attrs = ExtendedAttributes::new()
            .with(ExtendedAttribute::RuntimeEnabled, AttributeValue::value("Local"));

        assert!(!attrs.insert_if_absent(ExtendedAttribute::RuntimeEnabled, AttributeValue::value("Other")));
        assert_eq!(attrs.value_of(ExtendedAttribute::RuntimeEnabled), Some("Local"));
        assert!(attrs.insert_if_absent(ExtendedAttribute::Conditional, AttributeValue::value("X")));
    }

    #[test]
    fn test_restricted_to_drops_everything_else() {
        let mut attrs = ExtendedAttributes::new()
            .with(ExtendedAttribute::Conditional, AttributeValue::value("A"))
            .with(ExtendedAttribute::CheckSecurity, AttributeValue::Present);
        attrs.insert_named("Unknown", AttributeValue::Present);

        let subset = attrs.restricted_to(&[ExtendedAttribute::Conditional]);
        assert_eq!(subset.len(), 1);
        assert!(subset.contains(ExtendedAttribute::Conditional));
    }

    #[test]
    fn test_json_form_is_flat_and_sorted() {
        let mut attrs = ExtendedAttributes::new()
            .with(ExtendedAttribute::RuntimeEnabled, AttributeValue::value("Feature"))
            .with(ExtendedAttribute::Custom, AttributeValue::Present);
        attrs.insert_named("Apple", AttributeValue::value("x"));

        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"Apple":"x","Custom":true,"RuntimeEnabled":"Feature"}"#);

        let back: ExtendedAttributes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attrs);
    }

    #[test]
    fn test_false_presence_is_rejected() {
        let result: Result<ExtendedAttributes, _> = serde_json::from_str(r#"{"Custom":false}"#);
        assert!(result.is_err());
    }
}
