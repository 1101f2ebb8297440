use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// The token stream did not match the registry grammar at the current
/// position. Always fatal: the parser never backtracks and never exposes a
/// partially built registry.
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("malformed document at byte {offset}: {source}")]
    Xml {
        offset: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("malformed attribute at byte {offset}: {source}")]
    Attribute {
        offset: u64,
        #[source]
        source: AttrError,
    },
    #[error("expected {expected} at byte {offset}, found {found}")]
    ExpectedElement {
        expected: &'static str,
        found: String,
        offset: u64,
    },
    #[error("expected character data inside <{element}> at byte {offset}")]
    ExpectedCharacters { element: String, offset: u64 },
    #[error("expected a type name at byte {offset}")]
    ExpectedType { offset: u64 },
    #[error("missing </{element}> before end of document")]
    MissingClose { element: String },
    #[error("missing attribute {attribute:?} on <{element}> at byte {offset}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
        offset: u64,
    },
    #[error(
        "feature {feature:?} has malformed version number {number:?} \
         (expected MAJOR.MINOR with single digits)"
    )]
    InvalidVersionNumber { feature: String, number: String },
    #[error("<command> closed at byte {offset} without a <proto> child")]
    MissingPrototype { offset: u64 },
    #[error("document contains no <registry> element")]
    MissingRegistry,
}

/// A parsed cross-reference points at a name the registry never defines, or
/// two definitions collide in a way the version ordering cannot resolve.
/// Detected when the reference is used, not at parse time; the registry does
/// not validate referential integrity eagerly.
#[derive(Debug, Error)]
pub enum ConsistencyError {
    #[error("{owner} references undefined command {command:?}")]
    UnknownCommand { owner: String, command: String },
    #[error("{owner} references undefined enum {name:?}")]
    UnknownEnum { owner: String, name: String },
    #[error("api {api:?} declares features {first:?} and {second:?} with the same number {number}")]
    DuplicateVersion {
        api: String,
        first: String,
        second: String,
        number: String,
    },
}
