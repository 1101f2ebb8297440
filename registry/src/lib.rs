pub mod command;
pub mod error;
pub mod extension;
pub mod feature;
pub mod link;
pub mod registry;
pub mod slice;
pub mod token;
pub mod type_ref;

pub use command::{Command, Parameter, Prototype};
pub use error::{ConsistencyError, StructuralError};
pub use extension::Extension;
pub use feature::Feature;
pub use link::{link, Api, ApiExtension, ApiVersion, VersionChain};
pub use registry::Registry;
pub use slice::ApiSlice;
pub use token::{Element, Token, TokenReader};
pub use type_ref::TypeRef;

/// Parses a whole registry document into its in-memory model. The result
/// is immutable; hand it to [`link`] to compute per-version symbol sets.
pub fn parse_registry(document: &str) -> Result<Registry, StructuralError> {
    let mut reader = TokenReader::new(document);
    Registry::parse(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    // the scenario the whole pipeline exists for: parse a document, link
    // it, and check that re-listed symbols end up in exactly one version
    #[test]
    fn parse_then_link() {
        let registry = parse_registry(
            r#"<registry>
                <enums>
                    <enum value="0x0001" name="E1"/>
                    <enum value="0x0002" name="E2"/>
                </enums>
                <commands>
                    <command><proto>void <name>cA</name></proto></command>
                    <command><proto>void <name>cB</name></proto></command>
                </commands>
                <feature api="gl" name="V1_0" number="1.0">
                    <require><enum name="E1"/><command name="cA"/></require>
                </feature>
                <feature api="gl" name="V1_1" number="1.1">
                    <require>
                        <enum name="E1"/><enum name="E2"/>
                        <command name="cA"/><command name="cB"/>
                    </require>
                </feature>
            </registry>"#,
        )
        .unwrap();

        let apis = link(&registry).unwrap();
        let chain = apis["gl"].link_version("1.1", "core").unwrap();

        assert_eq!(chain.versions[0].feature.name, "V1_0");
        assert!(chain.versions[0].profile.enums.contains("E1"));
        assert!(chain.versions[0].profile.commands.contains("cA"));
        assert!(!chain.versions[1].profile.enums.contains("E1"));
        assert!(chain.versions[1].profile.enums.contains("E2"));
        assert!(chain.versions[1].profile.commands.contains("cB"));
    }
}
