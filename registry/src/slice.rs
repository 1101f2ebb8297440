use std::collections::BTreeSet;

use crate::error::StructuralError;
use crate::token::{Token, TokenReader};

/// A bag of type/enum/command name references, optionally restricted to a
/// named profile. References only; the definitions stay in the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiSlice {
    /// `None` applies to every profile.
    pub profile: Option<String>,
    pub types: BTreeSet<String>,
    pub enums: BTreeSet<String>,
    pub commands: BTreeSet<String>,
}

impl ApiSlice {
    pub const REQUIRE_TAG: &'static str = "require";
    pub const REMOVE_TAG: &'static str = "remove";

    pub fn with_profile(profile: Option<String>) -> Self {
        ApiSlice {
            profile,
            ..ApiSlice::default()
        }
    }

    /// Whether this block applies when resolving the given profile. A block
    /// without a profile applies to all of them.
    pub fn applies_to(&self, profile: &str) -> bool {
        match self.profile.as_deref() {
            None => true,
            Some(own) => own == profile,
        }
    }

    /// Union with `other`. Type names already present keep their first
    /// writer; enums and commands are a plain set union.
    pub fn add_all(&mut self, other: &ApiSlice) {
        for type_name in &other.types {
            if !self.types.contains(type_name) {
                self.types.insert(type_name.clone());
            }
        }
        self.enums.extend(other.enums.iter().cloned());
        self.commands.extend(other.commands.iter().cloned());
    }

    /// Set difference on all three fields independently.
    pub fn remove_all(&mut self, other: &ApiSlice) {
        self.types.retain(|name| !other.types.contains(name));
        self.enums.retain(|name| !other.enums.contains(name));
        self.commands.retain(|name| !other.commands.contains(name));
    }

    /// Parses a `<require>` or `<remove>` block; `tag` picks which of the
    /// two. The grandchildren all have the same shape, an element carrying a
    /// `name` attribute.
    pub(crate) fn parse(
        reader: &mut TokenReader,
        tag: &'static str,
    ) -> Result<Self, StructuralError> {
        let element = reader.expect_open(tag)?;
        let mut slice = ApiSlice::with_profile(element.attribute("profile").map(str::to_owned));

        loop {
            match reader.advance()? {
                Token::Open(child) => match child.name.as_str() {
                    "enum" => {
                        slice.enums.insert(child.require_attribute("name")?);
                    }
                    "type" => {
                        let name = child.require_attribute("name")?;
                        if !slice.types.contains(&name) {
                            slice.types.insert(name);
                        }
                    }
                    "command" => {
                        slice.commands.insert(child.require_attribute("name")?);
                    }
                    _ => reader.skip_element()?,
                },
                Token::Close(close) if close == tag => return Ok(slice),
                Token::Eof => {
                    return Err(StructuralError::MissingClose {
                        element: tag.to_owned(),
                    })
                }
                _ => {}
            }
        }
    }
}
