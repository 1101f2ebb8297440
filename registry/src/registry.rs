use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::command::Command;
use crate::error::{ConsistencyError, StructuralError};
use crate::extension::Extension;
use crate::feature::Feature;
use crate::token::{Token, TokenReader};

lazy_static! {
    /// C spellings of the primitive GL types that the registry's `<types>`
    /// section would otherwise define. These are known up front; the section
    /// itself is skipped during parsing.
    static ref BUILTIN_TYPE_ALIASES: Vec<(&'static str, &'static str)> = vec![
        ("GLboolean", "uint8_t"),
        ("GLchar", "char"),
        ("GLbyte", "int8_t"),
        ("GLubyte", "uint8_t"),
        ("GLshort", "int16_t"),
        ("GLushort", "uint16_t"),
        ("GLenum", "unsigned int"),
        ("GLuint", "unsigned int"),
        ("GLint", "int"),
        ("GLbitfield", "unsigned int"),
        ("GLsizei", "int"),
        ("GLintptr", "intptr_t"),
        ("GLsizeiptr", "intptr_t"),
        ("GLuint64", "uint64_t"),
        ("GLint64", "int64_t"),
        ("GLfloat", "float"),
        ("GLdouble", "double"),
        ("GLsync", "struct __GLsync*"),
    ];
}

/// The recognized top-level children of `<registry>`. Everything else is
/// skipped without effect.
enum RegistryChild {
    Types,
    Enums,
    Commands,
    Feature,
    Extensions,
    Other,
}

impl RegistryChild {
    fn from_tag(name: &str) -> Self {
        match name {
            "types" => RegistryChild::Types,
            "enums" => RegistryChild::Enums,
            "commands" => RegistryChild::Commands,
            Feature::TAG_NAME => RegistryChild::Feature,
            "extensions" => RegistryChild::Extensions,
            _ => RegistryChild::Other,
        }
    }
}

/// The aggregate in-memory model of one registry document.
///
/// Built once by [`parse`](Registry::parse) and read-only from then on, so
/// it can be shared freely across concurrent linking requests.
#[derive(Clone, Debug)]
pub struct Registry {
    /// GL type name → C type spelling, pre-seeded with the primitives.
    pub type_aliases: BTreeMap<String, String>,
    /// Enum name → literal value text (usually hex).
    pub enum_values: BTreeMap<String, String>,
    pub features: BTreeMap<String, Feature>,
    pub extensions: BTreeMap<String, Extension>,
    pub commands: BTreeMap<String, Command>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub const TAG_NAME: &'static str = "registry";

    pub fn new() -> Self {
        let type_aliases = BUILTIN_TYPE_ALIASES
            .iter()
            .map(|(gl, c)| (gl.to_string(), c.to_string()))
            .collect();
        Registry {
            type_aliases,
            enum_values: BTreeMap::new(),
            features: BTreeMap::new(),
            extensions: BTreeMap::new(),
            commands: BTreeMap::new(),
        }
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        type_name == "void" || self.type_aliases.contains_key(type_name)
    }

    /// Checked command lookup; a miss is a consistency error attributed to
    /// `owner` (the feature or extension naming the command).
    pub fn command(&self, owner: &str, name: &str) -> Result<&Command, ConsistencyError> {
        self.commands
            .get(name)
            .ok_or_else(|| ConsistencyError::UnknownCommand {
                owner: owner.to_owned(),
                command: name.to_owned(),
            })
    }

    /// Checked enum-value lookup, same contract as [`command`](Self::command).
    pub fn enum_value(&self, owner: &str, name: &str) -> Result<&str, ConsistencyError> {
        self.enum_values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ConsistencyError::UnknownEnum {
                owner: owner.to_owned(),
                name: name.to_owned(),
            })
    }

    /// Parses a whole document: scans forward to the `<registry>` element
    /// and aggregates its children. Any structural violation aborts the
    /// parse; there is no partial registry.
    pub fn parse(reader: &mut TokenReader) -> Result<Self, StructuralError> {
        loop {
            match reader.advance()? {
                Token::Open(element) if element.name == Self::TAG_NAME => break,
                Token::Open(_) => reader.skip_element()?,
                Token::Eof => return Err(StructuralError::MissingRegistry),
                _ => {}
            }
        }

        let mut registry = Registry::new();
        loop {
            match reader.advance()? {
                Token::Open(child) => match RegistryChild::from_tag(&child.name) {
                    // not parsed beyond skipping; the primitive aliases are
                    // pre-seeded instead
                    RegistryChild::Types => reader.skip_element()?,
                    RegistryChild::Enums => registry.parse_enums(reader)?,
                    RegistryChild::Commands => registry.parse_commands(reader)?,
                    RegistryChild::Feature => {
                        let feature = Feature::parse(reader)?;
                        registry.features.insert(feature.name.clone(), feature);
                    }
                    RegistryChild::Extensions => registry.parse_extensions(reader)?,
                    RegistryChild::Other => reader.skip_element()?,
                },
                Token::Close(close) if close == Self::TAG_NAME => return Ok(registry),
                Token::Eof => {
                    return Err(StructuralError::MissingClose {
                        element: Self::TAG_NAME.to_owned(),
                    })
                }
                _ => {}
            }
        }
    }

    /// Parses one `<enums>` table. A name seen twice silently overwrites
    /// the earlier value.
    fn parse_enums(&mut self, reader: &mut TokenReader) -> Result<(), StructuralError> {
        loop {
            match reader.advance()? {
                Token::Open(child) => match child.name.as_str() {
                    "enum" => {
                        let name = child.require_attribute("name")?;
                        let value = child.require_attribute("value")?;
                        self.enum_values.insert(name, value);
                    }
                    // <unused> ranges and similar bookkeeping
                    _ => reader.skip_element()?,
                },
                Token::Close(close) if close == "enums" => return Ok(()),
                Token::Eof => {
                    return Err(StructuralError::MissingClose {
                        element: "enums".to_owned(),
                    })
                }
                _ => {}
            }
        }
    }

    fn parse_commands(&mut self, reader: &mut TokenReader) -> Result<(), StructuralError> {
        loop {
            match reader.advance()? {
                Token::Open(child) if child.name == Command::TAG_NAME => {
                    let command = Command::parse(reader)?;
                    self.commands
                        .insert(command.prototype.name.clone(), command);
                }
                Token::Open(_) => reader.skip_element()?,
                Token::Close(close) if close == "commands" => return Ok(()),
                Token::Eof => {
                    return Err(StructuralError::MissingClose {
                        element: "commands".to_owned(),
                    })
                }
                _ => {}
            }
        }
    }

    fn parse_extensions(&mut self, reader: &mut TokenReader) -> Result<(), StructuralError> {
        loop {
            match reader.advance()? {
                Token::Open(child) if child.name == Extension::TAG_NAME => {
                    let extension = Extension::parse(reader)?;
                    self.extensions.insert(extension.name.clone(), extension);
                }
                Token::Open(_) => reader.skip_element()?,
                Token::Close(close) if close == "extensions" => return Ok(()),
                Token::Eof => {
                    return Err(StructuralError::MissingClose {
                        element: "extensions".to_owned(),
                    })
                }
                _ => {}
            }
        }
    }
}
