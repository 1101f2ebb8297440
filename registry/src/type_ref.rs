use std::fmt;

use crate::error::StructuralError;
use crate::token::{Token, TokenReader};

/// A parsed type mention such as `const GLuint *`.
///
/// Only the restricted subset of C type syntax used by the registry is
/// modeled: an optional `const` qualifier, a base name, and up to two
/// levels of pointer indirection. `is_pointer_to_pointer` implies
/// `is_pointer`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    pub is_const: bool,
    pub base_name: String,
    pub is_pointer: bool,
    pub is_pointer_to_pointer: bool,
}

impl TypeRef {
    pub const TAG_NAME: &'static str = "ptype";

    /// Parses a type at the cursor. Two shapes occur in the document:
    ///
    /// - the whole type is bare interleaved text (`void <name>`,
    ///   `const void *<name>`), or
    /// - the type name sits in a `<ptype>` element while the `const`
    ///   qualifier and pointer stars remain as surrounding bare text
    ///   (`const <ptype>GLuint</ptype> *<name>`).
    ///
    /// Leaves the cursor on the first token following the type, which for
    /// well-formed prototypes and parameters is the open token of the
    /// `<name>` element.
    pub(crate) fn parse(reader: &mut TokenReader) -> Result<Self, StructuralError> {
        let mut text = String::new();

        if let Token::Text(chunk) = reader.current() {
            text.push_str(chunk);
            reader.advance()?;
        }

        if matches!(reader.current(), Token::Open(element) if element.name == Self::TAG_NAME) {
            text.push_str(&reader.element_text()?);
            reader.advance()?;
            // trailing bare text carries the pointer stars
            while let Token::Text(chunk) = reader.current() {
                text.push_str(chunk);
                reader.advance()?;
            }
        }

        Self::from_text(&text).ok_or(StructuralError::ExpectedType {
            offset: reader.position(),
        })
    }

    /// Decomposes the accumulated type text. The document always writes the
    /// `const` qualifier ahead of the base name and the pointer stars after
    /// it, so the prefix is stripped before the suffix.
    fn from_text(text: &str) -> Option<Self> {
        let mut rest = text;
        let is_const = rest.starts_with("const ");
        if is_const {
            rest = &rest["const ".len()..];
        }
        let mut is_pointer = false;
        let mut is_pointer_to_pointer = false;
        if let Some(stripped) = rest.strip_suffix('*') {
            is_pointer = true;
            rest = stripped;
        }
        if let Some(stripped) = rest.strip_suffix('*') {
            is_pointer_to_pointer = true;
            rest = stripped;
        }
        let base_name = rest.trim();
        if base_name.is_empty() {
            return None;
        }
        Some(TypeRef {
            is_const,
            base_name: base_name.to_owned(),
            is_pointer,
            is_pointer_to_pointer,
        })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        write!(f, "{}", self.base_name)?;
        if self.is_pointer {
            write!(f, "*")?;
        }
        if self.is_pointer_to_pointer {
            write!(f, "*")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parses `content` as it would appear inside a `<proto>` or `<param>`
    /// element, ahead of the `<name>` child.
    fn parse(content: &str) -> TypeRef {
        let document = format!("<param>{content}<name>x</name></param>");
        let mut reader = TokenReader::new(&document);
        reader.advance().unwrap(); // <param>
        reader.advance().unwrap(); // first token of the type
        let type_ = TypeRef::parse(&mut reader).unwrap();
        // the cursor must have stopped on <name>
        assert!(matches!(reader.current(), Token::Open(e) if e.name == "name"));
        type_
    }

    fn strip_whitespace(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn bare_void() {
        let type_ = parse("void ");
        assert_eq!(type_.base_name, "void");
        assert!(!type_.is_const && !type_.is_pointer && !type_.is_pointer_to_pointer);
    }

    #[test]
    fn wrapped_name() {
        let type_ = parse("<ptype>GLenum</ptype> ");
        assert_eq!(type_.base_name, "GLenum");
        assert!(!type_.is_const && !type_.is_pointer);
    }

    #[test]
    fn const_wrapped_pointer() {
        let type_ = parse("const <ptype>GLuint</ptype> *");
        assert!(type_.is_const);
        assert_eq!(type_.base_name, "GLuint");
        assert!(type_.is_pointer);
        assert!(!type_.is_pointer_to_pointer);
    }

    #[test]
    fn bare_const_void_pointer() {
        let type_ = parse("const void *");
        assert!(type_.is_const);
        assert_eq!(type_.base_name, "void");
        assert!(type_.is_pointer);
        assert!(!type_.is_pointer_to_pointer);
    }

    #[test]
    fn pointer_to_pointer() {
        let type_ = parse("<ptype>GLfloat</ptype> **");
        assert_eq!(type_.base_name, "GLfloat");
        assert!(type_.is_pointer);
        assert!(type_.is_pointer_to_pointer);
    }

    #[test]
    fn display_round_trips_modulo_whitespace() {
        for source in [
            "void",
            "GLenum",
            "const GLuint *",
            "const void *",
            "GLfloat **",
        ] {
            let type_ = TypeRef::from_text(source).unwrap();
            assert_eq!(
                strip_whitespace(&type_.to_string()),
                strip_whitespace(source),
                "round trip failed for {source:?}"
            );
        }
    }

    #[test]
    fn empty_type_is_rejected() {
        assert!(TypeRef::from_text("  ").is_none());
        assert!(TypeRef::from_text("*").is_none());
    }
}
