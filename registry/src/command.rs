use crate::error::StructuralError;
use crate::token::{Token, TokenReader};
use crate::type_ref::TypeRef;

/// A command's return type and name.
#[derive(Clone, Debug)]
pub struct Prototype {
    pub return_type: TypeRef,
    pub name: String,
}

impl Prototype {
    pub const TAG_NAME: &'static str = "proto";

    pub(crate) fn parse(reader: &mut TokenReader) -> Result<Self, StructuralError> {
        reader.expect_open(Self::TAG_NAME)?;
        reader.advance()?;

        let return_type = TypeRef::parse(reader)?;

        reader.expect_open("name")?;
        let name = reader.element_text()?;

        // consume anything left before </proto>
        loop {
            match reader.advance()? {
                Token::Close(close) if close == Self::TAG_NAME => break,
                Token::Eof => {
                    return Err(StructuralError::MissingClose {
                        element: Self::TAG_NAME.to_owned(),
                    })
                }
                _ => {}
            }
        }

        Ok(Prototype { return_type, name })
    }
}

/// One parameter of a command.
///
/// `length_ref` names another parameter whose value gives this parameter's
/// element count; it is carried verbatim, never resolved here.
#[derive(Clone, Debug)]
pub struct Parameter {
    pub type_: TypeRef,
    pub name: String,
    pub length_ref: Option<String>,
    pub group: Option<String>,
    pub kind: Option<String>,
}

impl Parameter {
    pub const TAG_NAME: &'static str = "param";

    pub(crate) fn parse(reader: &mut TokenReader) -> Result<Self, StructuralError> {
        let element = reader.expect_open(Self::TAG_NAME)?;
        let length_ref = element.attribute("len").map(str::to_owned);
        let group = element.attribute("group").map(str::to_owned);
        let kind = element.attribute("kind").map(str::to_owned);

        reader.advance()?;
        let type_ = TypeRef::parse(reader)?;

        reader.expect_open("name")?;
        let name = reader.element_text()?;

        loop {
            match reader.advance()? {
                Token::Close(close) if close == Self::TAG_NAME => {
                    return Ok(Parameter {
                        type_,
                        name,
                        length_ref,
                        group,
                        kind,
                    })
                }
                Token::Eof => {
                    return Err(StructuralError::MissingClose {
                        element: Self::TAG_NAME.to_owned(),
                    })
                }
                _ => {}
            }
        }
    }
}

/// A function definition: prototype plus parameters in document order.
/// Its identity within a registry is the prototype name.
#[derive(Clone, Debug)]
pub struct Command {
    pub prototype: Prototype,
    pub parameters: Vec<Parameter>,
}

impl Command {
    pub const TAG_NAME: &'static str = "command";

    pub(crate) fn parse(reader: &mut TokenReader) -> Result<Self, StructuralError> {
        reader.expect_open(Self::TAG_NAME)?;

        let mut prototype = None;
        let mut parameters = Vec::new();
        loop {
            match reader.advance()? {
                Token::Open(child) => match child.name.as_str() {
                    Prototype::TAG_NAME => prototype = Some(Prototype::parse(reader)?),
                    Parameter::TAG_NAME => parameters.push(Parameter::parse(reader)?),
                    // <glx>, <alias>, <vecequiv> and friends carry no
                    // information this model tracks
                    _ => reader.skip_element()?,
                },
                Token::Close(close) if close == Self::TAG_NAME => break,
                Token::Eof => {
                    return Err(StructuralError::MissingClose {
                        element: Self::TAG_NAME.to_owned(),
                    })
                }
                _ => {}
            }
        }

        let prototype = prototype.ok_or(StructuralError::MissingPrototype {
            offset: reader.position(),
        })?;
        Ok(Command {
            prototype,
            parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_command(document: &str) -> Result<Command, StructuralError> {
        let mut reader = TokenReader::new(document);
        reader.advance()?;
        Command::parse(&mut reader)
    }

    #[test]
    fn parses_prototype_and_parameters_in_order() {
        let command = parse_command(
            r#"<command>
                <proto>void <name>glAccum</name></proto>
                <param group="AccumOp"><ptype>GLenum</ptype> <name>op</name></param>
                <param kind="Coord"><ptype>GLfloat</ptype> <name>value</name></param>
                <glx type="render" opcode="137"/>
            </command>"#,
        )
        .unwrap();

        assert_eq!(command.prototype.name, "glAccum");
        assert_eq!(command.prototype.return_type.base_name, "void");
        assert_eq!(command.parameters.len(), 2);
        assert_eq!(command.parameters[0].name, "op");
        assert_eq!(command.parameters[0].group.as_deref(), Some("AccumOp"));
        assert_eq!(command.parameters[1].name, "value");
        assert_eq!(command.parameters[1].kind.as_deref(), Some("Coord"));
    }

    #[test]
    fn carries_length_reference() {
        let command = parse_command(
            r#"<command>
                <proto>void <name>glDeleteProgramsNV</name></proto>
                <param><ptype>GLsizei</ptype> <name>n</name></param>
                <param len="n">const <ptype>GLuint</ptype> *<name>programs</name></param>
            </command>"#,
        )
        .unwrap();

        let programs = &command.parameters[1];
        assert_eq!(programs.length_ref.as_deref(), Some("n"));
        assert!(programs.type_.is_const);
        assert!(programs.type_.is_pointer);
    }

    #[test]
    fn prototype_without_name_element_fails() {
        let error = parse_command("<command><proto>void </proto></command>").unwrap_err();
        assert!(matches!(error, StructuralError::ExpectedElement { expected: "name", .. }));
    }

    #[test]
    fn command_without_prototype_fails() {
        let error = parse_command("<command></command>").unwrap_err();
        assert!(matches!(error, StructuralError::MissingPrototype { .. }));
    }

    #[test]
    fn unterminated_command_fails() {
        let mut reader = TokenReader::new("<command><proto>void <name>glFlush</name></proto>");
        reader.advance().unwrap();
        // surfaces either as a missing close or as a malformed-document
        // error from the underlying reader, but never succeeds
        assert!(Command::parse(&mut reader).is_err());
    }
}
