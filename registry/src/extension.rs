use crate::error::StructuralError;
use crate::slice::ApiSlice;
use crate::token::{Token, TokenReader};

/// A vendor or group addendum of symbols usable alongside a base version.
///
/// Extensions are purely additive: only `require` blocks are modeled, and
/// anything else inside the element is skipped.
#[derive(Clone, Debug)]
pub struct Extension {
    pub name: String,
    /// Pipe-delimited list of api names the extension is written against,
    /// e.g. `gles1|gles2`.
    pub supported: String,
    pub requires: Vec<ApiSlice>,
}

impl Extension {
    pub const TAG_NAME: &'static str = "extension";

    /// Exact membership test against the pipe-delimited `supported` list.
    pub fn supports_api(&self, api: &str) -> bool {
        self.supported.split('|').any(|entry| entry == api)
    }

    pub(crate) fn parse(reader: &mut TokenReader) -> Result<Self, StructuralError> {
        let element = reader.expect_open(Self::TAG_NAME)?;
        let name = element.require_attribute("name")?;
        let supported = element.require_attribute("supported")?;

        let mut requires = Vec::new();
        loop {
            match reader.advance()? {
                Token::Open(child) if child.name == ApiSlice::REQUIRE_TAG => {
                    requires.push(ApiSlice::parse(reader, ApiSlice::REQUIRE_TAG)?)
                }
                Token::Open(_) => reader.skip_element()?,
                Token::Close(close) if close == Self::TAG_NAME => {
                    return Ok(Extension {
                        name,
                        supported,
                        requires,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_exact_within_pipe_list() {
        let extension = Extension {
            name: "GL_QCOM_tiled_rendering".to_owned(),
            supported: "gles1|gles2".to_owned(),
            requires: Vec::new(),
        };
        assert!(extension.supports_api("gles1"));
        assert!(extension.supports_api("gles2"));
        assert!(!extension.supports_api("gl"));
        assert!(!extension.supports_api("gles"));
    }

    #[test]
    fn parses_extension_with_profiled_requires() {
        let document = r#"<extension name="GL_ARB_draw_indirect" supported="gl|glcore">
            <require>
                <enum name="GL_DRAW_INDIRECT_BUFFER"/>
                <command name="glDrawArraysIndirect"/>
            </require>
            <require profile="compatibility">
                <command name="glDrawElementsIndirect"/>
            </require>
        </extension>"#;
        let mut reader = TokenReader::new(document);
        reader.advance().unwrap();
        let extension = Extension::parse(&mut reader).unwrap();

        assert_eq!(extension.name, "GL_ARB_draw_indirect");
        assert!(extension.supports_api("glcore"));
        assert_eq!(extension.requires.len(), 2);
        assert_eq!(extension.requires[1].profile.as_deref(), Some("compatibility"));
        assert!(matches!(reader.current(), Token::Close(n) if n == "extension"));
    }
}
