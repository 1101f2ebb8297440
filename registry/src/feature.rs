use crate::error::StructuralError;
use crate::slice::ApiSlice;
use crate::token::{Token, TokenReader};

/// A named, numbered snapshot of an API version: additive `require` blocks
/// and subtractive `remove` blocks.
///
/// Ordering between features of the same api lives in
/// [`Api`](crate::link::Api), which keeps them sorted by `(major, minor)`;
/// a feature does not link to its predecessor itself.
#[derive(Clone, Debug)]
pub struct Feature {
    pub api: String,
    pub name: String,
    /// Always matches `D.D`, a single digit on either side of the dot.
    pub number: String,
    pub number_major: u8,
    pub number_minor: u8,
    pub requires: Vec<ApiSlice>,
    pub removes: Vec<ApiSlice>,
}

impl Feature {
    pub const TAG_NAME: &'static str = "feature";

    pub fn version_key(&self) -> (u8, u8) {
        (self.number_major, self.number_minor)
    }

    /// Decomposes a `D.D` version literal. Anything else (wrong length,
    /// non-digits, missing separator) is a structural error, not a
    /// recoverable one.
    fn parse_number(feature: &str, number: &str) -> Result<(u8, u8), StructuralError> {
        let bytes = number.as_bytes();
        if bytes.len() != 3
            || !bytes[0].is_ascii_digit()
            || bytes[1] != b'.'
            || !bytes[2].is_ascii_digit()
        {
            return Err(StructuralError::InvalidVersionNumber {
                feature: feature.to_owned(),
                number: number.to_owned(),
            });
        }
        Ok((bytes[0] - b'0', bytes[2] - b'0'))
    }

    pub(crate) fn parse(reader: &mut TokenReader) -> Result<Self, StructuralError> {
        let element = reader.expect_open(Self::TAG_NAME)?;
        let api = element.require_attribute("api")?;
        let name = element.require_attribute("name")?;
        let number = element.require_attribute("number")?;
        let (number_major, number_minor) = Self::parse_number(&name, &number)?;

        let mut requires = Vec::new();
        let mut removes = Vec::new();
        loop {
            match reader.advance()? {
                Token::Open(child) => match child.name.as_str() {
                    ApiSlice::REQUIRE_TAG => {
                        requires.push(ApiSlice::parse(reader, ApiSlice::REQUIRE_TAG)?)
                    }
                    ApiSlice::REMOVE_TAG => {
                        removes.push(ApiSlice::parse(reader, ApiSlice::REMOVE_TAG)?)
                    }
                    other => {
                        eprintln!("warning: unrecognized <feature> child <{other}>");
                        reader.skip_element()?;
                    }
                },
                Token::Close(close) if close == Self::TAG_NAME => {
                    return Ok(Feature {
                        api,
                        name,
                        number,
                        number_major,
                        number_minor,
                        requires,
                        removes,
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
