use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::StructuralError;

/// A single structural event pulled from the registry document.
#[derive(Clone, Debug)]
pub enum Token {
    Open(Element),
    Close(String),
    Text(String),
    Eof,
}

impl Token {
    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Open(element) => format!("<{}>", element.name),
            Token::Close(name) => format!("</{name}>"),
            Token::Text(_) => "character data".to_owned(),
            Token::Eof => "end of document".to_owned(),
        }
    }
}

/// An element-open token: tag name, attributes, and the byte offset at
/// which it was read.
#[derive(Clone, Debug)]
pub struct Element {
    pub name: String,
    offset: u64,
    attributes: Vec<(String, String)>,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Looks up an attribute that the grammar requires to be present.
    pub fn require_attribute(&self, name: &'static str) -> Result<String, StructuralError> {
        self.attribute(name)
            .map(str::to_owned)
            .ok_or(StructuralError::MissingAttribute {
                element: self.name.clone(),
                attribute: name,
                offset: self.offset,
            })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// Forward-only cursor over a registry document.
///
/// All entity parse routines share one contract: they are entered with the
/// cursor on the element-open token of the entity they parse, and they
/// return with the cursor on the matching element-close token.
///
/// Self-closing elements are reported as an open token immediately followed
/// by a matching close token. Comments, processing instructions and the
/// document declaration are never surfaced.
pub struct TokenReader<'a> {
    reader: Reader<&'a [u8]>,
    current: Token,
    pending_close: Option<String>,
}

impl<'a> TokenReader<'a> {
    pub fn new(document: &'a str) -> Self {
        Self {
            reader: Reader::from_str(document),
            current: Token::Eof,
            pending_close: None,
        }
    }

    /// The token the cursor currently sits on. Before the first call to
    /// [`advance`](Self::advance) this is `Token::Eof`.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Byte offset of the reader within the document.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Moves the cursor to the next structural token and returns it.
    pub fn advance(&mut self) -> Result<Token, StructuralError> {
        if let Some(name) = self.pending_close.take() {
            self.current = Token::Close(name);
            return Ok(self.current.clone());
        }
        loop {
            let offset = self.position();
            let event = self
                .reader
                .read_event()
                .map_err(|source| StructuralError::Xml { offset, source })?;
            let token = match event {
                Event::Start(start) => Token::Open(self.element(&start, offset)?),
                Event::Empty(start) => {
                    let element = self.element(&start, offset)?;
                    self.pending_close = Some(element.name.clone());
                    Token::Open(element)
                }
                Event::End(end) => Token::Close(self.decode(end.name().into_inner())?),
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|source| StructuralError::Xml { offset, source })?;
                    Token::Text(text.into_owned())
                }
                Event::CData(data) => Token::Text(self.decode(&data)?),
                Event::Eof => Token::Eof,
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
            };
            self.current = token;
            return Ok(self.current.clone());
        }
    }

    /// Checks that the cursor sits on an element-open token with the given
    /// tag name and returns it.
    pub fn expect_open(&self, name: &'static str) -> Result<Element, StructuralError> {
        match &self.current {
            Token::Open(element) if element.name == name => Ok(element.clone()),
            other => Err(StructuralError::ExpectedElement {
                expected: name,
                found: other.describe(),
                offset: self.position(),
            }),
        }
    }

    /// Consumes the text content of the element the cursor sits on, leaving
    /// the cursor on its element-close token. Nested markup is a structural
    /// error.
    pub fn element_text(&mut self) -> Result<String, StructuralError> {
        let Token::Open(element) = &self.current else {
            return Err(StructuralError::ExpectedElement {
                expected: "element with text content",
                found: self.current.describe(),
                offset: self.position(),
            });
        };
        let name = element.name.clone();
        let mut text = String::new();
        loop {
            match self.advance()? {
                Token::Text(chunk) => text.push_str(&chunk),
                Token::Close(close) if close == name => return Ok(text),
                Token::Eof => return Err(StructuralError::MissingClose { element: name }),
                _ => {
                    return Err(StructuralError::ExpectedCharacters {
                        element: name,
                        offset: self.position(),
                    })
                }
            }
        }
    }

    /// Skips the element the cursor sits on, including all of its
    /// descendants, leaving the cursor on its element-close token.
    pub fn skip_element(&mut self) -> Result<(), StructuralError> {
        let Token::Open(element) = &self.current else {
            return Ok(());
        };
        let name = element.name.clone();
        let mut depth = 0usize;
        loop {
            match self.advance()? {
                Token::Open(inner) if inner.name == name => depth += 1,
                Token::Close(close) if close == name => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                Token::Eof => return Err(StructuralError::MissingClose { element: name }),
                _ => {}
            }
        }
    }

    fn element(
        &self,
        start: &quick_xml::events::BytesStart,
        offset: u64,
    ) -> Result<Element, StructuralError> {
        let name = self.decode(start.name().into_inner())?;
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute =
                attribute.map_err(|source| StructuralError::Attribute { offset, source })?;
            let key = self.decode(attribute.key.into_inner())?;
            let value = attribute
                .unescape_value()
                .map_err(|source| StructuralError::Xml { offset, source })?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name,
            offset,
            attributes,
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, StructuralError> {
        self.reader
            .decoder()
            .decode(bytes)
            .map(|text| text.into_owned())
            .map_err(|source| StructuralError::Xml {
                offset: self.position(),
                source,
            })
    }
}
