//! Parser for canonical type strings
//!
//! Accepts the grammar produced by [`Type`]'s `Display` implementation:
//!
//! ```text
//! union   := type ('|' type)*
//! type    := '?'? name ('<' union (',' union)? '>')?
//! name    := builtin keyword | class name
//! ```
//!
//! A single parameter (`array<Dog>`) is read as the value type.

use super::{Builtin, Type};
use crate::{Error, Result};
use std::str::FromStr;

/// Parse a possibly multi-variant type string such as `int|?Dog`
pub fn parse_union(input: &str) -> Result<Vec<Type>> {
    let mut parser = Parser::new(input);
    let variants = parser.union()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(variants)
}

impl FromStr for Type {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut variants = parse_union(s)?;
        if variants.len() != 1 {
            return Err(Error::invalid_argument(format!(
                "Expected a single type, '{}' has {} variants",
                s,
                variants.len()
            )));
        }
        Ok(variants.remove(0))
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::invalid_argument(format!(
            "Cannot parse type '{}' at offset {}: {}",
            self.input, self.pos, message
        ))
    }

    fn union(&mut self) -> Result<Vec<Type>> {
        let mut variants = vec![self.single()?];
        while self.eat('|') {
            variants.push(self.single()?);
        }
        Ok(variants)
    }

    fn single(&mut self) -> Result<Type> {
        let nullable = self.eat('?');
        let name = self.name()?;

        let mut ty = match Builtin::from_keyword(name) {
            Some(Builtin::Null) => Type::null(),
            Some(Builtin::Bool) => Type::bool(),
            Some(Builtin::Int) => Type::int(),
            Some(Builtin::Float) => Type::float(),
            Some(Builtin::String) => Type::string(),
            Some(Builtin::Array) => Type::array(),
            Some(Builtin::Object) => Type::object(),
            Some(Builtin::Mixed) => Type::mixed(),
            None => Type::class(name),
        };

        if self.eat('<') {
            let first = self.union()?;
            if self.eat(',') {
                let second = self.union()?;
                ty = ty.with_key_types(first).with_value_types(second);
            } else {
                ty = ty.with_value_types(first);
            }
            if !self.eat('>') {
                return Err(self.error("expected '>'"));
            }
        }

        Ok(if nullable { ty.nullable() } else { ty })
    }

    fn name(&mut self) -> Result<&'a str> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '\\' | ':' | '.') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.error("expected a type name"));
        }
        let input = self.input;
        Ok(&input[start..self.pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtins_and_classes() {
        assert_eq!("int".parse::<Type>().unwrap(), Type::int());
        assert_eq!("App\\Dog".parse::<Type>().unwrap(), Type::class("App\\Dog"));
        assert_eq!("?string".parse::<Type>().unwrap(), Type::string().nullable());
    }

    #[test]
    fn test_parse_generics() {
        let parsed: Type = "array<int, Cat|Dog>".parse().unwrap();
        assert_eq!(parsed.to_string(), "array<int,Cat|Dog>");

        let value_only: Type = "Collection<Dog>".parse().unwrap();
        assert_eq!(value_only.to_string(), "Collection<mixed,Dog>");
        assert_eq!(value_only.class_name(), Some("Collection"));
    }

    #[test]
    fn test_parse_union() {
        let variants = parse_union("int|?Dog").unwrap();
        assert_eq!(variants, vec![Type::int(), Type::class("Dog").nullable()]);
    }

    #[test]
    fn test_display_round_trip() {
        let input = "array<int,array<string,?Dog>>";
        assert_eq!(input.parse::<Type>().unwrap().to_string(), input);
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Type>().is_err());
        assert!("array<int".parse::<Type>().is_err());
        assert!("int|string".parse::<Type>().is_err());
        assert!(matches!(
            parse_union("int>"),
            Err(Error::InvalidArgument { .. })
        ));
    }
}
