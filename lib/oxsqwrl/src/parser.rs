#![allow(clippy::ignored_unit_patterns)]
use crate::algebra::{Argument, Atom, Name, Query};
use crate::vocab::DEFAULT_PREFIXES;
use oxilangtag::LanguageTag;
use oxiri::{Iri, IriParseError};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode, Variable};
use peg::parser;
use peg::str::LineCol;
use std::collections::HashMap;

/// A SQWRL parser.
///
/// The `rdf`, `rdfs`, `owl`, `xsd`, `swrlb` and `sqwrl` prefixes are always available.
///
/// ```
/// use oxsqwrl::SqwrlParser;
///
/// let query = SqwrlParser::new()
///     .with_prefix("fam", "http://example.com/family#")?
///     .parse_query("fam:Person(?p) ^ swrlb:greaterThan(?a, 17) -> sqwrl:select(?p)")?;
/// assert_eq!(query.head.len(), 1);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[must_use]
#[derive(Clone)]
pub struct SqwrlParser {
    prefixes: HashMap<String, String>,
}

impl Default for SqwrlParser {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES
                .iter()
                .map(|(name, iri)| ((*name).into(), (*iri).into()))
                .collect(),
        }
    }
}

impl SqwrlParser {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an IRI prefix used during parsing.
    ///
    /// The empty prefix name allows writing `:Person`.
    #[inline]
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        self.prefixes.insert(
            prefix_name.into(),
            Iri::parse(prefix_iri.into())?.into_inner(),
        );
        Ok(self)
    }

    /// Parse the given query string using the already set options.
    ///
    /// ```
    /// use oxsqwrl::SqwrlParser;
    ///
    /// assert!(SqwrlParser::new().parse_query("Person(?p -> sqwrl:select(?p)").is_err());
    /// ```
    pub fn parse_query(self, query: &str) -> Result<Query, SqwrlSyntaxError> {
        let state = ParserState {
            prefixes: self.prefixes,
        };
        Ok(parser::QueryUnit(query, &state).map_err(SqwrlSyntaxErrorKind::Syntax)?)
    }
}

/// Error returned during SQWRL parsing.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct SqwrlSyntaxError {
    #[from]
    kind: SqwrlSyntaxErrorKind,
}

impl SqwrlSyntaxError {
    /// The position of the error in the query, if known.
    pub fn location(&self) -> Option<LineCol> {
        match &self.kind {
            SqwrlSyntaxErrorKind::Syntax(e) => Some(e.location.clone()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum SqwrlSyntaxErrorKind {
    #[error(transparent)]
    Syntax(#[from] peg::error::ParseError<LineCol>),
}

struct ParserState {
    prefixes: HashMap<String, String>,
}

fn unescape_iriref(mut input: &str) -> Result<String, &'static str> {
    let mut output = String::with_capacity(input.len());
    while let Some((before, after)) = input.split_once('\\') {
        output.push_str(before);
        let mut after = after.chars();
        let (escape, after) = match after.next() {
            Some('u') => read_hex_char::<4>(after.as_str())?,
            Some('U') => read_hex_char::<8>(after.as_str())?,
            Some(_) => {
                return Err(
                    "IRIs are only allowed to contain escape sequences \\uXXXX and \\UXXXXXXXX",
                );
            }
            None => return Err("IRIs are not allowed to end with a '\'"),
        };
        output.push(escape);
        input = after;
    }
    output.push_str(input);
    Ok(output)
}

fn unescape_string(mut input: &str) -> Result<String, &'static str> {
    let mut output = String::with_capacity(input.len());
    while let Some((before, after)) = input.split_once('\\') {
        output.push_str(before);
        let mut after = after.chars();
        let (escape, after) = match after.next() {
            Some('t') => ('\u{0009}', after.as_str()),
            Some('n') => ('\u{000A}', after.as_str()),
            Some('r') => ('\u{000D}', after.as_str()),
            Some('"') => ('\u{0022}', after.as_str()),
            Some('\'') => ('\u{0027}', after.as_str()),
            Some('\\') => ('\u{005C}', after.as_str()),
            Some('u') => read_hex_char::<4>(after.as_str())?,
            Some('U') => read_hex_char::<8>(after.as_str())?,
            Some(_) => return Err("the characters that can be escaped in strings are tnr\"'\\"),
            None => return Err("strings are not allowed to end with a '\'"),
        };
        output.push(escape);
        input = after;
    }
    output.push_str(input);
    Ok(output)
}

fn read_hex_char<const SIZE: usize>(input: &str) -> Result<(char, &str), &'static str> {
    if let Some(escape) = input.get(..SIZE) {
        if let Some(char) = u32::from_str_radix(escape, 16)
            .ok()
            .and_then(char::from_u32)
        {
            Ok((char, &input[SIZE..]))
        } else {
            Err("\\u escape sequence should be followed by hexadecimal digits")
        }
    } else {
        Err("\\u escape sequence should be followed by hexadecimal digits")
    }
}

parser! {
    //See https://github.com/protegeproject/swrlapi/wiki/SWRLLanguageFAQ
    grammar parser(state: &ParserState) for str {
        pub rule QueryUnit() -> Query = _ body:Body() _ "->" _ head:Head() _ {
            Query { body, head }
        }

        rule Body() -> Vec<Atom> = Atom() ** (_ "^" _)

        rule Head() -> Vec<Atom> = Atom() ++ (_ "^" _)

        rule Atom() -> Atom = predicate:Name() _ "(" _ arguments:(Argument() ** (_ "," _)) _ ")" {
            Atom { predicate, arguments }
        }

        rule Argument() -> Argument =
            v:VAR1() { Argument::Variable(Variable::new_unchecked(v)) } /
            l:Literal() { Argument::Literal(l) } /
            n:Name() { Argument::Name(n) }

        rule Name() -> Name =
            i:IRIREF() { Name::Iri(NamedNode::from(i)) } /
            i:PNAME_LN() { Name::Iri(NamedNode::from(i)) } /
            n:$(SHORT_NAME()) { Name::Short(n.into()) }

        rule Literal() -> Literal = RDFLiteral() / NumericLiteral() / BooleanLiteral()

        rule RDFLiteral() -> Literal =
            value:String() _ "^^" _ datatype:Datatype() { Literal::new_typed_literal(value, datatype) } /
            value:String() _ language:LANGTAG() { Literal::new_language_tagged_literal_unchecked(value, language.into_inner()) } /
            value:String() { Literal::new_simple_literal(value) }

        rule Datatype() -> NamedNode = i:(IRIREF() / PNAME_LN()) {
            NamedNode::from(i)
        }

        rule NumericLiteral() -> Literal =
            d:$(['+' | '-']? DOUBLE()) { Literal::new_typed_literal(d, xsd::DOUBLE) } /
            d:$(['+' | '-']? DECIMAL()) { Literal::new_typed_literal(d, xsd::DECIMAL) } /
            i:$(['+' | '-']? INTEGER()) { Literal::new_typed_literal(i, xsd::INTEGER) }

        rule BooleanLiteral() -> Literal =
            "true" !PN_CHARS() { Literal::new_typed_literal("true", xsd::BOOLEAN) } /
            "false" !PN_CHARS() { Literal::new_typed_literal("false", xsd::BOOLEAN) }

        rule String() -> String = STRING_LITERAL1() / STRING_LITERAL2()

        rule IRIREF() -> Iri<String> = "<" i:$((!['>'] [_])*) ">" {?
            Iri::parse(unescape_iriref(i)?).map_err(|_| "IRI parsing failed")
        }

        rule PNAME_NS() -> &'input str = ns:$(PN_PREFIX()?) ":" {
            ns
        }

        rule PNAME_LN() -> Iri<String> = ns:PNAME_NS() local:$(PN_LOCAL()) {?
            if let Some(base) = state.prefixes.get(ns) {
                let mut iri = String::with_capacity(base.len() + local.len());
                iri.push_str(base);
                for chunk in local.split('\\') { // We remove \
                    iri.push_str(chunk);
                }
                Iri::parse(iri).map_err(|_| "IRI parsing failed")
            } else {
                Err("Prefix not found")
            }
        }

        rule SHORT_NAME() = PN_CHARS_U() PN_CHARS()*

        rule VAR1() -> &'input str = "?" v:$(VARNAME()) { v }

        rule LANGTAG() -> LanguageTag<String> = "@" l:$(['a' ..= 'z' | 'A' ..= 'Z']+ ("-" ['a' ..= 'z' | 'A' ..= 'Z' | '0' ..= '9']+)*) {?
            LanguageTag::parse(l.to_ascii_lowercase()).map_err(|_| "language tag parsing failed")
        }

        rule INTEGER() = ['0'..='9']+

        rule DECIMAL() = ['0'..='9']* "." ['0'..='9']+

        rule DOUBLE() = (['0'..='9']+ "." ['0'..='9']* / "." ['0'..='9']+ / ['0'..='9']+) EXPONENT()

        rule EXPONENT() = ['e' | 'E'] ['+' | '-']? ['0'..='9']+

        rule STRING_LITERAL1() -> String = "'" l:$((STRING_LITERAL1_simple_char() / ECHAR() / UCHAR())*) "'" {?
             unescape_string(l)
        }
        rule STRING_LITERAL1_simple_char() = !['\u{27}' | '\u{5C}' | '\u{0A}' | '\u{0D}'] [_]

        rule STRING_LITERAL2() -> String = "\"" l:$((STRING_LITERAL2_simple_char() / ECHAR() / UCHAR())*) "\"" {?
             unescape_string(l)
        }
        rule STRING_LITERAL2_simple_char() = !['\u{22}' | '\u{5C}' | '\u{0A}' | '\u{0D}'] [_]

        rule UCHAR() = "\\u" HEX() HEX() HEX() HEX() / "\\U" HEX() HEX() HEX() HEX() HEX() HEX() HEX() HEX()

        rule ECHAR() = "\\" ['t' | 'n' | 'r' | '"' |'\'' | '\\']

        rule PN_CHARS_BASE() = ['A' ..= 'Z' | 'a' ..= 'z' | '\u{00C0}'..='\u{00D6}' | '\u{00D8}'..='\u{00F6}' | '\u{00F8}'..='\u{02FF}' | '\u{0370}'..='\u{037D}' | '\u{037F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}']

        rule PN_CHARS_U() = ['_'] / PN_CHARS_BASE()

        rule VARNAME() = (['0'..='9'] / PN_CHARS_U()) (['0' ..= '9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}'] / PN_CHARS_U())*

        rule PN_CHARS() = ['-' | '0' ..= '9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}'] / PN_CHARS_U()

        rule PN_PREFIX() = PN_CHARS_BASE() PN_CHARS()* ("."+ PN_CHARS()+)*

        rule PN_LOCAL() = (PN_CHARS_U() / [':' | '0'..='9'] / PLX()) (PN_CHARS() / [':'] / PLX())* (['.']+ (PN_CHARS() / [':'] / PLX())+)?

        rule PLX() = PERCENT() / PN_LOCAL_ESC()

        rule PERCENT() = ['%'] HEX() HEX()

        rule HEX() = ['0' ..= '9' | 'A' ..= 'F' | 'a' ..= 'f']

        rule PN_LOCAL_ESC() = ['\\'] ['_' | '~' | '.' | '-' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' | '/' | '?' | '#' | '@' | '%']

        //space
        rule _() = quiet! { ([' ' | '\t' | '\n' | '\r'] / comment())* }

        //comment
        rule comment() = quiet! { ['#'] (!['\r' | '\n'] [_])* }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{sqwrl, swrlb};

    fn parse(query: &str) -> Query {
        SqwrlParser::new().parse_query(query).unwrap()
    }

    #[test]
    fn short_and_prefixed_names() {
        let query = parse("Person(?p) ^ swrlb:greaterThan(?a, 17) -> sqwrl:select(?p)");
        assert_eq!(query.body[0].predicate, Name::Short("Person".into()));
        assert_eq!(
            query.body[1].predicate,
            Name::Iri(NamedNode::new_unchecked(format!("{}greaterThan", swrlb::NAMESPACE)))
        );
        assert_eq!(
            query.head[0].predicate,
            Name::Iri(NamedNode::new_unchecked(format!("{}select", sqwrl::NAMESPACE)))
        );
    }

    #[test]
    fn literals() {
        let query = parse(
            r#"p(?x, "a\"b", "chat"@FR, "1"^^xsd:int, -12, 1.5, 2e3, true, trueFriend) -> sqwrl:select(?x)"#,
        );
        assert_eq!(
            query.body[0].arguments[1..],
            [
                Argument::Literal(Literal::new_simple_literal("a\"b")),
                Argument::Literal(Literal::new_language_tagged_literal_unchecked("chat", "fr")),
                Argument::Literal(Literal::new_typed_literal("1", xsd::INT)),
                Argument::Literal(Literal::new_typed_literal("-12", xsd::INTEGER)),
                Argument::Literal(Literal::new_typed_literal("1.5", xsd::DECIMAL)),
                Argument::Literal(Literal::new_typed_literal("2e3", xsd::DOUBLE)),
                Argument::Literal(Literal::new_typed_literal("true", xsd::BOOLEAN)),
                Argument::Name(Name::Short("trueFriend".into())),
            ]
        );
    }

    #[test]
    fn empty_body_and_comments() {
        let query = parse("# constants only\n -> sqwrl:select(\"a\") # trailing");
        assert!(query.body.is_empty());
        assert_eq!(query.head.len(), 1);
    }

    #[test]
    fn full_iris() {
        let query = parse("<http://example.com/Person>(?p) -> sqwrl:select(?p)");
        assert_eq!(
            query.body[0].predicate,
            Name::Iri(NamedNode::new_unchecked("http://example.com/Person"))
        );
    }

    #[test]
    fn syntax_errors() {
        for query in [
            "Person(?p -> sqwrl:select(?p)",
            "Person(?p)",
            "Person(?p) -> ",
            "Person(?p) -> sqwrl:select(?p) garbage",
            "unknown:Person(?p) -> sqwrl:select(?p)",
            "Person(?p) ^ -> sqwrl:select(?p)",
        ] {
            let error = SqwrlParser::new().parse_query(query).unwrap_err();
            assert!(error.location().is_some(), "{query}");
        }
    }

    #[test]
    fn custom_prefixes() {
        let query = SqwrlParser::new()
            .with_prefix("", "http://example.com/family#")
            .unwrap()
            .parse_query(":Person(?p) -> sqwrl:select(?p)")
            .unwrap();
        assert_eq!(
            query.body[0].predicate,
            Name::Iri(NamedNode::new_unchecked("http://example.com/family#Person"))
        );
    }
}
