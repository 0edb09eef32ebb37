//! CSS Syntax Module Level 3 — Parsing into a mutable rule tree.
//! Spec: <https://www.w3.org/TR/css-syntax-3/>

#![forbid(unsafe_code)]

use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserInput;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::StyleSheetParser;

/// A single CSS declaration (property: value [!important]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name. Lowercased for ordinary properties; custom
    /// properties (`--*`) are case-sensitive and keep their spelling.
    pub name: String,
    /// Raw value text (without trailing !important).
    pub value: String,
    /// Whether the declaration was marked as `!important`.
    pub important: bool,
}

/// A single style rule with a raw prelude and parsed declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Raw prelude text (typically the selector list).
    pub prelude: String,
    /// Declarations within the rule block.
    pub declarations: Vec<Declaration>,
}

/// An at-rule with a raw params string and a parsed body.
///
/// The body mixes child kinds: descriptor-style at-rules (e.g.
/// `@property`) hold declarations, grouping at-rules (e.g. `@media`)
/// hold nested rules. Block-less at-rules have an empty body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtRule {
    /// At-keyword name without the `@`, lowercased.
    pub name: String,
    /// Raw prelude text between the name and the block, trimmed.
    pub params: String,
    /// Child nodes of the block, in source order.
    pub nodes: Vec<Node>,
}

/// One node of the rule tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// An at-rule, with or without a block.
    AtRule(AtRule),
    /// A qualified style rule.
    Rule(StyleRule),
    /// A declaration directly inside an at-rule body.
    Declaration(Declaration),
}

/// A parsed stylesheet: the ordered top-level nodes of the rule tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Top-level rules and at-rules in source order.
    pub nodes: Vec<Node>,
}

/// Parse `!important` at the end of a value, returning (`value_without_important`, `important_flag`).
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(pos) = trimmed.rfind("!important")
        && let Some(prefix) = trimmed.get(..pos)
    {
        let head = prefix.trim_end();
        return (head.to_owned(), true);
    }
    (trimmed.to_owned(), false)
}

/// Canonicalize a declaration name: ordinary properties are ASCII
/// case-insensitive, custom properties are not.
fn canonical_declaration_name(name: &str) -> String {
    if name.starts_with("--") {
        name.to_owned()
    } else {
        name.to_ascii_lowercase()
    }
}

/// Prelude captured for an at-rule before its block is parsed.
struct AtRulePrelude {
    name: String,
    params: String,
}

/// Consume the rest of a prelude and return its raw text, trimmed.
fn slice_prelude<'input>(input: &mut Parser<'input, '_>) -> &'input str {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    input.slice_from(start).trim()
}

/// A declaration parser that records property name and its raw value.
struct BodyDeclParser;

impl CssDeclarationParser<'_> for BodyDeclParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let start = input.position();
        // Consume until end of the declaration item.
        while input.next_including_whitespace_and_comments().is_ok() {}
        let raw = input.slice_from(start);
        let (value, important) = split_important_tail(raw);
        Ok(Declaration {
            name: canonical_declaration_name(name.as_ref()),
            value,
            important,
        })
    }
}

impl CssAtRuleParser<'_> for BodyDeclParser {
    type Prelude = ();
    type AtRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        _name: CowRcStr<'input>,
        _input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(())
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        // Not produced by this parser
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Err(())
    }
}

impl CssQualifiedRuleParser<'_> for BodyDeclParser {
    type Prelude = ();
    type QualifiedRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl CssRuleBodyItemParser<'_, Declaration, ()> for BodyDeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Body parser for at-rule blocks, which may mix declarations,
/// nested qualified rules, and nested at-rules.
struct MixedBodyParser;

impl CssDeclarationParser<'_> for MixedBodyParser {
    type Declaration = Node;
    type Error = ();

    fn parse_value<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let raw = input.slice_from(start);
        let (value, important) = split_important_tail(raw);
        Ok(Node::Declaration(Declaration {
            name: canonical_declaration_name(name.as_ref()),
            value,
            important,
        }))
    }
}

impl CssAtRuleParser<'_> for MixedBodyParser {
    type Prelude = AtRulePrelude;
    type AtRule = Node;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(AtRulePrelude {
            name: name.as_ref().to_ascii_lowercase(),
            params: slice_prelude(input).to_owned(),
        })
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        Ok(Node::AtRule(AtRule {
            name: prelude.name,
            params: prelude.params,
            nodes: parse_mixed_body(input),
        }))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Ok(Node::AtRule(AtRule {
            name: prelude.name,
            params: prelude.params,
            nodes: Vec::new(),
        }))
    }
}

impl CssQualifiedRuleParser<'_> for MixedBodyParser {
    type Prelude = String; // raw selector/prelude
    type QualifiedRule = Node;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(slice_prelude(input).to_owned())
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Ok(Node::Rule(StyleRule {
            prelude,
            declarations: parse_declarations_from_block(input),
        }))
    }
}

impl CssRuleBodyItemParser<'_, Node, ()> for MixedBodyParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        true
    }
}

/// Top-level parser that builds rule-tree nodes for qualified rules
/// and at-rules alike.
struct TopLevelParser;

impl CssAtRuleParser<'_> for TopLevelParser {
    type Prelude = AtRulePrelude;
    type AtRule = Node;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(AtRulePrelude {
            name: name.as_ref().to_ascii_lowercase(),
            params: slice_prelude(input).to_owned(),
        })
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        Ok(Node::AtRule(AtRule {
            name: prelude.name,
            params: prelude.params,
            nodes: parse_mixed_body(input),
        }))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Ok(Node::AtRule(AtRule {
            name: prelude.name,
            params: prelude.params,
            nodes: Vec::new(),
        }))
    }
}

impl CssQualifiedRuleParser<'_> for TopLevelParser {
    type Prelude = String; // raw selector/prelude
    type QualifiedRule = Node;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(slice_prelude(input).to_owned())
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Ok(Node::Rule(StyleRule {
            prelude,
            declarations: parse_declarations_from_block(input),
        }))
    }
}

/// Parse declarations from a style-rule block using the `cssparser` body parser.
fn parse_declarations_from_block(block: &mut Parser) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    let mut body = BodyDeclParser;
    for decl in CssRuleBodyParser::new(block, &mut body).flatten() {
        out.push(decl);
    }
    out
}

/// Parse an at-rule block into mixed child nodes.
fn parse_mixed_body(block: &mut Parser) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    let mut body = MixedBodyParser;
    for node in CssRuleBodyParser::new(block, &mut body).flatten() {
        out.push(node);
    }
    out
}

/// Parse a full stylesheet into a `Stylesheet` using cssparser.
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut top = TopLevelParser;
    let mut sheet = Stylesheet::default();
    for node in StyleSheetParser::new(&mut parser, &mut top).flatten() {
        sheet.nodes.push(node);
    }
    sheet
}
