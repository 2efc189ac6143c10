//! Parser for the netlist language.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{GradspiceError, Result};

/// Parser for netlists.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser, reading the first token from `lexer`.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<CircuitAst> {
        let mut ast = CircuitAst::new();

        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {}
                TokenKind::Directive => self.parse_directive(&mut ast.settings)?,
                TokenKind::Identifier => {
                    let element = self.parse_element()?;
                    if ast.elements.iter().any(|e| e.name == element.name) {
                        return Err(GradspiceError::invalid_component(
                            &element.name,
                            element.line,
                            "duplicate element name",
                        ));
                    }
                    for node in &element.nodes {
                        ast.note_node(node);
                    }
                    ast.elements.push(element);
                }
                TokenKind::Number => {
                    return Err(GradspiceError::parse(
                        self.current.line,
                        format!("unexpected number '{}' at start of line", self.current.text),
                    ));
                }
            }

            self.expect_end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn at_end_of_line(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn expect_end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => {
                self.advance()?;
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(GradspiceError::parse(
                self.current.line,
                format!("unexpected token '{}'", self.current.text),
            )),
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<f64> {
        if self.current.kind != TokenKind::Number {
            return Err(GradspiceError::parse(
                self.current.line,
                format!("expected {what}, got {:?}", self.current.kind),
            ));
        }
        let token = self.advance()?;
        parse_value(&token.text).ok_or_else(|| {
            GradspiceError::parse(token.line, format!("invalid number '{}'", token.text))
        })
    }

    fn expect_count(&mut self, what: &str) -> Result<usize> {
        let line = self.current.line;
        let text = self.current.text.clone();
        if self.current.kind != TokenKind::Number {
            return Err(GradspiceError::parse(line, format!("expected {what}")));
        }
        self.advance()?;
        text.parse::<usize>()
            .map_err(|_| GradspiceError::parse(line, format!("{what} must be a non-negative integer, got '{text}'")))
    }

    fn parse_directive(&mut self, settings: &mut NetlistSettings) -> Result<()> {
        let directive = self.advance()?;

        match directive.text.to_lowercase().as_str() {
            ".tstep" => settings.time_step = Some(self.expect_number("time step")?),
            ".rate" => settings.learning_rate = Some(self.expect_number("learning rate")?),
            ".tolerance" => settings.tolerance = Some(self.expect_number("tolerance")?),
            ".instants" => settings.instants = Some(self.expect_count("instant count")?),
            ".iterations" => settings.max_iterations = Some(self.expect_count("iteration count")?),
            _ => {
                return Err(GradspiceError::parse(
                    directive.line,
                    format!("unknown directive: {}", directive.text),
                ));
            }
        }

        Ok(())
    }

    fn parse_element(&mut self) -> Result<ElementDef> {
        let first = self.advance()?;
        let line = first.line;

        // Keywords first, so "REF" is not taken for a resistor
        let (element_type, name) = if let Some(et) = ElementType::from_keyword(&first.text) {
            if self.current.kind != TokenKind::Identifier {
                return Err(GradspiceError::invalid_component(
                    &first.text,
                    line,
                    "expected element name after keyword",
                ));
            }
            (et, self.advance()?.text)
        } else {
            let et = first
                .text
                .chars()
                .next()
                .and_then(ElementType::from_prefix)
                .ok_or_else(|| GradspiceError::UnknownComponentType {
                    component_type: first.text.clone(),
                    line,
                })?;
            (et, first.text)
        };

        let expected_nodes = element_type.expected_node_count();
        let mut nodes = Vec::with_capacity(expected_nodes);
        while nodes.len() < expected_nodes && !self.at_end_of_line() {
            let token = self.advance()?;
            if !matches!(token.kind, TokenKind::Identifier | TokenKind::Number) {
                return Err(GradspiceError::invalid_component(
                    &name,
                    line,
                    format!("invalid node name '{}'", token.text),
                ));
            }
            if is_ground(&token.text) {
                nodes.push("0".to_string());
            } else {
                nodes.push(token.text);
            }
        }

        if nodes.len() < expected_nodes {
            return Err(GradspiceError::invalid_component(
                &name,
                line,
                format!("expected {} nodes, got {}", expected_nodes, nodes.len()),
            ));
        }

        let value = if element_type.requires_value() {
            if self.at_end_of_line() {
                return Err(GradspiceError::invalid_component(&name, line, "missing value"));
            }
            let token = self.advance()?;
            let value = match token.kind {
                TokenKind::Number => parse_value(&token.text),
                _ => None,
            };
            Some(value.ok_or_else(|| {
                GradspiceError::invalid_component(&name, line, format!("invalid value '{}'", token.text))
            })?)
        } else {
            None
        };

        if !self.at_end_of_line() {
            return Err(GradspiceError::invalid_component(
                &name,
                line,
                format!("unexpected trailing token '{}'", self.current.text),
            ));
        }

        Ok(ElementDef {
            element_type,
            name,
            nodes,
            value,
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse;

    #[test]
    fn test_parse_resistor() {
        let ast = parse("R1 in out 10k").unwrap();
        assert_eq!(ast.elements.len(), 1);
        assert_eq!(ast.elements[0].element_type, ElementType::Resistor);
        assert_eq!(ast.elements[0].name, "R1");
        assert_eq!(ast.elements[0].nodes, vec!["in", "out"]);
        assert_eq!(ast.elements[0].value, Some(10_000.0));
    }

    #[test]
    fn test_parse_keywords_and_ground_aliases() {
        let ast = parse("B1 GND top 1.5\nREF g 0\nPROBE out top").unwrap();
        assert_eq!(ast.elements[0].element_type, ElementType::Source);
        assert_eq!(ast.elements[0].nodes, vec!["0", "top"]);
        assert_eq!(ast.elements[1].element_type, ElementType::Reference);
        assert_eq!(ast.elements[1].name, "g");
        assert_eq!(ast.elements[1].value, None);
        assert_eq!(ast.elements[2].element_type, ElementType::Probe);
        assert_eq!(ast.elements[2].nodes, vec!["top"]);
    }

    #[test]
    fn test_nodes_in_order_of_first_appearance() {
        let ast = parse("V1 0 b 1\nR1 b a 1k\nR2 a 0 1k\nC1 c b 1u").unwrap();
        assert_eq!(ast.nodes, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_parse_directives() {
        let ast = parse(".tstep 1m\n.rate 0.05\n.instants 20\n.iterations 500\n.tolerance 1e-6").unwrap();
        assert_eq!(
            ast.settings,
            NetlistSettings {
                time_step: Some(1e-3),
                learning_rate: Some(0.05),
                instants: Some(20),
                max_iterations: Some(500),
                tolerance: Some(1e-6),
            }
        );
    }

    #[test]
    fn test_parse_with_comments() {
        let input = "# This is a comment\nR1 in out 1k ; inline comment\n\n";
        let ast = parse(input).unwrap();
        assert_eq!(ast.elements.len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("X1 a b 1").unwrap_err(),
            GradspiceError::UnknownComponentType { line: 1, .. }
        ));
        assert!(matches!(
            parse("R1 a b 1\nR2 a").unwrap_err(),
            GradspiceError::InvalidComponent { line: 2, .. }
        ));
        assert!(matches!(
            parse("C1 a b").unwrap_err(),
            GradspiceError::InvalidComponent { .. }
        ));
        assert!(matches!(
            parse("R1 a b 1 2").unwrap_err(),
            GradspiceError::InvalidComponent { .. }
        ));
        assert!(matches!(
            parse("R1 a b 1\nR1 b c 2").unwrap_err(),
            GradspiceError::InvalidComponent { line: 2, .. }
        ));
        assert!(matches!(
            parse(".instants 2.5").unwrap_err(),
            GradspiceError::ParseError { .. }
        ));
        assert!(matches!(
            parse(".bogus 1").unwrap_err(),
            GradspiceError::ParseError { .. }
        ));
    }
}
