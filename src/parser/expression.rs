//! Value expression parsing.
//!
//! Covers the expression subset that appears inside graph patterns: boolean
//! connectives, comparisons, property references, literals, and aggregate
//! set function calls. Precedence, loosest first: OR, XOR, AND, NOT,
//! comparison, primary.

use crate::ast::expression::{
    AggregateFunction, BinaryOperator, ComparisonOperator, Expression, Literal, PropertyReference,
    SetFunctionType, UnaryOperator, VariableReference,
};
use crate::lexer::token::TokenKind;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_expression(&mut self) -> Option<Expression> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> Option<Expression> {
        let mut left = self.parse_xor_expression()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_xor_expression()?;
            left = binary(BinaryOperator::Or, left, right);
        }
        Some(left)
    }

    fn parse_xor_expression(&mut self) -> Option<Expression> {
        let mut left = self.parse_and_expression()?;
        while self.eat(&TokenKind::Xor) {
            let right = self.parse_and_expression()?;
            left = binary(BinaryOperator::Xor, left, right);
        }
        Some(left)
    }

    fn parse_and_expression(&mut self) -> Option<Expression> {
        let mut left = self.parse_not_expression()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_not_expression()?;
            left = binary(BinaryOperator::And, left, right);
        }
        Some(left)
    }

    fn parse_not_expression(&mut self) -> Option<Expression> {
        let start = self.current_start()?;
        if self.eat(&TokenKind::Not) {
            let operand = self.parse_not_expression()?;
            let end = operand.span().end;
            return Some(Expression::Unary {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
                span: start..end,
            });
        }
        self.parse_comparison_expression()
    }

    fn parse_comparison_expression(&mut self) -> Option<Expression> {
        let left = self.parse_primary_expression()?;

        let op = match self.current_kind() {
            Some(TokenKind::Eq) => ComparisonOperator::Equals,
            Some(TokenKind::NotEq) => ComparisonOperator::NotEquals,
            Some(TokenKind::Lt) => ComparisonOperator::LessThan,
            Some(TokenKind::Gt) => ComparisonOperator::GreaterThan,
            Some(TokenKind::LtEq) => ComparisonOperator::LessThanOrEquals,
            Some(TokenKind::GtEq) => ComparisonOperator::GreaterThanOrEquals,
            _ => return Some(left),
        };
        self.advance();

        let right = match self.parse_primary_expression() {
            Some(right) => right,
            None => {
                self.error_here(
                    "Expected expression after comparison operator",
                    "expected operand here",
                );
                return None;
            }
        };
        let span = left.span().start..right.span().end;
        Some(Expression::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }

    fn parse_primary_expression(&mut self) -> Option<Expression> {
        let start = self.current_start()?;

        let base = match self.current_kind() {
            Some(TokenKind::IntegerLiteral(text)) => {
                let text = text.clone();
                self.advance();
                Expression::Literal(Literal::Integer(text), start..self.last_consumed_end(start))
            }
            Some(TokenKind::FloatLiteral(text)) => {
                let text = text.clone();
                self.advance();
                Expression::Literal(Literal::Float(text), start..self.last_consumed_end(start))
            }
            Some(TokenKind::StringLiteral(text)) => {
                let text = text.clone();
                self.advance();
                Expression::Literal(Literal::String(text), start..self.last_consumed_end(start))
            }
            Some(TokenKind::True) => {
                self.advance();
                Expression::Literal(Literal::Boolean(true), start..self.last_consumed_end(start))
            }
            Some(TokenKind::False) => {
                self.advance();
                Expression::Literal(Literal::Boolean(false), start..self.last_consumed_end(start))
            }
            Some(TokenKind::Null) => {
                self.advance();
                Expression::Literal(Literal::Null, start..self.last_consumed_end(start))
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                if !self.eat(&TokenKind::RParen) {
                    self.error_here("Expected ')' in expression", "expected ')' here");
                    return None;
                }
                Expression::Parenthesized(Box::new(inner), start..self.last_consumed_end(start))
            }
            Some(kind) => {
                let name = kind.identifier_text()?;
                // Aggregate set function call?
                if self.peek_kind(1) == Some(&TokenKind::LParen) {
                    if let Some(function) = SetFunctionType::from_name(&name) {
                        return self.parse_aggregate_function(function, start);
                    }
                }
                self.advance();
                Expression::Variable(VariableReference {
                    name,
                    span: start..self.last_consumed_end(start),
                })
            }
            None => return None,
        };

        self.parse_property_chain(base, start)
    }

    fn parse_property_chain(&mut self, base: Expression, start: usize) -> Option<Expression> {
        let mut expr = base;
        while self.eat(&TokenKind::Dot) {
            let property = match self.current_kind().and_then(|k| k.identifier_text()) {
                Some(name) => {
                    self.advance();
                    name
                }
                None => {
                    self.error_here("Expected property name after '.'", "expected name here");
                    return None;
                }
            };
            let end = self.last_consumed_end(start);
            expr = Expression::Property(PropertyReference {
                base: Box::new(expr),
                property,
                span: start..end,
            });
        }
        Some(expr)
    }

    fn parse_aggregate_function(
        &mut self,
        function: SetFunctionType,
        start: usize,
    ) -> Option<Expression> {
        self.advance(); // function name
        self.advance(); // (

        let distinct = self.eat(&TokenKind::Distinct);
        let argument = match self.parse_expression() {
            Some(argument) => argument,
            None => {
                self.error_here(
                    "Expected argument in aggregate function call",
                    "expected expression here",
                );
                return None;
            }
        };

        if !self.eat(&TokenKind::RParen) {
            self.error_here(
                "Expected ')' to close aggregate function call",
                "expected ')' here",
            );
            return None;
        }

        let end = self.last_consumed_end(start);
        Some(Expression::Aggregate(AggregateFunction {
            function,
            distinct,
            argument: Box::new(argument),
            span: start..end,
        }))
    }
}

fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Expression {
    let span = left.span().start..right.span().end;
    Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_expr(source: &str) -> Expression {
        let lexed = Lexer::new(source).tokenize();
        assert!(lexed.diagnostics.is_empty());
        let mut parser = Parser::new(&lexed.tokens);
        let expr = parser.parse_expression().expect("expression");
        assert!(parser.diags.is_empty(), "{:?}", parser.diags);
        expr
    }

    #[test]
    fn comparison_with_property() {
        let expr = parse_expr("a.prop = 3");
        let Expression::Comparison { op, left, .. } = expr else {
            panic!("expected comparison");
        };
        assert_eq!(op, ComparisonOperator::Equals);
        assert!(matches!(*left, Expression::Property(_)));
    }

    #[test]
    fn and_is_left_associative() {
        let expr = parse_expr("a.x = 1 AND a.y = 2 AND a.z = 3");
        let Expression::Binary { op, left, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOperator::And);
        assert!(matches!(
            *left,
            Expression::Binary {
                op: BinaryOperator::And,
                ..
            }
        ));
    }

    #[test]
    fn precedence_or_over_and() {
        let expr = parse_expr("a.x = 1 OR a.y = 2 AND a.z = 3");
        let Expression::Binary { op, right, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOperator::Or);
        assert!(matches!(
            *right,
            Expression::Binary {
                op: BinaryOperator::And,
                ..
            }
        ));
    }

    #[test]
    fn not_expression() {
        let expr = parse_expr("NOT a.blocked");
        assert!(matches!(
            expr,
            Expression::Unary {
                op: UnaryOperator::Not,
                ..
            }
        ));
    }

    #[test]
    fn aggregate_call() {
        let expr = parse_expr("COUNT(e) = 2");
        let Expression::Comparison { left, .. } = expr else {
            panic!("expected comparison");
        };
        let Expression::Aggregate(agg) = *left else {
            panic!("expected aggregate");
        };
        assert_eq!(agg.function, SetFunctionType::Count);
        assert!(!agg.distinct);
    }

    #[test]
    fn aggregate_distinct() {
        let expr = parse_expr("SUM(DISTINCT e.amount)");
        let Expression::Aggregate(agg) = expr else {
            panic!("expected aggregate");
        };
        assert!(agg.distinct);
    }

    #[test]
    fn property_chain() {
        let expr = parse_expr("a.b.c");
        let Expression::Property(outer) = expr else {
            panic!("expected property");
        };
        assert_eq!(outer.property.as_str(), "c");
        assert!(matches!(*outer.base, Expression::Property(_)));
    }

    #[test]
    fn literals() {
        assert!(matches!(
            parse_expr("TRUE"),
            Expression::Literal(Literal::Boolean(true), _)
        ));
        assert!(matches!(
            parse_expr("NULL"),
            Expression::Literal(Literal::Null, _)
        ));
        assert!(matches!(
            parse_expr("3.25"),
            Expression::Literal(Literal::Float(_), _)
        ));
    }
}
