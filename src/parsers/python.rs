//! Python structural scan using tree-sitter
//!
//! Finds function boundaries, counts decision points per function and
//! tallies Halstead operator/operand tokens for the whole file. No name
//! resolution or type information is involved.

use crate::metrics::halstead::HalsteadCounts;
use anyhow::{Context, Result};
use std::collections::HashSet;
use tree_sitter::{Node, Parser};

/// Cyclomatic complexity of one `def` / `async def`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionComplexity {
    pub name: String,
    pub line_start: u32,
    pub line_end: u32,
    pub complexity: u32,
}

/// Result of scanning one source file
#[derive(Debug, Clone, Default)]
pub struct SourceScan {
    /// Every function unit, in source order (nested ones included)
    pub functions: Vec<FunctionComplexity>,
    /// Complexity of the module treated as a single implicit function
    pub module_complexity: u32,
    pub tokens: HalsteadCounts,
}

impl SourceScan {
    /// Worst function complexity, or the module complexity when the scan
    /// found no function at all.
    pub fn max_complexity(&self) -> u32 {
        self.functions
            .iter()
            .map(|f| f.complexity)
            .max()
            .unwrap_or(self.module_complexity)
    }
}

/// Scan Python source code
pub fn scan_source(source: &str) -> Result<SourceScan> {
    let mut parser = Parser::new();
    let language = tree_sitter_python::LANGUAGE;
    parser
        .set_language(&language.into())
        .context("Failed to set Python language")?;

    let tree = parser
        .parse(source, None)
        .context("Failed to parse Python source")?;

    let root = tree.root_node();
    let source_bytes = source.as_bytes();

    let mut functions = Vec::new();
    collect_functions(root, source_bytes, &mut functions);

    let mut tally = TokenTally::default();
    tally.visit(root, source_bytes);

    Ok(SourceScan {
        functions,
        module_complexity: count_decision_points(root) + 1,
        tokens: tally.into_counts(),
    })
}

fn is_function(node: &Node) -> bool {
    node.kind() == "function_definition"
}

/// Pre-order walk over the descendants of `root` using a cursor, so deep
/// expression chains cannot exhaust the thread stack. `visit` returns
/// whether to descend into the node's children.
fn walk_descendants<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>) -> bool) {
    let mut cursor = root.walk();
    if !cursor.goto_first_child() {
        return;
    }
    loop {
        if visit(cursor.node()) && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() || cursor.node() == root {
                return;
            }
        }
    }
}

/// Collect every function unit below `root`, including nested ones
fn collect_functions(root: Node, source: &[u8], out: &mut Vec<FunctionComplexity>) {
    walk_descendants(root, |node| {
        if is_function(&node) {
            let name = node
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source).ok())
                .unwrap_or("<anonymous>")
                .to_string();
            out.push(FunctionComplexity {
                name,
                line_start: node.start_position().row as u32 + 1,
                line_end: node.end_position().row as u32 + 1,
                complexity: count_decision_points(node) + 1,
            });
        }
        true
    });
}

/// Decision points contributed by a single node
fn decision_weight(node: &Node) -> u32 {
    match node.kind() {
        // Branches and loops
        "if_statement" | "elif_clause" | "for_statement" | "while_statement" => 1,
        // Exception handling branches, `except*` included
        "except_clause" => 1,
        // Each `and` / `or` is one short-circuit branch
        "boolean_operator" => 1,
        // `a if cond else b`
        "conditional_expression" => 1,
        // Comprehension loops and filters
        "for_in_clause" | "if_clause" => 1,
        // `match` arms
        "case_clause" => 1,
        _ => 0,
    }
}

/// Count decision points below `node`, leaving nested functions to
/// their own unit.
fn count_decision_points(node: Node) -> u32 {
    let mut count = 0;
    walk_descendants(node, |child| {
        if is_function(&child) {
            return false;
        }
        count += decision_weight(&child);
        true
    });
    count
}

/// Running operator/operand tally over the syntax tree
#[derive(Default)]
struct TokenTally {
    operators: HashSet<String>,
    operands: HashSet<String>,
    total_operators: usize,
    total_operands: usize,
}

impl TokenTally {
    fn visit(&mut self, root: Node, source: &[u8]) {
        if !self.visit_node(root, source) {
            return;
        }
        walk_descendants(root, |node| self.visit_node(node, source));
    }

    /// Record a leaf, or return true when the node's children need a visit
    fn visit_node(&mut self, node: Node, source: &[u8]) -> bool {
        if node.is_missing() || matches!(node.kind(), "comment" | "line_continuation") {
            return false;
        }

        // A string literal, f-strings included, is a single operand
        if node.kind() == "string" || node.child_count() == 0 {
            self.record_leaf(node, source);
            return false;
        }
        true
    }

    fn record_leaf(&mut self, node: Node, source: &[u8]) {
        let text = node.utf8_text(source).unwrap_or("");
        if text.trim().is_empty() {
            return;
        }

        if node.is_named() {
            self.operands.insert(text.to_string());
            self.total_operands += 1;
        } else if !matches!(text, ")" | "]" | "}") {
            // Keywords, operators, opening delimiters and separators
            self.operators.insert(text.to_string());
            self.total_operators += 1;
        }
    }

    fn into_counts(self) -> HalsteadCounts {
        HalsteadCounts {
            distinct_operators: self.operators.len(),
            distinct_operands: self.operands.len(),
            total_operators: self.total_operators,
            total_operands: self.total_operands,
        }
    }
}
