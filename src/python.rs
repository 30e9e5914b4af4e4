use std::ops::Range;

use rustpython_parser::{
    Parse,
    ast::{self, Ranged},
};
use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error)]
#[error("Invalid Python code: {0}")]
pub struct SyntaxError(String);

impl From<SyntaxError> for AppError {
    fn from(error: SyntaxError) -> Self {
        AppError::ValidationFailed(error.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Function,
    AsyncFunction,
    Class,
}

impl DeclarationKind {
    pub fn label(self) -> &'static str {
        match self {
            DeclarationKind::Function => "FunctionDef",
            DeclarationKind::AsyncFunction => "AsyncFunctionDef",
            DeclarationKind::Class => "ClassDef",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub span: Range<usize>,
    pub has_docstring: bool,
    pub body_start: Option<usize>,
}

impl Declaration {
    fn from_stmt(stmt: &ast::Stmt, code: &str) -> Option<Self> {
        let (name, kind, body) = match stmt {
            ast::Stmt::FunctionDef(def) => (def.name.as_str(), DeclarationKind::Function, &def.body),
            ast::Stmt::AsyncFunctionDef(def) => {
                (def.name.as_str(), DeclarationKind::AsyncFunction, &def.body)
            }
            ast::Stmt::ClassDef(def) => (def.name.as_str(), DeclarationKind::Class, &def.body),
            _ => return None,
        };

        let range = stmt.range();
        Some(Self {
            name: name.to_owned(),
            kind,
            span: usize::from(range.start())..usize::from(range.end()),
            has_docstring: body.first().is_some_and(is_docstring),
            body_start: body.first().map(|first| statement_start(first, code)),
        })
    }

    pub fn source<'a>(&self, code: &'a str) -> Option<&'a str> {
        code.get(self.span.clone())
            .filter(|slice| !slice.trim().is_empty())
    }
}

// Decorated definitions start at their first `@`, not at `def`/`class`.
fn statement_start(stmt: &ast::Stmt, code: &str) -> usize {
    let start = usize::from(stmt.range().start());
    let decorators = match stmt {
        ast::Stmt::FunctionDef(def) => &def.decorator_list,
        ast::Stmt::AsyncFunctionDef(def) => &def.decorator_list,
        ast::Stmt::ClassDef(def) => &def.decorator_list,
        _ => return start,
    };
    let Some(first) = decorators.first() else {
        return start;
    };

    let decorator = usize::from(first.range().start());
    code.get(..decorator)
        .and_then(|prefix| prefix.rfind('@'))
        .map_or(start, |at| at.min(start))
}

fn is_docstring(stmt: &ast::Stmt) -> bool {
    let ast::Stmt::Expr(expr) = stmt else {
        return false;
    };
    matches!(
        expr.value.as_ref(),
        ast::Expr::Constant(ast::ExprConstant {
            value: ast::Constant::Str(_),
            ..
        })
    )
}

pub fn parse_declarations(code: &str) -> Result<Vec<Declaration>, SyntaxError> {
    let suite =
        ast::Suite::parse(code, "<submitted>").map_err(|error| SyntaxError(error.to_string()))?;

    Ok(suite
        .iter()
        .filter_map(|stmt| Declaration::from_stmt(stmt, code))
        .collect())
}

/// Returns `code` with `doc` inserted as the first statement of every listed
/// declaration that lacks a docstring.
pub fn insert_docstrings<'a, I>(code: &str, docs: I) -> String
where
    I: IntoIterator<Item = (&'a Declaration, &'a str)>,
{
    let mut pending: Vec<(&Declaration, usize, &str)> = docs
        .into_iter()
        .filter(|(declaration, _)| !declaration.has_docstring)
        .filter_map(|(declaration, doc)| {
            declaration
                .body_start
                .map(|body_start| (declaration, body_start, doc))
        })
        .collect();

    // Later offsets first so earlier ones stay valid.
    pending.sort_by(|a, b| b.1.cmp(&a.1));
    pending.dedup_by_key(|entry| entry.1);

    let mut rewritten = code.to_owned();
    for (declaration, body_start, doc) in pending {
        if !rewritten.is_char_boundary(body_start) {
            continue;
        }

        let newline = line_ending(&rewritten[..body_start], code);
        let line_start = rewritten[..body_start].rfind('\n').map_or(0, |index| index + 1);
        let lead = &rewritten[line_start..body_start];

        if lead.trim().is_empty() {
            let indent = lead.to_owned();
            let literal = docstring_literal(doc, &indent, newline);
            rewritten.insert_str(body_start, &format!("{literal}{newline}{indent}"));
        } else {
            // One-line body such as `def f(): return 1`.
            let indent = format!("{}    ", header_indent(&rewritten, declaration.span.start));
            let literal = docstring_literal(doc, &indent, newline);
            let gap_start = rewritten[..body_start].trim_end().len();
            rewritten.replace_range(
                gap_start..body_start,
                &format!("{newline}{indent}{literal}{newline}{indent}"),
            );
        }
    }

    rewritten
}

fn line_ending(before: &str, code: &str) -> &'static str {
    let crlf = match before.rfind('\n') {
        Some(index) => before[..index].ends_with('\r'),
        None => code.contains("\r\n"),
    };
    if crlf { "\r\n" } else { "\n" }
}

fn header_indent(code: &str, start: usize) -> &str {
    let Some(prefix) = code.get(..start) else {
        return "";
    };
    let line_start = prefix.rfind('\n').map_or(0, |index| index + 1);
    let lead = &prefix[line_start..];
    if lead.trim().is_empty() { lead } else { "" }
}

fn docstring_literal(doc: &str, indent: &str, newline: &str) -> String {
    let text = dedent(strip_quotes(doc.trim()));
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    let body = escaped
        .lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 || line.is_empty() {
                line.to_owned()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join(newline);

    if body.contains('\n') {
        format!("\"\"\"{body}{newline}{indent}\"\"\"")
    } else {
        format!("\"\"\"{body}\"\"\"")
    }
}

// Unwraps a reply that is itself a triple-quoted literal.
fn strip_quotes(doc: &str) -> &str {
    for quote in ["\"\"\"", "'''"] {
        if let Some(inner) = doc
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    doc
}

fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                line.trim_start()
            } else {
                line.get(margin..).unwrap_or_else(|| line.trim_start())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "import os\n\n\ndef add(a, b):\n    return a + b\n\n\nasync def fetch():\n    \"\"\"Already documented.\"\"\"\n    return 1\n\n\nclass Greeter:\n    name = 'x'\n\n\nVALUE = 3\n";

    #[test]
    fn finds_top_level_declarations_in_order() {
        let declarations = parse_declarations(SAMPLE).expect("sample should parse");
        let summary: Vec<_> = declarations
            .iter()
            .map(|d| (d.name.as_str(), d.kind.label(), d.has_docstring))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("add", "FunctionDef", false),
                ("fetch", "AsyncFunctionDef", true),
                ("Greeter", "ClassDef", false),
            ]
        );
    }

    #[test]
    fn source_slice_is_exact_declaration_text() {
        let declarations = parse_declarations(SAMPLE).expect("sample should parse");
        let source = declarations[0].source(SAMPLE).expect("slice should exist");
        assert!(source.starts_with("def add(a, b):"));
        assert!(source.contains("return a + b"));
        assert!(!source.contains("async def"));
    }

    #[test]
    fn nested_definitions_are_not_top_level() {
        let code = "def outer():\n    def inner():\n        pass\n    return inner\n";
        let declarations = parse_declarations(code).expect("should parse");
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].name, "outer");
    }

    #[test]
    fn out_of_range_span_has_no_source() {
        let declaration = Declaration {
            name: "ghost".into(),
            kind: DeclarationKind::Function,
            span: 40..80,
            has_docstring: false,
            body_start: None,
        };
        assert_eq!(declaration.source("def ghost(): pass"), None);
    }

    #[test]
    fn syntax_error_carries_parser_diagnostic() {
        let error = parse_declarations("def broken(:\n    pass\n").expect_err("should not parse");
        let message = error.to_string();
        assert!(message.starts_with("Invalid Python code: "));
        assert!(message.len() > "Invalid Python code: ".len());
    }

    #[test]
    fn inserts_docstring_as_first_body_statement() {
        let code = "def add(a, b):\n    return a + b\n";
        let declarations = parse_declarations(code).expect("should parse");
        let rewritten = insert_docstrings(code, [(&declarations[0], "Add two numbers.")]);

        assert_eq!(
            rewritten,
            "def add(a, b):\n    \"\"\"Add two numbers.\"\"\"\n    return a + b\n"
        );
        let reparsed = parse_declarations(&rewritten).expect("rewritten code should parse");
        assert!(reparsed[0].has_docstring);
    }

    #[test]
    fn keeps_existing_docstrings() {
        let code = "def f():\n    \"\"\"Mine.\"\"\"\n    return 1\n";
        let declarations = parse_declarations(code).expect("should parse");
        let rewritten = insert_docstrings(code, [(&declarations[0], "Theirs.")]);
        assert_eq!(rewritten, code);
    }

    #[test]
    fn splits_one_line_bodies() {
        let code = "def f(): return 1\n";
        let declarations = parse_declarations(code).expect("should parse");
        let rewritten = insert_docstrings(code, [(&declarations[0], "Return one.")]);

        assert_eq!(rewritten, "def f():\n    \"\"\"Return one.\"\"\"\n    return 1\n");
        assert!(parse_declarations(&rewritten).is_ok());
    }

    #[test]
    fn handles_several_declarations_and_awkward_text() {
        let code = "class A:\n    x = 1\n\ndef b():\n    pass\n";
        let declarations = parse_declarations(code).expect("should parse");
        let docs = [
            (&declarations[0], "\"\"\"A class with a \"quoted\" word.\"\"\""),
            (&declarations[1], "Line one.\n    Line two with a \\ slash."),
        ];
        let rewritten = insert_docstrings(code, docs);

        let reparsed = parse_declarations(&rewritten).expect("rewritten code should parse");
        assert!(reparsed.iter().all(|d| d.has_docstring));
        assert!(rewritten.contains("\"\"\"A class with a \\\"quoted\\\" word.\"\"\""));
        assert!(rewritten.contains("    Line two with a \\\\ slash."));
    }

    #[test]
    fn inserts_above_decorated_first_member() {
        let code = "class A:\n    @staticmethod\n    def m():\n        return 1\n";
        let declarations = parse_declarations(code).expect("should parse");
        let rewritten = insert_docstrings(code, [(&declarations[0], "Doc.")]);

        assert_eq!(
            rewritten,
            "class A:\n    \"\"\"Doc.\"\"\"\n    @staticmethod\n    def m():\n        return 1\n"
        );
        let reparsed = parse_declarations(&rewritten).expect("rewritten code should parse");
        assert!(reparsed[0].has_docstring);
    }

    #[test]
    fn body_start_covers_stacked_decorators() {
        let code = "class A:\n    @property\n    @cached\n    def m(self):\n        return 1\n";
        let declarations = parse_declarations(code).expect("should parse");
        assert_eq!(declarations[0].body_start, code.find("@property"));
    }

    #[test]
    fn keeps_crlf_line_endings() {
        let code = "def add(a, b):\r\n    return a + b\r\n";
        let declarations = parse_declarations(code).expect("should parse");
        let rewritten = insert_docstrings(code, [(&declarations[0], "Add.\nReturns the sum.")]);

        assert_eq!(
            rewritten,
            "def add(a, b):\r\n    \"\"\"Add.\r\n    Returns the sum.\r\n    \"\"\"\r\n    return a + b\r\n"
        );
        assert!(!rewritten.replace("\r\n", "").contains('\n'));
        assert!(parse_declarations(&rewritten).is_ok());
    }

    #[test]
    fn keeps_crlf_when_splitting_one_line_bodies() {
        let code = "def f(): return 1\r\n";
        let declarations = parse_declarations(code).expect("should parse");
        let rewritten = insert_docstrings(code, [(&declarations[0], "Return one.")]);

        assert_eq!(
            rewritten,
            "def f():\r\n    \"\"\"Return one.\"\"\"\r\n    return 1\r\n"
        );
    }
}
