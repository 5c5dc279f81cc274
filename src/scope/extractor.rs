//! Extract lexical scopes (functions, async functions, classes) from Python source.
//!
//! Each scope's line range is `[min_line, max_line + 1)`, where min/max are
//! taken over the start line of every node in the definition's subtree,
//! decorators included. Line numbers are zero-based.
//!
//! Only start lines count: a trailing multi-line string ends the range on
//! the line where the string begins.
//!
//! Keyword-argument, match-pattern and type-parameter nodes are not visited.
//! Each sits on the line of an expression or statement that is visited
//! (the call, the `case` clause, the `def`/`class` header), so skipping them
//! leaves every range unchanged.

use crate::utils::error::ParseError;
use rustpython_ast::{self as ast, Expr, Stmt};
use rustpython_parser::{parse, Mode};
use std::ops::Range;

/// Kind of scope-introducing definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Function,
    AsyncFunction,
    Class,
}

/// A scope found in a source file, before stats are attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDef {
    /// Unqualified definition name
    pub name: String,

    pub kind: ScopeKind,

    /// Zero-based half-open line range
    pub range: Range<usize>,
}

/// Parse `source` and return every scope definition, nested ones included
///
/// **Public** - main entry point for scope extraction
///
/// Definitions are returned in pre-order: an enclosing scope always comes
/// before the scopes nested in it.
///
/// # Errors
/// * `ParseError::Syntax` - `source` is not valid Python
pub fn extract_scopes(source: &str, path: &str) -> Result<Vec<ScopeDef>, ParseError> {
    let parsed = parse(source, Mode::Module, path).map_err(|e| ParseError::Syntax {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let ast::Mod::Module(module) = parsed else {
        return Ok(Vec::new());
    };

    let lines = LineMap::new(source);
    let mut scopes = Vec::new();
    collect_scopes(&module.body, &lines, &mut scopes);
    Ok(scopes)
}

/// The three scope-bearing statement kinds, and everything else
enum Definition<'a> {
    Function(&'a ast::StmtFunctionDef),
    AsyncFunction(&'a ast::StmtAsyncFunctionDef),
    Class(&'a ast::StmtClassDef),
    Other,
}

impl<'a> Definition<'a> {
    fn of(stmt: &'a Stmt) -> Self {
        match stmt {
            Stmt::FunctionDef(def) => Definition::Function(def),
            Stmt::AsyncFunctionDef(def) => Definition::AsyncFunction(def),
            Stmt::ClassDef(def) => Definition::Class(def),
            _ => Definition::Other,
        }
    }
}

/// Walk statements in pre-order, recording each definition
///
/// **Private** - recursion driver for extract_scopes
fn collect_scopes(body: &[Stmt], lines: &LineMap, scopes: &mut Vec<ScopeDef>) {
    for stmt in body {
        let found = match Definition::of(stmt) {
            Definition::Function(def) => Some((def.name.as_str(), ScopeKind::Function)),
            Definition::AsyncFunction(def) => Some((def.name.as_str(), ScopeKind::AsyncFunction)),
            Definition::Class(def) => Some((def.name.as_str(), ScopeKind::Class)),
            Definition::Other => None,
        };

        if let Some((name, kind)) = found {
            let mut span = LineSpan::new(lines);
            span.visit_stmt(stmt);
            scopes.push(ScopeDef {
                name: name.to_string(),
                kind,
                range: span.range(),
            });
        }

        for nested in child_bodies(stmt) {
            collect_scopes(nested, lines, scopes);
        }
    }
}

/// Statement blocks directly nested in `stmt`
///
/// **Private** - definitions may appear inside any compound statement
fn child_bodies(stmt: &Stmt) -> Vec<&[Stmt]> {
    match stmt {
        Stmt::FunctionDef(s) => vec![s.body.as_slice()],
        Stmt::AsyncFunctionDef(s) => vec![s.body.as_slice()],
        Stmt::ClassDef(s) => vec![s.body.as_slice()],
        Stmt::For(s) => vec![s.body.as_slice(), s.orelse.as_slice()],
        Stmt::AsyncFor(s) => vec![s.body.as_slice(), s.orelse.as_slice()],
        Stmt::While(s) => vec![s.body.as_slice(), s.orelse.as_slice()],
        Stmt::If(s) => vec![s.body.as_slice(), s.orelse.as_slice()],
        Stmt::With(s) => vec![s.body.as_slice()],
        Stmt::AsyncWith(s) => vec![s.body.as_slice()],
        Stmt::Match(s) => s.cases.iter().map(|case| case.body.as_slice()).collect(),
        Stmt::Try(s) => try_bodies(&s.body, &s.handlers, &s.orelse, &s.finalbody),
        Stmt::TryStar(s) => try_bodies(&s.body, &s.handlers, &s.orelse, &s.finalbody),
        _ => Vec::new(),
    }
}

fn try_bodies<'a>(
    body: &'a [Stmt],
    handlers: &'a [ast::ExceptHandler],
    orelse: &'a [Stmt],
    finalbody: &'a [Stmt],
) -> Vec<&'a [Stmt]> {
    let mut bodies = vec![body];
    for handler in handlers {
        let ast::ExceptHandler::ExceptHandler(h) = handler;
        bodies.push(&h.body);
    }
    bodies.push(orelse);
    bodies.push(finalbody);
    bodies
}

/// Byte offset to zero-based line number mapping
struct LineMap {
    starts: Vec<usize>,
}

impl LineMap {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }
}

/// Minimum and maximum start line over a definition's subtree
struct LineSpan<'a> {
    lines: &'a LineMap,
    min: Option<usize>,
    max: usize,
}

impl<'a> LineSpan<'a> {
    fn new(lines: &'a LineMap) -> Self {
        Self {
            lines,
            min: None,
            max: 0,
        }
    }

    fn range(&self) -> Range<usize> {
        let start = self.min.unwrap_or(0);
        start..self.max.max(start) + 1
    }

    fn mark(&mut self, offset: usize) {
        let line = self.lines.line_of(offset);
        self.min = Some(self.min.map_or(line, |min| min.min(line)));
        self.max = self.max.max(line);
    }

    fn visit_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_exprs(&s.decorator_list);
                self.visit_arguments(&s.args);
                self.visit_opt_expr(&s.returns);
                self.visit_body(&s.body);
            }
            Stmt::AsyncFunctionDef(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_exprs(&s.decorator_list);
                self.visit_arguments(&s.args);
                self.visit_opt_expr(&s.returns);
                self.visit_body(&s.body);
            }
            Stmt::ClassDef(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_exprs(&s.decorator_list);
                self.visit_exprs(&s.bases);
                self.visit_keywords(&s.keywords);
                self.visit_body(&s.body);
            }
            Stmt::Return(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_opt_expr(&s.value);
            }
            Stmt::Delete(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_exprs(&s.targets);
            }
            Stmt::Assign(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_exprs(&s.targets);
                self.visit_expr(&s.value);
            }
            Stmt::AugAssign(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_expr(&s.target);
                self.visit_expr(&s.value);
            }
            Stmt::AnnAssign(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_expr(&s.target);
                self.visit_expr(&s.annotation);
                self.visit_opt_expr(&s.value);
            }
            Stmt::For(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_expr(&s.target);
                self.visit_expr(&s.iter);
                self.visit_body(&s.body);
                self.visit_body(&s.orelse);
            }
            Stmt::AsyncFor(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_expr(&s.target);
                self.visit_expr(&s.iter);
                self.visit_body(&s.body);
                self.visit_body(&s.orelse);
            }
            Stmt::While(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_expr(&s.test);
                self.visit_body(&s.body);
                self.visit_body(&s.orelse);
            }
            Stmt::If(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_expr(&s.test);
                self.visit_body(&s.body);
                self.visit_body(&s.orelse);
            }
            Stmt::With(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_with_items(&s.items);
                self.visit_body(&s.body);
            }
            Stmt::AsyncWith(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_with_items(&s.items);
                self.visit_body(&s.body);
            }
            Stmt::Match(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_expr(&s.subject);
                // Patterns sit on their case line, ahead of the case body
                for case in &s.cases {
                    self.visit_opt_expr(&case.guard);
                    self.visit_body(&case.body);
                }
            }
            Stmt::Raise(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_opt_expr(&s.exc);
                self.visit_opt_expr(&s.cause);
            }
            Stmt::Try(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_body(&s.body);
                self.visit_handlers(&s.handlers);
                self.visit_body(&s.orelse);
                self.visit_body(&s.finalbody);
            }
            Stmt::TryStar(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_body(&s.body);
                self.visit_handlers(&s.handlers);
                self.visit_body(&s.orelse);
                self.visit_body(&s.finalbody);
            }
            Stmt::Assert(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_expr(&s.test);
                self.visit_opt_expr(&s.msg);
            }
            Stmt::Import(s) => {
                self.mark(s.range.start().to_usize());
                for alias in &s.names {
                    self.mark(alias.range.start().to_usize());
                }
            }
            Stmt::ImportFrom(s) => {
                self.mark(s.range.start().to_usize());
                for alias in &s.names {
                    self.mark(alias.range.start().to_usize());
                }
            }
            Stmt::Global(s) => self.mark(s.range.start().to_usize()),
            Stmt::Nonlocal(s) => self.mark(s.range.start().to_usize()),
            Stmt::Expr(s) => {
                self.mark(s.range.start().to_usize());
                self.visit_expr(&s.value);
            }
            Stmt::Pass(s) => self.mark(s.range.start().to_usize()),
            Stmt::Break(s) => self.mark(s.range.start().to_usize()),
            Stmt::Continue(s) => self.mark(s.range.start().to_usize()),
            // Type aliases are not tracked
            _ => {}
        }
    }

    fn visit_handlers(&mut self, handlers: &[ast::ExceptHandler]) {
        for handler in handlers {
            let ast::ExceptHandler::ExceptHandler(h) = handler;
            self.mark(h.range.start().to_usize());
            self.visit_opt_expr(&h.type_);
            self.visit_body(&h.body);
        }
    }

    fn visit_with_items(&mut self, items: &[ast::WithItem]) {
        for item in items {
            self.visit_expr(&item.context_expr);
            self.visit_opt_expr(&item.optional_vars);
        }
    }

    fn visit_arguments(&mut self, args: &ast::Arguments) {
        for arg in args
            .posonlyargs
            .iter()
            .chain(&args.args)
            .chain(&args.kwonlyargs)
        {
            self.visit_arg(&arg.def);
            self.visit_opt_expr(&arg.default);
        }
        if let Some(arg) = &args.vararg {
            self.visit_arg(arg);
        }
        if let Some(arg) = &args.kwarg {
            self.visit_arg(arg);
        }
    }

    fn visit_arg(&mut self, arg: &ast::Arg) {
        self.mark(arg.range.start().to_usize());
        self.visit_opt_expr(&arg.annotation);
    }

    fn visit_keywords(&mut self, keywords: &[ast::Keyword]) {
        for keyword in keywords {
            self.visit_expr(&keyword.value);
        }
    }

    fn visit_comprehensions(&mut self, generators: &[ast::Comprehension]) {
        for generator in generators {
            self.visit_expr(&generator.target);
            self.visit_expr(&generator.iter);
            self.visit_exprs(&generator.ifs);
        }
    }

    fn visit_exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }

    fn visit_opt_expr(&mut self, expr: &Option<Box<Expr>>) {
        if let Some(expr) = expr {
            self.visit_expr(expr);
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::BoolOp(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_exprs(&e.values);
            }
            Expr::NamedExpr(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.target);
                self.visit_expr(&e.value);
            }
            Expr::BinOp(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.left);
                self.visit_expr(&e.right);
            }
            Expr::UnaryOp(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.operand);
            }
            Expr::Lambda(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_arguments(&e.args);
                self.visit_expr(&e.body);
            }
            Expr::IfExp(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.test);
                self.visit_expr(&e.body);
                self.visit_expr(&e.orelse);
            }
            Expr::Dict(e) => {
                self.mark(e.range.start().to_usize());
                for key in e.keys.iter().flatten() {
                    self.visit_expr(key);
                }
                self.visit_exprs(&e.values);
            }
            Expr::Set(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_exprs(&e.elts);
            }
            Expr::ListComp(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.elt);
                self.visit_comprehensions(&e.generators);
            }
            Expr::SetComp(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.elt);
                self.visit_comprehensions(&e.generators);
            }
            Expr::DictComp(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.key);
                self.visit_expr(&e.value);
                self.visit_comprehensions(&e.generators);
            }
            Expr::GeneratorExp(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.elt);
                self.visit_comprehensions(&e.generators);
            }
            Expr::Await(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.value);
            }
            Expr::Yield(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_opt_expr(&e.value);
            }
            Expr::YieldFrom(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.value);
            }
            Expr::Compare(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.left);
                self.visit_exprs(&e.comparators);
            }
            Expr::Call(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.func);
                self.visit_exprs(&e.args);
                self.visit_keywords(&e.keywords);
            }
            Expr::FormattedValue(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.value);
                self.visit_opt_expr(&e.format_spec);
            }
            Expr::JoinedStr(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_exprs(&e.values);
            }
            Expr::Constant(e) => self.mark(e.range.start().to_usize()),
            Expr::Attribute(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.value);
            }
            Expr::Subscript(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.value);
                self.visit_expr(&e.slice);
            }
            Expr::Starred(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_expr(&e.value);
            }
            Expr::Name(e) => self.mark(e.range.start().to_usize()),
            Expr::List(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_exprs(&e.elts);
            }
            Expr::Tuple(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_exprs(&e.elts);
            }
            Expr::Slice(e) => {
                self.mark(e.range.start().to_usize());
                self.visit_opt_expr(&e.lower);
                self.visit_opt_expr(&e.upper);
                self.visit_opt_expr(&e.step);
            }
        }
    }
}
