//! The run context: one `Lox` per file run or REPL session.
//!
//! Each call to [`Lox::run`] pushes one source string through
//! scan → parse → resolve → interpret.  Globals (and the resolver's hop
//! counts for functions defined earlier) survive between calls; the error
//! flags are cleared by the caller with [`Lox::reset`].

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::expr::ExprIds;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::report::Reporter;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::stmt::Stmt;
use crate::token::Token;

/// Exit code for a scan, parse or resolve error.
pub const EXIT_STATIC_ERROR: i32 = 65;
/// Exit code for an unrecovered runtime error.
pub const EXIT_RUNTIME_ERROR: i32 = 70;
/// Exit code for a bad command line.
pub const EXIT_USAGE: i32 = 64;

pub struct Lox {
    interpreter: Interpreter,
    reporter: Reporter,
    ids: ExprIds,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// Program output to stdout, diagnostics to stderr.
    pub fn new() -> Self {
        Self::with_sinks(io::stdout(), io::stderr())
    }

    /// Program output to `out`, diagnostics to `err`.
    pub fn with_sinks<O, E>(out: O, err: E) -> Self
    where
        O: Write + 'static,
        E: Write + 'static,
    {
        info!("Session created");

        Self {
            interpreter: Interpreter::new(Box::new(out)),
            reporter: Reporter::new(Box::new(err)),
            ids: ExprIds::new(),
        }
    }

    /// Scan, parse, resolve and execute `source`.  Nothing executes if any
    /// static error was reported.
    pub fn run(&mut self, source: &str) {
        let statements: Vec<Stmt> = self.parse(source);

        if self.reporter.had_error() {
            debug!("Skipping execution: syntax errors");
            return;
        }

        Resolver::new(&mut self.interpreter, &mut self.reporter).resolve(&statements);

        if self.reporter.had_error() {
            debug!("Skipping execution: resolution errors");
            return;
        }

        if let Err(e) = self.interpreter.interpret(&statements) {
            self.reporter.report(&e);
        }
    }

    /// Scan and parse `source`, reporting every lexical and syntax error.
    pub fn parse(&mut self, source: &str) -> Vec<Stmt> {
        let tokens: Vec<Token> = self.scan(source);

        Parser::new(&tokens, &mut self.ids, &mut self.reporter).parse()
    }

    /// Parse and resolve `source` as one expression, evaluate it and return
    /// the value's printed form.  Errors are reported; `None` means one occurred.
    pub fn evaluate(&mut self, source: &str) -> Option<String> {
        let tokens: Vec<Token> = self.scan(source);

        let expr = Parser::new(&tokens, &mut self.ids, &mut self.reporter).parse_expression();

        if self.reporter.had_error() {
            return None;
        }

        let expr = expr?;

        Resolver::new(&mut self.interpreter, &mut self.reporter).resolve_expression(&expr);

        if self.reporter.had_error() {
            debug!("Skipping evaluation: resolution errors");
            return None;
        }

        match self.interpreter.evaluate(&expr) {
            Ok(value) => Some(value.to_string()),
            Err(e) => {
                self.reporter.report(&e);
                None
            }
        }
    }

    /// Every token of `source`, reporting lexical errors along the way.
    pub fn scan(&mut self, source: &str) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();

        for result in Scanner::new(source) {
            match result {
                Ok(token) => tokens.push(token),
                Err(e) => self.reporter.report(&e),
            }
        }

        debug!("Scanned {} tokens", tokens.len());

        tokens
    }

    /// Clear the error flags, keeping every global binding.
    pub fn reset(&mut self) {
        self.reporter.reset();
    }

    pub fn had_error(&self) -> bool {
        self.reporter.had_error()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.reporter.had_runtime_error()
    }

    /// Process exit code for what has been observed since the last reset.
    pub fn exit_code(&self) -> i32 {
        if self.had_error() {
            EXIT_STATIC_ERROR
        } else if self.had_runtime_error() {
            EXIT_RUNTIME_ERROR
        } else {
            0
        }
    }
}

/// An in‑memory sink that can be handed to [`Lox::with_sinks`] and read back
/// afterwards through a clone.
#[derive(Clone, Default)]
pub struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Captured text split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
