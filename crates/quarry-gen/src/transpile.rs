//! Statement splitting and the per-file and per-folder entry points.

use std::path::Path;

use quarry_core::lexer::CommentKind;
use quarry_core::{Lexer, Parser, Span, TokenKind};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::{split_name, QueryConfig};
use crate::engine::Engine;
use crate::error::{GenError, Result};
use crate::output::{ParsedQuery, QueryFile, QueryFolder};
use crate::visitor::Visitor;
use crate::walk;

/// Splits `source` at every `;` outside parentheses.
///
/// Each piece runs from the end of the previous `;` up to and including its own, so the
/// comments between two statements belong to the second. Pieces holding nothing but
/// whitespace and comments are dropped.
pub(crate) fn split(source: &str) -> Vec<Span> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut depth = 0_usize;
    let mut empty = true;
    for token in Lexer::new(source).tokenize() {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Semicolon if depth == 0 => {
                if !empty {
                    pieces.push(Span::new(start, token.span.end));
                }
                start = token.span.end;
                empty = true;
                continue;
            }
            TokenKind::Eof => {
                if !empty {
                    pieces.push(Span::new(start, source.len()));
                }
                break;
            }
            _ => {}
        }
        empty = false;
    }
    pieces
}

/// Transpiles SQL files against one catalog for one engine.
///
/// ```rust
/// use quarry_gen::{Catalog, Engine, Transpiler};
///
/// let catalog = Catalog::from_json(
///     r#"{"tables": [{"name": "users", "columns": [{"name": "id", "type": "INTEGER"}]}]}"#,
/// )
/// .unwrap();
/// let transpiler = Transpiler::new(Engine::Sqlite, catalog);
/// let queries = transpiler
///     .parse_queries("-- AllUsers\nSELECT id FROM users WHERE id > ?;")
///     .unwrap();
/// assert_eq!(queries[0].name, "AllUsers");
/// assert_eq!(queries[0].sql, r#"SELECT "id" FROM "users" WHERE "id" > ?1"#);
/// ```
#[derive(Debug, Clone)]
pub struct Transpiler {
    engine: Engine,
    catalog: Catalog,
}

impl Transpiler {
    #[must_use]
    pub const fn new(engine: Engine, catalog: Catalog) -> Self {
        Self { engine, catalog }
    }

    #[must_use]
    pub const fn engine(&self) -> Engine {
        self.engine
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Transpiles every statement in `sql`.
    ///
    /// A failing statement does not stop the ones after it; all failures are reported
    /// together once the whole text has been read.
    ///
    /// # Errors
    ///
    /// Returns the error of the only failing statement, or [`GenError::Multiple`] when
    /// several fail. Spans are relative to `sql`.
    pub fn parse_queries(&self, sql: &str) -> Result<Vec<ParsedQuery>> {
        let mut queries = Vec::new();
        let mut errors = Vec::new();
        for piece in split(sql) {
            match self.statement(piece.text(sql)) {
                Ok(query) => queries.push(query),
                Err(e) => {
                    let e = e.offset(piece.start);
                    warn!(error = %e, "statement skipped");
                    errors.push(e);
                }
            }
        }
        GenError::collect(errors).map_or(Ok(queries), Err)
    }

    fn statement(&self, sql: &str) -> Result<ParsedQuery> {
        let mut parser = Parser::new(sql);
        let statement = parser.parse_statement()?;
        let comments = parser.comments();
        let start = statement.span().start;
        let (name, config) = comments
            .iter()
            .rev()
            .find(|c| c.kind == CommentKind::Line && c.span.end <= start)
            .map_or(("", ""), |c| split_name(&c.text));
        debug!(name, "transpiling statement");
        Visitor::new(self.engine, &self.catalog, sql, comments).transpile(
            &statement,
            name,
            &QueryConfig::parse(config),
        )
    }

    /// Transpiles one file.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Io`] if the file cannot be read, or the statement errors wrapped
    /// in [`GenError::File`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<QueryFile> {
        let path = path.as_ref();
        let sql = std::fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let queries = self.parse_queries(&sql).map_err(|source| GenError::File {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        debug!(path = %path.display(), queries = queries.len(), "file transpiled");
        Ok(QueryFile {
            path: path.to_path_buf(),
            queries,
        })
    }

    /// Walks each folder recursively and transpiles every `*.sql` file except `*.bob.sql`.
    ///
    /// A failing file does not stop the ones after it.
    ///
    /// # Errors
    ///
    /// Returns the error of the only failing folder or file, or [`GenError::Multiple`] with
    /// one error per failure.
    pub fn parse_folders<P: AsRef<Path>>(&self, folders: &[P]) -> Result<Vec<QueryFolder>> {
        let mut out = Vec::new();
        let mut errors = Vec::new();
        for root in folders {
            let found = match walk::sql_folders(root.as_ref()) {
                Ok(found) => found,
                Err(e) => {
                    warn!(error = %e, "folder skipped");
                    errors.push(e);
                    continue;
                }
            };
            for (path, files) in found {
                let mut parsed = Vec::with_capacity(files.len());
                for file in &files {
                    match self.parse_file(file) {
                        Ok(query_file) => parsed.push(query_file),
                        Err(e) => {
                            warn!(path = %file.display(), error = %e, "file skipped");
                            errors.push(e);
                        }
                    }
                }
                out.push(QueryFolder {
                    path,
                    files: parsed,
                });
            }
        }
        if let Some(e) = GenError::collect(errors) {
            return Err(e);
        }
        info!(
            folders = out.len(),
            files = out.iter().map(|f| f.files.len()).sum::<usize>(),
            engine = %self.engine,
            "transpiled"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::testing::catalog;

    fn pieces(sql: &str) -> Vec<&str> {
        split(sql).into_iter().map(|s| s.text(sql)).collect()
    }

    #[test]
    fn test_split_at_top_level_semicolons() {
        assert_eq!(
            pieces("SELECT 1; SELECT (';'); -- trailing\n"),
            ["SELECT 1;", " SELECT (';');"]
        );
        assert_eq!(pieces(";;  ;"), Vec::<&str>::new());
        assert_eq!(pieces("SELECT 1"), ["SELECT 1"]);
    }

    #[test]
    fn test_names_and_configs_come_from_line_comments() {
        let transpiler = Transpiler::new(Engine::Sqlite, catalog());
        let queries = transpiler
            .parse_queries(
                "-- ignored\n-- UserNames User:Users\nSELECT name FROM users;\n\n-- PostTitles ::false\nSELECT title FROM posts;",
            )
            .unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].name, "UserNames");
        assert_eq!(queries[0].config.row_name, "User");
        assert_eq!(queries[0].config.row_slice_name, "Users");
        assert_eq!(queries[0].sql, "SELECT \"name\" FROM \"users\"");
        assert_eq!(queries[1].name, "PostTitles");
        assert_eq!(queries[1].config.row_name, "PostTitlesRow");
        assert!(!queries[1].config.generate_row);
    }

    #[test]
    fn test_errors_point_into_the_file_and_do_not_stop_later_statements() {
        let transpiler = Transpiler::new(Engine::Sqlite, catalog());
        let sql = "SELECT id FROM users;\nSELECT nope FROM users;\nSELECT gone FROM users;";
        let err = transpiler.parse_queries(sql).unwrap_err();
        let GenError::Multiple(errors) = err else {
            panic!("expected several errors, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
        let span = errors[0].span().unwrap();
        assert_eq!(span.text(sql), "nope");
        assert_eq!(errors[1].span().unwrap().text(sql), "gone");
    }
}
