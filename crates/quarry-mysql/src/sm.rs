//! `SELECT` modifiers, including the MySQL-only ones.

use quarry_core::clause::{FieldOptions, IntoTarget, LineOptions, SelectInto};
use quarry_core::query::{Modifier, SelectQuery};

pub use quarry_core::mods::sm::*;

/// `HIGH_PRIORITY`.
#[must_use]
pub fn high_priority() -> impl Modifier<SelectQuery> + Clone {
    modifier("HIGH_PRIORITY")
}

/// `STRAIGHT_JOIN` as a statement modifier: tables are joined in `FROM` order.
#[must_use]
pub fn straight() -> impl Modifier<SelectQuery> + Clone {
    modifier("STRAIGHT_JOIN")
}

/// `SQL_SMALL_RESULT`.
#[must_use]
pub fn small_result() -> impl Modifier<SelectQuery> + Clone {
    modifier("SQL_SMALL_RESULT")
}

/// `SQL_BIG_RESULT`.
#[must_use]
pub fn big_result() -> impl Modifier<SelectQuery> + Clone {
    modifier("SQL_BIG_RESULT")
}

/// `SQL_BUFFER_RESULT`.
#[must_use]
pub fn buffer_result() -> impl Modifier<SelectQuery> + Clone {
    modifier("SQL_BUFFER_RESULT")
}

/// `SQL_CALC_FOUND_ROWS`.
#[must_use]
pub fn calc_found_rows() -> impl Modifier<SelectQuery> + Clone {
    modifier("SQL_CALC_FOUND_ROWS")
}

/// `SELECT ... INTO` under construction; applying it replaces any earlier target.
#[derive(Debug, Clone)]
pub struct IntoChain {
    target: IntoTarget,
}

/// `INTO @var, ...`.
pub fn into<I, S>(vars: I) -> IntoChain
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    IntoChain {
        target: IntoTarget::Variables(vars.into_iter().map(Into::into).collect()),
    }
}

/// `INTO DUMPFILE 'file'`.
pub fn into_dumpfile(file: impl Into<String>) -> IntoChain {
    IntoChain {
        target: IntoTarget::Dumpfile(file.into()),
    }
}

/// `INTO OUTFILE 'file'`; field and line options are set on the chain.
pub fn into_outfile(file: impl Into<String>) -> IntoChain {
    IntoChain {
        target: IntoTarget::Outfile {
            file: file.into(),
            charset: None,
            fields: FieldOptions::default(),
            lines: LineOptions::default(),
        },
    }
}

impl IntoChain {
    /// `CHARACTER SET name`. Ignored unless writing an outfile.
    #[must_use]
    pub fn character_set(mut self, charset: impl Into<String>) -> Self {
        if let IntoTarget::Outfile { charset: c, .. } = &mut self.target {
            *c = Some(charset.into());
        }
        self
    }

    /// `FIELDS TERMINATED BY 'str'`.
    #[must_use]
    pub fn fields_terminated_by(mut self, s: impl Into<String>) -> Self {
        if let IntoTarget::Outfile { fields: f, .. } = &mut self.target {
            f.terminated_by = Some(s.into());
        }
        self
    }

    /// `FIELDS ENCLOSED BY 'str'`.
    #[must_use]
    pub fn fields_enclosed_by(mut self, s: impl Into<String>) -> Self {
        if let IntoTarget::Outfile { fields: f, .. } = &mut self.target {
            f.enclosed_by = Some(s.into());
            f.optionally_enclosed = false;
        }
        self
    }

    /// `FIELDS OPTIONALLY ENCLOSED BY 'str'`.
    #[must_use]
    pub fn fields_optionally_enclosed_by(mut self, s: impl Into<String>) -> Self {
        if let IntoTarget::Outfile { fields: f, .. } = &mut self.target {
            f.enclosed_by = Some(s.into());
            f.optionally_enclosed = true;
        }
        self
    }

    /// `FIELDS ESCAPED BY 'str'`.
    #[must_use]
    pub fn fields_escaped_by(mut self, s: impl Into<String>) -> Self {
        if let IntoTarget::Outfile { fields: f, .. } = &mut self.target {
            f.escaped_by = Some(s.into());
        }
        self
    }

    /// `LINES STARTING BY 'str'`.
    #[must_use]
    pub fn lines_starting_by(mut self, s: impl Into<String>) -> Self {
        if let IntoTarget::Outfile { lines: l, .. } = &mut self.target {
            l.starting_by = Some(s.into());
        }
        self
    }

    /// `LINES TERMINATED BY 'str'`.
    #[must_use]
    pub fn lines_terminated_by(mut self, s: impl Into<String>) -> Self {
        if let IntoTarget::Outfile { lines: l, .. } = &mut self.target {
            l.terminated_by = Some(s.into());
        }
        self
    }
}

impl Modifier<SelectQuery> for IntoChain {
    fn apply(&self, query: &mut SelectQuery) {
        query.into = Some(SelectInto {
            target: self.target.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::query::Query;

    use super::*;

    fn sql(q: &SelectQuery) -> String {
        let (sql, _) = q.build().unwrap();
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_statement_modifiers_keep_order_and_dedupe() {
        let q = crate::select()
            .apply(high_priority())
            .apply(straight())
            .apply(small_result())
            .apply(high_priority())
            .apply(from("t"));
        assert_eq!(
            sql(&q),
            "SELECT HIGH_PRIORITY STRAIGHT_JOIN SQL_SMALL_RESULT * FROM t"
        );
    }

    #[test]
    fn test_into_variables() {
        let q = crate::select()
            .apply(columns(["a".into(), "b".into()]))
            .apply(from("t"))
            .apply(into(["x", "y"]));
        assert_eq!(sql(&q), "SELECT a, b FROM t INTO @x, @y");
    }

    #[test]
    fn test_into_outfile_options() {
        let q = crate::select().apply(from("t")).apply(
            into_outfile("/tmp/out.csv")
                .character_set("utf8mb4")
                .fields_terminated_by(",")
                .fields_optionally_enclosed_by("\"")
                .fields_escaped_by("\\")
                .lines_starting_by(">")
                .lines_terminated_by("\n"),
        );
        let (raw, _) = q.build().unwrap();
        assert!(raw.ends_with(
            "INTO OUTFILE '/tmp/out.csv' CHARACTER SET utf8mb4 \
             FIELDS TERMINATED BY ',' OPTIONALLY ENCLOSED BY '\"' ESCAPED BY '\\\\' \
             LINES STARTING BY '>' TERMINATED BY '\n'"
        ));
    }

    #[test]
    fn test_outfile_options_ignored_for_dumpfile() {
        let q = crate::select()
            .apply(from("t"))
            .apply(into_dumpfile("/tmp/blob").fields_terminated_by(","));
        assert_eq!(sql(&q), "SELECT * FROM t INTO DUMPFILE '/tmp/blob'");
    }
}
