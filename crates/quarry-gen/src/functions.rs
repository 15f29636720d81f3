//! Built-in SQL functions: arity, argument types and result typing.

use quarry_core::Span;

use crate::engine::Engine;
use crate::error::{GenError, Result};
use crate::types::{NodeType, NodeTypes};

/// How a function's result type is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Return {
    Fixed(&'static str),
    /// A class and the declared type reported for it.
    Declared(&'static str, &'static str),
    /// `SUM`/`AVG`: `REAL` on `SQLite`, `DECIMAL` on `MySQL`.
    Aggregate,
    /// The type of the first argument whose type is known.
    FirstKnown,
    /// The type of the argument at this position.
    Arg(usize),
    /// `INTEGER` for an integer argument, else `REAL`.
    Numeric,
}

/// How a function's result nullability is derived from its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nullability {
    AnyNullable,
    AllNullable,
    NeverNullable,
    AlwaysNullable,
    /// Nullable when any of the listed arguments is.
    Args(&'static [usize]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Function {
    pub required: usize,
    pub variadic: bool,
    /// Expected argument types; the last one repeats for variadic functions.
    pub args: &'static [&'static str],
    pub ret: Return,
    /// Whether binds passed to this function may be NULL.
    pub args_nullable: bool,
    pub nullable: Nullability,
}

const fn fixed(
    required: usize,
    args: &'static [&'static str],
    ret: &'static str,
    nullable: Nullability,
) -> Function {
    Function {
        required,
        variadic: false,
        args,
        ret: Return::Fixed(ret),
        args_nullable: false,
        nullable,
    }
}

const fn variadic(mut f: Function) -> Function {
    f.variadic = true;
    f
}

const fn returning(mut f: Function, ret: Return) -> Function {
    f.ret = ret;
    f
}

const fn nullable_args(mut f: Function) -> Function {
    f.args_nullable = true;
    f
}

use Nullability::{AllNullable, AlwaysNullable, AnyNullable, NeverNullable};

/// Looks up a function by name, ignoring ASCII case.
pub(crate) fn lookup(engine: Engine, name: &str) -> Option<Function> {
    let f = match name.to_ascii_lowercase().as_str() {
        "abs" => returning(fixed(1, &[""], "", AnyNullable), Return::Numeric),
        "changes" => fixed(0, &[], "INTEGER", NeverNullable),
        "char" => variadic(fixed(0, &["INTEGER"], "TEXT", AnyNullable)),
        "coalesce" => nullable_args(variadic(returning(
            fixed(1, &[""], "", AllNullable),
            Return::FirstKnown,
        ))),
        // SQLite's concat() skips NULLs, MySQL's CONCAT is NULL if any argument is.
        "concat" => variadic(fixed(
            1,
            &["TEXT"],
            "TEXT",
            match engine {
                Engine::Sqlite => NeverNullable,
                Engine::Mysql => AnyNullable,
            },
        )),
        "concat_ws" => variadic(fixed(2, &["TEXT", "TEXT"], "TEXT", Nullability::Args(&[0]))),
        "format" | "printf" => variadic(fixed(1, &["TEXT", ""], "TEXT", Nullability::Args(&[0]))),
        "glob" => fixed(2, &["TEXT", "TEXT"], "BOOLEAN", AnyNullable),
        "hex" => fixed(1, &[""], "TEXT", NeverNullable),
        "ifnull" => nullable_args(returning(
            fixed(2, &["", ""], "", AllNullable),
            Return::FirstKnown,
        )),
        "iif" => returning(
            fixed(3, &["BOOLEAN", "", ""], "", Nullability::Args(&[1, 2])),
            Return::Arg(1),
        ),
        "instr" => fixed(2, &["TEXT", "TEXT"], "INTEGER", AnyNullable),
        "length" => fixed(1, &[""], "INTEGER", AnyNullable),
        "lower" | "upper" | "unhex" => fixed(1, &["TEXT"], "TEXT", AnyNullable),
        "ltrim" | "rtrim" | "trim" => fixed(1, &["TEXT", "TEXT"], "TEXT", AnyNullable),
        "nullif" => returning(fixed(2, &["", ""], "", AlwaysNullable), Return::Arg(0)),
        "random" => fixed(0, &[], "INTEGER", NeverNullable),
        "replace" => fixed(3, &["TEXT", "TEXT", "TEXT"], "TEXT", AnyNullable),
        "round" => fixed(1, &["REAL", "INTEGER"], "REAL", AnyNullable),
        "substr" | "substring" => fixed(2, &["TEXT", "INTEGER", "INTEGER"], "TEXT", AnyNullable),
        "typeof" => fixed(1, &[""], "TEXT", NeverNullable),
        "unicode" => fixed(1, &["TEXT"], "INTEGER", AnyNullable),
        "count" => returning(
            fixed(0, &[""], "", NeverNullable),
            Return::Declared("INTEGER", "BIGINT"),
        ),
        "sum" | "avg" => returning(
            fixed(1, &[""], "", AlwaysNullable),
            Return::Aggregate,
        ),
        "total" => fixed(1, &[""], "REAL", NeverNullable),
        "min" | "max" => variadic(returning(
            fixed(1, &[""], "", AlwaysNullable),
            Return::FirstKnown,
        )),
        "group_concat" => fixed(1, &["", "TEXT"], "TEXT", AlwaysNullable),
        "date" | "time" | "datetime" => variadic(fixed(0, &["TEXT", "TEXT"], "TEXT", AnyNullable)),
        "julianday" | "unixepoch" => variadic(fixed(0, &["TEXT", "TEXT"], "REAL", AnyNullable)),
        "strftime" => variadic(fixed(1, &["TEXT", "TEXT"], "TEXT", AnyNullable)),
        "json" => fixed(1, &[""], "JSON", AnyNullable),
        "json_extract" => variadic(fixed(2, &["", "TEXT"], "", AlwaysNullable)),
        "values" => returning(fixed(1, &[""], "", AnyNullable), Return::Arg(0)),
        _ => return None,
    };
    Some(f)
}

fn numeric(class: &str) -> bool {
    matches!(class, "INTEGER" | "REAL" | "NUMERIC" | "BOOLEAN")
}

impl Function {
    /// The type expected at argument position `i`; empty accepts anything.
    pub(crate) fn expected(&self, i: usize) -> &'static str {
        match self.args.get(i).copied() {
            Some(t) => t,
            None if self.variadic => self.args.last().copied().unwrap_or_default(),
            None => "",
        }
    }

    /// Checks the argument count and the classes of the arguments whose type is known.
    pub(crate) fn check(&self, name: &str, args: &[NodeTypes], span: Span) -> Result<()> {
        if args.len() < self.required {
            return Err(GenError::argument(
                span,
                format!("too few arguments for function {name}"),
            ));
        }
        if !self.variadic && args.len() > self.args.len() {
            return Err(GenError::argument(
                span,
                format!("too many arguments for function {name}"),
            ));
        }
        for (i, arg) in args.iter().enumerate() {
            let expected = self.expected(i);
            let got = arg.confirmed();
            if expected.is_empty() || got.is_empty() || expected.eq_ignore_ascii_case(got) {
                continue;
            }
            if numeric(expected) && numeric(got) {
                continue;
            }
            return Err(GenError::conflict(
                span,
                format!(
                    "function {name} expects {expected} at position {}, got {got}",
                    i + 1
                ),
            ));
        }
        Ok(())
    }

    /// The result type for arguments of the given types and nullabilities.
    pub(crate) fn result(&self, engine: Engine, args: &[NodeTypes]) -> NodeTypes {
        let types = match self.ret {
            Return::Fixed(t) => NodeTypes::from(NodeType::new(t)),
            Return::Declared(class, declared) => {
                NodeTypes::from(NodeType::new(class).declared(declared))
            }
            Return::Aggregate => NodeTypes::from(match engine {
                Engine::Sqlite => NodeType::new("REAL"),
                Engine::Mysql => NodeType::new("NUMERIC").declared("DECIMAL"),
            }),
            Return::FirstKnown => args
                .iter()
                .find(|a| !a.is_unknown())
                .cloned()
                .unwrap_or_else(|| NodeTypes::from(NodeType::new(""))),
            Return::Arg(i) => args
                .get(i)
                .filter(|a| !a.is_unknown())
                .cloned()
                .unwrap_or_else(|| NodeTypes::from(NodeType::new(""))),
            Return::Numeric => {
                let class = match args.first().map(NodeTypes::confirmed) {
                    Some("INTEGER") => "INTEGER",
                    _ => "REAL",
                };
                NodeTypes::from(NodeType::new(class))
            }
        };
        let nullables: Vec<bool> = args.iter().map(NodeTypes::is_nullable).collect();
        types.with_nullable(self.nullable.compute(&nullables))
    }
}

impl Nullability {
    fn compute(self, args: &[bool]) -> bool {
        match self {
            Self::AnyNullable => args.iter().any(|n| *n),
            Self::AllNullable => !args.is_empty() && args.iter().all(|n| *n),
            Self::NeverNullable => false,
            Self::AlwaysNullable => true,
            Self::Args(positions) => positions
                .iter()
                .any(|i| args.get(*i).copied().unwrap_or_default()),
        }
    }
}
