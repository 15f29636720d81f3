//! Syntax tree produced by [`Parser`](crate::parser::Parser).
//!
//! Every node carries the byte [`Span`](crate::lexer::Span) it was parsed from, so
//! later passes can address nodes by position and rewrite the original text.

mod expression;
mod statement;

pub use expression::{
    BinaryOp, Expr, ExprKind, FrameBound, FrameExclude, FrameSpec, FrameUnits, FunctionArgs,
    FunctionCall, Ident, InList, LikeOp, Literal, ObjectName, Over, UnaryOp, WhenClause,
    WindowSpec,
};
pub use statement::{
    Assignment, Compound, CompoundOp, ConflictResolution, ConflictTarget, Cte, Delete, IndexedBy,
    Insert, InsertSource, Join, JoinConstraint, JoinOperator, Limit, NamedWindow, OrderBy,
    OrderingTerm, Query, ResultColumn, Returning, RowAlias, Select, SelectCore, Statement,
    TableFactor, TableWithJoins, Update, Upsert, UpsertAction, ValuesList, ValuesRow, With,
};
