//! Nesting binds into the groups that contain them.

use std::collections::HashMap;

use indexmap::IndexMap;
use quarry_core::Span;

use crate::config::ColumnConfig;
use crate::engine::Engine;
use crate::output::{QueryArg, QueryCol};

pub(crate) const BIND_NAME: &str = "arg";
pub(crate) const GROUP_NAME: &str = "group";

/// One bind occurrence as the visitor saw it.
#[derive(Debug, Clone)]
pub(crate) struct Bind {
    pub key: String,
    /// The name taken from the column or literal the bind is compared or assigned to.
    pub name: String,
    pub config: ColumnConfig,
    pub db_type: String,
    pub nullable: bool,
    pub position: Span,
    pub can_be_multiple: bool,
}

/// Merges occurrences of the same bind key into one argument with several positions.
///
/// The first non-empty config field wins; a bind used more than once cannot take a slice.
pub(crate) fn merge_binds(engine: Engine, binds: Vec<Bind>) -> Vec<QueryArg> {
    let mut merged: IndexMap<String, Bind> = IndexMap::new();
    let mut positions: HashMap<String, Vec<Span>> = HashMap::new();
    for bind in binds {
        positions
            .entry(bind.key.clone())
            .or_default()
            .push(bind.position);
        match merged.get_mut(&bind.key) {
            Some(existing) => {
                existing.config.fill(&bind.config);
                if existing.name.is_empty() {
                    existing.name = bind.name;
                }
                if existing.db_type.is_empty() {
                    existing.db_type = bind.db_type;
                }
                existing.nullable |= bind.nullable;
                existing.can_be_multiple = false;
            }
            None => {
                merged.insert(bind.key.clone(), bind);
            }
        }
    }
    merged
        .into_values()
        .map(|bind| {
            let positions = positions.remove(&bind.key).unwrap_or_default();
            QueryArg {
                col: column(
                    engine,
                    &bind.config,
                    &bind.db_type,
                    bind.nullable,
                    default_name(&bind),
                ),
                children: Vec::new(),
                positions,
                can_be_multiple: bind.can_be_multiple,
            }
        })
        .collect()
}

/// `:name` binds keep their name. Numbered and anonymous ones take the name recorded for
/// them, or [`BIND_NAME`] when there is none.
fn default_name(bind: &Bind) -> &str {
    let key = bind.key.as_str();
    if !key.starts_with('#') && !key.bytes().all(|b| b.is_ascii_digit()) {
        key
    } else if bind.name.is_empty() {
        BIND_NAME
    } else {
        &bind.name
    }
}

/// Builds the output column for an argument or result column, applying its comment config.
pub(crate) fn column(
    engine: Engine,
    config: &ColumnConfig,
    db_type: &str,
    nullable: bool,
    default_name: &str,
) -> QueryCol {
    let name = if config.name.is_empty() {
        default_name.to_string()
    } else {
        config.name.clone()
    };
    let type_name = if config.type_name.is_empty() {
        engine.rust_type(db_type).to_string()
    } else {
        config.type_name.clone()
    };
    QueryCol {
        name,
        db_name: String::new(),
        db_type: db_type.to_string(),
        type_name,
        nullable: config.nullable.unwrap_or(nullable),
    }
}

/// Attaches binds and smaller groups to the smallest group strictly containing them.
///
/// Only binds that occur once can be nested. Groups that end up empty are dropped and a
/// group with a single child that cannot take a slice is replaced by that child. The
/// result is ordered by position with duplicate names suffixed `_2`, `_3`, ...
pub(crate) fn resolve(binds: Vec<QueryArg>, mut groups: Vec<QueryArg>) -> Vec<QueryArg> {
    groups.sort_by_key(|g| g.span().len());

    let mut binds: Vec<Option<QueryArg>> = binds.into_iter().map(Some).collect();
    let mut built: Vec<Option<QueryArg>> = Vec::with_capacity(groups.len());

    for group in groups {
        let span = group.span();
        let mut children = Vec::new();
        for slot in &mut binds {
            let nests = slot
                .as_ref()
                .is_some_and(|b| b.positions.len() == 1 && span.strictly_contains(b.span()));
            if nests {
                children.extend(slot.take());
            }
        }
        for slot in &mut built {
            let nests = slot
                .as_ref()
                .is_some_and(|g| span.strictly_contains(g.span()));
            if nests {
                children.extend(slot.take().and_then(elide));
            }
        }
        children.sort_by_key(|c| (c.span().start, c.span().end));
        fix_names(&mut children);
        built.push(Some(QueryArg { children, ..group }));
    }

    let mut out: Vec<QueryArg> = binds
        .into_iter()
        .flatten()
        .chain(built.into_iter().flatten().filter_map(elide))
        .collect();
    out.sort_by_key(|a| (a.span().start, a.span().end));
    fix_names(&mut out);
    out
}

fn elide(mut group: QueryArg) -> Option<QueryArg> {
    match group.children.len() {
        0 => None,
        1 if !group.can_be_multiple => group.children.pop(),
        _ => Some(group),
    }
}

fn fix_names(args: &mut [QueryArg]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for arg in args {
        let count = seen.entry(arg.col.name.clone()).or_default();
        *count += 1;
        if *count > 1 {
            arg.col.name = format!("{}_{count}", arg.col.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(name: &str, start: usize, end: usize) -> QueryArg {
        QueryArg {
            col: QueryCol {
                name: name.to_string(),
                ..QueryCol::default()
            },
            positions: vec![Span::new(start, end)],
            ..QueryArg::default()
        }
    }

    fn group(start: usize, end: usize, multiple: bool) -> QueryArg {
        QueryArg {
            can_be_multiple: multiple,
            ..bind(GROUP_NAME, start, end)
        }
    }

    fn names(args: &[QueryArg]) -> Vec<&str> {
        args.iter().map(|a| a.col.name.as_str()).collect()
    }

    #[test]
    fn test_binds_nest_into_smallest_group() {
        // (?, (?, ?))
        let binds = vec![bind("arg", 1, 3), bind("arg", 6, 8), bind("arg", 10, 12)];
        let groups = vec![group(0, 14, false), group(5, 13, false)];
        let out = resolve(binds, groups);
        assert_eq!(out.len(), 1);
        let outer = &out[0];
        assert_eq!(names(&outer.children), ["arg", "group"]);
        assert_eq!(names(&outer.children[1].children), ["arg", "arg_2"]);
    }

    #[test]
    fn test_single_child_group_is_elided() {
        let out = resolve(vec![bind("id", 10, 12)], vec![group(9, 13, false)]);
        assert_eq!(out, vec![bind("id", 10, 12)]);

        let out = resolve(vec![bind("id", 10, 12)], vec![group(9, 13, true)]);
        assert_eq!(out[0].children.len(), 1);
        assert!(out[0].can_be_multiple);
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let out = resolve(vec![bind("a", 0, 2)], vec![group(5, 9, false)]);
        assert_eq!(names(&out), ["a"]);
    }

    #[test]
    fn test_repeated_binds_stay_top_level() {
        let mut twice = bind("a", 1, 3);
        twice.positions.push(Span::new(20, 22));
        let out = resolve(vec![twice, bind("b", 5, 7)], vec![group(0, 10, false)]);
        assert_eq!(names(&out), ["a", "b"]);
    }

    #[test]
    fn test_duplicate_names_get_suffixes() {
        let out = resolve(
            vec![bind("arg", 0, 2), bind("arg", 5, 7), bind("arg", 9, 11)],
            vec![],
        );
        assert_eq!(names(&out), ["arg", "arg_2", "arg_3"]);
    }

    #[test]
    fn test_merge_binds_by_key() {
        let occurrence = |key: &str, at: usize, name: &str| Bind {
            key: key.to_string(),
            name: String::new(),
            config: ColumnConfig::named(name),
            db_type: String::from("INTEGER"),
            nullable: false,
            position: Span::new(at, at + 2),
            can_be_multiple: true,
        };
        let merged = merge_binds(
            Engine::Sqlite,
            vec![
                occurrence("1", 0, ""),
                occurrence("2", 5, "b"),
                occurrence("1", 10, "a"),
            ],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].col.name, "a");
        assert_eq!(merged[0].positions, vec![Span::new(0, 2), Span::new(10, 12)]);
        assert!(!merged[0].can_be_multiple);
        assert_eq!(merged[0].col.type_name, "i64");
        assert!(merged[1].can_be_multiple);
    }

    #[test]
    fn test_bind_names() {
        let occurrence = |key: &str, name: &str| Bind {
            key: key.to_string(),
            name: name.to_string(),
            config: ColumnConfig::default(),
            db_type: String::from("TEXT"),
            nullable: false,
            position: Span::new(0, 1),
            can_be_multiple: false,
        };
        let merged = merge_binds(
            Engine::Sqlite,
            vec![
                occurrence("#1", "email"),
                occurrence("2", ""),
                occurrence("user", "name"),
                occurrence("3", ""),
                occurrence("3", "title"),
            ],
        );
        assert_eq!(names(&merged), ["email", "arg", "user", "title"]);
    }
}
