//! Candidate types and their unification.
//!
//! A node's type is a set of candidates. Every constraint the visitor learns narrows the set
//! by intersection; an empty database type is a wildcard that matches anything.

/// One candidate type for a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeType {
    /// The type class used for matching, e.g. `INTEGER`. Empty matches anything.
    pub db_type: String,
    /// The declared type the candidate came from, e.g. `VARCHAR`, when known.
    pub declared: String,
    /// `None` until something says whether the value can be NULL.
    pub nullable: Option<bool>,
}

impl NodeType {
    /// A not-null candidate of `db_type`.
    #[must_use]
    pub fn new(db_type: impl Into<String>) -> Self {
        Self {
            db_type: db_type.into(),
            declared: String::new(),
            nullable: Some(false),
        }
    }

    #[must_use]
    pub fn nullable(db_type: impl Into<String>) -> Self {
        Self {
            nullable: Some(true),
            ..Self::new(db_type)
        }
    }

    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    #[must_use]
    pub fn declared(mut self, declared: impl Into<String>) -> Self {
        self.declared = declared.into();
        self
    }

    fn matches(&self, other: &Self) -> bool {
        self.db_type.is_empty()
            || other.db_type.is_empty()
            || self.db_type.eq_ignore_ascii_case(&other.db_type)
    }

    /// The common refinement of two candidates, or `None` if they are incompatible.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Option<Self> {
        if !self.matches(other) {
            return None;
        }
        let db_type = if self.db_type.is_empty() {
            other.db_type.clone()
        } else {
            self.db_type.clone()
        };
        let declared = if self.declared.is_empty() {
            other.declared.clone()
        } else {
            self.declared.clone()
        };
        Some(Self {
            db_type,
            declared,
            nullable: merge_nullable(self.nullable, other.nullable),
        })
    }
}

const fn merge_nullable(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a || b),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// The candidate set of a node. An empty set means nothing is known yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTypes(pub Vec<NodeType>);

impl From<NodeType> for NodeTypes {
    fn from(t: NodeType) -> Self {
        Self(vec![t])
    }
}

impl FromIterator<NodeType> for NodeTypes {
    fn from_iter<I: IntoIterator<Item = NodeType>>(iter: I) -> Self {
        let mut types = Self::default();
        for t in iter {
            types.push(t);
        }
        types
    }
}

impl NodeTypes {
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds a candidate, folding it into an existing one of the same class.
    pub fn push(&mut self, t: NodeType) {
        if let Some(existing) = self
            .0
            .iter_mut()
            .find(|e| e.db_type.eq_ignore_ascii_case(&t.db_type))
        {
            existing.nullable = merge_nullable(existing.nullable, t.nullable);
            if existing.declared.is_empty() {
                existing.declared = t.declared;
            }
        } else {
            self.0.push(t);
        }
    }

    /// Intersects two candidate sets. An unknown side leaves the other unchanged.
    ///
    /// Returns `None` when both sides are known and share no candidate.
    #[must_use]
    pub fn unify(&self, other: &Self) -> Option<Self> {
        if self.is_unknown() {
            return Some(other.clone());
        }
        if other.is_unknown() {
            return Some(self.clone());
        }
        let merged: Self = other
            .0
            .iter()
            .flat_map(|t| self.0.iter().filter_map(move |c| c.merge(t)))
            .collect();
        (!merged.is_unknown()).then_some(merged)
    }

    /// The type class every candidate agrees on, or `""`.
    #[must_use]
    pub fn confirmed(&self) -> &str {
        let mut types = self.0.iter().map(|t| t.db_type.as_str());
        match types.next() {
            Some(first) if types.all(|t| t.eq_ignore_ascii_case(first)) => first,
            _ => "",
        }
    }

    /// The declared type when all candidates agree on it, else the confirmed class.
    #[must_use]
    pub fn type_name(&self) -> &str {
        let mut declared = self.0.iter().map(|t| t.declared.as_str());
        match declared.next() {
            Some(first) if !first.is_empty() && declared.all(|t| t.eq_ignore_ascii_case(first)) => {
                first
            }
            _ => self.confirmed(),
        }
    }

    /// Whether any candidate can be NULL.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.0.iter().any(|t| t.nullable == Some(true))
    }

    /// Forces the nullability of every candidate.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        for t in &mut self.0 {
            t.nullable = Some(nullable);
        }
        self
    }

    /// Clears nullability so a later merge takes it from the other side.
    #[must_use]
    pub fn without_nullability(mut self) -> Self {
        for t in &mut self.0 {
            t.nullable = None;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(types: &[&str]) -> NodeTypes {
        types.iter().map(|t| NodeType::new(*t)).collect()
    }

    #[test]
    fn test_intersection_narrows() {
        let a = set(&["INTEGER", "REAL"]);
        let b = set(&["REAL", "TEXT"]);
        assert_eq!(a.unify(&b).unwrap(), set(&["REAL"]));
        assert!(set(&["TEXT"]).unify(&set(&["BLOB"])).is_none());
    }

    #[test]
    fn test_wildcard_and_unknown() {
        let null = NodeTypes::from(NodeType::nullable(""));
        let merged = null.unify(&set(&["TEXT"])).unwrap();
        assert_eq!(merged.confirmed(), "TEXT");
        assert!(merged.is_nullable());
        assert_eq!(NodeTypes::default().unify(&set(&["BLOB"])).unwrap(), set(&["BLOB"]));
    }

    #[test]
    fn test_nullability_merges_with_or() {
        let a = NodeTypes::from(NodeType::new("INTEGER"));
        let b = NodeTypes::from(NodeType::nullable("INTEGER"));
        assert!(a.unify(&b).unwrap().is_nullable());
        let unset = NodeTypes::from(NodeType::nullable("INTEGER")).without_nullability();
        assert!(!unset.unify(&a).unwrap().is_nullable());
    }

    #[test]
    fn test_type_name_prefers_declared() {
        let t = NodeTypes::from(NodeType::new("TEXT").declared("VARCHAR"));
        assert_eq!(t.type_name(), "VARCHAR");
        let mixed: NodeTypes = [NodeType::new("TEXT"), NodeType::new("BLOB")]
            .into_iter()
            .collect();
        assert_eq!(mixed.confirmed(), "");
        assert_eq!(mixed.type_name(), "");
    }
}
