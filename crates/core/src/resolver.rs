//! Path-based lookup over a group's subtree
//!
//! All lookups run over the dotted path of every descendant of the searched
//! group (the group itself is never a candidate), in depth-first insertion
//! order. Every mode accepts the absolute path (`Root.G.X`) or the path
//! relative to the searched group (`G.X`).
//!
//! ## Table of Contents
//! 1. PathResolver - exact, prefix and wildcard lookup
//! 2. SearchQuery - query mode selection from raw search text
//! 3. Wildcard matching

use crate::tree::{NodeId, PropertyTree};
use glob::Pattern;

// ============================================================================
// 1. PathResolver
// ============================================================================

/// Searches the descendants of one group of a [`PropertyTree`]
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    tree: &'a PropertyTree,
    scope: NodeId,
}

/// A descendant together with its absolute path and where the scope-relative part starts
struct Candidate {
    id: NodeId,
    path: String,
    relative_start: usize,
}

impl Candidate {
    fn relative(&self) -> &str {
        &self.path[self.relative_start..]
    }
}

impl<'a> PathResolver<'a> {
    pub fn new(tree: &'a PropertyTree, scope: NodeId) -> Self {
        Self { tree, scope }
    }

    /// Resolver over the whole tree
    pub fn root(tree: &'a PropertyTree) -> Self {
        Self::new(tree, tree.root())
    }

    /// First descendant whose absolute or relative path equals `path`
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return None;
        }
        self.candidates()
            .into_iter()
            .find(|c| c.path == path || c.relative() == path)
            .map(|c| c.id)
    }

    /// Every descendant strictly below `prefix`: paths starting with `prefix + "."`.
    ///
    /// The node whose path equals `prefix` is *not* included; combine with
    /// [`find_by_path`](Self::find_by_path) to get it as well. An empty prefix
    /// matches nothing.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<NodeId> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let bounded = format!("{prefix}.");
        self.candidates()
            .into_iter()
            .filter(|c| c.path.starts_with(&bounded) || c.relative().starts_with(&bounded))
            .map(|c| c.id)
            .collect()
    }

    /// Every descendant whose absolute or relative path matches `pattern`, where `*` stands
    /// for any run of characters (separators included). Anchored at both
    /// ends, case-sensitive. An empty pattern matches nothing.
    pub fn find_by_pattern(&self, pattern: &str) -> Vec<NodeId> {
        if pattern.is_empty() {
            return Vec::new();
        }
        let Some(compiled) = compile_wildcard(pattern) else {
            return Vec::new();
        };
        self.candidates()
            .into_iter()
            .filter(|c| compiled.matches(&c.path) || compiled.matches(c.relative()))
            .map(|c| c.id)
            .collect()
    }

    /// Run a parsed search query
    pub fn search(&self, query: &SearchQuery) -> Vec<NodeId> {
        match query {
            SearchQuery::Path(path) => self.find_by_path(path).into_iter().collect(),
            SearchQuery::Prefix(prefix) => self.find_by_prefix(prefix),
            SearchQuery::Pattern(pattern) => self.find_by_pattern(pattern),
        }
    }

    fn candidates(&self) -> Vec<Candidate> {
        let Some(scope) = self.tree.get(self.scope) else {
            return Vec::new();
        };
        let scope_path = self.tree.full_path(self.scope);
        let relative_start = scope_path.len() + 1;

        let mut result = Vec::new();
        let mut stack: Vec<(NodeId, String)> = scope
            .items()
            .iter()
            .rev()
            .map(|&id| (id, format!("{scope_path}.{}", self.tree[id].name())))
            .collect();

        while let Some((id, path)) = stack.pop() {
            for &child in self.tree[id].items().iter().rev() {
                stack.push((child, format!("{path}.{}", self.tree[child].name())));
            }
            result.push(Candidate {
                id,
                path,
                relative_start,
            });
        }

        result
    }
}

// ============================================================================
// 2. SearchQuery
// ============================================================================

/// Lookup mode chosen from raw search-bar text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Path(String),
    Prefix(String),
    Pattern(String),
}

impl SearchQuery {
    /// `*` anywhere → pattern; trailing `.` → prefix (separators stripped);
    /// otherwise exact path. Blank input yields `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if input.contains('*') {
            Some(SearchQuery::Pattern(input.to_string()))
        } else if input.ends_with('.') {
            Some(SearchQuery::Prefix(input.trim_end_matches('.').to_string()))
        } else {
            Some(SearchQuery::Path(input.to_string()))
        }
    }
}

// ============================================================================
// 3. Wildcard matching
// ============================================================================

/// Compile a `*`-only wildcard into a glob pattern. Every other glob
/// metacharacter is escaped and runs of `*` collapse into one.
pub fn compile_wildcard(pattern: &str) -> Option<Pattern> {
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c != '*' || !collapsed.ends_with('*') {
            collapsed.push(c);
        }
    }

    let escaped: Vec<String> = collapsed.split('*').map(Pattern::escape).collect();
    match Pattern::new(&escaped.join("*")) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            tracing::warn!("Failed to compile wildcard {:?}: {}", pattern, e);
            None
        }
    }
}

/// Anchored, case-sensitive match where `*` is the only metacharacter
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    compile_wildcard(pattern).is_some_and(|compiled| compiled.matches(text))
}
