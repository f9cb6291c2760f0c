//! Build-time catalog validation.
//!
//! Every definition is checked against the entity descriptors, and the
//! projection graph (node = `(kind, projection)`, edge = "chains into") must be
//! acyclic. All problems are collected so one failed startup reports them all.

use std::collections::{HashMap, HashSet};
use std::fmt;

use roster_model::EntityKind;
use thiserror::Error;

use crate::projection::{Expand, ProjectionDef};
use crate::search::SearchDef;

/// One problem found in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two projections of one kind share a name.
    #[error("{kind} declares projection '{name}' more than once")]
    DuplicateProjection {
        /// Projected kind.
        kind: EntityKind,
        /// Projection name.
        name: String,
    },

    /// Two searches of one kind share a name.
    #[error("{kind} declares search '{name}' more than once")]
    DuplicateSearch {
        /// Searched kind.
        kind: EntityKind,
        /// Search name.
        name: String,
    },

    /// A definition names a field the kind does not have.
    #[error("'{owner}' references unknown field {kind}.{field}")]
    UnknownField {
        /// Kind the field was looked up on.
        kind: EntityKind,
        /// Definition holding the reference.
        owner: String,
        /// Field name.
        field: String,
    },

    /// A projection names a relation the kind does not have.
    #[error("projection '{owner}' references unknown relation {kind}.{relation}")]
    UnknownRelation {
        /// Kind the relation was looked up on.
        kind: EntityKind,
        /// Projection holding the reference.
        owner: String,
        /// Relation name.
        relation: String,
    },

    /// A search predicate reads an undeclared parameter.
    #[error("search {kind}.{search} uses undeclared parameter '{param}'")]
    UnknownParameter {
        /// Searched kind.
        kind: EntityKind,
        /// Search name.
        search: String,
        /// Parameter name.
        param: String,
    },

    /// A search declares one parameter twice.
    #[error("search {kind}.{search} declares parameter '{param}' more than once")]
    DuplicateParameter {
        /// Searched kind.
        kind: EntityKind,
        /// Search name.
        search: String,
        /// Parameter name.
        param: String,
    },

    /// A relation chains into a projection the related kind doesn't register.
    #[error("projection {kind}.{projection} chains '{relation}' into unknown projection {target}.{chained}")]
    DanglingProjection {
        /// Projected kind.
        kind: EntityKind,
        /// Projection name.
        projection: String,
        /// Chained relation.
        relation: String,
        /// Related kind.
        target: EntityKind,
        /// Missing projection name.
        chained: String,
    },

    /// Projections chain into each other in a loop.
    #[error("projection cycle: {}", .chain.join(" -> "))]
    Cycle {
        /// The nodes on the cycle, first node repeated at the end.
        chain: Vec<String>,
    },
}

/// The catalog could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ConfigurationError {
    /// Every problem found.
    pub problems: Vec<CatalogError>,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid catalog ({} problem(s))", self.problems.len())?;
        for problem in &self.problems {
            write!(f, "; {problem}")?;
        }
        Ok(())
    }
}

impl ConfigurationError {
    /// Whether any problem is a projection cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        self.problems
            .iter()
            .any(|p| matches!(p, CatalogError::Cycle { .. }))
    }
}

/// Checks searches and projections, returning every problem found.
#[must_use]
pub fn validate(searches: &[SearchDef], projections: &[ProjectionDef]) -> Vec<CatalogError> {
    let mut errors = Vec::new();
    errors.extend(check_searches(searches));
    errors.extend(check_projections(projections));
    errors.extend(find_cycles(projections));
    errors
}

fn check_searches(searches: &[SearchDef]) -> Vec<CatalogError> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for search in searches {
        if !names.insert((search.kind, search.name.as_str())) {
            errors.push(CatalogError::DuplicateSearch {
                kind: search.kind,
                name: search.name.clone(),
            });
        }

        let mut params = HashSet::new();
        for param in &search.params {
            if !params.insert(param.name.as_str()) {
                errors.push(CatalogError::DuplicateParameter {
                    kind: search.kind,
                    search: search.name.clone(),
                    param: param.name.clone(),
                });
            }
        }

        let descriptor = search.kind.descriptor();
        for predicate in &search.predicates {
            if descriptor.field(predicate.field).is_none() {
                errors.push(CatalogError::UnknownField {
                    kind: search.kind,
                    owner: search.name.clone(),
                    field: predicate.field.to_string(),
                });
            }
            if !params.contains(predicate.param.as_str()) {
                errors.push(CatalogError::UnknownParameter {
                    kind: search.kind,
                    search: search.name.clone(),
                    param: predicate.param.clone(),
                });
            }
        }
    }

    errors
}

fn check_projections(projections: &[ProjectionDef]) -> Vec<CatalogError> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();
    for projection in projections {
        if !names.insert((projection.kind, projection.name.as_str())) {
            errors.push(CatalogError::DuplicateProjection {
                kind: projection.kind,
                name: projection.name.clone(),
            });
        }
    }

    for projection in projections {
        let descriptor = projection.kind.descriptor();
        for field in &projection.fields {
            if descriptor.field(field).is_none() {
                errors.push(CatalogError::UnknownField {
                    kind: projection.kind,
                    owner: projection.name.clone(),
                    field: (*field).to_string(),
                });
            }
        }

        for expansion in &projection.relations {
            let Some(relation) = descriptor.relation(expansion.relation) else {
                errors.push(CatalogError::UnknownRelation {
                    kind: projection.kind,
                    owner: projection.name.clone(),
                    relation: expansion.relation.to_string(),
                });
                continue;
            };
            if let Expand::Projection(chained) = &expansion.expand {
                if !names.contains(&(relation.target, chained.as_str())) {
                    errors.push(CatalogError::DanglingProjection {
                        kind: projection.kind,
                        projection: projection.name.clone(),
                        relation: relation.name.to_string(),
                        target: relation.target,
                        chained: chained.clone(),
                    });
                }
            }
        }
    }

    errors
}

type Node<'a> = (EntityKind, &'a str);

fn label(node: Node<'_>) -> String {
    format!("{}.{}", node.0, node.1)
}

fn find_cycles(projections: &[ProjectionDef]) -> Vec<CatalogError> {
    let mut graph: HashMap<Node<'_>, Vec<Node<'_>>> = HashMap::new();
    for projection in projections {
        let edges = graph
            .entry((projection.kind, projection.name.as_str()))
            .or_default();
        for (relation, chained) in projection.chains() {
            if let Some(rel) = projection.kind.descriptor().relation(relation) {
                edges.push((rel.target, chained));
            }
        }
    }

    let mut cycles = Vec::new();
    let mut visited = HashSet::new();
    for projection in projections {
        let start = (projection.kind, projection.name.as_str());
        let mut path = Vec::new();
        collect_cycles(&graph, start, &mut visited, &mut path, &mut cycles);
    }
    cycles
        .into_iter()
        .map(|cycle| CatalogError::Cycle {
            chain: cycle.into_iter().map(label).collect(),
        })
        .collect()
}

/// Depth-first walk that records one cycle per back edge and keeps going,
/// so independent cycles through a shared node are all reported.
fn collect_cycles<'a>(
    graph: &HashMap<Node<'a>, Vec<Node<'a>>>,
    node: Node<'a>,
    visited: &mut HashSet<Node<'a>>,
    path: &mut Vec<Node<'a>>,
    cycles: &mut Vec<Vec<Node<'a>>>,
) {
    if let Some(start) = path.iter().position(|n| *n == node) {
        let mut cycle = path[start..].to_vec();
        cycle.push(node);
        cycles.push(cycle);
        return;
    }
    if !visited.insert(node) {
        // Already explored from another root.
        return;
    }

    path.push(node);
    for next in graph.get(&node).into_iter().flatten() {
        collect_cycles(graph, *next, visited, path, cycles);
    }
    path.pop();
}
