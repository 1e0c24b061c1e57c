use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::schema::Schema;
use crate::types::RelationKind;

/// Counts for the belongsTo dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationGraphSummary {
    pub entities: usize,
    pub references: usize,
    pub join_tables: usize,
}

/// Dependency ordering of entities along their belongsTo references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationGraphReport {
    pub summary: RelationGraphSummary,
    /// Referenced entities come before the entities that reference them.
    pub topo_order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}

/// Build a deterministic belongsTo dependency report for a schema.
pub fn build_relation_graph_report(schema: &Schema) -> RelationGraphReport {
    let graph = build_adjacency(schema);
    let summary = RelationGraphSummary {
        entities: graph.len(),
        references: graph.values().map(|dependents| dependents.len()).sum(),
        join_tables: schema.join_tables.len(),
    };

    match toposort(&graph) {
        Ok(order) => RelationGraphReport {
            summary,
            topo_order: Some(order),
            cycle: None,
        },
        Err(cycle) => RelationGraphReport {
            summary,
            topo_order: None,
            cycle: Some(cycle),
        },
    }
}

/// Target entity -> entities holding a belongsTo reference to it.
fn build_adjacency(schema: &Schema) -> BTreeMap<String, BTreeSet<String>> {
    let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for name in schema.entities.keys() {
        graph.entry(name.clone()).or_default();
    }

    for (entity, relation) in schema.relations() {
        if relation.kind == RelationKind::BelongsTo {
            graph
                .entry(relation.target.clone())
                .or_default()
                .insert(entity.name.clone());
        }
    }

    graph
}

fn toposort(graph: &BTreeMap<String, BTreeSet<String>>) -> Result<Vec<String>, Vec<String>> {
    let mut indegree: BTreeMap<&str, usize> =
        graph.keys().map(|node| (node.as_str(), 0)).collect();

    for dependents in graph.values() {
        for dependent in dependents {
            *indegree.entry(dependent.as_str()).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<&str> = indegree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(node, _)| *node)
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node.to_string());

        if let Some(dependents) = graph.get(node) {
            for dependent in dependents {
                if let Some(count) = indegree.get_mut(dependent.as_str()) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(dependent.as_str());
                    }
                }
            }
        }
    }

    if order.len() == indegree.len() {
        Ok(order)
    } else {
        Err(indegree
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(node, _)| node.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::parse_schema;

    #[test]
    fn referenced_entities_come_first() {
        let schema = parse_schema(
            "Post:\n  author: User\n  category: Category\nUser:\n  name: string\nCategory:\n  name: string\n",
        )
        .expect("parse schema");

        let report = build_relation_graph_report(&schema);
        let order = report.topo_order.expect("expected toposort");
        let position = |name: &str| order.iter().position(|item| item == name).unwrap();
        assert!(position("User") < position("Post"));
        assert!(position("Category") < position("Post"));
        assert_eq!(report.summary.references, 2);
    }

    #[test]
    fn reports_cycle() {
        let schema = parse_schema("A:\n  b: B\nB:\n  a: A\nC:\n  name: string\n")
            .expect("parse schema");

        let report = build_relation_graph_report(&schema);
        assert!(report.topo_order.is_none());
        let cycle = report.cycle.expect("cycle");
        assert!(cycle.contains(&"A".to_string()));
        assert!(cycle.contains(&"B".to_string()));
        assert!(!cycle.contains(&"C".to_string()));
    }
}
