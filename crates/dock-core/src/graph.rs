//! Table dependency graph and topological ordering

use crate::config::TableConfig;
use crate::error::{CoreError, CoreResult};
use crate::table_name::TableName;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// A directed acyclic graph of foreign-key dependencies among configured tables.
///
/// Edges point from a dependency (parent) to the table that references it
/// (child), so a topological sort yields parents before children.
#[derive(Debug)]
pub struct TableGraph {
    /// The underlying graph
    graph: DiGraph<TableName, ()>,

    /// Map from table name to node index
    node_map: HashMap<TableName, NodeIndex>,
}

impl TableGraph {
    /// Build the graph from the configured table list.
    ///
    /// Nodes are added in configuration order, which later drives the
    /// tie-break in [`dependency_order`](Self::dependency_order).
    /// Self-references (a table with a foreign key into itself) are
    /// filtered out; they carry no ordering constraint. A dependency on a
    /// table outside the configured set is rejected so destructive phases
    /// never run against a partial graph.
    pub fn build(tables: &[TableConfig]) -> CoreResult<Self> {
        let mut graph = DiGraph::new();
        let mut node_map: HashMap<TableName, NodeIndex> = HashMap::new();

        for table in tables {
            if table.name.as_str().is_empty() {
                return Err(CoreError::EmptyName {
                    context: "table name in dependency graph".into(),
                });
            }
            if !node_map.contains_key(&table.name) {
                let idx = graph.add_node(table.name.clone());
                node_map.insert(table.name.clone(), idx);
            }
        }

        for table in tables {
            let child = node_map[&table.name];
            for dep in &table.depends_on {
                if dep == &table.name {
                    continue;
                }
                let parent =
                    *node_map
                        .get(dep)
                        .ok_or_else(|| CoreError::UnknownDependency {
                            table: table.name.to_string(),
                            dependency: dep.to_string(),
                        })?;
                graph.add_edge(parent, child, ());
            }
        }

        let built = Self { graph, node_map };
        built.validate()?;
        Ok(built)
    }

    /// Validate the graph has no cycles
    pub fn validate(&self) -> CoreResult<()> {
        match toposort(&self.graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(CoreError::CircularDependency {
                cycle: self.find_cycle_path(cycle.node_id()),
            }),
        }
    }

    /// Find a cycle path starting from a node for error reporting
    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path: Vec<String> = vec![self.graph[start].to_string()];
        let mut current = start;
        let mut visited = HashSet::new();
        visited.insert(current);

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].to_string());

            if target == start || visited.contains(&target) {
                break;
            }

            visited.insert(target);
            current = target;
        }

        path.join(" -> ")
    }

    /// Tables in dependency order: every table appears after all tables it
    /// depends on.
    ///
    /// Kahn's algorithm, always draining the ready node with the smallest
    /// node index. Node indices follow configuration order, so tables with
    /// no ordering constraint between them keep their configured relative
    /// order: deterministic, not arbitrary.
    pub fn dependency_order(&self) -> CoreResult<Vec<TableName>> {
        let mut indegree: Vec<usize> = vec![0; self.graph.node_count()];
        for edge in self.graph.edge_references() {
            indegree[edge.target().index()] += 1;
        }

        // min-heap over node indices
        let mut ready: BinaryHeap<std::cmp::Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|idx| indegree[idx.index()] == 0)
            .map(std::cmp::Reverse)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(std::cmp::Reverse(idx)) = ready.pop() {
            order.push(self.graph[idx].clone());
            for edge in self.graph.edges(idx) {
                let target = edge.target();
                indegree[target.index()] -= 1;
                if indegree[target.index()] == 0 {
                    ready.push(std::cmp::Reverse(target));
                }
            }
        }

        if order.len() < self.graph.node_count() {
            // a cycle kept some nodes from ever becoming ready
            let stuck = self
                .graph
                .node_indices()
                .find(|idx| indegree[idx.index()] > 0)
                .expect("incomplete order implies a node with positive indegree");
            return Err(CoreError::CircularDependency {
                cycle: self.find_cycle_path(stuck),
            });
        }

        Ok(order)
    }

    /// Direct dependencies (parents) of a table
    pub fn dependencies(&self, table: &str) -> Vec<TableName> {
        match self.node_map.get(table) {
            Some(&idx) => self
                .graph
                .edges_directed(idx, petgraph::Direction::Incoming)
                .map(|e| self.graph[e.source()].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Direct dependents (children) of a table
    pub fn dependents(&self, table: &str) -> Vec<TableName> {
        match self.node_map.get(table) {
            Some(&idx) => self
                .graph
                .edges_directed(idx, petgraph::Direction::Outgoing)
                .map(|e| self.graph[e.target()].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Check if a table exists in the graph
    pub fn contains(&self, table: &str) -> bool {
        self.node_map.contains_key(table)
    }

    /// Number of tables in the graph
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// True when no tables are configured
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
