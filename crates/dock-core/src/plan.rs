//! Transfer plan: delete and insert orderings derived from the table graph

use crate::config::TableConfig;
use crate::error::CoreResult;
use crate::graph::TableGraph;
use crate::table_name::TableName;

/// Ordered operations for a full-database transfer.
///
/// Both orders come from one topological sort of the dependency graph:
/// `insert_order` lists parents before children, `delete_order` is its
/// reverse (children before parents). The plan, including its cycle
/// check, is computed before any destructive operation runs.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    insert_order: Vec<TableName>,
    delete_order: Vec<TableName>,
}

impl TransferPlan {
    /// Compute the plan for the configured table set.
    ///
    /// Fails with `CircularDependency` when the configuration is not a DAG
    /// and with `UnknownDependency` when a dependency points outside the
    /// configured set.
    pub fn from_tables(tables: &[TableConfig]) -> CoreResult<Self> {
        let graph = TableGraph::build(tables)?;
        let insert_order = graph.dependency_order()?;
        let mut delete_order = insert_order.clone();
        delete_order.reverse();

        Ok(Self {
            insert_order,
            delete_order,
        })
    }

    /// Tables in insert order: parents first
    pub fn insert_order(&self) -> &[TableName] {
        &self.insert_order
    }

    /// Tables in delete order: children first
    pub fn delete_order(&self) -> &[TableName] {
        &self.delete_order
    }

    /// Number of tables in the plan
    pub fn len(&self) -> usize {
        self.insert_order.len()
    }

    /// True when the plan covers no tables
    pub fn is_empty(&self) -> bool {
        self.insert_order.is_empty()
    }
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
