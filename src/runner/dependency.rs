//! Dependency graph for step execution ordering.

use std::collections::{BinaryHeap, HashMap};

use crate::error::{CairnError, Result};
use crate::workflow::Workflow;

/// Dependency relationships between a workflow's steps.
///
/// Edges cover only dependencies that name a step present in the workflow.
/// References to nonexistent steps are not edges: they are a runtime
/// condition classified per step by the dependency checker, so the graph
/// stays buildable for any validated workflow.
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    /// Step ids in declared order.
    ids: Vec<&'a str>,
    /// Direct dependencies of each step, as indices into `ids`.
    dependencies: Vec<Vec<usize>>,
    /// Steps that depend on each step, as indices into `ids`.
    dependents: Vec<Vec<usize>>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph for a workflow.
    pub fn new(workflow: &'a Workflow) -> Self {
        let ids: Vec<&str> = workflow.steps().iter().map(|s| s.id.as_str()).collect();
        let index: HashMap<&str, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];

        for (i, step) in workflow.steps().iter().enumerate() {
            for dep in &step.depends_on {
                if let Some(&d) = index.get(dep.as_str()) {
                    // A step may declare the same dependency twice; one edge is enough.
                    if !dependencies[i].contains(&d) {
                        dependencies[i].push(d);
                        dependents[d].push(i);
                    }
                }
            }
        }

        Self {
            ids,
            dependencies,
            dependents,
        }
    }

    /// Get the number of steps in the graph.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns step indices in execution order (dependencies before
    /// dependents), tie-broken by declared position so the order is
    /// deterministic.
    ///
    /// Returns [`CairnError::CircularDependency`] if a cycle is detected.
    pub fn execution_order(&self) -> Result<Vec<usize>> {
        let mut in_degree: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();

        // Min-heap on declared position keeps ready steps in declared order.
        let mut ready: BinaryHeap<std::cmp::Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(i, _)| std::cmp::Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.ids.len());

        while let Some(std::cmp::Reverse(i)) = ready.pop() {
            order.push(i);

            for &dependent in &self.dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(std::cmp::Reverse(dependent));
                }
            }
        }

        // If we haven't processed all nodes, there's a cycle
        if order.len() != self.ids.len() {
            let cycle = self
                .find_cycle()
                .map(|path| path.join(" -> "))
                .unwrap_or_else(|| "unknown".to_string());
            return Err(CairnError::CircularDependency { cycle });
        }

        Ok(order)
    }

    /// Find a cycle in the graph, returning the id path if one exists.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs(
            node: usize,
            graph: &DependencyGraph<'_>,
            state: &mut [State],
            path: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            state[node] = State::Visiting;
            path.push(node);

            for &dep in &graph.dependencies[node] {
                match state[dep] {
                    State::Visiting => {
                        // Found cycle - build the cycle path
                        let start = path.iter().position(|&n| n == dep).unwrap_or(0);
                        let mut cycle: Vec<String> = path[start..]
                            .iter()
                            .map(|&n| graph.ids[n].to_string())
                            .collect();
                        cycle.push(graph.ids[dep].to_string());
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(dep, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state[node] = State::Visited;
            None
        }

        let mut state = vec![State::Unvisited; self.ids.len()];
        let mut path = Vec::new();

        for node in 0..self.ids.len() {
            if state[node] == State::Unvisited {
                if let Some(cycle) = dfs(node, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Step;

    fn workflow(steps: Vec<Step>) -> Workflow {
        Workflow::new("test", steps).unwrap()
    }

    fn ordered_ids(workflow: &Workflow) -> Vec<String> {
        let graph = DependencyGraph::new(workflow);
        graph
            .execution_order()
            .unwrap()
            .into_iter()
            .map(|i| workflow.steps()[i].id.clone())
            .collect()
    }

    #[test]
    fn empty_workflow_builds_empty_graph() {
        let wf = workflow(vec![]);
        let graph = DependencyGraph::new(&wf);
        assert!(graph.is_empty());
        assert!(graph.execution_order().unwrap().is_empty());
    }

    #[test]
    fn independent_steps_keep_declared_order() {
        let wf = workflow(vec![Step::new("a"), Step::new("b"), Step::new("c")]);
        assert_eq!(ordered_ids(&wf), vec!["a", "b", "c"]);
    }

    #[test]
    fn linear_chain_orders_dependencies_first() {
        let wf = workflow(vec![
            Step::new("first"),
            Step::new("second").depends_on("first"),
            Step::new("third").depends_on("second"),
        ]);
        assert_eq!(ordered_ids(&wf), vec!["first", "second", "third"]);
    }

    #[test]
    fn out_of_order_declarations_are_tolerated() {
        let wf = workflow(vec![
            Step::new("third").depends_on("second"),
            Step::new("second").depends_on("first"),
            Step::new("first"),
        ]);
        assert_eq!(ordered_ids(&wf), vec!["first", "second", "third"]);
    }

    #[test]
    fn diamond_dependency_respects_edges() {
        let wf = workflow(vec![
            Step::new("a"),
            Step::new("b").depends_on("a"),
            Step::new("c").depends_on("a"),
            Step::new("d").depends_on("b").depends_on("c"),
        ]);

        let order = ordered_ids(&wf);
        let pos = |id: &str| order.iter().position(|s| s == id).unwrap();

        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
    }

    #[test]
    fn unknown_dependencies_do_not_create_edges() {
        let wf = workflow(vec![Step::new("a").depends_on("ghost"), Step::new("b")]);
        // "ghost" is not a step; "a" is still schedulable.
        assert_eq!(ordered_ids(&wf), vec!["a", "b"]);
    }

    #[test]
    fn duplicate_dependency_declarations_are_deduplicated() {
        let wf = workflow(vec![
            Step::new("a"),
            Step::new("b").depends_on("a").depends_on("a"),
        ]);
        assert_eq!(ordered_ids(&wf), vec!["a", "b"]);
    }

    #[test]
    fn simple_cycle_is_an_error() {
        let wf = workflow(vec![
            Step::new("a").depends_on("b"),
            Step::new("b").depends_on("a"),
        ]);
        let graph = DependencyGraph::new(&wf);

        let result = graph.execution_order();
        assert!(matches!(
            result,
            Err(CairnError::CircularDependency { .. })
        ));
    }

    #[test]
    fn self_cycle_is_an_error() {
        let wf = workflow(vec![Step::new("a").depends_on("a")]);
        let graph = DependencyGraph::new(&wf);
        assert!(graph.execution_order().is_err());
    }

    #[test]
    fn no_cycle_returns_none() {
        let wf = workflow(vec![Step::new("a"), Step::new("b").depends_on("a")]);
        let graph = DependencyGraph::new(&wf);
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn simple_cycle_returns_path() {
        let wf = workflow(vec![
            Step::new("a").depends_on("b"),
            Step::new("b").depends_on("a"),
        ]);
        let graph = DependencyGraph::new(&wf);

        let path = graph.find_cycle().unwrap();
        // Path should show the cycle: e.g., ["a", "b", "a"]
        assert!(path.len() >= 2);
        assert_eq!(path.first(), path.last());
    }

    #[test]
    fn longer_cycle_returns_full_path() {
        let wf = workflow(vec![
            Step::new("a").depends_on("c"),
            Step::new("b").depends_on("a"),
            Step::new("c").depends_on("b"),
        ]);
        let graph = DependencyGraph::new(&wf);

        let path = graph.find_cycle().unwrap();
        assert!(path.contains(&"a".to_string()));
        assert!(path.contains(&"b".to_string()));
        assert!(path.contains(&"c".to_string()));
    }

    #[test]
    fn cycle_error_message_names_the_cycle() {
        let wf = workflow(vec![
            Step::new("a").depends_on("b"),
            Step::new("b").depends_on("a"),
        ]);
        let graph = DependencyGraph::new(&wf);

        let err = graph.execution_order().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("a"));
        assert!(msg.contains("b"));
        assert!(msg.contains("->"));
    }
}
