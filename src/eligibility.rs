use std::collections::BTreeSet;

use crate::graph::CourseGraph;

/// Courses that can be scheduled right now: still required, not already
/// taken or enrolled, and with every prerequisite in the taken set. Pure in
/// its inputs; the scheduler recomputes it after every simulated term.
pub fn eligible_courses(
    graph: &CourseGraph,
    taken_or_enrolled: &BTreeSet<String>,
    remaining_required: &BTreeSet<String>,
) -> BTreeSet<String> {
    remaining_required
        .iter()
        .filter(|id| !taken_or_enrolled.contains(*id))
        .filter(|id| {
            graph.course(id).is_some_and(|course| {
                course
                    .prerequisites
                    .iter()
                    .all(|p| taken_or_enrolled.contains(p))
            })
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, LearningStyle};

    fn course(id: &str, prereqs: &[&str]) -> Course {
        Course {
            id: id.to_string(),
            name: format!("Course {id}"),
            credits: 3,
            level: 100,
            difficulty: 2.5,
            success_rate: 0.8,
            learning_style: LearningStyle::Visual,
            prerequisites: prereqs.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn sample_graph() -> CourseGraph {
        CourseGraph::load(vec![
            course("A", &[]),
            course("B", &[]),
            course("C", &["A", "B"]),
            course("D", &["C"]),
        ])
        .expect("load")
    }

    #[test]
    fn frontier_requires_all_prerequisites() {
        let graph = sample_graph();
        let eligible = eligible_courses(&graph, &ids(&["A"]), &ids(&["B", "C", "D"]));
        assert_eq!(eligible, ids(&["B"]));
    }

    #[test]
    fn taken_courses_are_excluded() {
        let graph = sample_graph();
        let eligible = eligible_courses(&graph, &ids(&["A", "B"]), &ids(&["A", "C"]));
        assert_eq!(eligible, ids(&["C"]));
    }

    #[test]
    fn adding_taken_courses_never_shrinks_the_frontier() {
        let graph = sample_graph();
        let remaining = ids(&["B", "C", "D"]);
        let before = eligible_courses(&graph, &ids(&["A"]), &remaining);
        let after = eligible_courses(&graph, &ids(&["A", "B"]), &remaining);
        for id in before.difference(&after) {
            // Only courses newly absorbed into the taken set may leave.
            assert_eq!(id, "B");
        }
        assert!(after.contains("C"));
    }

    #[test]
    fn empty_requirements_yield_empty_frontier() {
        let graph = sample_graph();
        let eligible = eligible_courses(&graph, &ids(&["A", "B"]), &BTreeSet::new());
        assert!(eligible.is_empty());
    }
}
