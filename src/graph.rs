use std::collections::{BTreeMap, BTreeSet, VecDeque};

use thiserror::Error;

use crate::models::Course;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("prerequisite cycle detected involving {course_id}")]
    Cycle { course_id: String },
    #[error("{course_id} lists unknown prerequisite {prereq_id}")]
    UnknownPrerequisite {
        course_id: String,
        prereq_id: String,
    },
}

/// Immutable prerequisite graph for one planning run. Validated as a DAG at
/// load; reachability figures are cached here because the graph never changes
/// while a run is in flight.
#[derive(Debug, Clone)]
pub struct CourseGraph {
    courses: BTreeMap<String, Course>,
    dependents: BTreeMap<String, BTreeSet<String>>,
    transitive_counts: BTreeMap<String, usize>,
    prereq_depths: BTreeMap<String, usize>,
    max_transitive: usize,
}

impl CourseGraph {
    pub fn load(courses: Vec<Course>) -> Result<Self, GraphError> {
        let courses: BTreeMap<String, Course> =
            courses.into_iter().map(|c| (c.id.clone(), c)).collect();

        for course in courses.values() {
            for prereq in &course.prerequisites {
                if !courses.contains_key(prereq) {
                    return Err(GraphError::UnknownPrerequisite {
                        course_id: course.id.clone(),
                        prereq_id: prereq.clone(),
                    });
                }
            }
        }

        let mut dependents: BTreeMap<String, BTreeSet<String>> = courses
            .keys()
            .map(|id| (id.clone(), BTreeSet::new()))
            .collect();
        for course in courses.values() {
            for prereq in &course.prerequisites {
                dependents
                    .entry(prereq.clone())
                    .or_default()
                    .insert(course.id.clone());
            }
        }

        let topo_order = topological_order(&courses, &dependents)?;

        let prereq_depths = chain_depths(&courses, &topo_order);
        let transitive_counts: BTreeMap<String, usize> = courses
            .keys()
            .map(|id| (id.clone(), downstream_count(id, &dependents)))
            .collect();
        let max_transitive = transitive_counts.values().copied().max().unwrap_or(0);

        Ok(CourseGraph {
            courses,
            dependents,
            transitive_counts,
            prereq_depths,
            max_transitive,
        })
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.get(id)
    }

    pub fn prerequisites_of(&self, id: &str) -> BTreeSet<String> {
        self.courses
            .get(id)
            .map(|c| c.prerequisites.clone())
            .unwrap_or_default()
    }

    pub fn direct_dependents_of(&self, id: &str) -> BTreeSet<String> {
        self.dependents.get(id).cloned().unwrap_or_default()
    }

    /// Size of the full downstream closure: how many courses this one
    /// transitively gates.
    pub fn transitive_dependents_count(&self, id: &str) -> usize {
        self.transitive_counts.get(id).copied().unwrap_or(0)
    }

    /// Largest downstream closure in the graph, the scoring normalizer.
    pub fn max_transitive_dependents(&self) -> usize {
        self.max_transitive
    }

    /// Length of the longest prerequisite chain upstream of this course.
    /// A course with no prerequisites has depth zero.
    pub fn prerequisite_depth(&self, id: &str) -> usize {
        self.prereq_depths.get(id).copied().unwrap_or(0)
    }
}

/// Kahn's algorithm. A leftover course after the queue drains sits on a
/// cycle; the smallest such id is reported so identical inputs always name
/// the same course.
fn topological_order(
    courses: &BTreeMap<String, Course>,
    dependents: &BTreeMap<String, BTreeSet<String>>,
) -> Result<Vec<String>, GraphError> {
    let mut in_degree: BTreeMap<&str, usize> = courses
        .values()
        .map(|c| (c.id.as_str(), c.prerequisites.len()))
        .collect();

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut order = Vec::with_capacity(courses.len());
    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        if let Some(deps) = dependents.get(id) {
            for dep in deps {
                if let Some(d) = in_degree.get_mut(dep.as_str()) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(dep.as_str());
                    }
                }
            }
        }
    }

    if order.len() < courses.len() {
        let stuck = in_degree
            .iter()
            .filter(|(_, d)| **d > 0)
            .map(|(id, _)| id.to_string())
            .min()
            .unwrap_or_default();
        return Err(GraphError::Cycle { course_id: stuck });
    }
    Ok(order)
}

/// Longest upstream chain per course, folded along the topological order.
fn chain_depths(
    courses: &BTreeMap<String, Course>,
    topo_order: &[String],
) -> BTreeMap<String, usize> {
    let mut depths: BTreeMap<String, usize> = BTreeMap::new();
    for id in topo_order {
        let Some(course) = courses.get(id) else {
            continue;
        };
        let depth = course
            .prerequisites
            .iter()
            .map(|p| depths.get(p).copied().unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);
        depths.insert(id.clone(), depth);
    }
    depths
}

fn downstream_count(id: &str, dependents: &BTreeMap<String, BTreeSet<String>>) -> usize {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(id);
    while let Some(current) = queue.pop_front() {
        if let Some(next) = dependents.get(current) {
            for dep in next {
                if seen.insert(dep.as_str()) {
                    queue.push_back(dep.as_str());
                }
            }
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LearningStyle;

    fn course(id: &str, prereqs: &[&str]) -> Course {
        Course {
            id: id.to_string(),
            name: format!("Course {id}"),
            credits: 3,
            level: 200,
            difficulty: 3.0,
            success_rate: 0.8,
            learning_style: LearningStyle::Visual,
            prerequisites: prereqs.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn loads_an_acyclic_graph() {
        let graph = CourseGraph::load(vec![
            course("A", &[]),
            course("B", &["A"]),
            course("C", &["A", "B"]),
        ])
        .expect("acyclic graph loads");
        assert!(graph.course("A").is_some());
        assert_eq!(graph.prerequisites_of("C").len(), 2);
        let expected: BTreeSet<String> = ["B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(graph.direct_dependents_of("A"), expected);
    }

    #[test]
    fn rejects_a_cycle_naming_a_member() {
        let err = CourseGraph::load(vec![
            course("A", &["C"]),
            course("B", &["A"]),
            course("C", &["B"]),
            course("D", &[]),
        ])
        .expect_err("cycle must fail");
        match err {
            GraphError::Cycle { course_id } => assert_eq!(course_id, "A"),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_prerequisites() {
        let err = CourseGraph::load(vec![course("A", &["MISSING"])]).expect_err("must fail");
        match err {
            GraphError::UnknownPrerequisite {
                course_id,
                prereq_id,
            } => {
                assert_eq!(course_id, "A");
                assert_eq!(prereq_id, "MISSING");
            }
            other => panic!("expected unknown prerequisite error, got {other:?}"),
        }
    }

    #[test]
    fn counts_transitive_dependents() {
        let graph = CourseGraph::load(vec![
            course("A", &[]),
            course("B", &["A"]),
            course("C", &["B"]),
            course("D", &["B"]),
        ])
        .expect("load");
        assert_eq!(graph.transitive_dependents_count("A"), 3);
        assert_eq!(graph.transitive_dependents_count("B"), 2);
        assert_eq!(graph.transitive_dependents_count("C"), 0);
        assert_eq!(graph.max_transitive_dependents(), 3);
    }

    #[test]
    fn measures_prerequisite_chain_depth() {
        let graph = CourseGraph::load(vec![
            course("A", &[]),
            course("B", &["A"]),
            course("C", &["B"]),
            course("D", &["A", "C"]),
        ])
        .expect("load");
        assert_eq!(graph.prerequisite_depth("A"), 0);
        assert_eq!(graph.prerequisite_depth("B"), 1);
        assert_eq!(graph.prerequisite_depth("D"), 3);
    }

    #[test]
    fn empty_graph_loads() {
        let graph = CourseGraph::load(Vec::new()).expect("empty graph is valid");
        assert_eq!(graph.max_transitive_dependents(), 0);
        assert!(graph.course("A").is_none());
    }
}
