use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    ReadingWriting,
}

impl LearningStyle {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Visual" => Some(LearningStyle::Visual),
            "Auditory" => Some(LearningStyle::Auditory),
            "Kinesthetic" => Some(LearningStyle::Kinesthetic),
            "Reading-Writing" | "ReadingWriting" => Some(LearningStyle::ReadingWriting),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            LearningStyle::Visual => "Visual",
            LearningStyle::Auditory => "Auditory",
            LearningStyle::Kinesthetic => "Kinesthetic",
            LearningStyle::ReadingWriting => "Reading-Writing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermType {
    Fall,
    Spring,
    Summer,
}

impl TermType {
    /// Cyclic academic calendar: Fall -> Spring -> Summer -> Fall.
    pub fn next(&self) -> Self {
        match self {
            TermType::Fall => TermType::Spring,
            TermType::Spring => TermType::Summer,
            TermType::Summer => TermType::Fall,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Fall" => Some(TermType::Fall),
            "Spring" => Some(TermType::Spring),
            "Summer" => Some(TermType::Summer),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            TermType::Fall => "Fall",
            TermType::Spring => "Spring",
            TermType::Summer => "Summer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_tag(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub credits: u32,
    pub level: u32,
    pub difficulty: f64,
    pub success_rate: f64,
    pub learning_style: LearningStyle,
    pub prerequisites: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentStatus {
    Completed,
    Enrolled,
    Required,
}

impl EnrollmentStatus {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "completed" => Some(EnrollmentStatus::Completed),
            "enrolled" => Some(EnrollmentStatus::Enrolled),
            "required" => Some(EnrollmentStatus::Required),
            _ => None,
        }
    }
}

/// One transcript row; letter grades feed the GPA summary in reports.
#[derive(Debug, Clone)]
pub struct CourseRecord {
    pub course_id: String,
    pub credits: u32,
    pub status: EnrollmentStatus,
    pub grade: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StudentProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub learning_style: LearningStyle,
    pub preferred_load: u32,
    pub work_hours_per_week: u32,
    pub completed: BTreeSet<String>,
    pub enrolled: BTreeSet<String>,
    pub remaining_required: BTreeSet<String>,
    pub last_term: Option<TermType>,
    pub target_graduation: Option<String>,
}

impl StudentProfile {
    /// Union of completed and enrolled course ids, the base set prerequisite
    /// checks run against.
    pub fn taken_or_enrolled(&self) -> BTreeSet<String> {
        self.completed.union(&self.enrolled).cloned().collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredCourse {
    pub course_id: String,
    pub name: String,
    pub credits: u32,
    pub level: u32,
    pub difficulty: f64,
    pub score: f64,
    pub unlock_impact: f64,
    pub style_match: f64,
    pub ease: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Term {
    pub number: u32,
    pub term_type: TermType,
    pub courses: Vec<ScoredCourse>,
    pub total_credits: u32,
    pub mean_difficulty: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state")]
pub enum PlanOutcome {
    /// Every remaining requirement was scheduled.
    Complete,
    /// Requirements remain but none are eligible; the unresolved set is
    /// surfaced so the caller can explain the blockage.
    Stalled { unresolved: BTreeSet<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct TermPlan {
    pub terms: Vec<Term>,
    pub outcome: PlanOutcome,
    pub risk_factors: Vec<RiskFactor>,
}

impl TermPlan {
    pub fn total_credits(&self) -> u32 {
        self.terms.iter().map(|t| t.total_credits).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskCategory {
    DifficultyCluster,
    WorkloadConflict,
    LearningStyleMismatch,
    PrerequisiteBottleneck,
}

impl RiskCategory {
    pub fn as_tag(&self) -> &'static str {
        match self {
            RiskCategory::DifficultyCluster => "Difficulty Cluster",
            RiskCategory::WorkloadConflict => "Workload Conflict",
            RiskCategory::LearningStyleMismatch => "Learning Style Mismatch",
            RiskCategory::PrerequisiteBottleneck => "Prerequisite Bottleneck",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub severity: RiskLevel,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeerMatch {
    pub student_id: Uuid,
    pub name: String,
    pub learning_style: LearningStyle,
    pub similarity: f64,
    pub shared_courses: usize,
    pub completed_count: usize,
}
