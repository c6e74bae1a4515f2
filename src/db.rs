use std::collections::{BTreeMap, BTreeSet};

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{
    Course, CourseRecord, EnrollmentStatus, LearningStyle, StudentProfile, TermType,
};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let courses: Vec<(&str, &str, i32, i32, f64, f64, &str, Vec<&str>)> = vec![
        ("CMSC201", "Computer Science I", 4, 100, 2.8, 0.78, "Kinesthetic", vec![]),
        ("CMSC202", "Computer Science II", 4, 200, 3.4, 0.70, "Kinesthetic", vec!["CMSC201"]),
        ("CMSC203", "Discrete Structures", 3, 200, 3.1, 0.74, "Visual", vec!["CMSC201"]),
        ("CMSC331", "Programming Languages", 3, 300, 3.0, 0.76, "Reading-Writing", vec!["CMSC202"]),
        ("CMSC341", "Data Structures", 3, 300, 3.8, 0.66, "Visual", vec!["CMSC202", "CMSC203"]),
        ("CMSC411", "Computer Architecture", 3, 400, 3.9, 0.63, "Visual", vec!["CMSC341"]),
        ("CMSC421", "Operating Systems", 3, 400, 4.1, 0.60, "Kinesthetic", vec!["CMSC341"]),
        ("CMSC441", "Algorithms", 3, 400, 4.3, 0.58, "Visual", vec!["CMSC341", "MATH152"]),
        ("MATH151", "Calculus I", 4, 100, 3.2, 0.72, "Reading-Writing", vec![]),
        ("MATH152", "Calculus II", 4, 200, 3.6, 0.65, "Reading-Writing", vec!["MATH151"]),
    ];

    for (id, name, credits, level, difficulty, success_rate, style, _) in &courses {
        sqlx::query(
            r#"
            INSERT INTO degree_planner.courses
            (id, name, credits, level, difficulty, success_rate, learning_style)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, credits = EXCLUDED.credits,
                level = EXCLUDED.level, difficulty = EXCLUDED.difficulty,
                success_rate = EXCLUDED.success_rate,
                learning_style = EXCLUDED.learning_style
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(credits)
        .bind(level)
        .bind(difficulty)
        .bind(success_rate)
        .bind(style)
        .execute(pool)
        .await?;
    }

    for (id, _, _, _, _, _, _, prereqs) in &courses {
        for prereq in prereqs {
            sqlx::query(
                r#"
                INSERT INTO degree_planner.prerequisites (course_id, prereq_id)
                VALUES ($1, $2)
                ON CONFLICT (course_id, prereq_id) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(prereq)
            .execute(pool)
            .await?;
        }
    }

    let students = vec![
        (
            Uuid::parse_str("3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2")?,
            "Avery Lee",
            "avery.lee@example.edu",
            "Visual",
            4,
            10,
            Some("Spring"),
        ),
        (
            Uuid::parse_str("0c22f1f1-9184-4fd4-9b21-28c68a6a89dc")?,
            "Jules Moreno",
            "jules.moreno@example.edu",
            "Kinesthetic",
            3,
            25,
            None,
        ),
        (
            Uuid::parse_str("d5a0a1a2-2a3c-44c2-8f73-60b7897a9dd2")?,
            "Kiara Patel",
            "kiara.patel@example.edu",
            "Auditory",
            5,
            0,
            Some("Fall"),
        ),
    ];

    for (id, name, email, style, load, hours, last_term) in students {
        sqlx::query(
            r#"
            INSERT INTO degree_planner.students
            (id, full_name, email, learning_style, preferred_load, work_hours_per_week, last_term)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                learning_style = EXCLUDED.learning_style,
                preferred_load = EXCLUDED.preferred_load,
                work_hours_per_week = EXCLUDED.work_hours_per_week,
                last_term = EXCLUDED.last_term
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(style)
        .bind(load)
        .bind(hours)
        .bind(last_term)
        .execute(pool)
        .await?;
    }

    let enrollments: Vec<(&str, &str, &str, Option<&str>, NaiveDate)> = vec![
        (
            "avery.lee@example.edu",
            "CMSC201",
            "completed",
            Some("A-"),
            NaiveDate::from_ymd_opt(2025, 12, 18).context("invalid date")?,
        ),
        (
            "avery.lee@example.edu",
            "MATH151",
            "completed",
            Some("B+"),
            NaiveDate::from_ymd_opt(2025, 12, 18).context("invalid date")?,
        ),
        (
            "avery.lee@example.edu",
            "CMSC202",
            "enrolled",
            None,
            NaiveDate::from_ymd_opt(2026, 1, 26).context("invalid date")?,
        ),
        (
            "jules.moreno@example.edu",
            "CMSC201",
            "completed",
            Some("B"),
            NaiveDate::from_ymd_opt(2025, 12, 18).context("invalid date")?,
        ),
    ];

    let required: Vec<(&str, Vec<&str>)> = vec![
        (
            "avery.lee@example.edu",
            vec![
                "CMSC202", "CMSC203", "CMSC331", "CMSC341", "CMSC411", "CMSC421", "CMSC441",
                "MATH152",
            ],
        ),
        (
            "jules.moreno@example.edu",
            vec!["CMSC202", "CMSC203", "CMSC341", "MATH151", "MATH152"],
        ),
        (
            "kiara.patel@example.edu",
            vec!["CMSC201", "CMSC202", "CMSC203", "MATH151"],
        ),
    ];

    let today = NaiveDate::from_ymd_opt(2026, 1, 20).context("invalid date")?;
    for (email, course_id, status, grade, recorded_at) in enrollments {
        upsert_enrollment(pool, email, course_id, status, grade, recorded_at).await?;
    }
    for (email, course_ids) in required {
        for course_id in course_ids {
            // Required rows never overwrite real transcript rows.
            let exists = sqlx::query(
                r#"
                SELECT 1 AS present FROM degree_planner.enrollments e
                JOIN degree_planner.students s ON s.id = e.student_id
                WHERE s.email = $1 AND e.course_id = $2
                "#,
            )
            .bind(email)
            .bind(course_id)
            .fetch_optional(pool)
            .await?;
            if exists.is_none() {
                upsert_enrollment(pool, email, course_id, "required", None, today).await?;
            }
        }
    }

    Ok(())
}

async fn upsert_enrollment(
    pool: &PgPool,
    email: &str,
    course_id: &str,
    status: &str,
    grade: Option<&str>,
    recorded_at: NaiveDate,
) -> anyhow::Result<()> {
    let student_id: Uuid =
        sqlx::query("SELECT id FROM degree_planner.students WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await
            .with_context(|| format!("no student with email {email}"))?
            .get("id");

    sqlx::query(
        r#"
        INSERT INTO degree_planner.enrollments
        (student_id, course_id, status, grade, recorded_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (student_id, course_id) DO UPDATE
        SET status = EXCLUDED.status, grade = EXCLUDED.grade,
            recorded_at = EXCLUDED.recorded_at
        "#,
    )
    .bind(student_id)
    .bind(course_id)
    .bind(status)
    .bind(grade)
    .bind(recorded_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn import_courses_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        id: String,
        name: String,
        credits: i32,
        level: i32,
        difficulty: f64,
        success_rate: f64,
        learning_style: String,
        /// Semicolon-separated prerequisite course ids.
        prerequisites: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        rows.push(result?);
    }

    let mut inserted = 0usize;
    for row in &rows {
        let result = sqlx::query(
            r#"
            INSERT INTO degree_planner.courses
            (id, name, credits, level, difficulty, success_rate, learning_style)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, credits = EXCLUDED.credits,
                level = EXCLUDED.level, difficulty = EXCLUDED.difficulty,
                success_rate = EXCLUDED.success_rate,
                learning_style = EXCLUDED.learning_style
            "#,
        )
        .bind(&row.id)
        .bind(&row.name)
        .bind(row.credits)
        .bind(row.level)
        .bind(row.difficulty)
        .bind(row.success_rate)
        .bind(&row.learning_style)
        .execute(pool)
        .await?;
        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    // Edges land after every course row so forward references resolve.
    for row in &rows {
        let Some(prereqs) = &row.prerequisites else {
            continue;
        };
        for prereq in prereqs.split(';').filter(|p| !p.is_empty()) {
            sqlx::query(
                r#"
                INSERT INTO degree_planner.prerequisites (course_id, prereq_id)
                VALUES ($1, $2)
                ON CONFLICT (course_id, prereq_id) DO NOTHING
                "#,
            )
            .bind(&row.id)
            .bind(prereq)
            .execute(pool)
            .await?;
        }
    }

    Ok(inserted)
}

pub async fn import_enrollments_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        learning_style: String,
        preferred_load: i32,
        work_hours_per_week: i32,
        course_id: String,
        status: String,
        grade: Option<String>,
        recorded_at: NaiveDate,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        sqlx::query(
            r#"
            INSERT INTO degree_planner.students
            (id, full_name, email, learning_style, preferred_load, work_hours_per_week)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                learning_style = EXCLUDED.learning_style,
                preferred_load = EXCLUDED.preferred_load,
                work_hours_per_week = EXCLUDED.work_hours_per_week
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.full_name)
        .bind(&row.email)
        .bind(&row.learning_style)
        .bind(row.preferred_load)
        .bind(row.work_hours_per_week)
        .execute(pool)
        .await?;

        upsert_enrollment(
            pool,
            &row.email,
            &row.course_id,
            &row.status,
            row.grade.as_deref(),
            row.recorded_at,
        )
        .await?;
        inserted += 1;
    }

    Ok(inserted)
}

/// Point-in-time course catalog snapshot: every course plus its edge set.
/// The optimizer core validates and never queries mid-run.
pub async fn fetch_course_catalog(pool: &PgPool) -> anyhow::Result<Vec<Course>> {
    let mut prereqs: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let edge_rows =
        sqlx::query("SELECT course_id, prereq_id FROM degree_planner.prerequisites")
            .fetch_all(pool)
            .await?;
    for row in edge_rows {
        let course_id: String = row.get("course_id");
        let prereq_id: String = row.get("prereq_id");
        prereqs.entry(course_id).or_default().insert(prereq_id);
    }

    let rows = sqlx::query(
        "SELECT id, name, credits, level, difficulty, success_rate, learning_style \
         FROM degree_planner.courses ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut courses = Vec::new();
    for row in rows {
        let id: String = row.get("id");
        let style: String = row.get("learning_style");
        let learning_style = LearningStyle::from_tag(&style)
            .with_context(|| format!("course {id} has unknown learning style {style}"))?;
        let credits: i32 = row.get("credits");
        let level: i32 = row.get("level");
        courses.push(Course {
            prerequisites: prereqs.remove(&id).unwrap_or_default(),
            id,
            name: row.get("name"),
            credits: credits as u32,
            level: level as u32,
            difficulty: row.get("difficulty"),
            success_rate: row.get("success_rate"),
            learning_style,
        });
    }
    Ok(courses)
}

/// One student's profile and transcript, keyed by email.
pub async fn fetch_student(
    pool: &PgPool,
    email: &str,
) -> anyhow::Result<(StudentProfile, Vec<CourseRecord>)> {
    let row = sqlx::query(
        "SELECT id, full_name, email, learning_style, preferred_load, \
         work_hours_per_week, last_term, target_graduation \
         FROM degree_planner.students WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("no student with email {email}"))?;

    let mut profile = profile_from_row(&row)?;
    let records = fetch_transcript(pool, profile.id).await?;
    apply_transcript(&mut profile, &records);
    Ok((profile, records))
}

/// Every student with their transcript applied, for peer comparison.
pub async fn fetch_all_students(pool: &PgPool) -> anyhow::Result<Vec<StudentProfile>> {
    let rows = sqlx::query(
        "SELECT id, full_name, email, learning_style, preferred_load, \
         work_hours_per_week, last_term, target_graduation \
         FROM degree_planner.students ORDER BY email",
    )
    .fetch_all(pool)
    .await?;

    let mut profiles = Vec::new();
    for row in rows {
        let mut profile = profile_from_row(&row)?;
        let records = fetch_transcript(pool, profile.id).await?;
        apply_transcript(&mut profile, &records);
        profiles.push(profile);
    }
    Ok(profiles)
}

fn profile_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<StudentProfile> {
    let email: String = row.get("email");
    let style: String = row.get("learning_style");
    let learning_style = LearningStyle::from_tag(&style)
        .with_context(|| format!("student {email} has unknown learning style {style}"))?;
    let last_term: Option<String> = row.get("last_term");
    let last_term = match last_term {
        Some(tag) => Some(
            TermType::from_tag(&tag)
                .with_context(|| format!("student {email} has unknown term {tag}"))?,
        ),
        None => None,
    };
    let preferred_load: i32 = row.get("preferred_load");
    let work_hours: i32 = row.get("work_hours_per_week");

    Ok(StudentProfile {
        id: row.get("id"),
        name: row.get("full_name"),
        email,
        learning_style,
        preferred_load: preferred_load as u32,
        work_hours_per_week: work_hours as u32,
        completed: BTreeSet::new(),
        enrolled: BTreeSet::new(),
        remaining_required: BTreeSet::new(),
        last_term,
        target_graduation: row.get("target_graduation"),
    })
}

async fn fetch_transcript(pool: &PgPool, student_id: Uuid) -> anyhow::Result<Vec<CourseRecord>> {
    let rows = sqlx::query(
        "SELECT e.course_id, e.status, e.grade, c.credits \
         FROM degree_planner.enrollments e \
         JOIN degree_planner.courses c ON c.id = e.course_id \
         WHERE e.student_id = $1 ORDER BY e.course_id",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let mut records = Vec::new();
    for row in rows {
        let course_id: String = row.get("course_id");
        let status_tag: String = row.get("status");
        let status = EnrollmentStatus::from_tag(&status_tag)
            .with_context(|| format!("enrollment {course_id} has unknown status {status_tag}"))?;
        let credits: i32 = row.get("credits");
        records.push(CourseRecord {
            course_id,
            credits: credits as u32,
            status,
            grade: row.get("grade"),
        });
    }
    Ok(records)
}

fn apply_transcript(profile: &mut StudentProfile, records: &[CourseRecord]) {
    for record in records {
        match record.status {
            EnrollmentStatus::Completed => {
                profile.completed.insert(record.course_id.clone());
            }
            EnrollmentStatus::Enrolled => {
                profile.enrolled.insert(record.course_id.clone());
            }
            EnrollmentStatus::Required => {
                profile.remaining_required.insert(record.course_id.clone());
            }
        }
    }
}
