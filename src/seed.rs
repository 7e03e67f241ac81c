//! Demo dataset applied to an empty store, mirroring the credentials the
//! login screen advertises.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::data::assignment::{Assignment, SubmissionType};
use crate::data::course::Course;
use crate::data::user::{PasswordHash, RoleProfile, User};
use crate::store::Store;

pub static DEMO_PASSWORD: &str = "password123";

/// Deterministic seed ids so repeated bootstraps converge on one dataset.
fn demo_id(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

pub fn apply(store: &mut Store) {
    let salt = store.security().salt;
    let semester = store.semester().to_string();
    let pw_hash = PasswordHash::new(DEMO_PASSWORD, &salt);

    let anya = demo_id("prof.anya@university.edu");
    let ben = demo_id("ben.carter@student.edu");
    let chloe = demo_id("chloe.davis@student.edu");
    let david = demo_id("david.evans@student.edu");

    let calculus = demo_id("MATH101");
    let history = demo_id("HIST210");
    let physics = demo_id("PHYS150");

    let student = |id: Uuid, name: &str, email: &str, enrolled: Vec<Uuid>| User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        pw_hash: pw_hash.clone(),
        profile: RoleProfile::Student {
            enrolled_courses: enrolled,
            semester: semester.clone(),
        },
    };

    let users = vec![
        User {
            id: anya,
            name: "Professor Anya".to_string(),
            email: "prof.anya@university.edu".to_string(),
            pw_hash: pw_hash.clone(),
            profile: RoleProfile::Admin {
                courses: vec![calculus, history, physics],
            },
        },
        student(
            ben,
            "Ben Carter",
            "ben.carter@student.edu",
            vec![calculus, history, physics],
        ),
        student(
            chloe,
            "Chloe Davis",
            "chloe.davis@student.edu",
            vec![calculus, history],
        ),
        student(
            david,
            "David Evans",
            "david.evans@student.edu",
            vec![calculus, physics],
        ),
    ];

    let course = |id: Uuid, name: &str, code: &str, color: &str, students: Vec<Uuid>| Course {
        id,
        name: name.to_string(),
        code: code.to_string(),
        semester: semester.clone(),
        professor: anya,
        students,
        color: color.to_string(),
    };

    let courses = vec![
        course(
            calculus,
            "Calculus I",
            "MATH101",
            "bg-indigo-500",
            vec![ben, chloe, david],
        ),
        course(
            history,
            "World History",
            "HIST210",
            "bg-rose-500",
            vec![ben, chloe],
        ),
        course(
            physics,
            "Physics I",
            "PHYS150",
            "bg-emerald-500",
            vec![ben, david],
        ),
    ];

    let assignments = vec![
        Assignment {
            id: demo_id("assignment:calculus-ps1"),
            course: calculus,
            title: "Calculus I: Problem Set 1".to_string(),
            description: "Complete problems 1-10 from chapter 1. Show all your work.".to_string(),
            due: Utc::now() + Duration::days(7),
            submission_link: Some("https://docs.google.com/document/d/example1/edit".to_string()),
            submission_type: SubmissionType::Individual,
            created_by: anya,
            created: Utc::now(),
        },
        Assignment {
            id: demo_id("assignment:history-essay"),
            course: history,
            title: "History Essay: The Roman Empire".to_string(),
            description: "Write a 1500-word essay on the fall of the Western Roman Empire."
                .to_string(),
            due: Utc::now() + Duration::days(14),
            submission_link: Some("https://docs.google.com/document/d/example2/edit".to_string()),
            submission_type: SubmissionType::Individual,
            created_by: anya,
            created: Utc::now(),
        },
        Assignment {
            id: demo_id("assignment:physics-lab"),
            course: physics,
            title: "Physics Lab Report: Kinematics".to_string(),
            description: "Submit your lab report based on last week's experiment.".to_string(),
            due: Utc::now() + Duration::days(3),
            submission_link: None,
            submission_type: SubmissionType::Group,
            created_by: anya,
            created: Utc::now(),
        },
    ];

    *store.users_mut() = users;
    *store.courses_mut() = courses;
    *store.assignments_mut() = assignments;

    store.persist_users();
    store.persist_courses();
    store.persist_assignments();

    tracing::info!(
        "Seeded {} demo users, {} courses and {} assignments",
        store.users().len(),
        store.courses().len(),
        store.assignments().len()
    );
}
