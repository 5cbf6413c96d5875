//! Demo data generator
//!
//! Creates a handful of qualifications and a batch of employees with random
//! German-style names and addresses, each holding two to four skills.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::core::coordinator::Coordinator;
use crate::core::error::RosterError;
use crate::core::transport::Transport;
use crate::entities::{Employee, Qualification, SkillReference};

pub const MAX_QUALIFICATIONS: usize = 20;
pub const MAX_EMPLOYEES: usize = 10_000;

const BASE_SKILLS: &[&str] = &[
    "Java",
    "Python",
    "C#",
    "C++",
    "Go",
    "Rust",
    "SQL",
    "NoSQL",
    "Cloud",
    "AWS",
    "Azure",
    "GCP",
    "Docker",
    "Kubernetes",
    "DevOps",
    "CI/CD",
    "Security",
    "Testing",
    "QA",
    "UI/UX",
    "Frontend",
    "Backend",
    "Microservices",
    "Data Science",
    "Machine Learning",
    "Project Management",
];

const FIRST_NAMES: &[&str] = &[
    "Max", "Anna", "Peter", "Laura", "Jonas", "Lea", "Felix", "Mia", "Tim", "Nina", "Lukas", "Sarah", "Paul", "Emma",
    "Noah", "Sofia", "Ben", "Marie", "Julian", "Clara",
];

const LAST_NAMES: &[&str] = &[
    "Müller",
    "Schmidt",
    "Schneider",
    "Fischer",
    "Weber",
    "Wagner",
    "Becker",
    "Hoffmann",
    "Koch",
    "Bauer",
    "Klein",
    "Wolf",
    "Schröder",
    "Neumann",
    "Krause",
    "Maier",
    "Lehmann",
    "Huber",
    "Keller",
    "Schultz",
];

const CITIES: &[&str] = &[
    "Berlin",
    "Hamburg",
    "München",
    "Köln",
    "Frankfurt",
    "Stuttgart",
    "Düsseldorf",
    "Dortmund",
    "Essen",
    "Bremen",
    "Leipzig",
    "Dresden",
    "Hannover",
    "Nürnberg",
    "Freiburg",
    "Wiesbaden",
    "Mainz",
    "Mannheim",
    "Aachen",
    "Kiel",
];

const STREETS: &[&str] = &[
    "Musterstraße",
    "Hauptstraße",
    "Goethestraße",
    "Schillerweg",
    "Parkallee",
    "Bergstraße",
    "Lindenweg",
    "Rosenweg",
    "Marktplatz",
    "Bahnhofstraße",
];

/// Counts from one seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub qualifications_created: usize,
    /// Generated names the catalog already had
    pub qualifications_skipped: usize,
    pub qualifications_failed: usize,
    pub employees_created: usize,
    pub employees_failed: usize,
}

/// `count` distinct qualification names, clamped to `1..=20`
///
/// Base names are used first; "Skill N" fills up once they run out.
pub fn qualification_names<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    let count = count.clamp(1, MAX_QUALIFICATIONS);
    let mut names: Vec<String> = BASE_SKILLS
        .choose_multiple(rng, count.min(BASE_SKILLS.len()))
        .map(|s| s.to_string())
        .collect();
    let mut n = names.len();
    while names.len() < count {
        n += 1;
        let candidate = format!("Skill {n}");
        if !names.contains(&candidate) {
            names.push(candidate);
        }
    }
    names
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// One employee with random name, address and phone number
pub fn random_employee<R: Rng + ?Sized>(rng: &mut R) -> Employee {
    let mut employee = Employee::new(pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES));
    employee.street = Some(format!("{} {}", pick(rng, STREETS), rng.random_range(1..100)));
    employee.postcode = Some(rng.random_range(10_000..99_999).to_string());
    employee.city = Some(pick(rng, CITIES).to_string());
    employee.phone = Some(format!(
        "+49 {} {}",
        rng.random_range(20..99),
        rng.random_range(100_000..999_999)
    ));
    employee
}

/// Two to four distinct persisted qualifications as id references
pub fn random_skill_set<R: Rng + ?Sized>(rng: &mut R, catalog: &[Qualification]) -> Vec<SkillReference> {
    let persisted: Vec<&Qualification> = catalog.iter().filter(|q| q.id.is_some()).collect();
    let amount = rng.random_range(2..=4);
    persisted
        .choose_multiple(rng, amount)
        .filter_map(|q| q.id.map(|id| SkillReference::by_id(id, q.skill.clone())))
        .collect()
}

/// `count` employees clamped to `1..=10000`, skills drawn from `catalog`
pub fn employees<R: Rng + ?Sized>(rng: &mut R, count: usize, catalog: &[Qualification]) -> Vec<Employee> {
    let count = count.clamp(1, MAX_EMPLOYEES);
    (0..count)
        .map(|_| {
            let mut employee = random_employee(rng);
            employee.skill_set = random_skill_set(rng, catalog);
            employee
        })
        .collect()
}

/// Populate the backend through the coordinator's batch operations
pub async fn seed<T, R>(
    coordinator: &Coordinator<T>,
    rng: &mut R,
    qualification_count: usize,
    employee_count: usize,
) -> Result<SeedReport, RosterError>
where
    T: Transport,
    R: Rng + ?Sized,
{
    let mut report = SeedReport::default();

    let existing = coordinator.catalog(true).await?;
    let (known, fresh): (Vec<String>, Vec<String>) = qualification_names(rng, qualification_count)
        .into_iter()
        .partition(|name| existing.iter().any(|q| &q.skill == name));
    report.qualifications_skipped = known.len();

    if !fresh.is_empty() {
        let drafts: Vec<Qualification> = fresh.into_iter().map(Qualification::new).collect();
        let batch = coordinator.create_qualifications(&drafts).await?;
        report.qualifications_created = batch.created;
        report.qualifications_failed = batch.failures.len();
    }

    let catalog = coordinator.catalog(false).await?;
    if !catalog.iter().any(|q| q.id.is_some()) {
        warn!("no persisted qualifications; seeding employees without skills");
    }

    let drafts = employees(rng, employee_count, &catalog);
    let batch = coordinator.create_employees(&drafts).await?;
    report.employees_created = batch.created;
    report.employees_failed = batch.failures.len();

    info!(
        qualifications = report.qualifications_created,
        employees = report.employees_created,
        "seeding finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_qualification_names_are_distinct_and_clamped() {
        let mut rng = rng();
        let names = qualification_names(&mut rng, 50);
        assert_eq!(names.len(), MAX_QUALIFICATIONS);
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());

        assert_eq!(qualification_names(&mut rng, 0).len(), 1);
    }

    #[test]
    fn test_random_employee_shape() {
        let mut rng = rng();
        for _ in 0..50 {
            let emp = random_employee(&mut rng);
            assert!(emp.validate().is_ok());
            let postcode: u32 = emp.postcode.as_deref().unwrap().parse().unwrap();
            assert!((10_000..99_999).contains(&postcode));
            assert!(emp.phone.as_deref().unwrap().starts_with("+49 "));
            assert!(CITIES.contains(&emp.city.as_deref().unwrap()));
        }
    }

    #[test]
    fn test_skill_sets_use_distinct_persisted_ids() {
        let mut rng = rng();
        let catalog: Vec<Qualification> = (1..=6)
            .map(|i| Qualification::with_id(i, format!("Q{i}")))
            .chain(std::iter::once(Qualification::new("Draft")))
            .collect();

        for _ in 0..50 {
            let skills = random_skill_set(&mut rng, &catalog);
            assert!((2..=4).contains(&skills.len()));
            let ids: HashSet<_> = skills.iter().filter_map(SkillReference::id).collect();
            assert_eq!(ids.len(), skills.len());
        }
    }

    #[test]
    fn test_small_catalog_limits_skill_count() {
        let mut rng = rng();
        let catalog = vec![Qualification::with_id(1, "Java")];
        let skills = random_skill_set(&mut rng, &catalog);
        assert_eq!(skills, vec![SkillReference::by_id(1, "Java")]);
    }

    #[test]
    fn test_employee_count_is_clamped() {
        let mut rng = rng();
        assert_eq!(employees(&mut rng, 0, &[]).len(), 1);
        assert_eq!(employees(&mut rng, 3, &[]).len(), 3);
    }
}
