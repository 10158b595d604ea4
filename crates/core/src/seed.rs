//! Static default content.
//!
//! Used to seed empty collections and as the fallback for public reads when
//! the store is unreachable.

use serde_json::{Map, Value, json};

use crate::types::{CompanyRecord, Project, ProjectId, Skill, SkillCategory};

/// Slug of the single skills/company document.
pub const DEFAULT_SLUG: &str = "default";

struct SeedProject {
    title: &'static str,
    problem: &'static str,
    solution: &'static str,
    impact: &'static str,
    tech_stack: &'static [&'static str],
    live_link: &'static str,
    github_link: &'static str,
    featured: bool,
    metrics: Value,
}

fn seed_projects() -> Vec<SeedProject> {
    vec![
        SeedProject {
            title: "Inventory Sync Platform",
            problem: "Retail stores kept stock counts in spreadsheets that drifted from the \
                      online catalogue within hours.",
            solution: "Event-driven sync service that reconciles point-of-sale and warehouse \
                       feeds into a single stock ledger.",
            impact: "Overselling dropped to near zero and manual stock takes went from weekly \
                     to quarterly.",
            tech_stack: &["Rust", "PostgreSQL", "Redis", "Docker"],
            live_link: "",
            github_link: "",
            featured: true,
            metrics: json!({
                "users": 1200,
                "growth": "45%",
                "retention": "92%",
                "performance": "3x faster"
            }),
        },
        SeedProject {
            title: "Clinic Booking App",
            problem: "Patients booked by phone and receptionists spent most of the morning on \
                      scheduling calls.",
            solution: "Mobile booking app with live availability, reminders and a staff \
                       dashboard.",
            impact: "Phone bookings fell by two thirds and no-shows dropped after reminders \
                     launched.",
            tech_stack: &["React Native", "Node.js", "MongoDB"],
            live_link: "",
            github_link: "",
            featured: true,
            metrics: json!({
                "users": 5400,
                "satisfaction": "4.8/5",
                "conversion": "31%"
            }),
        },
        SeedProject {
            title: "Analytics Dashboard",
            problem: "Marketing reports were assembled by hand from four different tools.",
            solution: "Unified dashboard pulling campaign data on a schedule with shareable \
                       report views.",
            impact: "Weekly reporting time went from a day to a few minutes.",
            tech_stack: &["Next.js", "TypeScript", "Tailwind CSS"],
            live_link: "",
            github_link: "",
            featured: false,
            metrics: json!({
                "revenue": "$120k",
                "completion": "100%"
            }),
        },
    ]
}

/// Default projects with sequential ids starting at 1.
#[must_use]
pub fn default_projects() -> Vec<Project> {
    seed_projects()
        .into_iter()
        .zip(1_i64..)
        .map(|(seed, id)| Project {
            id: ProjectId::new(id),
            title: seed.title.to_owned(),
            problem: seed.problem.to_owned(),
            solution: seed.solution.to_owned(),
            impact: seed.impact.to_owned(),
            tech_stack: seed.tech_stack.iter().map(|s| (*s).to_owned()).collect(),
            images: Vec::new(),
            live_link: seed.live_link.to_owned(),
            github_link: seed.github_link.to_owned(),
            featured: seed.featured,
            metrics: match seed.metrics {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        })
        .collect()
}

fn skill(name: &str, level: u8, years: f64, icon_key: &str) -> Skill {
    Skill {
        name: name.to_owned(),
        level,
        years,
        icon_key: Some(icon_key.to_owned()),
    }
}

/// Default skill categories.
#[must_use]
pub fn default_skills() -> Vec<SkillCategory> {
    vec![
        SkillCategory {
            key: "frontend".into(),
            category: "Frontend".into(),
            skills: vec![
                skill("React", 90, 5.0, "Code"),
                skill("Next.js", 85, 4.0, "Code"),
                skill("Tailwind CSS", 85, 3.0, "Palette"),
            ],
        },
        SkillCategory {
            key: "backend".into(),
            category: "Backend".into(),
            skills: vec![
                skill("Node.js", 85, 5.0, "Server"),
                skill("Rust", 75, 2.0, "Server"),
                skill("PostgreSQL", 80, 4.0, "Database"),
                skill("MongoDB", 80, 4.0, "Database"),
            ],
        },
        SkillCategory {
            key: "mobile".into(),
            category: "Mobile".into(),
            skills: vec![skill("React Native", 80, 3.0, "Smartphone")],
        },
        SkillCategory {
            key: "devops".into(),
            category: "DevOps & Tools".into(),
            skills: vec![
                skill("Docker", 75, 3.0, "Cloud"),
                skill("Git", 90, 6.0, "GitBranch"),
                skill("CI/CD", 70, 3.0, "Settings"),
            ],
        },
    ]
}

/// Default company record.
#[must_use]
pub fn default_company() -> CompanyRecord {
    CompanyRecord {
        company_info: json!({
            "name": "Portfolio Studio",
            "description": "A small product studio building web and mobile software for \
                            growing businesses.",
            "founded": "2020",
            "location": "Remote",
            "website": "",
            "email": "",
            "industry": "Software Development"
        }),
        team: json!({
            "total": 4,
            "departments": [
                { "name": "Engineering", "size": 2, "description": "Web, mobile and backend development." },
                { "name": "Design", "size": 1, "description": "Product and interface design." },
                { "name": "Operations", "size": 1, "description": "Delivery and client relations." }
            ]
        }),
        achievements: json!([
            { "title": "First Product Launch", "description": "Shipped the first client product to production.", "year": "2020", "icon": "Rocket" },
            { "title": "50 Projects Delivered", "description": "Delivered fifty projects across retail, health and media.", "year": "2023", "icon": "Award" }
        ]),
        vision: json!({
            "title": "Our Vision",
            "content": "Software that small teams can rely on without a large IT department."
        }),
        mission: json!({
            "title": "Our Mission",
            "content": "Turn business problems into focused, maintainable products."
        }),
        values: json!([
            { "title": "Clarity", "description": "Plain communication and honest estimates.", "icon": "Eye" },
            { "title": "Craft", "description": "Careful work that holds up after launch.", "icon": "Heart" },
            { "title": "Ownership", "description": "We treat client products like our own.", "icon": "Target" }
        ]),
        milestones: json!([
            { "date": "2020", "title": "Founded", "description": "Started as a two-person studio." },
            { "date": "2022", "title": "Mobile Practice", "description": "Added mobile development." },
            { "date": "2024", "title": "Team of Four", "description": "Grew the team to four people." }
        ]),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::skill::parse_categories;

    #[test]
    fn test_default_project_ids_are_sequential() {
        let ids: Vec<i64> = default_projects().iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_default_projects_normalize_cleanly() {
        for project in default_projects() {
            let doc = Value::Object(project.to_document());
            assert_eq!(Project::from_document(&doc).unwrap(), project);
            assert!(!project.title.is_empty());
        }
    }

    #[test]
    fn test_default_skills_validate() {
        let value = serde_json::to_value(default_skills()).unwrap();
        assert_eq!(parse_categories(&value).unwrap(), default_skills());
    }

    #[test]
    fn test_default_company_sections_present() {
        let company = default_company();
        assert!(company.company_info.get("name").is_some());
        assert!(company.team["departments"].is_array());
        assert!(company.milestones.is_array());
    }
}
