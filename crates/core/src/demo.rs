//! Demo-data generation for sales presentations.
//!
//! Produces a [`DemoPlan`] describing a believable organization with users,
//! scenarios, tasks, triggers and alerts. Pure data -- the API handler turns
//! the plan into rows. Generation is seeded so a given seed always yields the
//! same plan.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::signals::{SignalDefinition, SIGNAL_DEFINITIONS};
use crate::status::{AlertStatus, Priority, ScenarioStatus, Severity, TaskStatus, UserRole};

pub const DEMO_USER_COUNT: usize = 4;
pub const DEMO_SCENARIO_COUNT: usize = 5;
pub const DEMO_TRIGGER_COUNT: usize = 6;
pub const DEMO_ALERT_COUNT: usize = 4;

/// Industries the generator knows how to flavour.
pub const INDUSTRIES: &[&str] = &[
    "technology",
    "financial_services",
    "healthcare",
    "manufacturing",
    "retail",
    "energy",
];

const COMPANY_PREFIXES: &[&str] = &["Northwind", "Apex", "Summit", "Meridian", "Harbor", "Vertex"];

const EXECUTIVES: &[(&str, &str, UserRole)] = &[
    ("Jordan Reyes", "Chief Executive Officer", UserRole::Executive),
    ("Priya Natarajan", "Chief Financial Officer", UserRole::Executive),
    ("Marcus Webb", "VP Strategy", UserRole::Analyst),
    ("Elena Sorensen", "Chief of Staff", UserRole::Admin),
];

const SCENARIO_TITLES: &[(&str, &str)] = &[
    ("Competitor price cut in core segment", "A top rival announced a 15% price reduction on our flagship line."),
    ("Key supplier financial distress", "Our single-source component supplier missed a debt covenant."),
    ("New data-privacy regulation", "Regulators published draft rules affecting customer data retention."),
    ("Ransomware readiness review", "Peers in our sector were hit by a coordinated ransomware campaign."),
    ("Adjacent market entry", "A window opened to enter the mid-market segment ahead of rivals."),
    ("CEO succession contingency", "The board requested an updated emergency succession plan."),
    ("Tariff escalation on imports", "Proposed tariffs would raise landed cost on 30% of SKUs."),
    ("Activist investor stake disclosed", "An activist fund disclosed a 6% stake and requested board seats."),
];

const TASK_TITLES: &[&str] = &[
    "Quantify revenue exposure",
    "Brief the executive committee",
    "Draft stakeholder communications",
    "Model response options",
    "Engage outside counsel",
    "Prepare board update",
    "Confirm budget envelope",
];

const STATUS_ROTATION: [ScenarioStatus; DEMO_SCENARIO_COUNT] = [
    ScenarioStatus::Active,
    ScenarioStatus::Voting,
    ScenarioStatus::Draft,
    ScenarioStatus::Concluded,
    ScenarioStatus::Active,
];

const ALERT_STATUS_ROTATION: [AlertStatus; DEMO_ALERT_COUNT] = [
    AlertStatus::Open,
    AlertStatus::Open,
    AlertStatus::Acknowledged,
    AlertStatus::Resolved,
];

#[derive(Debug, Clone, PartialEq)]
pub struct DemoUser {
    pub name: String,
    pub email: String,
    pub title: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoTask {
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Index into [`DemoPlan::users`].
    pub assignee: usize,
    pub due_in_days: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoScenario {
    pub title: String,
    pub description: String,
    pub status: ScenarioStatus,
    pub priority: Priority,
    pub tasks: Vec<DemoTask>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoTrigger {
    pub signal: &'static SignalDefinition,
    pub name: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoAlert {
    /// Index into [`DemoPlan::triggers`].
    pub trigger: usize,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub status: AlertStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoPlan {
    pub organization_name: String,
    pub industry: String,
    pub users: Vec<DemoUser>,
    pub scenarios: Vec<DemoScenario>,
    pub triggers: Vec<DemoTrigger>,
    pub alerts: Vec<DemoAlert>,
}

/// Build a demo plan. `organization_name` and `industry` override the
/// generated values; unknown industries fall back to `technology`.
pub fn generate(seed: u64, organization_name: Option<&str>, industry: Option<&str>) -> DemoPlan {
    let mut rng = StdRng::seed_from_u64(seed);

    let industry = industry
        .filter(|i| INDUSTRIES.contains(i))
        .unwrap_or(INDUSTRIES[0])
        .to_string();
    let organization_name = match organization_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let prefix = COMPANY_PREFIXES[rng.random_range(0..COMPANY_PREFIXES.len())];
            format!("{prefix} {} (Demo)", title_case(&industry))
        }
    };
    let domain = email_domain(&organization_name);

    let users = EXECUTIVES
        .iter()
        .map(|(name, title, role)| DemoUser {
            name: (*name).to_string(),
            email: format!("{}@{domain}", name.to_lowercase().replace(' ', ".")),
            title: (*title).to_string(),
            role: *role,
        })
        .collect();

    let mut scenario_pool: Vec<&(&str, &str)> = SCENARIO_TITLES.iter().collect();
    scenario_pool.shuffle(&mut rng);
    let scenarios = scenario_pool
        .into_iter()
        .take(DEMO_SCENARIO_COUNT)
        .zip(STATUS_ROTATION)
        .map(|(&(title, description), status)| DemoScenario {
            title: title.to_string(),
            description: description.to_string(),
            status,
            priority: Priority::ALL[rng.random_range(1..Priority::ALL.len())],
            tasks: demo_tasks(&mut rng, status),
        })
        .collect();

    let mut signal_pool: Vec<&'static SignalDefinition> = SIGNAL_DEFINITIONS.iter().collect();
    signal_pool.shuffle(&mut rng);
    let triggers: Vec<DemoTrigger> = signal_pool
        .into_iter()
        .take(DEMO_TRIGGER_COUNT)
        .map(|signal| DemoTrigger {
            signal,
            name: format!("{} watch", signal.name),
            severity: Severity::ALL[rng.random_range(1..Severity::ALL.len())],
        })
        .collect();

    let alerts = ALERT_STATUS_ROTATION
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let trigger = &triggers[i];
            DemoAlert {
                trigger: i,
                title: format!("{} threshold breached", trigger.signal.name),
                message: format!(
                    "{} moved past its threshold of {} {}.",
                    trigger.signal.name, trigger.signal.default_threshold, trigger.signal.unit
                ),
                severity: trigger.severity,
                status: *status,
            }
        })
        .collect();

    DemoPlan {
        organization_name,
        industry,
        users,
        scenarios,
        triggers,
        alerts,
    }
}

fn demo_tasks(rng: &mut StdRng, scenario_status: ScenarioStatus) -> Vec<DemoTask> {
    let count = rng.random_range(3..=5);
    let mut titles: Vec<&str> = TASK_TITLES.to_vec();
    titles.shuffle(rng);

    titles
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, title)| {
            let status = match scenario_status {
                ScenarioStatus::Concluded => TaskStatus::Completed,
                ScenarioStatus::Draft => TaskStatus::Pending,
                _ => TaskStatus::ALL[rng.random_range(0..TaskStatus::ALL.len())],
            };
            DemoTask {
                title: title.to_string(),
                status,
                priority: Priority::ALL[rng.random_range(0..Priority::ALL.len())],
                assignee: i % DEMO_USER_COUNT,
                due_in_days: rng.random_range(2..=30),
            }
        })
        .collect()
}

fn title_case(slug: &str) -> String {
    slug.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn email_domain(organization_name: &str) -> String {
    let slug: String = organization_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    if slug.is_empty() {
        "demo.example".to_string()
    } else {
        format!("{slug}.example")
    }
}
