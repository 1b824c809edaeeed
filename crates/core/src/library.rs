//! The seeded playbook library.
//!
//! [`PLAYBOOK_TEMPLATES`] is the static list of 166 response plans, grouped by
//! strategic category (58 offense, 56 defense, 52 special teams) and tagged
//! with one of the 16 signal-category slugs as their domain. The derived
//! columns (severity, frequency, budget, duration, stakeholders, task plan)
//! are computed by [`derive_library`] from lookup tables plus a fixed-seed
//! random draw, so every seeding run produces identical rows.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::Severity;

/// Number of template rows a fully seeded library contains.
pub const EXPECTED_PLAYBOOK_COUNT: usize = 166;

/// Seed for the budget jitter draw.
const LIBRARY_RNG_SEED: u64 = 0x0B45_7104;

/// Maximum number of playbooks associated with a single signal.
pub const MAX_SIGNAL_PLAYBOOKS: usize = 5;

// ---------------------------------------------------------------------------
// Strategic category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategicCategory {
    Offense,
    Defense,
    SpecialTeams,
}

impl StrategicCategory {
    pub const ALL: &'static [StrategicCategory] = &[
        StrategicCategory::Offense,
        StrategicCategory::Defense,
        StrategicCategory::SpecialTeams,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategicCategory::Offense => "offense",
            StrategicCategory::Defense => "defense",
            StrategicCategory::SpecialTeams => "special_teams",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StrategicCategory::Offense => "Offense",
            StrategicCategory::Defense => "Defense",
            StrategicCategory::SpecialTeams => "Special Teams",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategicCategory::Offense => "Proactive moves that seize advantage or open new ground",
            StrategicCategory::Defense => "Responses that protect position against threats",
            StrategicCategory::SpecialTeams => "Rare, high-stakes situations needing dedicated handling",
        }
    }

    /// Severity lookup cycled by position within the category.
    fn severity_table(self) -> &'static [Severity] {
        match self {
            StrategicCategory::Offense => &[
                Severity::Medium,
                Severity::High,
                Severity::Medium,
                Severity::Low,
                Severity::High,
                Severity::Medium,
            ],
            StrategicCategory::Defense => &[
                Severity::Critical,
                Severity::High,
                Severity::High,
                Severity::Critical,
                Severity::Medium,
            ],
            StrategicCategory::SpecialTeams => &[
                Severity::High,
                Severity::Critical,
                Severity::Critical,
                Severity::High,
            ],
        }
    }
}

impl fmt::Display for StrategicCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategicCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offense" => Ok(StrategicCategory::Offense),
            "defense" => Ok(StrategicCategory::Defense),
            "special_teams" => Ok(StrategicCategory::SpecialTeams),
            other => Err(CoreError::Validation(format!(
                "Invalid strategic category '{other}'. Must be one of: offense, defense, special_teams"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain lookup tables
// ---------------------------------------------------------------------------

/// How often situations in a domain typically arise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Rare,
    Occasional,
    Frequent,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Rare => "rare",
            Frequency::Occasional => "occasional",
            Frequency::Frequent => "frequent",
        }
    }
}

/// Per-domain inputs to the derived playbook fields.
#[derive(Debug, Clone, Copy)]
pub struct DomainProfile {
    pub slug: &'static str,
    pub frequency: Frequency,
    /// Base budget in thousands of USD before the severity multiplier.
    pub base_budget_k: i64,
    pub stakeholders: &'static [&'static str],
}

const fn profile(
    slug: &'static str,
    frequency: Frequency,
    base_budget_k: i64,
    stakeholders: &'static [&'static str],
) -> DomainProfile {
    DomainProfile {
        slug,
        frequency,
        base_budget_k,
        stakeholders,
    }
}

/// One profile per signal category, in the same order.
pub const DOMAIN_PROFILES: &[DomainProfile] = &[
    profile("competitive", Frequency::Frequent, 150, &["CEO", "CMO", "Chief Strategy Officer"]),
    profile("financial", Frequency::Occasional, 250, &["CFO", "Treasurer", "Board Audit Committee"]),
    profile("regulatory", Frequency::Occasional, 200, &["General Counsel", "Chief Compliance Officer", "Head of Government Affairs"]),
    profile("operational", Frequency::Frequent, 175, &["COO", "VP Operations", "Plant Managers"]),
    profile("technology", Frequency::Frequent, 225, &["CTO", "CIO", "Head of Platform"]),
    profile("market", Frequency::Frequent, 200, &["CEO", "CMO", "Chief Revenue Officer"]),
    profile("reputational", Frequency::Occasional, 100, &["CEO", "Head of Communications", "General Counsel"]),
    profile("talent", Frequency::Occasional, 120, &["CHRO", "CEO", "Compensation Committee"]),
    profile("supply_chain", Frequency::Occasional, 180, &["COO", "Chief Procurement Officer", "VP Logistics"]),
    profile("cybersecurity", Frequency::Frequent, 275, &["CISO", "CIO", "General Counsel"]),
    profile("geopolitical", Frequency::Rare, 220, &["CEO", "Head of Government Affairs", "Regional Presidents"]),
    profile("customer", Frequency::Frequent, 130, &["Chief Customer Officer", "Chief Revenue Officer", "Head of Support"]),
    profile("partnership", Frequency::Occasional, 140, &["Chief Strategy Officer", "VP Alliances", "General Counsel"]),
    profile("legal", Frequency::Occasional, 260, &["General Counsel", "CEO", "Board Risk Committee"]),
    profile("environmental", Frequency::Rare, 190, &["Chief Sustainability Officer", "COO", "Head of EHS"]),
    profile("innovation", Frequency::Occasional, 210, &["CTO", "Chief Product Officer", "Head of Corporate Venture"]),
];

/// Look up the profile for a domain slug.
pub fn domain_profile(slug: &str) -> Option<&'static DomainProfile> {
    DOMAIN_PROFILES.iter().find(|p| p.slug == slug)
}

/// Budget multiplier applied per severity.
fn severity_multiplier(severity: Severity) -> i64 {
    match severity {
        Severity::Low => 1,
        Severity::Medium => 2,
        Severity::High => 4,
        Severity::Critical => 8,
    }
}

/// Estimated duration in days per severity.
fn duration_days(severity: Severity) -> i32 {
    match severity {
        Severity::Critical => 14,
        Severity::High => 30,
        Severity::Medium => 45,
        Severity::Low => 60,
    }
}

// ---------------------------------------------------------------------------
// Derived records
// ---------------------------------------------------------------------------

/// A step in a playbook's response plan. `offset_days` is relative to activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub title: String,
    pub description: String,
    pub owner_role: String,
    pub offset_days: i32,
}

/// A fully derived library entry ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybookSeed {
    pub name: &'static str,
    pub description: String,
    pub category: StrategicCategory,
    pub domain: &'static str,
    pub severity: Severity,
    pub frequency: Frequency,
    pub budget_min: i64,
    pub budget_max: i64,
    pub estimated_duration_days: i32,
    pub stakeholders: Vec<String>,
    pub tasks: Vec<TaskTemplate>,
}

/// Build the five-step response plan for a playbook.
pub fn task_plan(name: &str, stakeholders: &[&str], duration: i32) -> Vec<TaskTemplate> {
    let owner = |i: usize| {
        stakeholders
            .get(i % stakeholders.len().max(1))
            .copied()
            .unwrap_or("Executive Sponsor")
            .to_string()
    };
    vec![
        TaskTemplate {
            title: "Assess situation and impact".into(),
            description: format!("Size the exposure and upside for {name}."),
            owner_role: owner(1),
            offset_days: 1,
        },
        TaskTemplate {
            title: "Convene response team".into(),
            description: "Stand up the cross-functional team and confirm decision rights.".into(),
            owner_role: owner(0),
            offset_days: 2,
        },
        TaskTemplate {
            title: "Select response option".into(),
            description: "Compare options, agree on the course of action and budget.".into(),
            owner_role: owner(0),
            offset_days: (duration / 6).max(3),
        },
        TaskTemplate {
            title: "Execute response plan".into(),
            description: "Run the agreed actions and report progress against milestones.".into(),
            owner_role: owner(2),
            offset_days: duration / 2,
        },
        TaskTemplate {
            title: "Review outcomes and lessons".into(),
            description: "Capture results, residual risk and updates to this playbook.".into(),
            owner_role: owner(1),
            offset_days: duration,
        },
    ]
}

/// Longest horizon, in days, a playbook duration or task offset may span.
pub const MAX_PLAN_DAYS: i32 = 3650;

/// Validate a custom task plan: titled steps due within [`MAX_PLAN_DAYS`]
/// of activation.
pub fn validate_task_plan(tasks: &[TaskTemplate]) -> Result<(), CoreError> {
    for (index, task) in tasks.iter().enumerate() {
        if task.title.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "tasks[{index}].title must not be empty"
            )));
        }
        if !(0..=MAX_PLAN_DAYS).contains(&task.offset_days) {
            return Err(CoreError::Validation(format!(
                "tasks[{index}].offsetDays must be between 0 and {MAX_PLAN_DAYS}"
            )));
        }
    }
    Ok(())
}

/// Validate the budget range and duration of a custom playbook. Absent
/// values are not checked.
pub fn validate_plan_bounds(
    budget_min: Option<i64>,
    budget_max: Option<i64>,
    estimated_duration_days: Option<i32>,
) -> Result<(), CoreError> {
    for (field, value) in [("budgetMin", budget_min), ("budgetMax", budget_max)] {
        if value.is_some_and(|v| v < 0) {
            return Err(CoreError::Validation(format!("{field} must not be negative")));
        }
    }
    if let (Some(min), Some(max)) = (budget_min, budget_max) {
        if min > max {
            return Err(CoreError::Validation(
                "budgetMin must not exceed budgetMax".into(),
            ));
        }
    }
    if estimated_duration_days.is_some_and(|d| !(0..=MAX_PLAN_DAYS).contains(&d)) {
        return Err(CoreError::Validation(format!(
            "estimatedDurationDays must be between 0 and {MAX_PLAN_DAYS}"
        )));
    }
    Ok(())
}

/// Derive every library entry from [`PLAYBOOK_TEMPLATES`].
///
/// Deterministic: uses a fixed-seed RNG for the budget jitter.
pub fn derive_library() -> Vec<PlaybookSeed> {
    let mut rng = StdRng::seed_from_u64(LIBRARY_RNG_SEED);
    let mut position_in_category = [0usize; 3];

    PLAYBOOK_TEMPLATES
        .iter()
        .map(|&(category, domain, name)| {
            let slot = match category {
                StrategicCategory::Offense => 0,
                StrategicCategory::Defense => 1,
                StrategicCategory::SpecialTeams => 2,
            };
            let position = position_in_category[slot];
            position_in_category[slot] += 1;

            let table = category.severity_table();
            let severity = table[position % table.len()];
            let profile = domain_profile(domain).unwrap_or(&DOMAIN_PROFILES[0]);

            let jitter_pct: i64 = rng.random_range(0..=25);
            let base = profile.base_budget_k * 1_000 * severity_multiplier(severity);
            let budget_min = base + base * jitter_pct / 100;
            let budget_max = (budget_min * 3 + 1) / 2;
            let duration = duration_days(severity);

            PlaybookSeed {
                name,
                description: format!(
                    "{} playbook for {} situations: {}.",
                    category.display_name(),
                    domain.replace('_', " "),
                    name.to_lowercase()
                ),
                category,
                domain,
                severity,
                frequency: profile.frequency,
                budget_min,
                budget_max,
                estimated_duration_days: duration,
                stakeholders: profile.stakeholders.iter().map(|s| s.to_string()).collect(),
                tasks: task_plan(name, profile.stakeholders, duration),
            }
        })
        .collect()
}

/// Rank library entries for a signal's domain.
///
/// Returns up to [`MAX_SIGNAL_PLAYBOOKS`] `(index into library, relevance)`
/// pairs, most severe first, ties broken by library order. Relevance starts
/// at 1.0 and drops 0.15 per rank.
pub fn rank_for_domain(library: &[PlaybookSeed], domain: &str) -> Vec<(usize, f64)> {
    let mut candidates: Vec<(usize, &PlaybookSeed)> = library
        .iter()
        .enumerate()
        .filter(|(_, p)| p.domain == domain)
        .collect();
    candidates.sort_by(|(ia, a), (ib, b)| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then(ia.cmp(ib))
    });

    candidates
        .into_iter()
        .take(MAX_SIGNAL_PLAYBOOKS)
        .enumerate()
        .map(|(rank, (index, _))| (index, 1.0 - 0.15 * rank as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Static templates
// ---------------------------------------------------------------------------

use StrategicCategory::{Defense as D, Offense as O, SpecialTeams as S};

/// `(category, domain slug, name)` for every seeded playbook.
pub const PLAYBOOK_TEMPLATES: &[(StrategicCategory, &str, &str)] = &[
    // --- Offense (58) ---
    (O, "competitive", "Competitor Weakness Exploitation"),
    (O, "competitive", "Preemptive Price Repositioning"),
    (O, "competitive", "Category Leadership Campaign"),
    (O, "competitive", "Competitive Talent Acquisition Push"),
    (O, "financial", "Opportunistic Debt Refinancing"),
    (O, "financial", "Share Buyback Acceleration"),
    (O, "financial", "Strategic Capital Raise"),
    (O, "financial", "Working Capital Optimization Drive"),
    (O, "regulatory", "Regulatory Advantage Positioning"),
    (O, "regulatory", "Early Compliance Certification"),
    (O, "regulatory", "Policy Shaping Coalition"),
    (O, "operational", "Operational Excellence Sprint"),
    (O, "operational", "Capacity Expansion Program"),
    (O, "operational", "Shared Services Consolidation"),
    (O, "operational", "Automation Scale-Up"),
    (O, "technology", "Platform Modernization Launch"),
    (O, "technology", "AI Capability Rollout"),
    (O, "technology", "Data Monetization Initiative"),
    (O, "technology", "Cloud Migration Acceleration"),
    (O, "market", "New Market Entry"),
    (O, "market", "Adjacent Segment Expansion"),
    (O, "market", "Geographic Expansion Wave"),
    (O, "market", "Premium Tier Launch"),
    (O, "reputational", "Thought Leadership Offensive"),
    (O, "reputational", "Brand Repositioning Campaign"),
    (O, "reputational", "Industry Award Strategy"),
    (O, "talent", "Leadership Bench Build-Out"),
    (O, "talent", "Strategic Acqui-Hire"),
    (O, "talent", "Employer Brand Campaign"),
    (O, "talent", "Critical Skills Academy"),
    (O, "supply_chain", "Supplier Consolidation Leverage"),
    (O, "supply_chain", "Nearshoring Advantage Play"),
    (O, "supply_chain", "Vertical Integration Move"),
    (O, "cybersecurity", "Security as Differentiator Campaign"),
    (O, "cybersecurity", "Zero Trust Market Signal"),
    (O, "cybersecurity", "Trust Certification Launch"),
    (O, "geopolitical", "Emerging Market Beachhead"),
    (O, "geopolitical", "Trade Agreement Exploitation"),
    (O, "geopolitical", "Sovereign Partnership Bid"),
    (O, "customer", "Key Account Expansion"),
    (O, "customer", "Customer Loyalty Program Launch"),
    (O, "customer", "Win-Back Campaign"),
    (O, "customer", "Customer Advisory Board Launch"),
    (O, "partnership", "Strategic Alliance Formation"),
    (O, "partnership", "Channel Partner Expansion"),
    (O, "partnership", "Joint Venture Launch"),
    (O, "partnership", "Ecosystem Platform Play"),
    (O, "legal", "Patent Portfolio Monetization"),
    (O, "legal", "IP Licensing Program"),
    (O, "legal", "Litigation Leverage Strategy"),
    (O, "environmental", "Green Product Line Launch"),
    (O, "environmental", "Carbon Neutral Certification Push"),
    (O, "environmental", "Sustainability-Linked Financing"),
    (O, "environmental", "Circular Economy Program"),
    (O, "innovation", "Disruptive Product Launch"),
    (O, "innovation", "Corporate Venture Investment"),
    (O, "innovation", "Innovation Lab Spin-Up"),
    (O, "innovation", "Rapid Prototype Commercialization"),
    // --- Defense (56) ---
    (D, "competitive", "New Entrant Response"),
    (D, "competitive", "Price War Defense"),
    (D, "competitive", "Competitor Product Launch Counter"),
    (D, "competitive", "Key Account Poaching Defense"),
    (D, "financial", "Liquidity Crisis Response"),
    (D, "financial", "Credit Downgrade Response"),
    (D, "financial", "Earnings Miss Recovery"),
    (D, "financial", "Currency Exposure Hedge"),
    (D, "regulatory", "Regulatory Investigation Response"),
    (D, "regulatory", "New Regulation Compliance Sprint"),
    (D, "regulatory", "License Revocation Defense"),
    (D, "regulatory", "Antitrust Inquiry Response"),
    (D, "operational", "Plant Shutdown Recovery"),
    (D, "operational", "Quality Failure Containment"),
    (D, "operational", "Service Outage Response"),
    (D, "operational", "Cost Overrun Containment"),
    (D, "technology", "Legacy System Failure Response"),
    (D, "technology", "Technology Obsolescence Defense"),
    (D, "technology", "Critical Vendor Platform Sunset"),
    (D, "market", "Demand Collapse Response"),
    (D, "market", "Market Share Erosion Defense"),
    (D, "market", "Commoditization Defense"),
    (D, "market", "Channel Disruption Response"),
    (D, "reputational", "Negative Media Campaign Response"),
    (D, "reputational", "Social Media Crisis Response"),
    (D, "reputational", "Executive Misconduct Response"),
    (D, "reputational", "Activist Campaign Defense"),
    (D, "talent", "Key Executive Departure"),
    (D, "talent", "Mass Attrition Response"),
    (D, "talent", "Labor Dispute Resolution"),
    (D, "supply_chain", "Supplier Insolvency Response"),
    (D, "supply_chain", "Logistics Disruption Response"),
    (D, "supply_chain", "Raw Material Shortage Response"),
    (D, "supply_chain", "Single-Source Risk Mitigation"),
    (D, "cybersecurity", "Ransomware Attack Response"),
    (D, "cybersecurity", "Data Breach Response"),
    (D, "cybersecurity", "Insider Threat Containment"),
    (D, "cybersecurity", "Third-Party Breach Response"),
    (D, "geopolitical", "Sanctions Exposure Response"),
    (D, "geopolitical", "Tariff Escalation Defense"),
    (D, "geopolitical", "Regional Instability Evacuation"),
    (D, "customer", "Major Customer Loss Response"),
    (D, "customer", "Product Recall Management"),
    (D, "customer", "Customer Data Complaint Escalation"),
    (D, "partnership", "Partner Default Response"),
    (D, "partnership", "Alliance Breakdown Response"),
    (D, "partnership", "Channel Conflict Resolution"),
    (D, "legal", "Class Action Defense"),
    (D, "legal", "IP Infringement Defense"),
    (D, "legal", "Contract Dispute Escalation"),
    (D, "environmental", "Environmental Incident Response"),
    (D, "environmental", "Climate Disclosure Challenge"),
    (D, "environmental", "Extreme Weather Continuity"),
    (D, "innovation", "Disruptive Technology Threat"),
    (D, "innovation", "R&D Pipeline Failure"),
    (D, "innovation", "Failed Product Launch Recovery"),
    // --- Special teams (52) ---
    (S, "competitive", "Hostile Takeover Defense"),
    (S, "competitive", "Competitor Acquisition Response"),
    (S, "competitive", "Industry Consolidation Play"),
    (S, "financial", "Activist Investor Engagement"),
    (S, "financial", "Merger Integration Playbook"),
    (S, "financial", "Divestiture Execution"),
    (S, "financial", "Bankruptcy Contingency Plan"),
    (S, "regulatory", "Government Shutdown Contingency"),
    (S, "regulatory", "Emergency Regulatory Waiver"),
    (S, "regulatory", "Whistleblower Disclosure Handling"),
    (S, "operational", "Pandemic Continuity Plan"),
    (S, "operational", "Headquarters Relocation"),
    (S, "operational", "Business Continuity Activation"),
    (S, "operational", "Facility Emergency Response"),
    (S, "technology", "Critical Infrastructure Failover"),
    (S, "technology", "Technology Carve-Out"),
    (S, "technology", "AI Incident Response"),
    (S, "market", "Black Swan Market Event"),
    (S, "market", "Market Exit Execution"),
    (S, "market", "Category Collapse Pivot"),
    (S, "market", "Sudden Demand Surge Response"),
    (S, "reputational", "Crisis Communications Activation"),
    (S, "reputational", "CEO Health Disclosure"),
    (S, "reputational", "Viral Incident Response"),
    (S, "talent", "CEO Succession Emergency"),
    (S, "talent", "Board Member Departure"),
    (S, "talent", "Executive Kidnap and Ransom Response"),
    (S, "talent", "Workforce Restructuring"),
    (S, "supply_chain", "Port Closure Response"),
    (S, "supply_chain", "Global Shortage Allocation"),
    (S, "supply_chain", "Supplier Fraud Response"),
    (S, "cybersecurity", "Nation-State Intrusion Response"),
    (S, "cybersecurity", "Critical Systems Lockout"),
    (S, "cybersecurity", "Deepfake Executive Fraud"),
    (S, "geopolitical", "Armed Conflict Exposure"),
    (S, "geopolitical", "Expropriation Response"),
    (S, "geopolitical", "Election Volatility Preparedness"),
    (S, "customer", "Mass Customer Harm Event"),
    (S, "customer", "Product Tampering Response"),
    (S, "customer", "Data Subject Request Surge"),
    (S, "partnership", "Joint Venture Unwind"),
    (S, "partnership", "Strategic Partner Acquired by Rival"),
    (S, "partnership", "Partner Ethics Breach"),
    (S, "legal", "Criminal Investigation Response"),
    (S, "legal", "Dawn Raid Readiness"),
    (S, "legal", "Executive Indictment Response"),
    (S, "environmental", "Natural Disaster Response"),
    (S, "environmental", "Toxic Release Emergency"),
    (S, "environmental", "Climate Litigation Response"),
    (S, "innovation", "Breakthrough Acquisition Opportunity"),
    (S, "innovation", "Moonshot Program Launch"),
    (S, "innovation", "Open Innovation Challenge"),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assert_matches::assert_matches;

    use super::*;
    use crate::signals::SIGNAL_CATEGORIES;

    fn count(category: StrategicCategory) -> usize {
        PLAYBOOK_TEMPLATES
            .iter()
            .filter(|(c, _, _)| *c == category)
            .count()
    }

    #[test]
    fn library_has_expected_size_and_split() {
        assert_eq!(PLAYBOOK_TEMPLATES.len(), EXPECTED_PLAYBOOK_COUNT);
        assert_eq!(count(StrategicCategory::Offense), 58);
        assert_eq!(count(StrategicCategory::Defense), 56);
        assert_eq!(count(StrategicCategory::SpecialTeams), 52);
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = PLAYBOOK_TEMPLATES.iter().map(|(_, _, n)| *n).collect();
        assert_eq!(names.len(), EXPECTED_PLAYBOOK_COUNT);
    }

    #[test]
    fn every_domain_is_a_signal_category_with_a_profile() {
        for (_, domain, name) in PLAYBOOK_TEMPLATES {
            assert!(
                SIGNAL_CATEGORIES.iter().any(|c| c.slug == *domain),
                "{name} has unknown domain {domain}"
            );
            assert!(domain_profile(domain).is_some());
        }
        assert_eq!(DOMAIN_PROFILES.len(), SIGNAL_CATEGORIES.len());
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(derive_library(), derive_library());
    }

    #[test]
    fn derived_budgets_follow_severity_multiplier() {
        for seed in derive_library() {
            let profile = domain_profile(seed.domain).unwrap();
            let base = profile.base_budget_k * 1_000 * severity_multiplier(seed.severity);
            assert!(seed.budget_min >= base);
            assert!(seed.budget_min <= base + base / 4);
            assert!(seed.budget_max > seed.budget_min);
            assert_eq!(seed.estimated_duration_days, duration_days(seed.severity));
            assert_eq!(seed.tasks.len(), 5);
        }
    }

    #[test]
    fn first_defense_playbook_is_critical() {
        let library = derive_library();
        let first_defense = library
            .iter()
            .find(|p| p.category == StrategicCategory::Defense)
            .unwrap();
        assert_eq!(first_defense.severity, Severity::Critical);
    }

    #[test]
    fn task_plan_offsets_are_non_decreasing() {
        let plan = task_plan("Test", &["CEO", "CFO", "COO"], 30);
        let offsets: Vec<_> = plan.iter().map(|t| t.offset_days).collect();
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]), "{offsets:?}");
        assert_eq!(plan.last().unwrap().offset_days, 30);
    }

    #[test]
    fn derived_plans_pass_custom_plan_validation() {
        for seed in derive_library() {
            validate_task_plan(&seed.tasks).unwrap();
            validate_plan_bounds(
                Some(seed.budget_min),
                Some(seed.budget_max),
                Some(seed.estimated_duration_days),
            )
            .unwrap();
        }
    }

    #[test]
    fn task_plan_rejects_offsets_outside_the_horizon() {
        let mut plan = task_plan("Test", &["CEO"], 30);
        plan[2].offset_days = -1;
        assert_matches!(validate_task_plan(&plan), Err(CoreError::Validation(msg)) => {
            assert_eq!(msg, "tasks[2].offsetDays must be between 0 and 3650");
        });

        plan[2].offset_days = i32::MAX;
        assert!(validate_task_plan(&plan).is_err());

        plan[2].offset_days = MAX_PLAN_DAYS;
        assert!(validate_task_plan(&plan).is_ok());
    }

    #[test]
    fn plan_bounds_reject_negative_and_inverted_budgets() {
        assert!(validate_plan_bounds(None, None, None).is_ok());
        assert!(validate_plan_bounds(Some(-1), None, None).is_err());
        assert!(validate_plan_bounds(Some(10), Some(5), None).is_err());
        assert!(validate_plan_bounds(Some(5), Some(10), Some(MAX_PLAN_DAYS + 1)).is_err());
        assert!(validate_plan_bounds(Some(5), Some(10), Some(90)).is_ok());
    }

    #[test]
    fn domain_ranking_prefers_severity_then_order() {
        let library = derive_library();
        let ranked = rank_for_domain(&library, "cybersecurity");
        assert_eq!(ranked.len(), MAX_SIGNAL_PLAYBOOKS);
        assert!((ranked[0].1 - 1.0).abs() < f64::EPSILON);
        for pair in ranked.windows(2) {
            let (a, b) = (&library[pair[0].0], &library[pair[1].0]);
            assert!(a.severity.rank() >= b.severity.rank());
            assert!(pair[0].1 > pair[1].1);
        }
        assert!(ranked.iter().all(|(i, _)| library[*i].domain == "cybersecurity"));
    }

    #[test]
    fn category_parses_from_text() {
        assert_eq!(
            "special_teams".parse::<StrategicCategory>().unwrap(),
            StrategicCategory::SpecialTeams
        );
        assert!("midfield".parse::<StrategicCategory>().is_err());
    }
}
