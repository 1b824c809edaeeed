//! Signal catalogue and trigger condition evaluation.
//!
//! Pure logic -- no database access. The seeding code inserts
//! [`SIGNAL_CATEGORIES`] and [`SIGNAL_DEFINITIONS`] into lookup tables; the
//! trigger handlers fetch a trigger row and pass its threshold and condition
//! into [`evaluate`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::Severity;

/// A topical grouping for signals. Playbook domains reuse the same slugs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalCategory {
    pub slug: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The 16 predefined signal categories, in display order.
pub const SIGNAL_CATEGORIES: &[SignalCategory] = &[
    SignalCategory { slug: "competitive", name: "Competitive", description: "Moves by rivals, new entrants and substitutes" },
    SignalCategory { slug: "financial", name: "Financial", description: "Liquidity, capital structure and performance against plan" },
    SignalCategory { slug: "regulatory", name: "Regulatory", description: "Rule changes, investigations and compliance findings" },
    SignalCategory { slug: "operational", name: "Operational", description: "Production, service delivery and cost discipline" },
    SignalCategory { slug: "technology", name: "Technology", description: "Platform health, obsolescence and technical debt" },
    SignalCategory { slug: "market", name: "Market", description: "Demand, share and pricing conditions" },
    SignalCategory { slug: "reputational", name: "Reputational", description: "Media, sentiment and stakeholder trust" },
    SignalCategory { slug: "talent", name: "Talent", description: "Leadership depth, attrition and engagement" },
    SignalCategory { slug: "supply_chain", name: "Supply Chain", description: "Supplier health, logistics and inventory" },
    SignalCategory { slug: "cybersecurity", name: "Cybersecurity", description: "Threats, vulnerabilities and incidents" },
    SignalCategory { slug: "geopolitical", name: "Geopolitical", description: "Trade policy, sanctions and country risk" },
    SignalCategory { slug: "customer", name: "Customer", description: "Churn, concentration and satisfaction" },
    SignalCategory { slug: "partnership", name: "Partnership", description: "Alliance, channel and joint-venture health" },
    SignalCategory { slug: "legal", name: "Legal", description: "Litigation exposure and intellectual property" },
    SignalCategory { slug: "environmental", name: "Environmental", description: "Emissions, incidents and climate exposure" },
    SignalCategory { slug: "innovation", name: "Innovation", description: "R&D pipeline and new-product performance" },
];

/// Number of signals seeded per category.
pub const SIGNALS_PER_CATEGORY: usize = 3;

/// Look up a category by slug.
pub fn category(slug: &str) -> Option<&'static SignalCategory> {
    SIGNAL_CATEGORIES.iter().find(|c| c.slug == slug)
}

/// Validate a category slug supplied by a client.
pub fn validate_category(slug: &str) -> Result<(), CoreError> {
    if category(slug).is_some() {
        return Ok(());
    }
    let accepted: Vec<&str> = SIGNAL_CATEGORIES.iter().map(|c| c.slug).collect();
    Err(CoreError::Validation(format!(
        "Invalid signal category '{slug}'. Must be one of: {}",
        accepted.join(", ")
    )))
}

// ---------------------------------------------------------------------------
// Trigger conditions
// ---------------------------------------------------------------------------

/// Comparison applied between an observed value and a trigger threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCondition {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    /// Fires when the value moved at least `threshold` percent from a baseline.
    ChangePct,
}

impl TriggerCondition {
    pub const ALL: &'static [TriggerCondition] = &[
        TriggerCondition::Gt,
        TriggerCondition::Gte,
        TriggerCondition::Lt,
        TriggerCondition::Lte,
        TriggerCondition::Eq,
        TriggerCondition::ChangePct,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TriggerCondition::Gt => "gt",
            TriggerCondition::Gte => "gte",
            TriggerCondition::Lt => "lt",
            TriggerCondition::Lte => "lte",
            TriggerCondition::Eq => "eq",
            TriggerCondition::ChangePct => "change_pct",
        }
    }

    /// Human-readable operator used in alert messages.
    pub fn describe(self) -> &'static str {
        match self {
            TriggerCondition::Gt => "above",
            TriggerCondition::Gte => "at or above",
            TriggerCondition::Lt => "below",
            TriggerCondition::Lte => "at or below",
            TriggerCondition::Eq => "equal to",
            TriggerCondition::ChangePct => "a change of at least (%)",
        }
    }
}

impl fmt::Display for TriggerCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerCondition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerCondition::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid trigger condition '{s}'. Must be one of: gt, gte, lt, lte, eq, change_pct"
                ))
            })
    }
}

/// Tolerance used by [`TriggerCondition::Eq`].
const EQ_EPSILON: f64 = 1e-9;

/// Returns `true` if `value` satisfies `condition` against `threshold`.
///
/// `baseline` is only consulted by [`TriggerCondition::ChangePct`], which
/// never fires without a non-zero baseline.
pub fn evaluate(
    condition: TriggerCondition,
    threshold: f64,
    value: f64,
    baseline: Option<f64>,
) -> bool {
    match condition {
        TriggerCondition::Gt => value > threshold,
        TriggerCondition::Gte => value >= threshold,
        TriggerCondition::Lt => value < threshold,
        TriggerCondition::Lte => value <= threshold,
        TriggerCondition::Eq => (value - threshold).abs() < EQ_EPSILON,
        TriggerCondition::ChangePct => match baseline {
            Some(base) if base.abs() > EQ_EPSILON => {
                ((value - base) / base).abs() * 100.0 >= threshold
            }
            _ => false,
        },
    }
}

/// Escalate `configured` severity by how far `value` overshoots `threshold`.
///
/// Overshoot is relative to the threshold's magnitude: under 10% keeps at
/// least `medium`, under 25% at least `high`, anything beyond is `critical`.
/// The result is never lower than `configured`.
pub fn severity_for_breach(configured: Severity, threshold: f64, value: f64) -> Severity {
    let overshoot = if threshold.abs() > EQ_EPSILON {
        ((value - threshold) / threshold).abs()
    } else {
        value.abs()
    };

    let computed = if overshoot < 0.10 {
        Severity::Medium
    } else if overshoot < 0.25 {
        Severity::High
    } else {
        Severity::Critical
    };
    configured.max(computed)
}

// ---------------------------------------------------------------------------
// Signal definitions
// ---------------------------------------------------------------------------

/// A monitored metric that triggers are attached to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalDefinition {
    pub category: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub default_threshold: f64,
    pub default_condition: TriggerCondition,
}

const fn signal(
    category: &'static str,
    name: &'static str,
    unit: &'static str,
    default_threshold: f64,
    default_condition: TriggerCondition,
) -> SignalDefinition {
    SignalDefinition {
        category,
        name,
        unit,
        default_threshold,
        default_condition,
    }
}

use TriggerCondition::{ChangePct, Gt, Gte, Lt};

/// Three signals per category, grouped in [`SIGNAL_CATEGORIES`] order.
pub const SIGNAL_DEFINITIONS: &[SignalDefinition] = &[
    signal("competitive", "Competitor Price Change", "percent", 10.0, ChangePct),
    signal("competitive", "Competitor Product Launches", "count", 1.0, Gte),
    signal("competitive", "Share of Voice", "percent", 20.0, Lt),
    signal("financial", "Cash Runway", "months", 12.0, Lt),
    signal("financial", "Credit Spread", "bps", 300.0, Gt),
    signal("financial", "Revenue Variance to Plan", "percent", 5.0, ChangePct),
    signal("regulatory", "Pending Regulatory Actions", "count", 1.0, Gte),
    signal("regulatory", "Compliance Findings", "count", 3.0, Gt),
    signal("regulatory", "Open Policy Consultations", "count", 2.0, Gte),
    signal("operational", "Unplanned Downtime", "hours", 8.0, Gt),
    signal("operational", "Defect Rate", "percent", 2.0, Gt),
    signal("operational", "On-Time Delivery", "percent", 95.0, Lt),
    signal("technology", "Critical System Availability", "percent", 99.5, Lt),
    signal("technology", "Technical Debt Ratio", "percent", 30.0, Gt),
    signal("technology", "Unsupported Systems", "count", 0.0, Gt),
    signal("market", "Market Growth Rate", "percent", 0.0, Lt),
    signal("market", "Market Share", "percent", 5.0, ChangePct),
    signal("market", "Demand Index", "index", 90.0, Lt),
    signal("reputational", "Negative Sentiment Share", "percent", 25.0, Gt),
    signal("reputational", "Media Mentions", "count", 50.0, ChangePct),
    signal("reputational", "Net Promoter Score", "score", 20.0, Lt),
    signal("talent", "Voluntary Attrition", "percent", 15.0, Gt),
    signal("talent", "Key Role Vacancies", "count", 3.0, Gt),
    signal("talent", "Engagement Score", "score", 65.0, Lt),
    signal("supply_chain", "Supplier Lead Time", "days", 45.0, Gt),
    signal("supply_chain", "Single-Source Spend Share", "percent", 40.0, Gt),
    signal("supply_chain", "Inventory Coverage", "days", 14.0, Lt),
    signal("cybersecurity", "Open Critical Vulnerabilities", "count", 0.0, Gt),
    signal("cybersecurity", "Phishing Click Rate", "percent", 5.0, Gt),
    signal("cybersecurity", "Security Incidents", "count", 1.0, Gte),
    signal("geopolitical", "Country Risk Index", "index", 70.0, Gt),
    signal("geopolitical", "Tariff Exposure", "percent", 10.0, Gt),
    signal("geopolitical", "Sanctioned Counterparties", "count", 0.0, Gt),
    signal("customer", "Customer Churn", "percent", 5.0, Gt),
    signal("customer", "Top Account Revenue Concentration", "percent", 30.0, Gt),
    signal("customer", "Complaint Volume", "count", 25.0, ChangePct),
    signal("partnership", "Partner Revenue Share", "percent", 15.0, ChangePct),
    signal("partnership", "Partner Health Score", "score", 60.0, Lt),
    signal("partnership", "Contract Renewals at Risk", "count", 2.0, Gt),
    signal("legal", "Active Litigation Matters", "count", 5.0, Gt),
    signal("legal", "Litigation Reserve", "usd", 1_000_000.0, Gt),
    signal("legal", "IP Challenges", "count", 1.0, Gte),
    signal("environmental", "Emissions Intensity", "tco2e_per_unit", 10.0, ChangePct),
    signal("environmental", "Environmental Incidents", "count", 1.0, Gte),
    signal("environmental", "Climate Risk Score", "score", 70.0, Gt),
    signal("innovation", "R&D Pipeline Value", "usd", 20.0, ChangePct),
    signal("innovation", "New Product Revenue Share", "percent", 10.0, Lt),
    signal("innovation", "Patent Filings", "count", 5.0, Lt),
];
