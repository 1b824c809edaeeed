//! Handlers for executive triggers and their evaluation against an
//! observed signal value.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::error::CoreError;
use bastion_core::signals::{self, TriggerCondition};
use bastion_core::status::{validate_name, validate_optional_name, AlertStatus, Severity};
use bastion_core::types::DbId;
use bastion_db::models::alert::{Alert, CreateAlert};
use bastion_db::models::trigger::{CreateTrigger, EvaluateTrigger, Trigger, TriggerFilter, UpdateTrigger};
use bastion_db::repositories::{AlertRepo, SignalRepo, TriggerRepo};
use bastion_events::ChangeEvent;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response body for `POST /triggers/{id}/evaluate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub fired: bool,
    pub alert: Option<Alert>,
}

fn validate_threshold(threshold: Option<f64>) -> Result<(), AppError> {
    match threshold {
        Some(t) if !t.is_finite() => Err(AppError::BadRequest(
            "threshold must be a finite number".to_string(),
        )),
        _ => Ok(()),
    }
}

/// POST /api/triggers
///
/// Without an explicit `condition`/`threshold`, the linked signal's
/// defaults apply.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTrigger>,
) -> AppResult<(StatusCode, Json<Trigger>)> {
    validate_name("name", &input.name)?;
    validate_threshold(input.threshold)?;
    match input.signal_id {
        Some(signal_id) => {
            SignalRepo::find_by_id(&state.pool, signal_id)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown signal '{signal_id}'"))
                })?;
        }
        None if input.threshold.is_none() => {
            return Err(AppError::BadRequest(
                "threshold is required when no signalId is given".to_string(),
            ));
        }
        None => {}
    }

    let trigger = TriggerRepo::create(&state.pool, &input).await?;
    state.event_bus.publish(
        ChangeEvent::new(entities::TRIGGER, actions::CREATED)
            .with_entity(trigger.id)
            .with_organization(trigger.organization_id)
            .with_details(serde_json::json!({
                "name": trigger.name,
                "condition": trigger.condition,
                "threshold": trigger.threshold,
            })),
    );
    Ok((StatusCode::CREATED, Json(trigger)))
}

/// GET /api/triggers?organizationId&isActive&signalId
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TriggerFilter>,
) -> AppResult<Json<Vec<Trigger>>> {
    let triggers = TriggerRepo::list(&state.pool, &filter).await?;
    Ok(Json(triggers))
}

/// GET /api/triggers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Trigger>> {
    let trigger = TriggerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Trigger", id))?;
    Ok(Json(trigger))
}

/// PATCH /api/triggers/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTrigger>,
) -> AppResult<Json<Trigger>> {
    validate_optional_name("name", input.name.as_deref())?;
    validate_threshold(input.threshold)?;

    let trigger = TriggerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Trigger", id))?;
    state.event_bus.publish(
        ChangeEvent::new(entities::TRIGGER, actions::UPDATED)
            .with_entity(id)
            .with_organization(trigger.organization_id),
    );
    Ok(Json(trigger))
}

/// DELETE /api/triggers/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let trigger = TriggerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Trigger", id))?;
    if !TriggerRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Trigger", id).into());
    }

    state.event_bus.publish(
        ChangeEvent::new(entities::TRIGGER, actions::DELETED)
            .with_entity(id)
            .with_organization(trigger.organization_id),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/triggers/{id}/evaluate
///
/// Compares `value` against the trigger. When the condition holds, an
/// `open` alert is raised with the signal's linked playbooks as
/// recommendations and the trigger's `lastTriggeredAt` is stamped.
pub async fn evaluate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<EvaluateTrigger>,
) -> AppResult<Json<Evaluation>> {
    if !input.value.is_finite() {
        return Err(AppError::BadRequest("value must be a finite number".to_string()));
    }
    let trigger = TriggerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Trigger", id))?;
    if !trigger.is_active {
        return Err(AppError::BadRequest(format!(
            "Trigger '{}' is inactive",
            trigger.name
        )));
    }

    let condition: TriggerCondition = trigger.condition.parse()?;
    let fired = signals::evaluate(condition, trigger.threshold, input.value, input.baseline);

    state.event_bus.publish(
        ChangeEvent::new(entities::TRIGGER, actions::EVALUATED)
            .with_entity(trigger.id)
            .with_organization(trigger.organization_id)
            .with_details(serde_json::json!({
                "value": input.value,
                "baseline": input.baseline,
                "fired": fired,
            })),
    );
    if !fired {
        return Ok(Json(Evaluation { fired, alert: None }));
    }

    let signal = match trigger.signal_id {
        Some(signal_id) => SignalRepo::find_by_id(&state.pool, signal_id).await?,
        None => None,
    };
    let recommended_playbook_ids = match &signal {
        Some(signal) => SignalRepo::playbook_ids_for(&state.pool, signal.id).await?,
        None => Vec::new(),
    };

    let configured: Severity = trigger.severity.parse().unwrap_or_default();
    let severity = signals::severity_for_breach(
        configured,
        trigger.threshold,
        breach_measure(condition, input.value, input.baseline),
    );
    let (subject, unit) = match &signal {
        Some(signal) => (signal.name.as_str(), signal.unit.as_str()),
        None => (trigger.name.as_str(), ""),
    };
    let message = breach_message(
        subject,
        unit,
        condition,
        trigger.threshold,
        input.value,
        input.baseline,
    );

    let alert = AlertRepo::create(
        &state.pool,
        &CreateAlert {
            organization_id: trigger.organization_id,
            trigger_id: Some(trigger.id),
            title: format!("{} triggered", trigger.name),
            message: Some(message),
            severity: Some(severity),
            status: Some(AlertStatus::Open),
            observed_value: Some(input.value),
            recommended_playbook_ids,
        },
    )
    .await?;
    TriggerRepo::mark_triggered(&state.pool, trigger.id).await?;

    tracing::info!(
        trigger_id = %trigger.id,
        alert_id = %alert.id,
        severity = severity.as_str(),
        "Trigger fired",
    );
    state.event_bus.publish(
        ChangeEvent::new(entities::ALERT, actions::CREATED)
            .with_entity(alert.id)
            .with_organization(alert.organization_id)
            .with_details(serde_json::json!({
                "triggerId": trigger.id,
                "severity": alert.severity,
            })),
    );

    Ok(Json(Evaluation {
        fired,
        alert: Some(alert),
    }))
}

/// The quantity compared against the threshold when grading severity:
/// the percent change for `change_pct`, the raw value otherwise.
fn breach_measure(condition: TriggerCondition, value: f64, baseline: Option<f64>) -> f64 {
    match (condition, baseline) {
        (TriggerCondition::ChangePct, Some(base)) if base != 0.0 => {
            ((value - base) / base).abs() * 100.0
        }
        _ => value,
    }
}

fn unit_suffix(unit: &str) -> String {
    match unit {
        "" => String::new(),
        "percent" => "%".to_string(),
        other => format!(" {other}"),
    }
}

/// Alert body naming the signal, the observed value and the threshold.
fn breach_message(
    subject: &str,
    unit: &str,
    condition: TriggerCondition,
    threshold: f64,
    value: f64,
    baseline: Option<f64>,
) -> String {
    let unit = unit_suffix(unit);
    match (condition, baseline) {
        (TriggerCondition::ChangePct, Some(base)) => format!(
            "{subject} moved {:.1}% from a baseline of {base}{unit} to {value}{unit} \
             (threshold {threshold}%)",
            breach_measure(condition, value, baseline),
        ),
        _ => format!(
            "{subject} is {value}{unit}, {} the threshold of {threshold}{unit}",
            condition.describe(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_pct_is_graded_on_the_percent_move() {
        assert_eq!(breach_measure(TriggerCondition::ChangePct, 150.0, Some(100.0)), 50.0);
        assert_eq!(breach_measure(TriggerCondition::Gt, 130.0, Some(100.0)), 130.0);
        assert_eq!(breach_measure(TriggerCondition::ChangePct, 130.0, None), 130.0);
    }

    #[test]
    fn units_render_compactly() {
        assert_eq!(unit_suffix("percent"), "%");
        assert_eq!(unit_suffix("months"), " months");
        assert_eq!(unit_suffix(""), "");
    }

    #[test]
    fn message_names_signal_value_and_threshold() {
        let message = breach_message("Cash Runway", "months", TriggerCondition::Lt, 12.0, 6.0, None);
        assert_eq!(message, "Cash Runway is 6 months, below the threshold of 12 months");

        let message = breach_message(
            "Competitor Price Change",
            "percent",
            TriggerCondition::ChangePct,
            10.0,
            80.0,
            Some(100.0),
        );
        assert_eq!(
            message,
            "Competitor Price Change moved 20.0% from a baseline of 100% to 80% (threshold 10%)"
        );
    }

    #[test]
    fn non_finite_threshold_is_rejected() {
        assert!(validate_threshold(Some(f64::NAN)).is_err());
        assert!(validate_threshold(Some(12.5)).is_ok());
        assert!(validate_threshold(None).is_ok());
    }
}
