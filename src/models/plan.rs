// ============================================================================
// Structure : Plan
// ============================================================================
// Plan d'investissement proposé aux utilisateurs (montants, ROI, durée)
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{amount_from_any, bool_from_any, Record};

api_enum! {
    /// Statut dérivé du flag `active`
    PlanStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

impl From<bool> for PlanStatus {
    fn from(active: bool) -> Self {
        if active {
            PlanStatus::Active
        } else {
            PlanStatus::Inactive
        }
    }
}

/// Plan d'investissement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "amount_from_any")]
    pub min_amount: f64,

    #[serde(default, deserialize_with = "amount_from_any")]
    pub max_amount: f64,

    /// Rendement annoncé, en pourcentage
    #[serde(default, deserialize_with = "amount_from_any")]
    pub roi_percent: f64,

    #[serde(default)]
    pub duration_days: u32,

    #[serde(default, deserialize_with = "bool_from_any")]
    pub active: bool,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn status(&self) -> PlanStatus {
        PlanStatus::from(self.active)
    }
}

impl Record for Plan {
    fn id(&self) -> i64 {
        self.id
    }

    fn status_key(&self) -> &str {
        self.status().as_str()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn amount(&self) -> f64 {
        self.min_amount
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

/// Corps de la requête de création d'un plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPlan {
    pub name: String,
    pub min_amount: f64,
    pub max_amount: f64,
    pub roi_percent: f64,
    pub duration_days: u32,
    pub active: bool,
}

impl NewPlan {
    /// Parse une saisie "nom;min;max;roi;jours"
    ///
    /// CONCEPT RUST : Option et early return avec ?
    /// - Chaque champ manquant ou non numérique renvoie None
    pub fn parse(input: &str) -> Option<Self> {
        let parts: Vec<&str> = input.split(';').map(str::trim).collect();
        if parts.len() != 5 || parts[0].is_empty() {
            return None;
        }

        Some(Self {
            name: parts[0].to_string(),
            min_amount: parts[1].parse().ok()?,
            max_amount: parts[2].parse().ok()?,
            roi_percent: parts[3].parse().ok()?,
            duration_days: parts[4].parse().ok()?,
            active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_active_flag_as_int() {
        let plan: Plan = serde_json::from_str(r#"{"id": 2, "name": "Gold", "active": 1}"#).unwrap();
        assert_eq!(plan.status(), PlanStatus::Active);
        assert_eq!(plan.status_key(), "active");
    }

    #[test]
    fn test_new_plan_parse() {
        let plan = NewPlan::parse("Silver; 100; 5000; 8.5; 30").unwrap();
        assert_eq!(plan.name, "Silver");
        assert_eq!(plan.max_amount, 5000.0);
        assert_eq!(plan.duration_days, 30);

        assert!(NewPlan::parse("Silver;abc;5000;8;30").is_none());
        assert!(NewPlan::parse("Silver;100").is_none());
    }
}
