use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// cm³ per m³.
pub const CUBIC_CM_PER_CUBIC_M: f64 = 1_000_000.0;

/// Validated calculator input. Dimensions are in centimetres, price is per m³.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    pub thickness: f64,
    pub width: f64,
    pub length: f64,
    pub quantity: u32,
    pub package_quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    pub unit_volume: f64,
    pub total_quantity: u64,
    pub total_volume: f64,
    pub cost: f64,
}

impl CalculationInput {
    pub fn calculate(&self) -> Calculation {
        let unit_volume = self.thickness * self.width * self.length / CUBIC_CM_PER_CUBIC_M;
        let total_quantity = u64::from(self.quantity) * u64::from(self.package_quantity);
        let total_volume = unit_volume * total_quantity as f64;
        Calculation {
            unit_volume,
            total_quantity,
            total_volume,
            cost: total_volume * self.price,
        }
    }
}

/// Client and species details typed next to the dimensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_contact: String,
    #[serde(default)]
    pub payment_terms: String,
    #[serde(default)]
    pub species: String,
}

/// One calculated row of the pending list.
///
/// Only the inputs are persisted. Volumes and cost are recomputed on every
/// access so a stored item can never disagree with its own dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WoodItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: ItemDetails,
    #[serde(flatten)]
    pub input: CalculationInput,
    pub created_at: DateTime<Utc>,
}

impl WoodItem {
    pub fn new(details: ItemDetails, input: CalculationInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            details,
            input,
            created_at: now,
        }
    }

    pub fn calculation(&self) -> Calculation {
        self.input.calculate()
    }

    /// "5 x 10 x 300 cm" style label used in lists and reports.
    pub fn size_label(&self) -> String {
        format!(
            "{} x {} x {} cm",
            trim_number(self.input.thickness),
            trim_number(self.input.width),
            trim_number(self.input.length)
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub items: usize,
    pub total_volume: f64,
    pub total_cost: f64,
}

pub fn totals(items: &[WoodItem]) -> Totals {
    items.iter().fold(
        Totals {
            items: items.len(),
            ..Totals::default()
        },
        |mut acc, item| {
            let calc = item.calculation();
            acc.total_volume += calc.total_volume;
            acc.total_cost += calc.cost;
            acc
        },
    )
}

fn trim_number(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.replace('.', ",")
}
