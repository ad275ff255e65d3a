use askama::Template;
use chrono::{DateTime, Utc};
use derive_more::Display;

use crate::domain::profile::CompanyProfile;
use crate::domain::wood::{WoodItem, totals};
use crate::presentation::format::{
    format_currency, format_date, format_datetime, format_quantity, format_volume,
};

pub const QUOTE_VALIDITY_DAYS: u32 = 15;
pub const DEFAULT_CLIENT: &str = "Consumidor Final";
pub const DEFAULT_PAYMENT_TERMS: &str = "50% entrada, 50% na entrega";
const DEFAULT_SPECIES: &str = "Não informado";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReportVariant {
    /// Adds a per-m³ price column.
    #[display("unit-price")]
    WithUnitPrice,
    #[display("simple")]
    Simple,
}

impl std::str::FromStr for ReportVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unit-price" | "unit" | "full" => Ok(ReportVariant::WithUnitPrice),
            "simple" => Ok(ReportVariant::Simple),
            other => Err(format!("unknown report variant: {other}")),
        }
    }
}

/// Header data with the placeholders shown for unset profile fields.
#[derive(Debug, Clone)]
pub struct CompanyHeader {
    pub company: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    pub cnpj: String,
    pub logo: Option<String>,
}

impl From<&CompanyProfile> for CompanyHeader {
    fn from(profile: &CompanyProfile) -> Self {
        Self {
            company: or_default(&profile.company, "Nome da Empresa"),
            phone: or_default(&profile.phone, "Telefone não informado"),
            address: or_default(&profile.address, "Endereço não informado"),
            email: or_default(&profile.email, "Email não informado"),
            cnpj: or_default(&profile.cnpj, "CNPJ não informado"),
            logo: Some(profile.logo.clone()).filter(|logo| !logo.is_empty()),
        }
    }
}

/// Client block printed under the header.
#[derive(Debug, Clone, Default)]
pub struct ReportClient {
    pub name: String,
    pub contact: String,
    pub payment_terms: String,
}

pub struct ReportRow {
    pub position: usize,
    pub dimensions: String,
    pub quantity: String,
    pub volume: String,
    pub species: String,
    pub unit_price: String,
    pub total: String,
}

impl ReportRow {
    fn new(position: usize, item: &WoodItem, variant: ReportVariant) -> Self {
        let calc = item.calculation();
        let unit_price = if calc.total_volume > 0.0 {
            calc.cost / calc.total_volume
        } else {
            0.0
        };
        let quantity = match (variant, item.input.package_quantity) {
            (ReportVariant::Simple, pq) if pq > 1 => {
                format!("{}×{}", format_quantity(u64::from(item.input.quantity)), pq)
            }
            _ => format_quantity(u64::from(item.input.quantity)),
        };
        Self {
            position,
            dimensions: item.size_label(),
            quantity,
            volume: format_volume(calc.total_volume),
            species: or_default(&item.details.species, DEFAULT_SPECIES),
            unit_price: format_currency(unit_price),
            total: format_currency(calc.cost),
        }
    }
}

#[derive(Template)]
#[template(path = "quote_report.html")]
pub struct QuoteReport {
    pub title_client: String,
    pub company: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub cnpj: String,
    pub logo: Option<String>,
    pub number: String,
    pub date: String,
    pub validity_days: u32,
    pub client_name: String,
    pub client_contact: String,
    pub payment_terms: String,
    pub show_unit_price: bool,
    pub column_count: usize,
    pub rows: Vec<ReportRow>,
    pub total_volume: String,
    pub total_value: String,
    pub generated_at: String,
}

impl QuoteReport {
    pub fn build(
        number: String,
        issued_at: DateTime<Utc>,
        client: &ReportClient,
        items: &[WoodItem],
        header: CompanyHeader,
        variant: ReportVariant,
        now: DateTime<Utc>,
    ) -> Self {
        let show_unit_price = variant == ReportVariant::WithUnitPrice;
        let sums = totals(items);
        Self {
            title_client: or_default(&client.name, "Cliente"),
            company: header.company,
            address: header.address,
            phone: header.phone,
            email: header.email,
            cnpj: header.cnpj,
            logo: header.logo,
            number,
            date: format_date(issued_at),
            validity_days: QUOTE_VALIDITY_DAYS,
            client_name: or_default(&client.name, DEFAULT_CLIENT),
            client_contact: client.contact.trim().to_string(),
            payment_terms: or_default(&client.payment_terms, DEFAULT_PAYMENT_TERMS),
            show_unit_price,
            column_count: if show_unit_price { 7 } else { 6 },
            rows: items
                .iter()
                .enumerate()
                .map(|(i, item)| ReportRow::new(i + 1, item, variant))
                .collect(),
            total_volume: format_volume(sums.total_volume),
            total_value: format_currency(sums.total_cost),
            generated_at: format_datetime(now),
        }
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wood::{CalculationInput, ItemDetails};

    fn board(species: &str, package_quantity: u32) -> WoodItem {
        WoodItem::new(
            ItemDetails {
                species: species.to_string(),
                ..ItemDetails::default()
            },
            CalculationInput {
                thickness: 5.0,
                width: 10.0,
                length: 300.0,
                quantity: 2,
                package_quantity,
                price: 1000.0,
            },
            Utc::now(),
        )
    }

    fn render(items: &[WoodItem], client: &ReportClient, variant: ReportVariant) -> String {
        let header = CompanyHeader::from(&CompanyProfile::default());
        QuoteReport::build("ORÇ-abc123".into(), Utc::now(), client, items, header, variant, Utc::now())
            .render()
            .unwrap()
    }

    #[test]
    fn unit_price_variant_shows_price_per_cubic_metre() {
        let html = render(&[board("Ipê", 1)], &ReportClient::default(), ReportVariant::WithUnitPrice);
        assert!(html.contains("Unit."));
        assert!(html.contains("R$ 1.000,00/m³"));
        assert!(html.contains("R$ 30,00"));
        assert!(html.contains("0,030m³"));
        assert!(html.contains("Nº:</strong> ORÇ-abc123"));
    }

    #[test]
    fn simple_variant_shows_package_multiplier() {
        let html = render(&[board("Cedro", 3)], &ReportClient::default(), ReportVariant::Simple);
        assert!(html.contains("Preço"));
        assert!(!html.contains("Unit."));
        assert!(html.contains("2×3"));
    }

    #[test]
    fn defaults_fill_missing_profile_and_client() {
        let html = render(&[board("", 1)], &ReportClient::default(), ReportVariant::Simple);
        assert!(html.contains("Nome da Empresa"));
        assert!(html.contains("CNPJ não informado"));
        assert!(html.contains(DEFAULT_CLIENT));
        assert!(html.contains(DEFAULT_PAYMENT_TERMS));
        assert!(html.contains(DEFAULT_SPECIES));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn interpolated_text_is_escaped() {
        let client = ReportClient {
            name: "<script>alert(1)</script>".to_string(),
            ..ReportClient::default()
        };
        let html = render(&[board("Ipê", 1)], &client, ReportVariant::Simple);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&#60;script&#62;alert(1)&#60;/script&#62;"));
    }

    #[test]
    fn empty_list_renders_placeholder_row() {
        let html = render(&[], &ReportClient::default(), ReportVariant::WithUnitPrice);
        assert!(html.contains("Nenhum item encontrado"));
        assert!(html.contains("colspan=\"7\""));
    }
}
