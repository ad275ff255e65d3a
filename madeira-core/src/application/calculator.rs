use serde::{Deserialize, Serialize};

use crate::domain::error::CalculationError;
use crate::domain::wood::{Calculation, CalculationInput};
use crate::presentation::format::{format_currency, format_volume, parse_price};

/// Raw calculator fields exactly as typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationForm {
    pub thickness: String,
    pub width: String,
    pub length: String,
    pub quantity: String,
    #[serde(default)]
    pub package_quantity: String,
    pub price: String,
}

/// Display strings for a calculation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationDisplay {
    pub unit_volume: String,
    pub total_volume: String,
    pub cost: String,
    pub quantity_label: String,
}

const ZERO_PRICES: &[&str] = &["R$ 0,00", "R$ ,00", "R$0,00", "0,00", "0"];

/// Checks the form in field order: width, thickness, length, quantity,
/// package quantity, price.
pub fn validate(form: &CalculationForm) -> Result<CalculationInput, CalculationError> {
    let width = parse_dimension(&form.width).ok_or(CalculationError::InvalidWidth)?;
    let thickness = parse_dimension(&form.thickness).ok_or(CalculationError::InvalidThickness)?;
    let length = parse_dimension(&form.length).ok_or(CalculationError::InvalidLength)?;
    let quantity = parse_count(&form.quantity).ok_or(CalculationError::InvalidQuantity)?;
    let package_quantity = parse_package_quantity(&form.package_quantity)?;
    let price = parse_positive_price(&form.price).ok_or(CalculationError::InvalidPrice)?;

    Ok(CalculationInput {
        thickness,
        width,
        length,
        quantity,
        package_quantity,
        price,
    })
}

pub fn calculate(form: &CalculationForm) -> Result<(CalculationInput, Calculation), CalculationError> {
    let input = validate(form)?;
    Ok((input, input.calculate()))
}

pub fn display(input: &CalculationInput, calc: &Calculation) -> CalculationDisplay {
    CalculationDisplay {
        unit_volume: format_volume(calc.unit_volume),
        total_volume: format_volume(calc.total_volume),
        cost: format_currency(calc.cost),
        quantity_label: quantity_label(input.package_quantity),
    }
}

pub fn quantity_label(package_quantity: u32) -> String {
    if package_quantity > 1 {
        format!("Peças ({package_quantity} por pacote)")
    } else {
        "Peças".to_string()
    }
}

fn parse_dimension(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_count(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|n| *n >= 1)
}

/// Leading integer as typed; blank, zero or unreadable text counts as one
/// package. Only a negative count is an error.
fn parse_package_quantity(text: &str) -> Result<u32, CalculationError> {
    let text = text.trim();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let Ok(value) = digits.parse::<u64>() else {
        return Ok(1);
    };
    if value == 0 {
        return Ok(1);
    }
    if negative {
        return Err(CalculationError::InvalidPackageQuantity);
    }
    u32::try_from(value).map_err(|_| CalculationError::InvalidPackageQuantity)
}

fn parse_positive_price(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || ZERO_PRICES.contains(&text) {
        return None;
    }
    Some(parse_price(text)).filter(|p| p.is_finite() && *p > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn form(thickness: &str, width: &str, length: &str, quantity: &str, package: &str, price: &str) -> CalculationForm {
        CalculationForm {
            thickness: thickness.to_string(),
            width: width.to_string(),
            length: length.to_string(),
            quantity: quantity.to_string(),
            package_quantity: package.to_string(),
            price: price.to_string(),
        }
    }

    #[test]
    fn reference_board_displays_expected_values() {
        let (input, calc) = calculate(&form("5", "10", "300", "2", "", "1000")).unwrap();
        let shown = display(&input, &calc);
        assert_eq!(shown.unit_volume, "0,015m³");
        assert_eq!(shown.total_volume, "0,030m³");
        assert_eq!(shown.cost, "R$ 30,00");
        assert_eq!(shown.quantity_label, "Peças");
    }

    #[test]
    fn accepts_decimal_comma_and_masked_price() {
        let input = validate(&form("2,5", "15", "400", "3", "12", "R$ 1.250,00")).unwrap();
        assert_eq!(input.thickness, 2.5);
        assert_eq!(input.package_quantity, 12);
        assert_eq!(input.price, 1250.0);
        assert_eq!(quantity_label(input.package_quantity), "Peças (12 por pacote)");
    }

    #[rstest]
    #[case(form("5", "", "300", "2", "", "1000"), CalculationError::InvalidWidth)]
    #[case(form("0", "10", "300", "2", "", "1000"), CalculationError::InvalidThickness)]
    #[case(form("5", "10", "-3", "2", "", "1000"), CalculationError::InvalidLength)]
    #[case(form("5", "10", "300", "0", "", "1000"), CalculationError::InvalidQuantity)]
    #[case(form("5", "10", "300", "2", "-3", "1000"), CalculationError::InvalidPackageQuantity)]
    #[case(form("5", "10", "300", "2", "", ""), CalculationError::InvalidPrice)]
    #[case(form("5", "10", "300", "2", "", "R$ 0,00"), CalculationError::InvalidPrice)]
    #[case(form("5", "10", "300", "2", "", "R$ ,00"), CalculationError::InvalidPrice)]
    #[case(form("5", "10", "300", "2", "", "abc"), CalculationError::InvalidPrice)]
    fn rejects_invalid_fields(#[case] input: CalculationForm, #[case] expected: CalculationError) {
        assert_eq!(validate(&input).unwrap_err(), expected);
    }

    #[rstest]
    #[case("", 1)]
    #[case("0", 1)]
    #[case("abc", 1)]
    #[case("12", 12)]
    #[case(" 6 ", 6)]
    #[case("4 pacotes", 4)]
    fn package_quantity_falls_back_to_one(#[case] package: &str, #[case] expected: u32) {
        let input = validate(&form("5", "10", "300", "2", package, "1000")).unwrap();
        assert_eq!(input.package_quantity, expected);
    }

    #[test]
    fn width_is_checked_before_thickness() {
        let err = validate(&form("", "", "", "", "", "")).unwrap_err();
        assert_eq!(err, CalculationError::InvalidWidth);
    }
}
