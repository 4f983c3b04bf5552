use colored::Colorize;
use rust_decimal::Decimal;

/// Format a display amount with two decimals and color
pub fn format_amount(amount: &Decimal, symbol: &str) -> String {
    format!("{:.2} {}", amount, symbol).yellow().to_string()
}

/// Shorten an address for display
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 14 {
        address.to_string()
    } else {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// Horizontal rule framing a summary block
pub fn rule(width: usize) -> String {
    "─".repeat(width)
}

const LABEL_WIDTH: usize = 18;

/// `label:` padded to a fixed column, then the value
pub fn labeled(label: &str, value: impl std::fmt::Display) -> String {
    format!("{:<width$}{}", format!("{}:", label), value, width = LABEL_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_rounds_to_two_places() {
        colored::control::set_override(false);

        assert_eq!(format_amount(&Decimal::new(1_234_567, 6), "INIT"), "1.23 INIT");
        assert_eq!(format_amount(&Decimal::ZERO, "INIT"), "0.00 INIT");
    }

    #[test]
    fn test_format_address() {
        assert_eq!(format_address("0xabc"), "0xabc");
        assert_eq!(
            format_address("0x52908400098527886e0f7030069857d2e4169ee7"),
            "0x529084...169ee7"
        );
        assert_eq!(format_address("ééééééééééééééééé"), "éééééééé...éééééé");
    }

    #[test]
    fn test_labeled_aligns_values() {
        assert_eq!(labeled("Failed", 3), "Failed:           3");
        assert_eq!(labeled("Total Addresses", "10"), "Total Addresses:  10");
        assert_eq!(rule(3), "───");
    }
}
