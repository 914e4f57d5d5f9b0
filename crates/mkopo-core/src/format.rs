/// Groups thousands with commas the way the `en-KE` locale prints integers.
pub fn format_amount(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_ksh(amount: u32) -> String {
    format!("Ksh {}", format_amount(amount))
}

/// Text before the first space; used to greet the applicant.
pub fn first_name(full_name: &str) -> &str {
    full_name.split(' ').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(850), "850");
        assert_eq!(format_amount(1_500), "1,500");
        assert_eq!(format_amount(60_000), "60,000");
        assert_eq!(format_amount(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_ksh() {
        assert_eq!(format_ksh(25_000), "Ksh 25,000");
    }

    #[test]
    fn test_first_name() {
        assert_eq!(first_name("Jane Wanjiru Kamau"), "Jane");
        assert_eq!(first_name("Otieno"), "Otieno");
        assert_eq!(first_name(" Leading"), "");
    }
}
