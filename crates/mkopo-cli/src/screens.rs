//! Text rendering of the three application screens.

use colored::Colorize;
use mkopo_core::{
    first_name, format_amount, format_ksh, LoanOption, StepIndicatorEntry, StepStatus, UserData,
    INTEREST_RATE_PERCENT, MAX_LOAN_AMOUNT, MIN_LOAN_AMOUNT, REPAYMENT_TERM,
};
use tabled::settings::Style;
use tabled::{Table, Tabled};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

pub fn header() -> String {
    format!(
        "\n{}\n   {} {}\n{}",
        RULE.dimmed(),
        "Kenyan Loans".bold(),
        "ChapChap".green().bold(),
        RULE.dimmed()
    )
}

pub fn step_indicator(entries: &[StepIndicatorEntry]) -> String {
    let mut line = String::from("   ");
    for entry in entries {
        let marker = match entry.status {
            StepStatus::Completed => "✔".green().bold(),
            StepStatus::Active => entry.step.number().to_string().green().bold(),
            StepStatus::Pending => entry.step.number().to_string().dimmed(),
        };
        let label = if entry.highlighted {
            entry.step.label().bold()
        } else {
            entry.step.label().dimmed()
        };
        line.push_str(&format!("({marker}) {label}"));

        match entry.connector_filled {
            Some(true) => line.push_str(&format!(" {} ", "━━━━".green())),
            Some(false) => line.push_str(&format!(" {} ", "────".dimmed())),
            None => {}
        }
    }
    line
}

pub fn eligibility_intro() -> String {
    format!(
        "\n{}\n{}\n{}\n",
        "Check Your Loan Eligibility".bold(),
        "Find out how much you qualify for instantly".dimmed(),
        format!(
            "{} - {}",
            format_ksh(MIN_LOAN_AMOUNT),
            format_amount(MAX_LOAN_AMOUNT)
        )
        .green()
        .bold()
    )
}

pub fn trust_badges() -> String {
    "   🛡  Secure Application    ✅ No CRB Check    ⚡ Instant Approval".to_string()
}

pub fn footer() -> String {
    format!(
        "\n{}\n   📄 No paperwork required.    👥 No guarantors needed.\n   {}\n",
        RULE.dimmed(),
        format!(
            "© {} Kenyan Loans ChapChap. All rights reserved.",
            chrono::Local::now().format("%Y")
        )
        .dimmed()
    )
}

pub fn selection_intro(user: &UserData) -> String {
    format!(
        "\n{}\n{}\n{}\n",
        format!("Hi {}, you qualify! 🎉", first_name(&user.full_name)).bold(),
        "Based on your M-Pesa records, here are your loan options".dimmed(),
        format!("(2-month term at {INTEREST_RATE_PERCENT}% interest)").dimmed()
    )
}

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "Loan Amount")]
    amount: String,
    #[tabled(rename = "Fee")]
    fee: String,
}

pub fn options_table(options: &[LoanOption]) -> String {
    let rows = options.iter().map(|option| OptionRow {
        amount: format_ksh(option.amount),
        fee: format_ksh(option.fee),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Label used in the amount picker.
pub fn option_label(option: &LoanOption) -> String {
    format!(
        "{}  (fee {})",
        format_ksh(option.amount),
        format_ksh(option.fee)
    )
}

pub fn selection_summary(loan: &LoanOption) -> String {
    format!(
        "\n   You selected {}\n   You will receive an M-Pesa prompt to pay the transaction fee of {}\n",
        format_ksh(loan.amount).green().bold(),
        format_ksh(loan.fee).green().bold()
    )
}

pub fn payment_failed(message: &str) -> String {
    format!("{} {}", "✘ Payment failed:".red().bold(), message)
}

pub fn payment_sent() -> String {
    format!(
        "{} {}",
        "✔ Payment request sent!".green().bold(),
        "Check your phone for the M-Pesa prompt."
    )
}

pub fn success_screen(user: &UserData, loan: &LoanOption, transaction_id: Option<&str>) -> String {
    let row = |label: &str, value: String| format!("   {:<18}{}\n", label.dimmed(), value);

    let mut out = format!(
        "\n{}\n{}, we've sent an M-Pesa request to your phone.\n\n",
        "✅ Payment Initiated!".green().bold(),
        first_name(&user.full_name)
    );
    out.push_str(&row("Loan Amount", format_ksh(loan.amount).bold().to_string()));
    out.push_str(&row("Transaction Fee", format_ksh(loan.fee).green().to_string()));
    out.push_str(&row("Phone Number", user.phone_number.clone()));
    if let Some(id) = transaction_id.filter(|id| !id.is_empty()) {
        out.push_str(&row("Reference", id.to_string()));
    }
    out.push_str("   ──────────────────────────────\n");
    out.push_str(&row("Repayment Term", REPAYMENT_TERM.to_string()));
    out.push_str(&row("Interest Rate", format!("{INTEREST_RATE_PERCENT}%")));

    out.push_str(&format!(
        "\n⏳ {}\n   {}\n",
        "Complete the M-Pesa payment".yellow().bold(),
        "Enter your M-Pesa PIN when prompted. Your loan will be disbursed within 5 minutes after confirmation."
    ));
    out.push_str(&format!("\n📱 {}\n", "Didn't receive the prompt?".cyan().bold()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkopo_core::{fees, step_indicator as indicator, LoanType, Step};

    fn user() -> UserData {
        UserData {
            full_name: "Jane Wanjiru Kamau".to_string(),
            phone_number: "0712345678".to_string(),
            id_number: "12345678".to_string(),
            loan_type: LoanType::Business,
        }
    }

    #[test]
    fn test_step_indicator_shows_every_step() {
        let line = step_indicator(&indicator(Step::Select));
        assert!(line.contains("Check"));
        assert!(line.contains("Select"));
        assert!(line.contains("Get Cash"));
        assert!(line.contains('✔'));
    }

    #[test]
    fn test_footer_carries_notice() {
        let footer = footer();
        assert!(footer.contains("No paperwork required."));
        assert!(footer.contains("No guarantors needed."));
        assert!(footer.contains(&format!("© {}", chrono::Local::now().format("%Y"))));
        assert!(footer.contains("Kenyan Loans ChapChap. All rights reserved."));
    }

    #[test]
    fn test_greeting_uses_first_name() {
        let intro = selection_intro(&user());
        assert!(intro.contains("Hi Jane, you qualify!"));
        assert!(intro.contains("10% interest"));
    }

    #[test]
    fn test_options_table_lists_every_amount() {
        let table = options_table(fees::loan_options());
        assert!(table.contains("Loan Amount"));
        assert!(table.contains("Ksh 1,500"));
        assert!(table.contains("Ksh 60,000"));
        assert!(table.contains("Ksh 1,200"));
    }

    #[test]
    fn test_success_screen_details() {
        let loan = LoanOption {
            amount: 10_000,
            fee: 300,
        };
        let screen = success_screen(&user(), &loan, Some(""));
        assert!(screen.contains("Payment Initiated!"));
        assert!(screen.contains("Jane, we've sent an M-Pesa request"));
        assert!(screen.contains("Ksh 10,000"));
        assert!(screen.contains("Ksh 300"));
        assert!(screen.contains("0712345678"));
        assert!(screen.contains("2 months"));
        assert!(screen.contains("Enter your M-Pesa PIN when prompted"));
        assert!(!screen.contains("Reference"));

        let screen = success_screen(&user(), &loan, Some("TR-1"));
        assert!(screen.contains("TR-1"));
    }
}
