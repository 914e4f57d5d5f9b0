use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use mkopo_core::{
    fees, EligibilityForm, FieldValidator, LoanFlow, LoanOption, LoanType, MkopoConfig, Step,
    UserData,
};
use mkopo_payments::{PaymentResult, PaymentService, ProviderFactory};
use std::time::Duration;
use tracing::{debug, info};

use crate::screens;

/// Answers supplied on the command line instead of at the prompts
#[derive(Args, Debug, Clone, Default)]
pub struct ApplyArgs {
    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Phone number, e.g. 0712345678
    #[arg(long)]
    pub phone: Option<String>,

    /// National ID number
    #[arg(long = "id-number")]
    pub id_number: Option<String>,

    /// Loan type, e.g. "personal" or "salary-advance"
    #[arg(long = "loan-type")]
    pub loan_type: Option<String>,

    /// Loan amount in shillings; must be one of the offered amounts
    #[arg(long)]
    pub amount: Option<u32>,

    /// Do not ask for confirmation; every answer must come from flags
    #[arg(short, long)]
    pub yes: bool,

    /// Use the simulated gateway instead of sending a real STK push
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Continue,
    Quit,
}

enum FailureAction {
    Retry,
    ChooseAgain,
    Quit,
}

struct Wizard {
    prefill: ApplyArgs,
    assume_yes: bool,
    theme: ColorfulTheme,
    service: PaymentService,
    verification_delay: Duration,
}

/// Runs the screens until the applicant quits and returns the flow as it
/// stood at that point.
pub async fn run(args: ApplyArgs, config: &MkopoConfig) -> Result<LoanFlow> {
    let mut gateway = config.gateway.clone();
    if args.dry_run {
        gateway.provider = "simulated".to_string();
    }
    let provider = ProviderFactory::create_from_config(&gateway)
        .context("Failed to set up the payment gateway")?;
    let service = PaymentService::new(provider);
    info!(provider = service.provider_name(), "starting application wizard");

    let mut wizard = Wizard {
        assume_yes: args.yes,
        prefill: args,
        theme: ColorfulTheme::default(),
        service,
        verification_delay: config.eligibility.verification_delay(),
    };

    let mut flow = LoanFlow::new();
    loop {
        println!("{}", screens::header());
        println!("{}", screens::step_indicator(&flow.step_indicator()));

        let next = match flow.step() {
            Step::Check => wizard.check_step(&mut flow).await?,
            Step::Select => wizard.select_step(&mut flow).await?,
            Step::GetCash => wizard.get_cash_step(&mut flow)?,
        };
        if next == Next::Quit {
            break;
        }
    }

    println!("{}", screens::footer());
    Ok(flow)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn joined(errors: Vec<mkopo_core::ValidationError>) -> Result<(), String> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "))
    }
}

impl Wizard {
    async fn check_step(&mut self, flow: &mut LoanFlow) -> Result<Next> {
        println!("{}", screens::eligibility_intro());

        let form = self.collect_form()?;
        let user = form.validate()?;

        let pb = spinner("Verifying your details...");
        tokio::time::sleep(self.verification_delay).await;
        pb.finish_and_clear();

        flow.submit_eligibility(user)?;
        println!("{}", screens::trust_badges());
        Ok(Next::Continue)
    }

    fn collect_form(&mut self) -> Result<EligibilityForm> {
        let prefill = std::mem::take(&mut self.prefill);

        let full_name = self.text_field("Full Name", "name", prefill.name, |v: &str| {
            joined(FieldValidator::validate_full_name(v))
        })?;
        let phone_number = self.text_field("Phone Number", "phone", prefill.phone, |v: &str| {
            FieldValidator::validate_phone_number(v).map_err(|e| e.to_string())
        })?;
        let id_number = self.text_field("ID Number", "id-number", prefill.id_number, |v: &str| {
            FieldValidator::validate_id_number(v).map_err(|e| e.to_string())
        })?;
        let loan_type = self.loan_type_field(prefill.loan_type)?;
        self.prefill.amount = prefill.amount;

        Ok(EligibilityForm {
            full_name,
            phone_number,
            id_number,
            loan_type: loan_type.label().to_string(),
        })
    }

    fn text_field<V>(
        &self,
        prompt: &str,
        flag: &str,
        prefill: Option<String>,
        validate: V,
    ) -> Result<String>
    where
        V: Fn(&str) -> Result<(), String>,
    {
        if let Some(value) = prefill {
            match validate(&value) {
                Ok(()) => {
                    println!("{} {}: {}", "✔".green(), prompt.bold(), value);
                    return Ok(value);
                }
                Err(message) if self.assume_yes => bail!("--{flag}: {message}"),
                Err(message) => println!("{} {}", "✘".red(), message.red()),
            }
        } else if self.assume_yes {
            bail!("--{flag} is required with --yes");
        }

        let value = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .validate_with(|input: &String| validate(input.as_str()))
            .interact_text()?;
        Ok(value)
    }

    fn loan_type_field(&self, prefill: Option<String>) -> Result<LoanType> {
        if let Some(value) = prefill {
            match FieldValidator::validate_loan_type(&value) {
                Ok(loan_type) => {
                    println!("{} {}: {}", "✔".green(), "Loan Type".bold(), loan_type);
                    return Ok(loan_type);
                }
                Err(e) if self.assume_yes => bail!("--loan-type: {e}"),
                Err(e) => println!("{} {}", "✘".red(), e.to_string().red()),
            }
        } else if self.assume_yes {
            bail!("--loan-type is required with --yes");
        }

        let labels: Vec<&str> = LoanType::ALL.iter().map(LoanType::label).collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Select Loan Type")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(LoanType::ALL[selection])
    }

    async fn select_step(&mut self, flow: &mut LoanFlow) -> Result<Next> {
        let user = flow
            .user_data()
            .cloned()
            .context("Eligibility details missing on the selection screen")?;

        println!("{}", screens::selection_intro(&user));
        println!("{}", screens::options_table(fees::loan_options()));

        let mut loan = self.choose_loan()?;
        loop {
            println!("{}", screens::selection_summary(&loan));

            if !self.assume_yes
                && !Confirm::with_theme(&self.theme)
                    .with_prompt("Get Loan Now?")
                    .default(true)
                    .interact()?
            {
                loan = self.choose_loan()?;
                continue;
            }

            match self.request_fee(&user, loan).await {
                Ok(transaction_id) => {
                    flow.payment_initiated(loan, transaction_id)?;
                    return Ok(Next::Continue);
                }
                Err(e) => {
                    println!("{}", screens::payment_failed(&e.to_string()));
                    if e.is_local() || self.assume_yes {
                        return Err(e).context("Payment failed");
                    }
                    match self.after_failure()? {
                        FailureAction::Retry => {}
                        FailureAction::ChooseAgain => loan = self.choose_loan()?,
                        FailureAction::Quit => return Ok(Next::Quit),
                    }
                }
            }
        }
    }

    /// Sends the STK push once and returns the gateway transaction id.
    async fn request_fee(&self, user: &UserData, loan: LoanOption) -> PaymentResult<String> {
        let pb = spinner("Sending M-Pesa request...");
        let result = self.service.initiate(user, Some(loan)).await;
        pb.finish_and_clear();

        let outcome = result?;
        println!("{}", screens::payment_sent());
        debug!(reference = %outcome.reference, msisdn = %outcome.msisdn, "payment outcome");
        Ok(outcome.transaction_id)
    }

    fn choose_loan(&mut self) -> Result<LoanOption> {
        if let Some(amount) = self.prefill.amount.take() {
            match fees::select_option(amount) {
                Ok(option) => return Ok(option),
                Err(e) if self.assume_yes => bail!("--amount: {e}"),
                Err(e) => println!("{} {}", "✘".red(), e.to_string().red()),
            }
        } else if self.assume_yes {
            bail!("--amount is required with --yes");
        }

        let options = fees::loan_options();
        let labels: Vec<String> = options.iter().map(screens::option_label).collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Select Your Loan Amount")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(options[selection])
    }

    fn after_failure(&self) -> Result<FailureAction> {
        let choices = ["Try again", "Choose another amount", "Quit"];
        let selection = Select::with_theme(&self.theme)
            .with_prompt("What would you like to do?")
            .items(&choices)
            .default(0)
            .interact()?;
        Ok(match selection {
            0 => FailureAction::Retry,
            1 => FailureAction::ChooseAgain,
            _ => FailureAction::Quit,
        })
    }

    fn get_cash_step(&mut self, flow: &mut LoanFlow) -> Result<Next> {
        let user = flow
            .user_data()
            .context("Eligibility details missing on the confirmation screen")?;
        let loan = flow
            .selected_loan()
            .context("Loan selection missing on the confirmation screen")?;
        println!(
            "{}",
            screens::success_screen(user, &loan, flow.transaction_id())
        );

        if self.assume_yes {
            return Ok(Next::Quit);
        }

        let again = Confirm::with_theme(&self.theme)
            .with_prompt("Apply for Another Loan?")
            .default(false)
            .interact()?;
        if again {
            flow.start_over();
            self.prefill = ApplyArgs::default();
            Ok(Next::Continue)
        } else {
            Ok(Next::Quit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use tokio::net::TcpListener;

    fn config() -> MkopoConfig {
        let mut config = MkopoConfig::default();
        config.eligibility.verification_delay_ms = 0;
        config
    }

    fn answers() -> ApplyArgs {
        ApplyArgs {
            name: Some("Jane Wanjiru".to_string()),
            phone: Some("0712345678".to_string()),
            id_number: Some("12345678".to_string()),
            loan_type: Some("salary-advance".to_string()),
            amount: Some(7_500),
            yes: true,
            dry_run: true,
        }
    }

    #[tokio::test]
    async fn test_dry_run_reaches_confirmation() {
        let flow = run(answers(), &config()).await.unwrap();

        assert_eq!(flow.step(), Step::GetCash);
        assert_eq!(flow.user_data().map(|u| u.loan_type), Some(LoanType::SalaryAdvance));
        assert_eq!(
            flow.selected_loan(),
            Some(LoanOption {
                amount: 7_500,
                fee: 250
            })
        );
        assert!(flow.transaction_id().is_some_and(|id| id.starts_with("SIM-")));
    }

    #[tokio::test]
    async fn test_dry_run_ignores_configured_gateway() {
        // megapay without credentials would fail to build
        let mut config = config();
        config.gateway.provider = "megapay".to_string();

        assert!(run(answers(), &config).await.is_ok());
        let err = run(ApplyArgs { dry_run: false, ..answers() }, &config)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to set up the payment gateway");
    }

    #[tokio::test]
    async fn test_yes_requires_every_answer() {
        let err = run(ApplyArgs { amount: None, ..answers() }, &config())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "--amount is required with --yes");

        let err = run(ApplyArgs { name: None, ..answers() }, &config())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "--name is required with --yes");
    }

    #[tokio::test]
    async fn test_yes_rejects_invalid_answers() {
        let err = run(ApplyArgs { amount: Some(1_501), ..answers() }, &config())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "--amount: Unknown loan amount: Ksh 1501");

        let err = run(
            ApplyArgs {
                phone: Some("0812345678".to_string()),
                ..answers()
            },
            &config(),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "--phone: Enter a valid Kenyan phone number (e.g., 0712345678)"
        );

        let err = run(
            ApplyArgs {
                loan_type: Some("mortgage".to_string()),
                ..answers()
            },
            &config(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "--loan-type: Please select a loan type");
    }

    #[tokio::test]
    async fn test_failed_payment_stops_without_prompting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = config();
        config.gateway.base_url = format!("http://{}/v1", addr);
        config.gateway.api_key = Some(SecretString::from("test-api-key".to_string()));
        config.gateway.email = Some("merchant@example.co.ke".to_string());
        config.gateway.timeout_secs = 2;

        let err = run(ApplyArgs { dry_run: false, ..answers() }, &config)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Payment failed");
        assert_eq!(
            err.root_cause().to_string(),
            "Network error. Please check your internet connection."
        );
    }
}
