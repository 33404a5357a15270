//! Checkout CLI
//!
//! Command-line interface for the Checkout API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use checkout_client::CheckoutClient;
use checkout_types::{CreatePaymentRequest, CustomerId, PaymentId, PaymentQuery, UserId};

#[derive(Parser)]
#[command(name = "checkout")]
#[command(author, version, about = "Checkout API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Checkout API
    #[arg(
        long,
        env = "CHECKOUT_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check out everything a customer owes
    Checkout {
        /// Customer ID
        customer: i64,
        /// ID of the user initiating the checkout
        #[arg(long)]
        user: i64,
        /// Repeating a checkout with the same key returns the first payment
        #[arg(long)]
        idempotency_key: Option<String>,
    },
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Create a payment directly
    Create {
        #[arg(long)]
        amount: String,
        /// DEBIT_CARD, CREDIT_CARD or PIX
        #[arg(long, default_value = "PIX")]
        method: String,
        #[arg(long)]
        order_ref: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        tax_id: String,
        #[arg(long)]
        user: i64,
        #[arg(long)]
        idempotency_key: Option<String>,
    },
    /// Get payment details
    Get {
        /// Payment ID (UUID)
        id: String,
    },
    /// List payments, optionally filtered by one field
    List {
        #[arg(long, conflicts_with_all = ["tax_id", "order_ref", "user"])]
        status: Option<String>,
        #[arg(long, conflicts_with_all = ["order_ref", "user"])]
        tax_id: Option<String>,
        #[arg(long, conflicts_with = "user")]
        order_ref: Option<i64>,
        #[arg(long)]
        user: Option<i64>,
    },
    /// Approve a pending payment
    Approve { id: String },
    /// Reject a pending payment
    Reject { id: String },
    /// Cancel a pending or approved payment
    Cancel { id: String },
    /// Delete a payment regardless of status
    Delete { id: String },
}

fn parse_payment_id(s: &str) -> Result<PaymentId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid payment ID: {}", s))
}

fn parse_amount(s: &str) -> Result<Decimal> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid amount: {}", s))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = CheckoutClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Checkout {
            customer,
            user,
            idempotency_key,
        } => {
            let payment = client
                .checkout(CustomerId::new(customer), UserId::new(user), idempotency_key)
                .await?;
            print_json(&payment)?;
        }

        Commands::Payment { action } => match action {
            PaymentCommands::Create {
                amount,
                method,
                order_ref,
                name,
                tax_id,
                user,
                idempotency_key,
            } => {
                let req = CreatePaymentRequest {
                    amount: Some(parse_amount(&amount)?),
                    payment_method: Some(method),
                    order_ref: Some(order_ref),
                    customer_name: name,
                    customer_tax_id: tax_id,
                    requesting_user_id: Some(user),
                    idempotency_key,
                };
                print_json(&client.create_payment(&req).await?)?;
            }
            PaymentCommands::Get { id } => {
                print_json(&client.get_payment(parse_payment_id(&id)?).await?)?;
            }
            PaymentCommands::List {
                status,
                tax_id,
                order_ref,
                user,
            } => {
                let query = PaymentQuery {
                    status,
                    tax_id,
                    order_ref,
                    user_id: user,
                };
                print_json(&client.list_payments(&query).await?)?;
            }
            PaymentCommands::Approve { id } => {
                print_json(&client.approve_payment(parse_payment_id(&id)?).await?)?;
            }
            PaymentCommands::Reject { id } => {
                print_json(&client.reject_payment(parse_payment_id(&id)?).await?)?;
            }
            PaymentCommands::Cancel { id } => {
                print_json(&client.cancel_payment(parse_payment_id(&id)?).await?)?;
            }
            PaymentCommands::Delete { id } => {
                client.delete_payment(parse_payment_id(&id)?).await?;
                println!("✓ Payment deleted");
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_checkout() {
        let cli = Cli::try_parse_from(["checkout", "checkout", "42", "--user", "7"]).unwrap();
        match cli.command {
            Commands::Checkout { customer, user, .. } => {
                assert_eq!(customer, 42);
                assert_eq!(user, 7);
            }
            _ => panic!("expected checkout"),
        }
    }

    #[test]
    fn test_list_accepts_only_one_filter() {
        let result = Cli::try_parse_from([
            "checkout", "payment", "list", "--status", "PENDING", "--user", "7",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("230.00").unwrap().to_string(), "230.00");
        assert!(parse_amount("abc").is_err());
    }
}
