//! # Console Command Loop
//!
//! Line-oriented front end standing in for the scanner and keypad. Any
//! input that is not a known command is treated as a scanned UPC, which is
//! exactly how a keyboard-wedge scanner arrives: digits plus Enter.

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use register_core::{CardType, Money};
use register_db::Database;
use register_engine::Register;

/// One parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Scan(String),
    Void(usize),
    Quantity(usize, i64),
    Tender,
    CashExact,
    CashNextDollar,
    CashCustom(Money),
    Card(CardType),
    Suspend(Option<String>),
    Resume(String),
    Suspensions,
    Delete(String),
    Items,
    Popular,
    Clear,
    Help,
    Quit,
    Invalid(String),
}

/// Parses one input line. Indices are 1-based on the wire, matching the
/// numbering the display prints.
fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut words = line.split_whitespace();
    let head = words.next()?;
    let rest: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "void" => match rest.first().and_then(|s| s.parse::<usize>().ok()) {
            Some(n) if n >= 1 => Command::Void(n - 1),
            _ => Command::Invalid("usage: void <line#>".to_string()),
        },
        "qty" => match (
            rest.first().and_then(|s| s.parse::<usize>().ok()),
            rest.get(1).and_then(|s| s.parse::<i64>().ok()),
        ) {
            (Some(n), Some(q)) if n >= 1 => Command::Quantity(n - 1, q),
            _ => Command::Invalid("usage: qty <line#> <quantity>".to_string()),
        },
        "tender" => Command::Tender,
        "cash" => match rest.first() {
            None | Some(&"exact") => Command::CashExact,
            Some(&"next") => Command::CashNextDollar,
            Some(amount) => match amount.parse::<Money>() {
                Ok(m) => Command::CashCustom(m),
                Err(_) => Command::Invalid("usage: cash [exact|next|<amount>]".to_string()),
            },
        },
        "card" => Command::Card(CardType::parse(rest.first().unwrap_or(&"other"))),
        "suspend" => {
            let note = rest.join(" ");
            Command::Suspend(if note.is_empty() { None } else { Some(note) })
        }
        "resume" => match rest.first() {
            Some(id) => Command::Resume((*id).to_string()),
            None => Command::Invalid("usage: resume <suspension-id>".to_string()),
        },
        "suspensions" => Command::Suspensions,
        "delete" => match rest.first() {
            Some(id) => Command::Delete((*id).to_string()),
            None => Command::Invalid("usage: delete <suspension-id>".to_string()),
        },
        "items" => Command::Items,
        "popular" => Command::Popular,
        "clear" => Command::Clear,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        // Anything else is a scan - that is how a wedge scanner types
        _ => Command::Scan(line.to_string()),
    };

    Some(command)
}

const HELP: &str = "\
commands:
  <upc>                scan an item (any bare input is a scan)
  void <line#>         void a line
  qty <line#> <n>      change a line quantity (n >= 1)
  tender               lock the basket and start payment
  cash [exact|next|$]  cash payment: exact, next dollar, or custom amount
  card [type]          card payment (visa/mc/amex/discover/other)
  suspend [note]       park this transaction
  resume <id>          bring a parked transaction back
  suspensions          list parked transactions
  delete <id>          discard a parked transaction
  items                list the catalog
  popular              list quick-pick items
  clear                void the whole transaction
  quit                 exit";

/// Runs the command loop until EOF or `quit`.
pub async fn run(
    register: Arc<Register<Database, Database>>,
    db: Database,
) -> std::io::Result<()> {
    println!("register ready - type 'help' for commands");
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match parse(&line) {
            Some(command) => command,
            None => {
                prompt()?;
                continue;
            }
        };
        debug!(?command, "Console command");

        match command {
            Command::Scan(upc) => report(register.scan(&upc).await),
            Command::Void(index) => report(register.void_line(index).await),
            Command::Quantity(index, qty) => report(register.change_quantity(index, qty).await),
            Command::Tender => report(register.start_tendering().await),
            Command::CashExact => report_receipt(register.pay_cash_exact().await),
            Command::CashNextDollar => report_receipt(register.pay_cash_next_dollar().await),
            Command::CashCustom(amount) => report_receipt(register.pay_cash_custom(amount).await),
            Command::Card(card_type) => report_receipt(register.pay_card(card_type).await),
            Command::Suspend(note) => match register.suspend(note).await {
                Ok(id) => println!("suspended as {id}"),
                Err(e) => println!("error: {e}"),
            },
            Command::Resume(id) => report(register.resume(&id).await),
            Command::Suspensions => {
                let suspensions = register.suspensions().await;
                if suspensions.is_empty() {
                    println!("no suspended transactions");
                }
                for snapshot in suspensions {
                    println!("  {}", snapshot.display_summary());
                }
            }
            Command::Delete(id) => match register.delete_suspension(&id).await {
                Ok(true) => println!("deleted {id}"),
                Ok(false) => println!("no suspension with id {id}"),
                Err(e) => println!("error: {e}"),
            },
            Command::Items => list_items(db.catalog().all_items().await),
            Command::Popular => list_items(db.catalog().popular_items().await),
            Command::Clear => register.clear_transaction().await,
            Command::Help => println!("{HELP}"),
            Command::Invalid(usage) => println!("{usage}"),
            Command::Quit => break,
        }

        prompt()?;
    }

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("register> ");
    std::io::stdout().flush()
}

fn report(result: register_engine::RegisterResult<()>) {
    // Rejections already went to the display sink; the error line here is
    // for commands whose failure has no display path (e.g. bad ids).
    if let Err(e) = result {
        println!("error: {e}");
    }
}

fn report_receipt(result: register_engine::RegisterResult<String>) {
    match result {
        Ok(receipt_number) => println!("sale complete - receipt {receipt_number}"),
        Err(e) => println!("error: {e}"),
    }
}

fn list_items(result: register_db::DbResult<Vec<register_core::CatalogItem>>) {
    match result {
        Ok(items) if items.is_empty() => println!("no items"),
        Ok(items) => {
            for item in items {
                println!("  {:<14} {:<32} {:>8}  {}", item.upc(), item.description(), item.price().to_string(), item.category());
            }
        }
        Err(e) => println!("error: {e}"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_input_is_a_scan() {
        assert_eq!(parse("4011"), Some(Command::Scan("4011".to_string())));
        assert_eq!(
            parse("  036000291452  "),
            Some(Command::Scan("036000291452".to_string()))
        );
    }

    #[test]
    fn test_blank_line_is_nothing() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn test_void_and_qty_are_one_based() {
        assert_eq!(parse("void 1"), Some(Command::Void(0)));
        assert_eq!(parse("qty 2 5"), Some(Command::Quantity(1, 5)));
        assert!(matches!(parse("void 0"), Some(Command::Invalid(_))));
        assert!(matches!(parse("void"), Some(Command::Invalid(_))));
        assert!(matches!(parse("qty 1"), Some(Command::Invalid(_))));
    }

    #[test]
    fn test_cash_variants() {
        assert_eq!(parse("cash"), Some(Command::CashExact));
        assert_eq!(parse("cash exact"), Some(Command::CashExact));
        assert_eq!(parse("cash next"), Some(Command::CashNextDollar));
        assert_eq!(
            parse("cash 20.00"),
            Some(Command::CashCustom(Money::from_cents(2000)))
        );
        assert!(matches!(parse("cash nope"), Some(Command::Invalid(_))));
    }

    #[test]
    fn test_card_defaults_to_other() {
        assert_eq!(parse("card visa"), Some(Command::Card(CardType::Visa)));
        assert_eq!(parse("card"), Some(Command::Card(CardType::Other)));
    }

    #[test]
    fn test_suspend_note_is_joined() {
        assert_eq!(parse("suspend"), Some(Command::Suspend(None)));
        assert_eq!(
            parse("suspend customer forgot wallet"),
            Some(Command::Suspend(Some("customer forgot wallet".to_string())))
        );
    }

    #[test]
    fn test_resume_requires_id() {
        assert_eq!(
            parse("resume S-20240115-001"),
            Some(Command::Resume("S-20240115-001".to_string()))
        );
        assert!(matches!(parse("resume"), Some(Command::Invalid(_))));
    }
}
