use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use coin_trail::{
    NewTransaction, PasswordHash, ValidatedPassword, create_user, initialize_db,
    insert_transaction, parse_email, seed_default_categories,
};

/// A utility for creating a test database for the Coin Trail server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many days of transactions to generate, ending today.
    #[arg(long, default_value_t = 730)]
    days: i64,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user test@example.com with the password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(&parse_email("test@example.com")?, password_hash, &conn)?;
    seed_default_categories(user.id, &conn)?;

    let categories = {
        let mut statement =
            conn.prepare("SELECT id, name, type FROM category WHERE user_id = ?1 ORDER BY id")?;
        statement
            .query_map([user.id.as_i64()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?
    };

    let find_category = |name: &str, kind: &str| {
        categories
            .iter()
            .find(|(_, category_name, category_type)| category_name == name && category_type == kind)
            .map(|(id, _, _)| *id)
            .ok_or_else(|| format!("Missing default category {name} ({kind})"))
    };

    let salary = find_category("Salary", "income")?;
    let housing = find_category("Housing", "expense")?;
    let groceries = find_category("Groceries", "expense")?;
    let transport = find_category("Transport", "expense")?;
    let entertainment = find_category("Entertainment", "expense")?;

    println!("Creating {} days of transactions...", args.days);

    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;

    for days_ago in (0..args.days).rev() {
        let date = today - Duration::days(days_ago);

        for (amount, category_id, description) in transactions_for_day(
            date,
            salary,
            housing,
            groceries,
            transport,
            entertainment,
        ) {
            insert_transaction(
                user.id,
                NewTransaction {
                    amount,
                    category_id,
                    date,
                    description: description.to_owned(),
                },
                &conn,
            )?;
            count += 1;
        }
    }

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}

/// A deterministic spread of pay, rent and everyday spending.
fn transactions_for_day(
    date: Date,
    salary: i64,
    housing: i64,
    groceries: i64,
    transport: i64,
    entertainment: i64,
) -> Vec<(f64, i64, &'static str)> {
    let mut transactions = Vec::new();
    let day = date.day();
    let seasonal = 1.0 + (date.month() as u8 as f64 / 12.0) * 0.25;

    if day == 1 {
        transactions.push((4200.0, salary, "Monthly salary"));
        transactions.push((1650.0, housing, "Rent payment"));
    }

    if date.weekday() == time::Weekday::Saturday {
        transactions.push(((142.35 * seasonal * 100.0).round() / 100.0, groceries, "Weekly groceries"));
    }

    if day % 3 == 0 {
        transactions.push((4.5, transport, "Bus fare"));
    }

    if day == 15 {
        transactions.push(((89.99 * seasonal * 100.0).round() / 100.0, entertainment, "Concert tickets"));
    }

    transactions
}
