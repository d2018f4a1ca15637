//! Run one query against a database and print the projected value as JSON.
//!
//! ```bash
//! sql-oneline --db app.db int "SELECT age FROM users WHERE user_id=?" --param int:1234
//! sql-oneline --db app.db strings "SELECT name FROM users WHERE age=?" --param int:21
//! sql-oneline --backend postgres --db "host=localhost user=app dbname=app" \
//!     execute "DELETE FROM users WHERE age<?" --param int:18
//! sql-oneline --config conn.json insert-id "INSERT INTO users(name,age) VALUES (?,?)" \
//!     --param text:Alex --param int:21
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use sql_oneline::config::ConnectionConfig;
use sql_oneline::driver::Connection;
use sql_oneline::oneline::OneLine;
use sql_oneline::sqlite::SqliteConnection;
use sql_oneline::{DatabaseType, SqlOneLineError, SqlParam};

#[derive(Parser, Debug)]
#[command(name = "sql-oneline", version, about = "Run a one-line SQL query and print the result")]
struct Cli {
    /// `SQLite` file path, or a `PostgreSQL` connection string with `--backend postgres`
    #[arg(long, conflicts_with = "config", required_unless_present = "config")]
    db: Option<String>,

    /// Engine behind `--db`
    #[arg(long, value_enum, default_value_t = DatabaseType::Sqlite, requires = "db")]
    backend: DatabaseType,

    /// JSON connection config (`{"type":"sqlite","db_path":"app.db"}`)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// SQL text with one `?` per parameter
    query: String,

    /// Positional parameter as `kind:value` (`int:`, `long:`, `text:`, `bool:`) or `null`
    #[arg(long = "param", short = 'p')]
    params: Vec<SqlParam>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// First row, column 1, as a boolean
    Boolean(QueryArgs),
    /// First row, column 1, as a 32-bit int
    Int(QueryArgs),
    /// First row, column 1, as a nullable 32-bit int
    Integer(QueryArgs),
    /// First row, column 1, as a nullable 64-bit int
    Long(QueryArgs),
    /// First row, column 1, as text
    String(QueryArgs),
    /// Column 1 of every row as 32-bit ints
    Ints(QueryArgs),
    /// Column 1 of every row as text
    Strings(QueryArgs),
    /// Run a DML statement and print the affected row count
    Execute(QueryArgs),
    /// Run an INSERT and print the generated key
    InsertId(QueryArgs),
}

impl Command {
    fn args(&self) -> &QueryArgs {
        match self {
            Command::Boolean(a)
            | Command::Int(a)
            | Command::Integer(a)
            | Command::Long(a)
            | Command::String(a)
            | Command::Ints(a)
            | Command::Strings(a)
            | Command::Execute(a)
            | Command::InsertId(a) => a,
        }
    }
}

fn run<C: Connection>(conn: &mut C, command: &Command) -> Result<Value, SqlOneLineError> {
    let one = OneLine::new();
    let QueryArgs { query, params } = command.args();
    let value = match command {
        Command::Boolean(_) => json!(one.try_get_boolean(conn, query, params)?),
        Command::Int(_) | Command::Integer(_) => json!(one.try_get_int(conn, query, params)?),
        Command::Long(_) => json!(one.try_get_long(conn, query, params)?),
        Command::String(_) => json!(one.try_get_string(conn, query, params)?),
        Command::Ints(_) => json!(one.try_get_array_int(conn, query, params)?),
        Command::Strings(_) => json!(one.try_get_array_string(conn, query, params)?),
        Command::Execute(_) => json!(one.try_execute(conn, query, params)?),
        Command::InsertId(_) => json!(one.try_insert_auto_increment(conn, query, params)?),
    };
    Ok(value)
}

fn connect_and_run(cli: &Cli) -> Result<Value, SqlOneLineError> {
    let config = match (&cli.config, &cli.db) {
        (Some(path), _) => ConnectionConfig::from_path(path)?,
        (None, Some(db)) => match cli.backend {
            DatabaseType::Sqlite => {
                let mut conn = SqliteConnection::open(db)?;
                return run(&mut conn, &cli.command);
            }
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => {
                let mut conn = sql_oneline::postgres::PostgresConnection::connect(db)?;
                return run(&mut conn, &cli.command);
            }
            #[cfg(not(feature = "postgres"))]
            DatabaseType::Postgres => {
                return Err(SqlOneLineError::ConfigError(
                    "built without the postgres feature".to_string(),
                ));
            }
        },
        (None, None) => {
            return Err(SqlOneLineError::ConfigError(
                "either --db or --config is required".to_string(),
            ));
        }
    };

    tracing::debug!(database = ?config.database_type(), "connecting from config");
    match config {
        ConnectionConfig::Sqlite(opts) => run(&mut opts.open()?, &cli.command),
        #[cfg(feature = "postgres")]
        ConnectionConfig::Postgres(opts) => run(&mut opts.connect()?, &cli.command),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match connect_and_run(&cli) {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, query = %cli.command.args().query, "query failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
