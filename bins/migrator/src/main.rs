//! Applies the ledger schema to the configured database.
//!
//! Thin front-end over the workspace's migration set: `migrator up`
//! brings a fresh database to the current schema (tables, constraints,
//! the entry-immutability trigger, and the seeded system account),
//! while `down`, `status`, and `fresh` behave as the migration CLI
//! defines them. Reads `DATABASE_URL` from the environment or `.env`.

use sea_orm_migration::prelude::*;
use tally_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
