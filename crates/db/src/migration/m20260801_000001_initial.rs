//! Initial database migration.
//!
//! Creates the ledger enums and tables, the constraints and indices the
//! engine depends on, the trigger that makes ledger entries immutable,
//! and the seeded system account.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;
        db.execute_unprepared(SEED_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account classification
CREATE TYPE account_type AS ENUM ('USER', 'SYSTEM');

-- Product operation that produced a transaction
CREATE TYPE transaction_type AS ENUM ('DEPOSIT', 'WITHDRAWAL', 'TRANSFER');

-- Side of a ledger entry
CREATE TYPE entry_type AS ENUM ('DEBIT', 'CREDIT');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL DEFAULT 'USER',
    currency CHAR(3) NOT NULL DEFAULT 'USD',
    balance BIGINT NOT NULL DEFAULT 0,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_name_not_empty CHECK (name <> ''),
    CONSTRAINT chk_user_balance_non_negative CHECK (
        account_type <> 'USER' OR balance >= 0
    )
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    idempotency_key VARCHAR(255),
    transaction_type transaction_type NOT NULL,
    amount BIGINT NOT NULL,
    currency CHAR(3) NOT NULL DEFAULT 'USD',
    description VARCHAR(500),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_txn_amount_positive CHECK (amount > 0)
);

-- Unique only when present: a NULL key opts out of idempotency
CREATE UNIQUE INDEX idx_txn_idempotency_key ON transactions(idempotency_key)
    WHERE idempotency_key IS NOT NULL;
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id UUID NOT NULL REFERENCES transactions(id),
    account_id UUID NOT NULL REFERENCES accounts(id),
    entry_type entry_type NOT NULL,
    amount BIGINT NOT NULL,
    balance_after BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_entry_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_le_account_created ON ledger_entries(account_id, created_at DESC);
CREATE INDEX idx_le_transaction ON ledger_entries(transaction_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: reject_ledger_entry_mutation
-- Ledger entries are immutable after insert. Enforced here so that
-- application bugs cannot rewrite history.
-- ============================================================
CREATE OR REPLACE FUNCTION reject_ledger_entry_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'ledger entries are immutable';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_ledger_entries_immutable
BEFORE UPDATE OR DELETE ON ledger_entries
FOR EACH ROW
EXECUTE FUNCTION reject_ledger_entry_mutation();
";

const SEED_SQL: &str = r"
-- The single system account: counterparty for deposits and withdrawals
INSERT INTO accounts (id, name, account_type, currency, balance, version)
VALUES (
    '00000000-0000-0000-0000-000000000001',
    'External Funding Source',
    'SYSTEM',
    'USD',
    0,
    0
);
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_ledger_entries_immutable ON ledger_entries;
DROP FUNCTION IF EXISTS reject_ledger_entry_mutation();
DROP TABLE IF EXISTS ledger_entries;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS accounts;
DROP TYPE IF EXISTS entry_type;
DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS account_type;
";
