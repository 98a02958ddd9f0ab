//! Table definition for enriched records.

use crate::client::Store;
use crate::error::map_sqlx_error;
use enricher_core::Result;
use tracing::debug;

pub const TABLE: &str = "fiofull";

pub const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS fiofull
(
    id         serial primary key,
    name       varchar(30),
    surname    varchar(20),
    patronymic varchar(20),
    age        int,
    gender     varchar(25),
    national   varchar(20)
)
"#;

pub const OFFSETS_TABLE: &str = "consumer_offsets";

/// Next offset to read per consumer group and partition.
pub const CREATE_OFFSETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS consumer_offsets
(
    group_id    text        not null,
    topic       text        not null,
    partition   int         not null,
    next_offset bigint      not null,
    updated_at  timestamptz not null default now(),
    primary key (group_id, topic, partition)
)
"#;

/// Creates the tables if they do not exist.
pub async fn init_schema(store: &Store) -> Result<()> {
    for ddl in [CREATE_TABLE, CREATE_OFFSETS_TABLE] {
        sqlx::query(ddl)
            .execute(store.pool())
            .await
            .map_err(map_sqlx_error)?;
    }

    debug!(tables = ?[TABLE, OFFSETS_TABLE], "Schema initialized");
    Ok(())
}
