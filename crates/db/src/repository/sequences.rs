//! Sequence and step statements.
//!
//! Writes against `steps` always filter on `account_id`, `sequence_id` and
//! `step_id` together; writes against `sequences` filter on `account_id` and
//! `sequence_id`. A statement that matches no row yields `DbError::NotFound`.

use sqlx::{PgConnection, PgExecutor};

use crate::{
    models::{
        NewSequence, NewStep, SequenceRow, SequenceTrackingUpdate, StepContentUpdate, StepKey,
        StepRow,
    },
    DbError,
};

// ---------------------------------------------------------------------------
// sequences
// ---------------------------------------------------------------------------

/// Insert a sequence row and return its assigned `sequence_id`.
///
/// `updated_at` starts equal to `created_at`.
pub async fn insert_sequence<'e, E>(
    executor: E,
    sequence: &NewSequence,
    now: i64,
) -> Result<i64, DbError>
where
    E: PgExecutor<'e>,
{
    let sequence_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO sequences
            (account_id, created_at, updated_at, sequence_name,
             sequence_open_tracking_enabled, sequence_click_tracking_enabled)
        VALUES ($1, $2, $2, $3, $4, $5)
        RETURNING sequence_id
        "#,
    )
    .bind(sequence.account_id)
    .bind(now)
    .bind(&sequence.sequence_name)
    .bind(sequence.sequence_open_tracking_enabled)
    .bind(sequence.sequence_click_tracking_enabled)
    .fetch_one(executor)
    .await?;

    Ok(sequence_id)
}

/// Set both tracking flags and bump `updated_at`.
pub async fn update_sequence_tracking<'e, E>(
    executor: E,
    update: &SequenceTrackingUpdate,
    now: i64,
) -> Result<i64, DbError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE sequences
        SET sequence_open_tracking_enabled = $1,
            sequence_click_tracking_enabled = $2,
            updated_at = $3
        WHERE account_id = $4 AND sequence_id = $5
        RETURNING sequence_id
        "#,
    )
    .bind(update.sequence_open_tracking_enabled)
    .bind(update.sequence_click_tracking_enabled)
    .bind(now)
    .bind(update.account_id)
    .bind(update.sequence_id)
    .fetch_optional(executor)
    .await?
    .ok_or(DbError::NotFound)
}

/// Fetch a single sequence owned by `account_id`.
pub async fn get_sequence<'e, E>(
    executor: E,
    account_id: i64,
    sequence_id: i64,
) -> Result<SequenceRow, DbError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, SequenceRow>(
        r#"
        SELECT sequence_id, account_id, created_at, updated_at, sequence_name,
               sequence_open_tracking_enabled, sequence_click_tracking_enabled
        FROM sequences
        WHERE account_id = $1 AND sequence_id = $2
        "#,
    )
    .bind(account_id)
    .bind(sequence_id)
    .fetch_optional(executor)
    .await?
    .ok_or(DbError::NotFound)
}

// ---------------------------------------------------------------------------
// steps
// ---------------------------------------------------------------------------

/// Insert one step under an existing sequence and return its `step_id`.
pub async fn insert_step<'e, E>(
    executor: E,
    account_id: i64,
    sequence_id: i64,
    step_position: i32,
    step: &NewStep,
    now: i64,
) -> Result<i64, DbError>
where
    E: PgExecutor<'e>,
{
    let step_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO steps
            (account_id, sequence_id, step_position, created_at, updated_at,
             step_email_subject, step_email_body, wait_days,
             eligible_start_time, eligible_end_time)
        VALUES ($1, $2, $3, $4, $4, $5, $6, $7, $8, $9)
        RETURNING step_id
        "#,
    )
    .bind(account_id)
    .bind(sequence_id)
    .bind(step_position)
    .bind(now)
    .bind(&step.step_email_subject)
    .bind(&step.step_email_body)
    .bind(step.wait_days)
    .bind(step.eligible_start_time)
    .bind(step.eligible_end_time)
    .fetch_one(executor)
    .await?;

    Ok(step_id)
}

/// Insert a sequence and its steps on one connection, in order.
///
/// Callers run this inside a transaction; on error nothing here is undone.
pub async fn insert_sequence_with_steps(
    conn: &mut PgConnection,
    sequence: &NewSequence,
    steps: &[NewStep],
    now: i64,
) -> Result<i64, DbError> {
    let sequence_id = insert_sequence(&mut *conn, sequence, now).await?;

    for (step_position, step) in (0_i32..).zip(steps) {
        insert_step(
            &mut *conn,
            sequence.account_id,
            sequence_id,
            step_position,
            step,
            now,
        )
        .await?;
    }

    Ok(sequence_id)
}

/// Replace a step's subject and body and bump `updated_at`.
pub async fn update_step_content<'e, E>(
    executor: E,
    update: &StepContentUpdate,
    now: i64,
) -> Result<(i64, i64), DbError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, (i64, i64)>(
        r#"
        UPDATE steps
        SET step_email_subject = $1, step_email_body = $2, updated_at = $3
        WHERE account_id = $4 AND sequence_id = $5 AND step_id = $6
        RETURNING sequence_id, step_id
        "#,
    )
    .bind(&update.step_email_subject)
    .bind(&update.step_email_body)
    .bind(now)
    .bind(update.key.account_id)
    .bind(update.key.sequence_id)
    .bind(update.key.step_id)
    .fetch_optional(executor)
    .await?
    .ok_or(DbError::NotFound)
}

/// Delete a step and return the ids of the deleted row.
pub async fn delete_step<'e, E>(executor: E, key: &StepKey) -> Result<(i64, i64), DbError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, (i64, i64)>(
        r#"
        DELETE FROM steps
        WHERE account_id = $1 AND sequence_id = $2 AND step_id = $3
        RETURNING sequence_id, step_id
        "#,
    )
    .bind(key.account_id)
    .bind(key.sequence_id)
    .bind(key.step_id)
    .fetch_optional(executor)
    .await?
    .ok_or(DbError::NotFound)
}

/// All steps of a sequence owned by `account_id`, in creation order.
pub async fn list_steps<'e, E>(
    executor: E,
    account_id: i64,
    sequence_id: i64,
) -> Result<Vec<StepRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, StepRow>(
        r#"
        SELECT step_id, account_id, sequence_id, step_position, created_at, updated_at,
               step_email_subject, step_email_body, wait_days,
               eligible_start_time, eligible_end_time
        FROM steps
        WHERE account_id = $1 AND sequence_id = $2
        ORDER BY step_position ASC, step_id ASC
        "#,
    )
    .bind(account_id)
    .bind(sequence_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
