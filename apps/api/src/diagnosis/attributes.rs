//! The attribute store: find-or-create rows for sets, attributes, and
//! values, and merge-on-conflict attribute lines per diagnosis.
//!
//! Every lookup key is backed by a uniqueness constraint, so find-or-create
//! is a single `INSERT … ON CONFLICT … RETURNING id` round trip and is safe
//! under concurrent writers. A line's value set only grows: re-linking an
//! already-linked value is a no-op.

use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::diagnosis::AttributeLineDetail;

async fn get_or_insert_set(conn: &mut PgConnection, name: &str) -> Result<Uuid, sqlx::Error> {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO attribute_sets (name) VALUES ($1)
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
         RETURNING id",
    )
    .bind(name)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

async fn get_or_insert_attribute(
    conn: &mut PgConnection,
    set_id: Uuid,
    name: &str,
) -> Result<Uuid, sqlx::Error> {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO attributes (name, attribute_set_id) VALUES ($1, $2)
         ON CONFLICT (attribute_set_id, name) DO UPDATE SET name = EXCLUDED.name
         RETURNING id",
    )
    .bind(name)
    .bind(set_id)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

// Value lookup is scoped to the owning attribute: two attributes may both
// hold a value named "Yes" without sharing a row.
async fn get_or_insert_value(
    conn: &mut PgConnection,
    attribute_id: Uuid,
    name: &str,
) -> Result<Uuid, sqlx::Error> {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO attribute_values (name, attribute_id) VALUES ($1, $2)
         ON CONFLICT (attribute_id, name) DO UPDATE SET name = EXCLUDED.name
         RETURNING id",
    )
    .bind(name)
    .bind(attribute_id)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Finds or creates the line for (diagnosis, attribute) and unions the given
/// values into it.
async fn upsert_line(
    conn: &mut PgConnection,
    diagnosis_id: Uuid,
    attribute_id: Uuid,
    value_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    let (line_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO attribute_lines (diagnosis_id, attribute_id) VALUES ($1, $2)
         ON CONFLICT (diagnosis_id, attribute_id) DO UPDATE SET attribute_id = EXCLUDED.attribute_id
         RETURNING id",
    )
    .bind(diagnosis_id)
    .bind(attribute_id)
    .fetch_one(&mut *conn)
    .await?;

    for value_id in value_ids {
        sqlx::query(
            "INSERT INTO attribute_line_values (line_id, value_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(line_id)
        .bind(value_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Upserts one attribute-set payload parsed from an AI response.
///
/// An object payload maps attribute names to a value or list of values. A
/// scalar payload (the model occasionally flattens a set to plain text) is
/// stored as a single value under an attribute named after the set.
pub async fn apply_attribute_set(
    conn: &mut PgConnection,
    diagnosis_id: Uuid,
    set_name: &str,
    payload: &Value,
) -> Result<(), AppError> {
    let set_id = get_or_insert_set(conn, set_name).await?;

    let entries: Vec<(String, Vec<String>)> = match payload {
        Value::Object(map) => map
            .iter()
            .map(|(attr_name, attr_values)| (attr_name.clone(), value_names(attr_values)))
            .collect(),
        other => vec![(set_name.to_string(), value_names(other))],
    };

    for (attr_name, values) in entries {
        if values.is_empty() {
            continue;
        }
        let attribute_id = get_or_insert_attribute(conn, set_id, &attr_name).await?;
        let mut value_ids = Vec::with_capacity(values.len());
        for value in &values {
            value_ids.push(get_or_insert_value(conn, attribute_id, value).await?);
        }
        upsert_line(conn, diagnosis_id, attribute_id, &value_ids).await?;
    }
    Ok(())
}

/// Normalizes a payload value into value-name strings: a list yields one
/// name per element, a scalar yields one, null yields none. Duplicates
/// within one payload collapse to a single name.
pub fn value_names(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(scalar_name).collect(),
        other => scalar_name(other).into_iter().collect(),
    };
    let mut names = Vec::with_capacity(raw.len());
    for name in raw {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn scalar_name(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Fetches a diagnosis's attribute lines joined out to set, attribute, and
/// value names.
pub async fn fetch_lines(
    pool: &PgPool,
    diagnosis_id: Uuid,
) -> Result<Vec<AttributeLineDetail>, AppError> {
    let lines: Vec<AttributeLineDetail> = sqlx::query_as(
        r#"
        SELECT
            l.id AS line_id,
            s.name AS attribute_set,
            a.name AS attribute,
            COALESCE(array_agg(v.name ORDER BY v.name) FILTER (WHERE v.name IS NOT NULL), '{}') AS "values"
        FROM attribute_lines l
        JOIN attributes a ON a.id = l.attribute_id
        JOIN attribute_sets s ON s.id = a.attribute_set_id
        LEFT JOIN attribute_line_values lv ON lv.line_id = l.id
        LEFT JOIN attribute_values v ON v.id = lv.value_id
        WHERE l.diagnosis_id = $1
        GROUP BY l.id, s.name, a.name
        ORDER BY s.name, a.name
        "#,
    )
    .bind(diagnosis_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}
