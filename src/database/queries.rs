use sqlx::Error;

use crate::types::DbConn;

/// How newly submitted keywords combine with an already stored list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MergePolicy {
    /// Overwrite the stored list.
    Replace,
    /// Append after the stored list, keeping duplicates. Matching is
    /// many-to-one, so duplicate keywords are harmless.
    Merge,
}

impl MergePolicy {
    pub fn from_callback(data: &str) -> Option<MergePolicy> {
        match data {
            "bind|replace" => Some(MergePolicy::Replace),
            "bind|join" => Some(MergePolicy::Merge),
            _ => None,
        }
    }
}

/// Writes the keyword list for `(user_id, sticker_id)` in a single upsert
/// statement, so concurrent binds to the same sticker cannot lose updates.
/// Keywords are lowercased on the way in, search patterns on the way out.
pub async fn upsert_keywords(
    db: &DbConn,
    user_id: String,
    sticker_id: String,
    keywords: Vec<String>,
    policy: MergePolicy,
) -> Result<(), Error> {
    log::debug!(
        "upsert_keywords: {:?} ({:?}) for sticker_id: {:?} and user_id: {:?}",
        keywords,
        policy,
        sticker_id,
        user_id
    );

    let sql = match policy {
        MergePolicy::Replace => {
            "INSERT INTO sticker_record (user_id, sticker_id, keywords) \
            VALUES ($1, $2, $3) \
            ON CONFLICT (user_id, sticker_id) \
            DO UPDATE SET keywords = excluded.keywords"
        }
        MergePolicy::Merge => {
            "INSERT INTO sticker_record (user_id, sticker_id, keywords) \
            VALUES ($1, $2, $3) \
            ON CONFLICT (user_id, sticker_id) \
            DO UPDATE SET keywords = sticker_record.keywords || char(10) || excluded.keywords"
        }
    };

    sqlx::query(sql)
        .bind(user_id)
        .bind(sticker_id)
        .bind(keywords.join("\n").to_lowercase())
        .execute(db)
        .await?;

    Ok(())
}

pub async fn get_keywords(
    db: &DbConn,
    user_id: String,
    sticker_id: String,
) -> Result<Option<Vec<String>>, Error> {
    log::debug!(
        "get_keywords for sticker_id: {:?} and user_id: {:?}",
        sticker_id,
        user_id
    );

    let row: Option<(String,)> = sqlx::query_as(
        "SELECT keywords FROM sticker_record \
        WHERE user_id = $1 AND sticker_id = $2",
    )
    .bind(user_id)
    .bind(sticker_id)
    .fetch_optional(db)
    .await?;

    let result = row.map(|(keywords,)| keywords.lines().map(str::to_string).collect());

    log::debug!("get_keywords result: {:?}", result);

    Ok(result)
}

/// Returns whether a record existed and was removed.
pub async fn delete_record(
    db: &DbConn,
    user_id: String,
    sticker_id: String,
) -> Result<bool, Error> {
    log::debug!(
        "delete_record for sticker_id: {:?} and user_id: {:?}",
        sticker_id,
        user_id
    );

    let result = sqlx::query(
        "DELETE FROM sticker_record \
        WHERE user_id = $1 AND sticker_id = $2",
    )
    .bind(user_id)
    .bind(sticker_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Case-insensitive substring search over the owner's keywords. Ordered by
/// sticker id so repeated calls page through a stable sequence. An empty
/// pattern lists everything the owner has saved.
pub async fn search_stickers(
    db: &DbConn,
    user_id: String,
    pattern: &str,
    offset: u32,
    limit: u32,
) -> Result<Vec<String>, Error> {
    log::debug!(
        "search_stickers: {:?} for user_id: {:?} at offset {:?}",
        pattern,
        user_id,
        offset
    );

    let escaped = escape_like(&pattern.to_lowercase());

    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT sticker_id FROM sticker_record \
        WHERE user_id = $1 AND keywords LIKE '%' || $2 || '%' ESCAPE '\\' \
        ORDER BY sticker_id \
        LIMIT $3 OFFSET $4",
    )
    .bind(user_id)
    .bind(escaped)
    .bind(limit as i64)
    .bind(offset as i64)
    .fetch_all(db)
    .await?;

    let result: Vec<String> = rows.into_iter().map(|(sticker_id,)| sticker_id).collect();

    log::debug!("search_stickers result: {:?}", result);

    Ok(result)
}

// LIKE wildcards in the user's pattern must match literally
fn escape_like(pattern: &str) -> String {
    pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
