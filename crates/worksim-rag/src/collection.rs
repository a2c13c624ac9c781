//! Deterministic collection naming and the chat fallback chain

/// Identifier length limit of the backing store (63 in the reference
/// deployment)
pub const MAX_COLLECTION_NAME: usize = 63;

/// How much of the logical name survives truncation before the hash suffix
const TRUNCATED_PREFIX: usize = 54;

/// Project id under which pre-project legacy data was written
const LEGACY_PROJECT: &str = "undefined";

/// Derive the collection name for `(project_id, user_id)`.
///
/// `user_{user}_project_{project}` when a user is present, `project_{project}`
/// otherwise, with hyphens replaced by underscores. Names over the store's
/// 63-char limit are replaced by the first 54 chars plus 8 hex chars of the
/// md5 of the full logical name, so truncation cannot collide two distinct
/// logical names. Pure and deterministic.
pub fn collection_name(project_id: &str, user_id: Option<&str>) -> String {
    let name = match user_id {
        Some(user) => format!(
            "user_{}_project_{}",
            user.replace('-', "_"),
            project_id.replace('-', "_")
        ),
        None => format!("project_{}", project_id.replace('-', "_")),
    };

    if name.chars().count() > MAX_COLLECTION_NAME {
        let digest = format!("{:x}", md5::compute(name.as_bytes()));
        let head: String = name.chars().take(TRUNCATED_PREFIX).collect();
        format!("{}_{}", head, &digest[..8])
    } else {
        name
    }
}

/// Ordered collection names to try during chat context retrieval.
///
/// Tier 1 is the scoped collection. Tier 2 drops the user (data written
/// before per-user scoping existed). Tier 3 is the legacy default project,
/// skipped when the request already targets it. Search does not use this
/// chain; it reads tier 1 only.
pub fn chat_fallback_chain(project_id: &str, user_id: Option<&str>) -> Vec<String> {
    let mut chain = vec![collection_name(project_id, user_id)];
    if user_id.is_some() {
        chain.push(collection_name(project_id, None));
    }
    if project_id != LEGACY_PROJECT {
        chain.push(collection_name(LEGACY_PROJECT, None));
    }
    chain
}
