use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{partition_key, CourseSummary, ProgressRecord, EMPTY_LEVEL_MESSAGE, LEVELS};
use crate::auth::IdentityClaim;
use crate::database::ProgressStore;
use crate::error::ApiError;
use crate::types::Operation;

/// Content of one level slot in the grouped view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelEntry {
    Courses(Vec<CourseSummary>),
    Empty(String),
}

impl LevelEntry {
    pub fn courses(&self) -> &[CourseSummary] {
        match self {
            LevelEntry::Courses(courses) => courses,
            LevelEntry::Empty(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LevelEntry::Empty(_))
    }
}

/// Response of the read pipeline. Levels serialize as `"1"` through `"10"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedProgress {
    pub tenant_id: String,
    pub user_id: String,
    pub academic_progress: BTreeMap<u8, LevelEntry>,
}

/// Bucket records into the ten curriculum levels.
///
/// Records stored with a level outside `1..=10` are dropped.
pub fn group_by_level(records: impl IntoIterator<Item = ProgressRecord>) -> BTreeMap<u8, LevelEntry> {
    let mut buckets: BTreeMap<u8, Vec<CourseSummary>> = LEVELS
        .map(|level| (level as u8, Vec::new()))
        .collect();

    for record in records {
        if !LEVELS.contains(&record.level) {
            tracing::warn!(
                level = record.level,
                course_id = %record.course_id,
                "dropping stored record with out-of-range level"
            );
            continue;
        }
        if let Some(bucket) = buckets.get_mut(&(record.level as u8)) {
            bucket.push(record.summary());
        }
    }

    buckets
        .into_iter()
        .map(|(level, courses)| {
            let entry = if courses.is_empty() {
                LevelEntry::Empty(EMPTY_LEVEL_MESSAGE.to_string())
            } else {
                LevelEntry::Courses(courses)
            };
            (level, entry)
        })
        .collect()
}

/// Read pipeline: fetch every record of the authenticated student and group them
pub async fn read_progress(
    store: &dyn ProgressStore,
    claim: &IdentityClaim,
) -> Result<GroupedProgress, ApiError> {
    let operation = Operation::ReadProgress;
    let pk = partition_key(&claim.tenant_id, &claim.user_id);

    let records = store.query_partition(&pk).await.map_err(|e| {
        tracing::error!(
            %operation,
            tenant_id = %claim.tenant_id,
            user_id = %claim.user_id,
            error = %e,
            "failed to query academic progress"
        );
        ApiError::from(e)
    })?;

    // Distinct identities can join to the same key when an id contains '#'
    let fetched = records.len();
    let records: Vec<ProgressRecord> = records
        .into_iter()
        .filter(|r| r.tenant_id == claim.tenant_id && r.user_id == claim.user_id)
        .collect();
    if records.len() != fetched {
        tracing::warn!(
            %operation,
            tenant_id = %claim.tenant_id,
            user_id = %claim.user_id,
            dropped = fetched - records.len(),
            "dropped records belonging to another identity"
        );
    }

    tracing::debug!(
        %operation,
        tenant_id = %claim.tenant_id,
        user_id = %claim.user_id,
        count = records.len(),
        "academic progress loaded"
    );

    Ok(GroupedProgress {
        tenant_id: claim.tenant_id.clone(),
        user_id: claim.user_id.clone(),
        academic_progress: group_by_level(records),
    })
}
