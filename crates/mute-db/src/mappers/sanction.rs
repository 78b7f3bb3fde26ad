//! SanctionRecord entity <-> model mapper

use mute_core::entities::{SanctionRecord, SanctionVariant};
use mute_core::error::DomainError;
use mute_core::value_objects::{MuteDuration, Snowflake};

use crate::models::SanctionModel;

/// Convert a row into a record
///
/// Fails on rows the domain would never have written (unknown variant,
/// non-positive duration).
impl TryFrom<SanctionModel> for SanctionRecord {
    type Error = DomainError;

    fn try_from(model: SanctionModel) -> Result<Self, Self::Error> {
        let variant: SanctionVariant = model.variant.parse()?;

        let duration = model
            .duration_secs
            .map(|secs| {
                u64::try_from(secs)
                    .map_err(|_| DomainError::DatabaseError(format!("negative duration_secs {secs}")))
                    .and_then(|secs| {
                        MuteDuration::from_secs(secs)
                            .map_err(|e| DomainError::DatabaseError(e.to_string()))
                    })
            })
            .transpose()?;

        Ok(SanctionRecord {
            guild_id: Snowflake::new(model.guild_id),
            user_id: Snowflake::new(model.user_id),
            applied_by: Snowflake::new(model.applied_by),
            applied_at: model.applied_at,
            duration,
            variant,
        })
    }
}

/// Record values ready for insertion
pub struct SanctionInsert {
    pub guild_id: i64,
    pub user_id: i64,
    pub applied_by: i64,
    pub duration_secs: Option<i64>,
    pub variant: &'static str,
}

impl SanctionInsert {
    pub fn new(record: &SanctionRecord) -> Self {
        Self {
            guild_id: record.guild_id.into_inner(),
            user_id: record.user_id.into_inner(),
            applied_by: record.applied_by.into_inner(),
            duration_secs: record.duration.map(|d| d.as_secs() as i64),
            variant: record.variant.as_str(),
        }
    }
}
