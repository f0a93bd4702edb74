//! Clips cut from a project and what hangs off them: rendered assets and
//! per-platform analytics.

use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use log::debug;
use serde::Serialize;

use crate::core::shared::delegate::{model_aggregate, model_delegate, GroupCount};
use crate::core::shared::enums::{AssetKind, ClipStatus, Platform};
use crate::core::shared::error::{ModelContext, StoreResult};
use crate::core::shared::filters::{or_true, FindManyArgs};
use crate::core::shared::schema::{analytics, assets, clips};

pub mod filters;
pub mod models;

pub use filters::{AnalyticsWhere, AssetWhere, ClipWhere};
pub use models::{
    Analytics, AnalyticsUpdate, Asset, AssetUpdate, Clip, ClipUpdate, NewAnalytics, NewAsset,
    NewClip,
};

model_delegate! {
    ClipDelegate {
        model: "Clip",
        table: clips,
        row: Clip,
        create: NewClip,
        update: ClipUpdate,
        filter: ClipWhere,
        upsert_on: (id),
        order: ClipOrderBy {
            Id => id,
            ProjectId => project_id,
            StartMs => start_ms,
            EndMs => end_ms,
            Caption => caption,
            Status => status,
            CreatedAt => created_at,
            UpdatedAt => updated_at,
        },
    }
}

model_aggregate!(ClipDelegate, clips, ClipWhere, ClipAggregate { start_ms, end_ms });

model_delegate! {
    AssetDelegate {
        model: "Asset",
        table: assets,
        row: Asset,
        create: NewAsset,
        update: AssetUpdate,
        filter: AssetWhere,
        upsert_on: (id),
        order: AssetOrderBy {
            Id => id,
            ClipId => clip_id,
            Kind => kind,
            StoragePath => storage_path,
            CreatedAt => created_at,
        },
    }
}

model_delegate! {
    /// Upserts resolve on `(clipId, platform)`, the natural key of a row.
    AnalyticsDelegate {
        model: "Analytics",
        table: analytics,
        row: Analytics,
        create: NewAnalytics,
        update: AnalyticsUpdate,
        filter: AnalyticsWhere,
        upsert_on: (clip_id, platform),
        order: AnalyticsOrderBy {
            Id => id,
            ClipId => clip_id,
            Platform => platform,
            Views => views,
            Likes => likes,
            Comments => comments,
            Shares => shares,
            CreatedAt => created_at,
            UpdatedAt => updated_at,
        },
    }
}

model_aggregate!(
    AnalyticsDelegate,
    analytics,
    AnalyticsWhere,
    AnalyticsAggregate { views, likes, comments, shares }
);

pub type ClipFindMany = FindManyArgs<ClipWhere, ClipOrderBy>;
pub type AssetFindMany = FindManyArgs<AssetWhere, AssetOrderBy>;
pub type AnalyticsFindMany = FindManyArgs<AnalyticsWhere, AnalyticsOrderBy>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipInclude {
    pub assets: bool,
    pub analytics: bool,
}

impl ClipInclude {
    pub fn all() -> Self {
        Self {
            assets: true,
            analytics: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipWithRelations {
    #[serde(flatten)]
    pub clip: Clip,
    pub assets: Option<Vec<Asset>>,
    pub analytics: Option<Vec<Analytics>>,
}

/// Per-platform totals of the analytics rows matching a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformTotals {
    pub platform: Platform,
    pub count: i64,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

impl<'c> ClipDelegate<'c> {
    pub fn find_many_with(
        &mut self,
        args: &ClipFindMany,
        include: ClipInclude,
    ) -> StoreResult<Vec<ClipWithRelations>> {
        let clips = self.find_many(args)?;
        self.load_relations(clips, include)
    }

    pub fn find_unique_with(
        &mut self,
        id: &str,
        include: ClipInclude,
    ) -> StoreResult<Option<ClipWithRelations>> {
        let Some(clip) = self.find_unique(id)? else {
            return Ok(None);
        };
        Ok(self.load_relations(vec![clip], include)?.pop())
    }

    fn load_relations(
        &mut self,
        parents: Vec<Clip>,
        include: ClipInclude,
    ) -> StoreResult<Vec<ClipWithRelations>> {
        debug!("Loading relations for {} clips: {include:?}", parents.len());
        let mut asset_groups: Vec<Option<Vec<Asset>>> = if include.assets {
            Asset::belonging_to(&parents)
                .order(assets::created_at.asc())
                .load::<Asset>(self.conn())
                .for_model("Asset")?
                .grouped_by(&parents)
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None; parents.len()]
        };
        let mut analytics_groups: Vec<Option<Vec<Analytics>>> = if include.analytics {
            Analytics::belonging_to(&parents)
                .order(analytics::platform.asc())
                .load::<Analytics>(self.conn())
                .for_model("Analytics")?
                .grouped_by(&parents)
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None; parents.len()]
        };

        let mut loaded = Vec::with_capacity(parents.len());
        for clip in parents.into_iter().rev() {
            loaded.push(ClipWithRelations {
                clip,
                assets: asset_groups.pop().flatten(),
                analytics: analytics_groups.pop().flatten(),
            });
        }
        loaded.reverse();
        Ok(loaded)
    }

    pub fn group_by_status(&mut self, filter: &ClipWhere) -> StoreResult<Vec<GroupCount<ClipStatus>>> {
        let rows = clips::table
            .filter(or_true(filter.to_condition()))
            .group_by(clips::status)
            .select((clips::status, count_star()))
            .order(clips::status.asc())
            .load::<(ClipStatus, i64)>(self.conn())
            .for_model(Self::MODEL)?;
        Ok(rows.into_iter().map(GroupCount::from).collect())
    }

    pub fn group_by_project(&mut self, filter: &ClipWhere) -> StoreResult<Vec<GroupCount<String>>> {
        let rows = clips::table
            .filter(or_true(filter.to_condition()))
            .group_by(clips::project_id)
            .select((clips::project_id, count_star()))
            .order(clips::project_id.asc())
            .load::<(String, i64)>(self.conn())
            .for_model(Self::MODEL)?;
        Ok(rows.into_iter().map(GroupCount::from).collect())
    }
}

impl<'c> AssetDelegate<'c> {
    pub fn group_by_kind(&mut self, filter: &AssetWhere) -> StoreResult<Vec<GroupCount<AssetKind>>> {
        let rows = assets::table
            .filter(or_true(filter.to_condition()))
            .group_by(assets::kind)
            .select((assets::kind, count_star()))
            .order(assets::kind.asc())
            .load::<(AssetKind, i64)>(self.conn())
            .for_model(Self::MODEL)?;
        Ok(rows.into_iter().map(GroupCount::from).collect())
    }
}

impl<'c> AnalyticsDelegate<'c> {
    pub fn find_unique_by_clip_platform(
        &mut self,
        clip_id: &str,
        platform: Platform,
    ) -> StoreResult<Option<Analytics>> {
        analytics::table
            .filter(analytics::clip_id.eq(clip_id))
            .filter(analytics::platform.eq(platform))
            .first::<Analytics>(self.conn())
            .optional()
            .for_model(Self::MODEL)
    }

    /// Overwrites all four counters for `(clip_id, platform)`, creating the
    /// row when it does not exist yet. Counters left out of `counts` become 0.
    pub fn record(
        &mut self,
        clip_id: &str,
        platform: Platform,
        counts: AnalyticsUpdate,
    ) -> StoreResult<Analytics> {
        let (views, likes, comments, shares) = (
            counts.views.unwrap_or_default(),
            counts.likes.unwrap_or_default(),
            counts.comments.unwrap_or_default(),
            counts.shares.unwrap_or_default(),
        );
        let create = NewAnalytics::new(clip_id, platform).with_counts(views, likes, comments, shares);
        self.upsert(create, AnalyticsUpdate::counts(views, likes, comments, shares))
    }

    pub fn group_by_platform(&mut self, filter: &AnalyticsWhere) -> StoreResult<Vec<PlatformTotals>> {
        let rows = analytics::table
            .filter(or_true(filter.to_condition()))
            .group_by(analytics::platform)
            .select((
                analytics::platform,
                count_star(),
                sum(analytics::views),
                sum(analytics::likes),
                sum(analytics::comments),
                sum(analytics::shares),
            ))
            .order(analytics::platform.asc())
            .load::<(Platform, i64, Option<i64>, Option<i64>, Option<i64>, Option<i64>)>(self.conn())
            .for_model(Self::MODEL)?;
        Ok(rows
            .into_iter()
            .map(|(platform, count, views, likes, comments, shares)| PlatformTotals {
                platform,
                count,
                views: views.unwrap_or_default(),
                likes: likes.unwrap_or_default(),
                comments: comments.unwrap_or_default(),
                shares: shares.unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::filters::OrderBy;

    #[test]
    fn test_clip_query_orders_by_score_window() {
        let args = ClipFindMany::new()
            .filter(ClipWhere::status(ClipStatus::Ready))
            .order_by(OrderBy::asc(ClipOrderBy::StartMs))
            .take(5);
        let query = ClipDelegate::boxed_query(&args).unwrap();
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(sql.contains("FROM \"Clip\""), "{sql}");
        assert!(sql.contains("ORDER BY \"Clip\".\"startMs\" ASC"), "{sql}");
    }

    #[test]
    fn test_analytics_upsert_targets_natural_key() {
        let create = NewAnalytics::new("c1", Platform::Instagram);
        let query = diesel::insert_into(analytics::table)
            .values(&create)
            .on_conflict((analytics::clip_id, analytics::platform))
            .do_update()
            .set(analytics::views.eq(10));
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(sql.contains("ON CONFLICT (\"clipId\", \"platform\")"), "{sql}");
    }

    #[test]
    fn test_platform_totals_serialize() {
        let totals = PlatformTotals {
            platform: Platform::Tiktok,
            count: 2,
            views: 300,
            likes: 20,
            comments: 4,
            shares: 1,
        };
        let json = serde_json::to_value(&totals).unwrap();
        assert_eq!(json["platform"], "tiktok");
        assert_eq!(json["views"], 300);
    }
}
