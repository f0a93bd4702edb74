//! Projects and the per-project rows produced while analysing them:
//! transcripts and clip candidates.

use diesel::prelude::*;
use log::debug;
use serde::Serialize;

use crate::clip::models::Clip;
use crate::core::shared::delegate::{model_aggregate, model_delegate, GroupCount};
use crate::core::shared::enums::ProjectStatus;
use crate::core::shared::error::{ModelContext, StoreResult};
use crate::core::shared::filters::{or_true, FindManyArgs};
use crate::core::shared::schema::{clip_candidates, clips, projects, transcripts};

pub mod filters;
pub mod models;

pub use filters::{ClipCandidateWhere, ProjectWhere, TranscriptWhere};
pub use models::{
    ClipCandidate, ClipCandidateUpdate, NewClipCandidate, NewProject, NewTranscript, Project,
    ProjectUpdate, Transcript, TranscriptUpdate,
};

model_delegate! {
    ProjectDelegate {
        model: "Project",
        table: projects,
        row: Project,
        create: NewProject,
        update: ProjectUpdate,
        filter: ProjectWhere,
        upsert_on: (id),
        order: ProjectOrderBy {
            Id => id,
            Title => title,
            SourcePath => source_path,
            DurationMs => duration_ms,
            Status => status,
            CreatedAt => created_at,
            UpdatedAt => updated_at,
        },
    }
}

model_aggregate!(ProjectDelegate, projects, ProjectWhere, ProjectAggregate { duration_ms });

model_delegate! {
    TranscriptDelegate {
        model: "Transcript",
        table: transcripts,
        row: Transcript,
        create: NewTranscript,
        update: TranscriptUpdate,
        filter: TranscriptWhere,
        upsert_on: (id),
        order: TranscriptOrderBy {
            Id => id,
            ProjectId => project_id,
            Provider => provider,
            CreatedAt => created_at,
            UpdatedAt => updated_at,
        },
    }
}

model_delegate! {
    ClipCandidateDelegate {
        model: "ClipCandidate",
        table: clip_candidates,
        row: ClipCandidate,
        create: NewClipCandidate,
        update: ClipCandidateUpdate,
        filter: ClipCandidateWhere,
        upsert_on: (id),
        order: ClipCandidateOrderBy {
            Id => id,
            ProjectId => project_id,
            StartMs => start_ms,
            EndMs => end_ms,
            CreatedAt => created_at,
        },
    }
}

model_aggregate!(
    ClipCandidateDelegate,
    clip_candidates,
    ClipCandidateWhere,
    ClipCandidateAggregate { start_ms, end_ms }
);

pub type ProjectFindMany = FindManyArgs<ProjectWhere, ProjectOrderBy>;
pub type TranscriptFindMany = FindManyArgs<TranscriptWhere, TranscriptOrderBy>;
pub type ClipCandidateFindMany = FindManyArgs<ClipCandidateWhere, ClipCandidateOrderBy>;

/// Relations to load alongside projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectInclude {
    pub transcripts: bool,
    pub clip_candidates: bool,
    pub clips: bool,
}

impl ProjectInclude {
    pub fn all() -> Self {
        Self {
            transcripts: true,
            clip_candidates: true,
            clips: true,
        }
    }
}

/// A project with the relations requested by a [`ProjectInclude`]. Relations
/// that were not requested stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithRelations {
    #[serde(flatten)]
    pub project: Project,
    pub transcripts: Option<Vec<Transcript>>,
    pub clip_candidates: Option<Vec<ClipCandidate>>,
    pub clips: Option<Vec<Clip>>,
}

impl<'c> ProjectDelegate<'c> {
    pub fn find_many_with(
        &mut self,
        args: &ProjectFindMany,
        include: ProjectInclude,
    ) -> StoreResult<Vec<ProjectWithRelations>> {
        let projects = self.find_many(args)?;
        self.load_relations(projects, include)
    }

    pub fn find_unique_with(
        &mut self,
        id: &str,
        include: ProjectInclude,
    ) -> StoreResult<Option<ProjectWithRelations>> {
        let Some(project) = self.find_unique(id)? else {
            return Ok(None);
        };
        Ok(self.load_relations(vec![project], include)?.pop())
    }

    fn load_relations(
        &mut self,
        projects: Vec<Project>,
        include: ProjectInclude,
    ) -> StoreResult<Vec<ProjectWithRelations>> {
        debug!(
            "Loading relations for {} projects: {include:?}",
            projects.len()
        );
        let mut transcript_groups: Vec<Option<Vec<Transcript>>> = if include.transcripts {
            Transcript::belonging_to(&projects)
                .order(transcripts::created_at.asc())
                .load::<Transcript>(self.conn())
                .for_model("Transcript")?
                .grouped_by(&projects)
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None; projects.len()]
        };
        let mut candidate_groups: Vec<Option<Vec<ClipCandidate>>> = if include.clip_candidates {
            ClipCandidate::belonging_to(&projects)
                .order(clip_candidates::start_ms.asc())
                .load::<ClipCandidate>(self.conn())
                .for_model("ClipCandidate")?
                .grouped_by(&projects)
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None; projects.len()]
        };
        let mut clip_groups: Vec<Option<Vec<Clip>>> = if include.clips {
            Clip::belonging_to(&projects)
                .order(clips::start_ms.asc())
                .load::<Clip>(self.conn())
                .for_model("Clip")?
                .grouped_by(&projects)
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None; projects.len()]
        };

        let mut loaded = Vec::with_capacity(projects.len());
        for project in projects.into_iter().rev() {
            loaded.push(ProjectWithRelations {
                project,
                transcripts: transcript_groups.pop().flatten(),
                clip_candidates: candidate_groups.pop().flatten(),
                clips: clip_groups.pop().flatten(),
            });
        }
        loaded.reverse();
        Ok(loaded)
    }

    pub fn group_by_status(&mut self, filter: &ProjectWhere) -> StoreResult<Vec<GroupCount<ProjectStatus>>> {
        let rows = projects::table
            .filter(or_true(filter.to_condition()))
            .group_by(projects::status)
            .select((projects::status, diesel::dsl::count_star()))
            .order(projects::status.asc())
            .load::<(ProjectStatus, i64)>(self.conn())
            .for_model(Self::MODEL)?;
        Ok(rows.into_iter().map(GroupCount::from).collect())
    }
}

impl<'c> TranscriptDelegate<'c> {
    pub fn group_by_provider(&mut self, filter: &TranscriptWhere) -> StoreResult<Vec<GroupCount<String>>> {
        let rows = transcripts::table
            .filter(or_true(filter.to_condition()))
            .group_by(transcripts::provider)
            .select((transcripts::provider, diesel::dsl::count_star()))
            .order(transcripts::provider.asc())
            .load::<(String, i64)>(self.conn())
            .for_model(Self::MODEL)?;
        Ok(rows.into_iter().map(GroupCount::from).collect())
    }
}

impl<'c> ClipCandidateDelegate<'c> {
    pub fn group_by_project(
        &mut self,
        filter: &ClipCandidateWhere,
    ) -> StoreResult<Vec<GroupCount<String>>> {
        let rows = clip_candidates::table
            .filter(or_true(filter.to_condition()))
            .group_by(clip_candidates::project_id)
            .select((clip_candidates::project_id, diesel::dsl::count_star()))
            .order(clip_candidates::project_id.asc())
            .load::<(String, i64)>(self.conn())
            .for_model(Self::MODEL)?;
        Ok(rows.into_iter().map(GroupCount::from).collect())
    }
}
