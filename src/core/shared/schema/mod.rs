pub mod clip;
pub mod preferences;
pub mod project;
pub mod queue;

pub use self::clip::*;
pub use self::preferences::*;
pub use self::project::*;
pub use self::queue::*;

diesel::joinable!(transcripts -> projects (project_id));
diesel::joinable!(clip_candidates -> projects (project_id));
diesel::joinable!(clips -> projects (project_id));
diesel::joinable!(assets -> clips (clip_id));
diesel::joinable!(analytics -> clips (clip_id));

diesel::allow_tables_to_appear_in_same_query!(
    projects,
    transcripts,
    clip_candidates,
    clips,
    assets,
    analytics,
    jobs,
    clip_profiles,
    theme_presets,
    settings,
    autopilot_configs,
);
