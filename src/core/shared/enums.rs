//! Closed value sets stored in TEXT columns.
//!
//! The database keeps plain text, and these enums only constrain what this
//! crate writes and accepts.
//! Each enum maps to `Text` for Diesel and round-trips through its lowercase
//! wire name for serde, `Display` and `FromStr`.

use diesel::deserialize::{self, FromSql};
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};
use std::io::Write;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal, default = $default:ident {
            $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
        #[diesel(sql_type = Text)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(serialize::IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let value = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                value.parse::<Self>().map_err(Into::into)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(format!("Unknown {}: {}", $label, s)),
                }
            }
        }
    };
}

// ============================================================================
// PROJECT
// ============================================================================

text_enum! {
    /// Processing state of an imported source video.
    ProjectStatus, "project status", default = Pending {
        Pending => "pending",
        Transcribing => "transcribing",
        Analyzing => "analyzing",
        Ready => "ready",
        Failed => "failed" | "error",
    }
}

// ============================================================================
// CLIP
// ============================================================================

text_enum! {
    ClipStatus, "clip status", default = Draft {
        Draft => "draft",
        Rendering => "rendering",
        Ready => "ready" | "rendered",
        Published => "published",
        Failed => "failed" | "error",
    }
}

text_enum! {
    /// Kind of file rendered for a clip.
    AssetKind, "asset kind", default = Video {
        Video => "video",
        Audio => "audio",
        Thumbnail => "thumbnail",
        Subtitle => "subtitle" | "caption" | "srt",
        Waveform => "waveform",
    }
}

text_enum! {
    /// Publishing destination. Used by analytics rows and autopilot configs.
    Platform, "platform", default = Youtube {
        Youtube => "youtube" | "youtube_shorts",
        Tiktok => "tiktok",
        Instagram => "instagram" | "reels",
        X => "x" | "twitter",
        Facebook => "facebook",
    }
}

// ============================================================================
// JOB
// ============================================================================

text_enum! {
    JobStatus, "job status", default = Pending {
        Pending => "pending" | "queued",
        Running => "running",
        Completed => "completed" | "done",
        Failed => "failed",
    }
}
