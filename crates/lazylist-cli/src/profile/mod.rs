//! Saved endpoint profile.

pub mod storage;

use serde::{Deserialize, Serialize};

use lazylist_core::ItemSchema;

use crate::cli::SourceArgs;

/// Everything needed to reach an endpoint, saved between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub source: Option<String>,
    pub signer: Option<String>,
    pub events_path: Option<String>,
    pub token: Option<String>,
    pub command: Option<String>,
    pub search_command: Option<String>,
    pub schema: Option<ItemSchema>,
}

impl Profile {
    /// Apply command-line flags on top of the saved values.
    pub fn overlay(mut self, args: &SourceArgs) -> Self {
        fn pick(flag: &Option<String>, saved: &mut Option<String>) {
            if flag.is_some() {
                saved.clone_from(flag);
            }
        }

        pick(&args.source, &mut self.source);
        pick(&args.signer, &mut self.signer);
        pick(&args.events_path, &mut self.events_path);
        pick(&args.token, &mut self.token);
        pick(&args.command, &mut self.command);
        pick(&args.search_command, &mut self.search_command);

        if args.id_field.is_some() || args.media_field.is_some() {
            let mut schema = self.schema.take().unwrap_or_default();
            if let Some(id) = &args.id_field {
                schema.id_field.clone_from(id);
            }
            if let Some(media) = &args.media_field {
                schema.media_field.clone_from(media);
            }
            self.schema = Some(schema);
        }

        self
    }

    pub fn schema(&self) -> ItemSchema {
        self.schema.clone().unwrap_or_default()
    }
}
